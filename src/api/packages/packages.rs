use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
	api::CustomError,
	models::{AddPackageSchema, Package},
};

impl Package {
	pub async fn get_active_by_clinic(
		db: &Pool<Postgres>,
		clinic_id: Uuid,
	) -> Result<Vec<Self>, CustomError> {
		let packages = sqlx::query_as::<_, Package>(
			"SELECT * FROM packages WHERE clinic_id = $1 AND is_active ORDER BY price, package_id",
		)
		.bind(clinic_id)
		.fetch_all(db)
		.await?;

		Ok(packages)
	}

	pub async fn get_package(db: &Pool<Postgres>, package_id: Uuid) -> Result<Self, CustomError> {
		let package = sqlx::query_as::<_, Package>("SELECT * FROM packages WHERE package_id = $1")
			.bind(package_id)
			.fetch_one(db)
			.await?;

		Ok(package)
	}

	pub async fn insert_package(
		db: &Pool<Postgres>,
		clinic_id: Uuid,
		body: &AddPackageSchema,
	) -> Result<Self, CustomError> {
		let package = sqlx::query_as::<_, Package>(
			"INSERT INTO packages (clinic_id, name_ru, name_ro, description_ru, description_ro, price, old_price, is_active)
			VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
			RETURNING *",
		)
		.bind(clinic_id)
		.bind(body.name_ru.trim())
		.bind(body.name_ro.as_deref())
		.bind(body.description_ru.as_deref())
		.bind(body.description_ro.as_deref())
		.bind(body.price)
		.bind(body.old_price)
		.fetch_one(db)
		.await?;

		Ok(package)
	}

	pub async fn delete_package(db: &Pool<Postgres>, package_id: Uuid) -> Result<u64, CustomError> {
		let result = sqlx::query("DELETE FROM packages WHERE package_id = $1")
			.bind(package_id)
			.execute(db)
			.await?;

		Ok(result.rows_affected())
	}
}
