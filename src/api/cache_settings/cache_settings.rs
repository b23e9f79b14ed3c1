use sqlx::{Pool, Postgres};

use crate::{
	api::CustomError,
	cache::{CacheSettings, SettingsPatch},
	models::CacheSettingRow,
};

impl CacheSettingRow {
	pub async fn get_all(db: &Pool<Postgres>) -> Result<Vec<Self>, CustomError> {
		let rows = sqlx::query_as::<_, CacheSettingRow>(
			"SELECT key, value, updated_ts FROM cache_settings ORDER BY key",
		)
		.fetch_all(db)
		.await?;

		Ok(rows)
	}

	/// Defaults overlaid with whatever is stored.
	pub async fn load_patch(db: &Pool<Postgres>) -> Result<SettingsPatch, CustomError> {
		let mut settings = CacheSettings::default().to_patch();
		for row in Self::get_all(db).await? {
			let value = row.json_value();
			settings.insert(row.key, value);
		}

		Ok(settings)
	}

	pub async fn upsert(db: &Pool<Postgres>, patch: &SettingsPatch) -> Result<(), CustomError> {
		let mut tx = db.begin().await?;

		for (key, value) in patch {
			sqlx::query(
				"INSERT INTO cache_settings (key, value, updated_ts) VALUES ($1, $2, now())
				ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_ts = now()",
			)
			.bind(key)
			.bind(value.to_string())
			.execute(&mut *tx)
			.await?;
		}

		tx.commit().await?;

		Ok(())
	}
}
