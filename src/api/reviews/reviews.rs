use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
	api::CustomError,
	models::{AddReviewSchema, Count, ReviewRow, ReviewStatus},
};

/// Ratings are read back as text, see [`ReviewRow`].
const REVIEW_COLUMNS: &str = "review_id, clinic_id, \
	quality::text AS quality, service::text AS service, \
	comfort::text AS comfort, price::text AS price, \
	comment, status, author_name, author_phone, author_email, created_ts, updated_ts";

impl ReviewRow {
	pub async fn get_review(db: &Pool<Postgres>, review_id: Uuid) -> Result<Self, CustomError> {
		let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE review_id = $1");
		let review = sqlx::query_as::<_, ReviewRow>(&sql)
			.bind(review_id)
			.fetch_one(db)
			.await?;

		Ok(review)
	}

	/// Newest first. `status = None` returns every status.
	pub async fn get_by_clinic(
		db: &Pool<Postgres>,
		clinic_id: Uuid,
		status: Option<ReviewStatus>,
		limit: i64,
		offset: i64,
	) -> Result<Vec<Self>, CustomError> {
		let sql = format!(
			"SELECT {REVIEW_COLUMNS} FROM reviews
			WHERE clinic_id = $1 AND ($2::text IS NULL OR status = $2)
			ORDER BY created_ts DESC, review_id
			LIMIT $3 OFFSET $4"
		);
		let reviews = sqlx::query_as::<_, ReviewRow>(&sql)
			.bind(clinic_id)
			.bind(status.map(|s| s.as_str()))
			.bind(limit)
			.bind(offset)
			.fetch_all(db)
			.await?;

		Ok(reviews)
	}

	/// Every approved review of a clinic, for rating aggregation.
	pub async fn get_approved_by_clinic(
		db: &Pool<Postgres>,
		clinic_id: Uuid,
	) -> Result<Vec<Self>, CustomError> {
		let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE clinic_id = $1 AND status = $2");
		let reviews = sqlx::query_as::<_, ReviewRow>(&sql)
			.bind(clinic_id)
			.bind(ReviewStatus::Approved.as_str())
			.fetch_all(db)
			.await?;

		Ok(reviews)
	}

	/// Moderation queue, oldest first.
	pub async fn get_by_status(
		db: &Pool<Postgres>,
		status: Option<ReviewStatus>,
		limit: i64,
		offset: i64,
	) -> Result<Vec<Self>, CustomError> {
		let sql = format!(
			"SELECT {REVIEW_COLUMNS} FROM reviews
			WHERE ($1::text IS NULL OR status = $1)
			ORDER BY created_ts, review_id
			LIMIT $2 OFFSET $3"
		);
		let reviews = sqlx::query_as::<_, ReviewRow>(&sql)
			.bind(status.map(|s| s.as_str()))
			.bind(limit)
			.bind(offset)
			.fetch_all(db)
			.await?;

		Ok(reviews)
	}

	pub async fn count_by_status(
		db: &Pool<Postgres>,
		status: Option<ReviewStatus>,
	) -> Result<i64, CustomError> {
		let count = sqlx::query_as::<_, Count>(
			"SELECT count(*) AS count FROM reviews WHERE ($1::text IS NULL OR status = $1)",
		)
		.bind(status.map(|s| s.as_str()))
		.fetch_one(db)
		.await?;

		Ok(count.count.unwrap_or(0))
	}

	/// New reviews always start in the moderation queue.
	pub async fn insert_review(
		db: &Pool<Postgres>,
		clinic_id: Uuid,
		body: &AddReviewSchema,
	) -> Result<Self, CustomError> {
		let sql = format!(
			"INSERT INTO reviews
			(clinic_id, quality, service, comfort, price, average_rating, comment, status, author_name, author_phone, author_email)
			VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
			RETURNING {REVIEW_COLUMNS}"
		);
		let review = sqlx::query_as::<_, ReviewRow>(&sql)
			.bind(clinic_id)
			.bind(body.quality)
			.bind(body.service)
			.bind(body.comfort)
			.bind(body.price)
			.bind(body.average_rating())
			.bind(body.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()))
			.bind(ReviewStatus::Pending.as_str())
			.bind(body.author_name.trim())
			.bind(body.author_phone.as_deref())
			.bind(body.author_email.as_deref())
			.fetch_one(db)
			.await?;

		Ok(review)
	}

	pub async fn update_status(
		db: &Pool<Postgres>,
		review_id: Uuid,
		status: ReviewStatus,
	) -> Result<Self, CustomError> {
		let sql = format!(
			"UPDATE reviews SET status = $1, updated_ts = now() WHERE review_id = $2 RETURNING {REVIEW_COLUMNS}"
		);
		let review = sqlx::query_as::<_, ReviewRow>(&sql)
			.bind(status.as_str())
			.bind(review_id)
			.fetch_one(db)
			.await?;

		Ok(review)
	}

	pub async fn delete_review(db: &Pool<Postgres>, review_id: Uuid) -> Result<u64, CustomError> {
		let result = sqlx::query("DELETE FROM reviews WHERE review_id = $1")
			.bind(review_id)
			.execute(db)
			.await?;

		Ok(result.rows_affected())
	}
}
