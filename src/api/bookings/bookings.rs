use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
	api::CustomError,
	models::{AddBookingSchema, Booking, BookingStatus, BookingsFilterOptions, Count},
};

impl Booking {
	pub async fn get_booking(db: &Pool<Postgres>, booking_id: Uuid) -> Result<Self, CustomError> {
		let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE booking_id = $1")
			.bind(booking_id)
			.fetch_one(db)
			.await?;

		Ok(booking)
	}

	/// Newest first.
	pub async fn get_bookings(
		db: &Pool<Postgres>,
		opts: &BookingsFilterOptions,
		limit: i64,
		offset: i64,
	) -> Result<Vec<Self>, CustomError> {
		let bookings = sqlx::query_as::<_, Booking>(
			"SELECT * FROM bookings
			WHERE ($1::text IS NULL OR status = $1)
			AND ($2::uuid IS NULL OR clinic_id = $2)
			ORDER BY created_ts DESC, booking_id
			LIMIT $3 OFFSET $4",
		)
		.bind(opts.status.map(|s| s.as_str()))
		.bind(opts.clinic_id)
		.bind(limit)
		.bind(offset)
		.fetch_all(db)
		.await?;

		Ok(bookings)
	}

	pub async fn count_bookings(
		db: &Pool<Postgres>,
		opts: &BookingsFilterOptions,
	) -> Result<i64, CustomError> {
		let count = sqlx::query_as::<_, Count>(
			"SELECT count(*) AS count FROM bookings
			WHERE ($1::text IS NULL OR status = $1)
			AND ($2::uuid IS NULL OR clinic_id = $2)",
		)
		.bind(opts.status.map(|s| s.as_str()))
		.bind(opts.clinic_id)
		.fetch_one(db)
		.await?;

		Ok(count.count.unwrap_or(0))
	}

	pub async fn insert_booking(
		db: &Pool<Postgres>,
		body: &AddBookingSchema,
	) -> Result<Self, CustomError> {
		let booking = sqlx::query_as::<_, Booking>(
			"INSERT INTO bookings (clinic_id, package_id, name, phone, email, preferred_date, comment, status)
			VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
			RETURNING *",
		)
		.bind(body.clinic_id)
		.bind(body.package_id)
		.bind(body.name.trim())
		.bind(body.phone.trim())
		.bind(body.email.as_deref())
		.bind(body.preferred_date)
		.bind(body.comment.as_deref())
		.bind(BookingStatus::New.as_str())
		.fetch_one(db)
		.await?;

		Ok(booking)
	}

	pub async fn update_status(
		db: &Pool<Postgres>,
		booking_id: Uuid,
		status: BookingStatus,
	) -> Result<Self, CustomError> {
		let booking = sqlx::query_as::<_, Booking>(
			"UPDATE bookings SET status = $1, updated_ts = now() WHERE booking_id = $2 RETURNING *",
		)
		.bind(status.as_str())
		.bind(booking_id)
		.fetch_one(db)
		.await?;

		Ok(booking)
	}
}
