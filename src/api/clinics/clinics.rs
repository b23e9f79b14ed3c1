use sqlx::{postgres::PgArguments, query::QueryAs, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
	api::CustomError,
	models::{limit_offset, Clinic, ClinicFilterOptions, ClinicSort, Count, SaveClinic},
	scoring::Scores,
};

/// Writable columns, in bind order.
const CLINIC_COLUMNS: [&str; 26] = [
	"name_ru",
	"name_ro",
	"address_ru",
	"address_ro",
	"city",
	"phone",
	"website",
	"parking",
	"open_24h",
	"weekend_work",
	"installment_plan",
	"urgent_care",
	"online_booking",
	"evening_hours",
	"convenient_location",
	"has_licenses",
	"has_certificates",
	"has_promotions",
	"google_rating",
	"google_reviews_count",
	"doctor_experience",
	"reviews_index",
	"trust_index",
	"access_index",
	"price_index",
	"d_score",
];

fn insert_sql() -> String {
	let placeholders = (1..=CLINIC_COLUMNS.len())
		.map(|i| format!("${i}"))
		.collect::<Vec<String>>()
		.join(", ");

	format!(
		"INSERT INTO clinics ({}) VALUES ({}) RETURNING *",
		CLINIC_COLUMNS.join(", "),
		placeholders
	)
}

fn update_sql() -> String {
	let assignments = CLINIC_COLUMNS
		.iter()
		.enumerate()
		.map(|(i, column)| format!("{column} = ${}", i + 1))
		.collect::<Vec<String>>()
		.join(", ");

	format!(
		"UPDATE clinics SET {}, updated_ts = now() WHERE clinic_id = ${} RETURNING *",
		assignments,
		CLINIC_COLUMNS.len() + 1
	)
}

fn bind_clinic<'q>(
	query: QueryAs<'q, Postgres, Clinic, PgArguments>,
	body: &SaveClinic,
	scores: &Scores,
) -> QueryAs<'q, Postgres, Clinic, PgArguments> {
	query
		.bind(body.name_ru.trim().to_string())
		.bind(body.name_ro.clone())
		.bind(body.address_ru.clone())
		.bind(body.address_ro.clone())
		.bind(body.city.clone())
		.bind(body.phone.clone())
		.bind(body.website.clone())
		.bind(body.parking)
		.bind(body.open_24h)
		.bind(body.weekend_work)
		.bind(body.installment_plan)
		.bind(body.urgent_care)
		.bind(body.online_booking)
		.bind(body.evening_hours)
		.bind(body.convenient_location)
		.bind(body.has_licenses)
		.bind(body.has_certificates)
		.bind(body.has_promotions)
		.bind(body.google_rating)
		.bind(body.google_reviews_count)
		.bind(body.doctor_experience)
		.bind(scores.reviews_index)
		.bind(scores.trust_index)
		.bind(scores.access_index)
		.bind(scores.price_index)
		.bind(scores.d_score)
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, opts: &ClinicFilterOptions) {
	if let Some(city) = opts.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
		query
			.push(" AND lower(city) = lower(")
			.push_bind(city.to_string())
			.push(")");
	}

	let flags = [
		("parking", opts.parking),
		("open_24h", opts.open_24h),
		("weekend_work", opts.weekend_work),
		("installment_plan", opts.installment),
		("urgent_care", opts.urgent_care),
	];
	for (column, wanted) in flags {
		if let Some(wanted) = wanted {
			query.push(format!(" AND {column} = ")).push_bind(wanted);
		}
	}
}

fn order_by(sort: ClinicSort) -> &'static str {
	match sort {
		ClinicSort::Score => " ORDER BY d_score DESC, clinic_id",
		ClinicSort::Rating => " ORDER BY google_rating DESC NULLS LAST, d_score DESC, clinic_id",
		ClinicSort::Name => " ORDER BY name_ru, clinic_id",
	}
}

impl Clinic {
	pub async fn get_clinic(db: &Pool<Postgres>, clinic_id: Uuid) -> Result<Self, CustomError> {
		let clinic = sqlx::query_as::<_, Clinic>("SELECT * FROM clinics WHERE clinic_id = $1")
			.bind(clinic_id)
			.fetch_one(db)
			.await?;

		Ok(clinic)
	}

	pub async fn get_clinics(
		db: &Pool<Postgres>,
		opts: &ClinicFilterOptions,
	) -> Result<Vec<Self>, CustomError> {
		let (limit, offset) = limit_offset(opts.page, opts.limit);

		let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM clinics WHERE TRUE");
		push_filters(&mut query, opts);
		query
			.push(order_by(opts.sort.unwrap_or_default()))
			.push(" LIMIT ")
			.push_bind(limit)
			.push(" OFFSET ")
			.push_bind(offset);

		let clinics = query.build_query_as::<Clinic>().fetch_all(db).await?;

		Ok(clinics)
	}

	pub async fn count_clinics(
		db: &Pool<Postgres>,
		opts: &ClinicFilterOptions,
	) -> Result<i64, CustomError> {
		let mut query =
			QueryBuilder::<Postgres>::new("SELECT count(*) AS count FROM clinics WHERE TRUE");
		push_filters(&mut query, opts);

		let count = query.build_query_as::<Count>().fetch_one(db).await?;

		Ok(count.count.unwrap_or(0))
	}

	pub async fn insert_clinic(
		db: &Pool<Postgres>,
		body: &SaveClinic,
		scores: &Scores,
	) -> Result<Self, CustomError> {
		let sql = insert_sql();
		let clinic = bind_clinic(sqlx::query_as::<_, Clinic>(&sql), body, scores)
			.fetch_one(db)
			.await?;

		Ok(clinic)
	}

	pub async fn update_clinic(
		db: &Pool<Postgres>,
		clinic_id: Uuid,
		body: &SaveClinic,
		scores: &Scores,
	) -> Result<Self, CustomError> {
		let sql = update_sql();
		let clinic = bind_clinic(sqlx::query_as::<_, Clinic>(&sql), body, scores)
			.bind(clinic_id)
			.fetch_one(db)
			.await?;

		Ok(clinic)
	}

	/// Reviews, packages and bookings go with the clinic (ON DELETE CASCADE).
	pub async fn delete_clinic(db: &Pool<Postgres>, clinic_id: Uuid) -> Result<u64, CustomError> {
		let result = sqlx::query("DELETE FROM clinics WHERE clinic_id = $1")
			.bind(clinic_id)
			.execute(db)
			.await?;

		Ok(result.rows_affected())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn insert_sql_has_one_placeholder_per_column() {
		let sql = insert_sql();

		assert!(sql.starts_with("INSERT INTO clinics (name_ru, name_ro,"));
		assert!(sql.contains("$26) RETURNING *"));
		assert!(!sql.contains("$27"));
	}

	#[test]
	fn update_sql_binds_id_last() {
		let sql = update_sql();

		assert!(sql.contains("name_ru = $1, name_ro = $2"));
		assert!(sql.contains("d_score = $26, updated_ts = now()"));
		assert!(sql.ends_with("WHERE clinic_id = $27 RETURNING *"));
	}

	#[test]
	fn filters_only_add_requested_conditions() {
		let opts = ClinicFilterOptions {
			city: Some(" Chișinău ".to_string()),
			parking: Some(true),
			installment: Some(false),
			..Default::default()
		};

		let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM clinics WHERE TRUE");
		push_filters(&mut query, &opts);

		assert_eq!(
			query.sql(),
			"SELECT * FROM clinics WHERE TRUE AND lower(city) = lower($1) AND parking = $2 AND installment_plan = $3"
		);
	}
}
