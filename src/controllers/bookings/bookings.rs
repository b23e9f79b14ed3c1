use actix_web::{
	get, patch, post,
	web::{self, Path},
	HttpResponse,
};
use chrono::Utc;
use log::info;
use serde_json::json;
use uuid::Uuid;

use crate::{
	api::CustomError,
	jwt_auth::JwtMiddleware,
	models::{
		limit_offset, AddBookingSchema, Booking, BookingStatus, BookingsFilterOptions, Clinic,
		FilteredBooking, Package, UpdateBookingStatusSchema,
	},
	utils::filter_booking_record,
	AppState,
};

#[post("/bookings")]
pub async fn add_booking_handler(
	body: web::Json<AddBookingSchema>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	body.validate(Utc::now().date_naive())
		.map_err(CustomError::BadRequest)?;

	Clinic::get_clinic(&data.db, body.clinic_id).await?;

	if let Some(package_id) = body.package_id {
		let package = Package::get_package(&data.db, package_id).await?;
		if package.clinic_id != body.clinic_id || !package.is_active {
			return Err(CustomError::BadRequest(
				"Пакет не относится к выбранной клинике".to_string(),
			));
		}
	}

	let booking = Booking::insert_booking(&data.db, &body).await?;
	info!("Новая запись {} в клинику {}", booking.booking_id, booking.clinic_id);

	let json_response = json!({
		"status": "success",
		"data": json!({
			"booking": filter_booking_record(&booking)
		})
	});

	Ok(HttpResponse::Created().json(json_response))
}

#[get("/bookings")]
pub async fn get_bookings_handler(
	_: JwtMiddleware,
	opts: web::Query<BookingsFilterOptions>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	let (limit, offset) = limit_offset(opts.page, opts.limit);

	let bookings = Booking::get_bookings(&data.db, &opts, limit, offset).await?;
	let bookings_count = Booking::count_bookings(&data.db, &opts).await?;

	let json_response = json!({
		"status": "success",
		"data": json!({
			"bookings": &bookings.iter().map(filter_booking_record).collect::<Vec<FilteredBooking>>(),
			"bookings_count": &bookings_count
		})
	});

	Ok(HttpResponse::Ok().json(json_response))
}

#[patch("/booking/{id}")]
pub async fn update_booking_status_handler(
	_: JwtMiddleware,
	path: Path<Uuid>,
	body: web::Json<UpdateBookingStatusSchema>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	let booking_id = path.into_inner();
	let current = Booking::get_booking(&data.db, booking_id).await?;
	let status = current
		.status
		.parse::<BookingStatus>()
		.map_err(CustomError::Internal)?;

	if !status.can_transition_to(body.status) {
		return Err(CustomError::Conflict(format!(
			"Нельзя перевести запись из статуса {status} в {}",
			body.status
		)));
	}

	let booking = Booking::update_status(&data.db, booking_id, body.status).await?;
	info!("Запись {booking_id}: {status} -> {}", body.status);

	let json_response = json!({
		"status": "success",
		"data": json!({
			"booking": filter_booking_record(&booking)
		})
	});

	Ok(HttpResponse::Ok().json(json_response))
}
