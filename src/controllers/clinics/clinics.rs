use actix_web::{
	delete, get, post, put,
	web::{self, Path},
	HttpResponse,
};
use log::info;
use serde_json::json;
use uuid::Uuid;

use crate::{
	api::CustomError,
	jwt_auth::JwtMiddleware,
	models::{Clinic, ClinicFilterOptions, FilteredClinic, LangOptions, ReviewRow, SaveClinic},
	ratings,
	scoring::compute_scores,
	utils::filter_clinic_record,
	AppState,
};

#[get("/clinics")]
pub async fn get_clinics_handler(
	opts: web::Query<ClinicFilterOptions>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	let lang = opts.lang.unwrap_or_default();

	let clinics = Clinic::get_clinics(&data.db, &opts).await?;
	let clinics_count = Clinic::count_clinics(&data.db, &opts).await?;

	let json_response = json!({
		"status": "success",
		"data": json!({
			"clinics": &clinics.iter().map(|clinic| filter_clinic_record(clinic, lang)).collect::<Vec<FilteredClinic>>(),
			"clinics_count": &clinics_count
		})
	});

	Ok(HttpResponse::Ok().json(json_response))
}

#[get("/clinic/{id}")]
pub async fn get_clinic_handler(
	path: Path<Uuid>,
	opts: web::Query<LangOptions>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	let clinic_id = path.into_inner();
	let lang = opts.lang.unwrap_or_default();

	let clinic = Clinic::get_clinic(&data.db, clinic_id).await?;
	let approved = ReviewRow::get_approved_by_clinic(&data.db, clinic_id).await?;
	let ratings = ratings::aggregate_rows(approved);

	let json_response = json!({
		"status": "success",
		"data": json!({
			"clinic": filter_clinic_record(&clinic, lang),
			"ratings": ratings
		})
	});

	Ok(HttpResponse::Ok().json(json_response))
}

#[post("/clinics")]
pub async fn add_clinic_handler(
	_: JwtMiddleware,
	body: web::Json<SaveClinic>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	body.validate().map_err(CustomError::BadRequest)?;

	let scores = compute_scores(&body.score_input());
	let clinic = Clinic::insert_clinic(&data.db, &body, &scores).await?;

	info!("Клиника {} добавлена, D-Score {}", clinic.clinic_id, clinic.d_score);

	let json_response = json!({
		"status": "success",
		"data": json!({
			"clinic": filter_clinic_record(&clinic, Default::default())
		})
	});

	Ok(HttpResponse::Created().json(json_response))
}

/// Full replacement; every index is recomputed from the new inputs.
#[put("/clinic/{id}")]
pub async fn update_clinic_handler(
	_: JwtMiddleware,
	path: Path<Uuid>,
	body: web::Json<SaveClinic>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	body.validate().map_err(CustomError::BadRequest)?;

	let scores = compute_scores(&body.score_input());
	let clinic = Clinic::update_clinic(&data.db, path.into_inner(), &body, &scores).await?;

	info!("Клиника {} обновлена, D-Score {}", clinic.clinic_id, clinic.d_score);

	let json_response = json!({
		"status": "success",
		"data": json!({
			"clinic": filter_clinic_record(&clinic, Default::default())
		})
	});

	Ok(HttpResponse::Ok().json(json_response))
}

#[delete("/clinic/{id}")]
pub async fn delete_clinic_handler(
	_: JwtMiddleware,
	path: Path<Uuid>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	let clinic_id = path.into_inner();

	if Clinic::delete_clinic(&data.db, clinic_id).await? == 0 {
		return Err(CustomError::NotFound(format!("Клиника {clinic_id} не найдена")));
	}

	info!("Клиника {clinic_id} удалена");

	Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{controllers::auth::issue_token, jwt_auth::tests::test_state, models::ADMIN_ROLE};
	use actix_web::{http::StatusCode, test, App};

	#[actix_web::test]
	async fn writes_require_a_token() {
		let app = test::init_service(
			App::new()
				.app_data(test_state())
				.service(add_clinic_handler)
				.service(delete_clinic_handler),
		)
		.await;

		let req = test::TestRequest::post()
			.uri("/clinics")
			.set_json(json!({"name_ru": "Dent"}))
			.to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

		let req = test::TestRequest::delete()
			.uri(&format!("/clinic/{}", Uuid::new_v4()))
			.to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
	}

	#[actix_web::test]
	async fn invalid_clinic_is_rejected_before_saving() {
		let state = test_state();
		let token = issue_token(&state.env, "admin", ADMIN_ROLE).unwrap();
		let app = test::init_service(App::new().app_data(state).service(add_clinic_handler)).await;

		let req = test::TestRequest::post()
			.uri("/clinics")
			.insert_header(("Authorization", format!("Bearer {token}")))
			.set_json(json!({"name_ru": "Dent", "google_rating": 7.5}))
			.to_request();
		let resp = test::call_service(&app, req).await;

		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
		let body: serde_json::Value = test::read_body_json(resp).await;
		assert_eq!(body["status"], "error");
	}
}
