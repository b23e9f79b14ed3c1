use actix_web::{
	delete, get, post,
	web::{self, Path},
	HttpResponse,
};
use log::info;
use serde_json::json;
use uuid::Uuid;

use crate::{
	api::CustomError,
	jwt_auth::JwtMiddleware,
	models::{AddPackageSchema, Clinic, FilteredPackage, LangOptions, Package},
	utils::filter_package_record,
	AppState,
};

#[get("/clinic/{id}/packages")]
pub async fn get_packages_handler(
	path: Path<Uuid>,
	opts: web::Query<LangOptions>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	let lang = opts.lang.unwrap_or_default();
	let packages = Package::get_active_by_clinic(&data.db, path.into_inner()).await?;

	let json_response = json!({
		"status": "success",
		"data": json!({
			"packages": &packages.iter().map(|package| filter_package_record(package, lang)).collect::<Vec<FilteredPackage>>()
		})
	});

	Ok(HttpResponse::Ok().json(json_response))
}

#[post("/clinic/{id}/packages")]
pub async fn add_package_handler(
	_: JwtMiddleware,
	path: Path<Uuid>,
	body: web::Json<AddPackageSchema>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	let clinic_id = path.into_inner();

	body.validate().map_err(CustomError::BadRequest)?;
	Clinic::get_clinic(&data.db, clinic_id).await?;

	let package = Package::insert_package(&data.db, clinic_id, &body).await?;
	info!("Пакет {} добавлен клинике {clinic_id}", package.package_id);

	let json_response = json!({
		"status": "success",
		"data": json!({
			"package": filter_package_record(&package, Default::default())
		})
	});

	Ok(HttpResponse::Created().json(json_response))
}

#[delete("/package/{id}")]
pub async fn delete_package_handler(
	_: JwtMiddleware,
	path: Path<Uuid>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	let package_id = path.into_inner();

	if Package::delete_package(&data.db, package_id).await? == 0 {
		return Err(CustomError::NotFound(format!("Пакет {package_id} не найден")));
	}

	info!("Пакет {package_id} удалён");

	Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{controllers::auth::issue_token, jwt_auth::tests::test_state, models::ADMIN_ROLE};
	use actix_web::{http::StatusCode, test, App};

	#[actix_web::test]
	async fn old_price_below_price_is_rejected() {
		let state = test_state();
		let token = issue_token(&state.env, "admin", ADMIN_ROLE).unwrap();
		let app = test::init_service(App::new().app_data(state).service(add_package_handler)).await;

		let req = test::TestRequest::post()
			.uri(&format!("/clinic/{}/packages", Uuid::new_v4()))
			.insert_header(("Authorization", format!("Bearer {token}")))
			.set_json(json!({"name_ru": "Чистка", "price": 800, "old_price": 500}))
			.to_request();
		let resp = test::call_service(&app, req).await;

		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}
}
