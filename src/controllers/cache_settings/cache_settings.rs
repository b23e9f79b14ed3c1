use actix_web::{get, put, web, HttpResponse};
use log::info;
use serde_json::json;

use crate::{
	api::CustomError,
	cache::{CacheSettings, SettingsPatch},
	jwt_auth::JwtMiddleware,
	models::CacheSettingRow,
	AppState,
};

/// Pulled by cache engines at startup and on every refresh tick.
#[get("/cache-settings")]
pub async fn get_cache_settings_handler(
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	let settings = CacheSettingRow::load_patch(&data.db).await?;

	let json_response = json!({
		"status": "success",
		"data": json!({
			"settings": settings
		})
	});

	Ok(HttpResponse::Ok().json(json_response))
}

/// Merges the given keys into the stored settings. Keys left out keep
/// their value.
#[put("/cache-settings")]
pub async fn update_cache_settings_handler(
	_: JwtMiddleware,
	body: web::Json<SettingsPatch>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	if body.is_empty() {
		return Err(CustomError::BadRequest(
			"Нет настроек для сохранения".to_string(),
		));
	}
	CacheSettings::validate_patch(&body).map_err(|e| CustomError::BadRequest(e.to_string()))?;

	CacheSettingRow::upsert(&data.db, &body).await?;
	info!(
		"Настройки кэша обновлены: {}",
		body.keys().cloned().collect::<Vec<String>>().join(", ")
	);

	let settings = CacheSettingRow::load_patch(&data.db).await?;

	let json_response = json!({
		"status": "success",
		"data": json!({
			"settings": settings
		})
	});

	Ok(HttpResponse::Ok().json(json_response))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{controllers::auth::issue_token, jwt_auth::tests::test_state, models::ADMIN_ROLE};
	use actix_web::{http::StatusCode, test, App};

	async fn put_settings(body: serde_json::Value, with_token: bool) -> StatusCode {
		let state = test_state();
		let token = issue_token(&state.env, "admin", ADMIN_ROLE).unwrap();
		let app = test::init_service(
			App::new()
				.app_data(state)
				.service(update_cache_settings_handler),
		)
		.await;

		let mut req = test::TestRequest::put().uri("/cache-settings").set_json(body);
		if with_token {
			req = req.insert_header(("Authorization", format!("Bearer {token}")));
		}

		test::call_service(&app, req.to_request()).await.status()
	}

	#[actix_web::test]
	async fn updates_require_a_token() {
		assert_eq!(
			put_settings(json!({"cacheEnabled": false}), false).await,
			StatusCode::UNAUTHORIZED
		);
	}

	#[actix_web::test]
	async fn unknown_key_is_rejected() {
		assert_eq!(
			put_settings(json!({"cacheEverything": true}), true).await,
			StatusCode::BAD_REQUEST
		);
	}

	#[actix_web::test]
	async fn invalid_value_is_rejected() {
		assert_eq!(
			put_settings(json!({"cacheStrategy": "cache-always"}), true).await,
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			put_settings(json!({"apiDataDuration": "soon"}), true).await,
			StatusCode::BAD_REQUEST
		);
	}

	#[actix_web::test]
	async fn empty_patch_is_rejected() {
		assert_eq!(put_settings(json!({}), true).await, StatusCode::BAD_REQUEST);
	}
}
