use actix_web::{
	cookie::{time::Duration as ActixWebDuration, Cookie},
	post, web, HttpResponse,
};
use argon2::{
	password_hash::{PasswordHash, PasswordVerifier},
	Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use log::{info, warn};
use serde_json::json;

use crate::{
	api::CustomError,
	config::Config,
	models::{LoginUserSchema, TokenClaims, ADMIN_ROLE},
	AppState,
};

/// Signs an HS256 token valid for `jwt_maxage` minutes.
pub fn issue_token(config: &Config, sub: &str, role: &str) -> Result<String, CustomError> {
	let now = Utc::now();
	let claims = TokenClaims {
		sub: sub.to_string(),
		role: role.to_string(),
		iat: now.timestamp() as usize,
		exp: (now + Duration::minutes(config.jwt_maxage)).timestamp() as usize,
	};

	encode(
		&Header::default(),
		&claims,
		&EncodingKey::from_secret(config.jwt_secret.as_ref()),
	)
	.map_err(|e| CustomError::Internal(e.to_string()))
}

fn verify_password(password_hash: &str, password: &str) -> bool {
	match PasswordHash::new(password_hash) {
		Ok(parsed) => Argon2::default()
			.verify_password(password.as_bytes(), &parsed)
			.is_ok(),
		Err(e) => {
			warn!("ADMIN_PASSWORD_HASH is not a valid PHC string: {e}");
			false
		}
	}
}

#[post("/auth/login")]
pub async fn login_handler(
	body: web::Json<LoginUserSchema>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	if body.login != data.env.admin_login
		|| !verify_password(&data.env.admin_password_hash, &body.password)
	{
		warn!("Неудачная попытка входа: {}", body.login);
		return Err(CustomError::BadRequest(
			"Неверный логин или пароль".to_string(),
		));
	}

	let token = issue_token(&data.env, &body.login, ADMIN_ROLE)?;

	let cookie = Cookie::build("token", token.to_owned())
		.path("/")
		.max_age(ActixWebDuration::new(60 * data.env.jwt_maxage, 0))
		.http_only(true)
		.finish();

	info!("Модератор {} вошёл в систему", body.login);

	Ok(HttpResponse::Ok()
		.cookie(cookie)
		.json(json!({"status": "success", "token": token})))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::jwt_auth::tests::test_state;
	use actix_web::{http::StatusCode, test, App};
	use argon2::password_hash::{PasswordHasher, SaltString};
	use rand_core::OsRng;
	use jsonwebtoken::{decode, DecodingKey, Validation};

	fn hash(password: &str) -> String {
		let salt = SaltString::generate(&mut OsRng);
		Argon2::default()
			.hash_password(password.as_bytes(), &salt)
			.unwrap()
			.to_string()
	}

	#[actix_web::test]
	async fn issued_token_carries_role_and_expiry() {
		let state = test_state();
		let token = issue_token(&state.env, "admin", ADMIN_ROLE).unwrap();

		let claims = decode::<TokenClaims>(
			&token,
			&DecodingKey::from_secret(state.env.jwt_secret.as_ref()),
			&Validation::default(),
		)
		.unwrap()
		.claims;

		assert_eq!(claims.sub, "admin");
		assert_eq!(claims.role, ADMIN_ROLE);
		assert_eq!(claims.exp - claims.iat, 60 * 60);
	}

	#[actix_web::test]
	async fn password_check() {
		let stored = hash("s3cret");

		assert!(verify_password(&stored, "s3cret"));
		assert!(!verify_password(&stored, "wrong"));
		assert!(!verify_password("not-a-hash", "s3cret"));
	}

	#[actix_web::test]
	async fn login_sets_token_cookie() {
		let state = test_state();
		let mut env = state.env.clone();
		env.admin_password_hash = hash("s3cret");
		let state = web::Data::new(AppState {
			db: state.db.clone(),
			env,
		});
		let app = test::init_service(App::new().app_data(state).service(login_handler)).await;

		let req = test::TestRequest::post()
			.uri("/auth/login")
			.set_json(json!({"login": "admin", "password": "s3cret"}))
			.to_request();
		let resp = test::call_service(&app, req).await;

		assert_eq!(resp.status(), StatusCode::OK);
		assert!(resp.response().cookies().any(|c| c.name() == "token"));
	}

	#[actix_web::test]
	async fn wrong_password_is_rejected() {
		let state = test_state();
		let mut env = state.env.clone();
		env.admin_password_hash = hash("s3cret");
		let state = web::Data::new(AppState {
			db: state.db.clone(),
			env,
		});
		let app = test::init_service(App::new().app_data(state).service(login_handler)).await;

		let req = test::TestRequest::post()
			.uri("/auth/login")
			.set_json(json!({"login": "admin", "password": "guess"}))
			.to_request();
		let resp = test::call_service(&app, req).await;

		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}
}
