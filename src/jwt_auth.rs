use actix_web::{dev::Payload, http, web, Error as ActixWebError, FromRequest, HttpRequest};
use jsonwebtoken::{decode, DecodingKey, Validation};
use std::future::{ready, Ready};

use crate::{
	api::CustomError,
	models::{TokenClaims, ADMIN_ROLE},
	AppState,
};

/// Extractor guarding moderator routes. Reads the token from the `token`
/// cookie or the `Authorization: Bearer` header.
pub struct JwtMiddleware {
	pub login: String,
}

fn token_from_request(req: &HttpRequest) -> Option<String> {
	req.cookie("token")
		.map(|c| c.value().to_string())
		.or_else(|| {
			req.headers()
				.get(http::header::AUTHORIZATION)
				.and_then(|h| h.to_str().ok())
				.and_then(|h| h.strip_prefix("Bearer "))
				.map(|t| t.trim().to_string())
		})
		.filter(|t| !t.is_empty())
}

fn authorize(req: &HttpRequest) -> Result<JwtMiddleware, CustomError> {
	let token = token_from_request(req).ok_or(CustomError::Unauthorized)?;

	let data = req
		.app_data::<web::Data<AppState>>()
		.ok_or_else(|| CustomError::Internal("состояние приложения не настроено".to_string()))?;

	let claims = decode::<TokenClaims>(
		&token,
		&DecodingKey::from_secret(data.env.jwt_secret.as_ref()),
		&Validation::default(),
	)
	.map_err(|_| CustomError::Unauthorized)?
	.claims;

	if claims.role != ADMIN_ROLE {
		return Err(CustomError::Forbidden);
	}

	Ok(JwtMiddleware { login: claims.sub })
}

impl FromRequest for JwtMiddleware {
	type Error = ActixWebError;
	type Future = Ready<Result<Self, Self::Error>>;

	fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
		ready(authorize(req).map_err(ActixWebError::from))
	}
}
