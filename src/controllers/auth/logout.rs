use actix_web::{
	cookie::{time::Duration as ActixWebDuration, Cookie},
	post, HttpResponse, Responder,
};
use serde_json::json;

use crate::jwt_auth::JwtMiddleware;

#[post("/auth/logout")]
pub async fn logout_handler(_: JwtMiddleware) -> impl Responder {
	let cookie = Cookie::build("token", "")
		.path("/")
		.max_age(ActixWebDuration::new(-1, 0))
		.http_only(true)
		.finish();

	HttpResponse::Ok()
		.cookie(cookie)
		.json(json!({"status": "success"}))
}
