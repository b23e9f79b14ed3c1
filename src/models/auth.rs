use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
	pub sub: String,
	pub role: String,
	pub iat: usize,
	pub exp: usize,
}

#[derive(Debug, Deserialize)]
pub struct LoginUserSchema {
	pub login: String,
	pub password: String,
}
