pub mod api;
pub mod cache;
pub mod config;
pub mod controllers;
pub mod jwt_auth;
pub mod models;
pub mod ratings;
pub mod scoring;
pub mod utils;

use config::Config;
use sqlx::{Pool, Postgres};

pub struct AppState {
	pub db: Pool<Postgres>,
	pub env: Config,
}
