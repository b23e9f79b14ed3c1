pub mod auth;
pub mod bookings;
pub mod cache_settings;
pub mod clinics;
pub mod config;
pub mod packages;
pub mod reviews;

pub use self::config::config;
