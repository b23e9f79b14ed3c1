pub mod bookings;
pub mod cache_settings;
pub mod clinics;
pub mod error;
pub mod packages;
pub mod reviews;

pub use self::error::*;
