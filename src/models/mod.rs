pub mod auth;
pub mod bookings;
pub mod cache_settings;
pub mod clinics;
pub mod packages;
pub mod reviews;
pub mod shared;

pub use self::auth::*;
pub use self::bookings::*;
pub use self::cache_settings::*;
pub use self::clinics::*;
pub use self::packages::*;
pub use self::reviews::*;
pub use self::shared::*;
