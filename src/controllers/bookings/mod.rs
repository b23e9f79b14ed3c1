pub mod bookings;

pub use self::bookings::*;
