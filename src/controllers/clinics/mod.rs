pub mod clinics;

pub use self::clinics::*;
