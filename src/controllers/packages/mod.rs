pub mod packages;

pub use self::packages::*;
