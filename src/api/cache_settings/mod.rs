pub mod cache_settings;

pub use self::cache_settings::*;
