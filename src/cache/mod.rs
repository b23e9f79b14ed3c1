//! Client side cache policy engine.
//!
//! Intercepts outbound `GET` requests and answers them from a versioned
//! in-memory store using one of three strategies per resource class:
//! cache-first, network-first or stale-while-revalidate. Settings come from
//! the server (`GET /api/cache-settings`) either by periodic pull or by a
//! pushed [`Command`].

pub mod clock;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod settings;
pub mod store;

pub use self::clock::*;
pub use self::engine::*;
pub use self::error::*;
pub use self::fetcher::*;
pub use self::settings::*;
pub use self::store::*;
