//! Open5E API client library
//!
//! An async Rust client for the [Open5E](https://open5e.com) D&D 5e
//! content API, with a bounded-concurrency request queue, status-aware
//! retry with exponential backoff, transparent pagination aggregation,
//! and a cache-aside persistence layer with per-category TTLs.

pub mod api;
pub mod cache;
pub mod error;
pub mod model;
pub mod params;
pub mod rate_limit;
pub mod response;

mod client;

pub use api::FetchOptions;
pub use client::*;
pub use error::Error;
pub use response::CacheStatus;
pub use response::Response;
