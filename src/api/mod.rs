//! Fetch operations: raw, paginated, and cached.

mod cached;
mod content;
mod fetch;
mod paginate;

pub use content::*;
pub use fetch::FetchOptions;
pub use paginate::Paginated;
