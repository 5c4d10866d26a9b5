pub mod cache;
pub mod client;
pub mod error;
pub mod result;
pub mod search;

pub use cache::RatingCache;
pub use client::{LookupConfig, RatingClient};
pub use error::LookupError;
pub use result::{Grade, LookupOutcome, RatingRecord};
pub use search::{SearchResponse, ServiceSearch, TosdrClient};
