pub mod config;
pub mod registry;
pub mod token_bucket;

pub use config::{BucketConfig, InvalidConfig, RefillPolicy};
pub use registry::BucketRegistry;
pub use token_bucket::TokenBucket;

/// Identifies whose bucket a request draws from, e.g. the client IP address.
pub type Key = String;
