pub mod config;
pub mod error;
pub mod rate_limiters;
pub mod routes;
