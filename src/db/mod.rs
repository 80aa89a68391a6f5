//! Connection pooling, statement execution and catalog introspection.

pub mod catalog;
pub mod config;
pub mod executor;
pub mod pool;
pub mod reconstruct;
pub mod types;
pub mod value;

pub use config::DatabaseConfig;
pub use pool::{ConnectionProvider, PoolStatus};
