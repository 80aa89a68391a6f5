//! MCP server exposing a MySQL database.
//!
//! Three tools are offered: `run_query` executes arbitrary SQL,
//! `describe_table` lists column metadata, and
//! `describe_indexes_and_foreign_keys` reconstructs grouped indexes and
//! foreign keys from INFORMATION_SCHEMA rows.

pub mod cli;
pub mod db;
pub mod error;
pub mod stdio;
pub mod tools;

pub use db::{ConnectionProvider, DatabaseConfig};
pub use error::DatabaseError;
pub use tools::DatabaseTools;
