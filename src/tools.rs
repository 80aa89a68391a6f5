//! The three database operations offered to the invocation host.
//!
//! Each operation holds one pooled connection for its whole duration. The
//! connection guard is dropped on every exit path, returning it to the pool.

use crate::db::catalog;
use crate::db::executor;
use crate::db::pool::ConnectionProvider;
use crate::db::reconstruct::reconstruct;
use crate::db::types::{ColumnDescriptor, QueryResult, TableRelationships};
use crate::error::Result;

pub const RUN_QUERY: &str = "run_query";
pub const DESCRIBE_TABLE: &str = "describe_table";
pub const DESCRIBE_INDEXES_AND_FOREIGN_KEYS: &str = "describe_indexes_and_foreign_keys";

#[derive(Debug, Clone)]
pub struct DatabaseTools {
    provider: ConnectionProvider,
}

impl DatabaseTools {
    pub fn new(provider: ConnectionProvider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &ConnectionProvider {
        &self.provider
    }

    /// Execute arbitrary, unvalidated SQL.
    ///
    /// This is the server's security-sensitive surface: it runs whatever it is
    /// given with the full privileges of the configured account.
    pub async fn run_query(&self, sql: &str) -> Result<QueryResult> {
        let mut conn = self.provider.acquire().await?;
        executor::execute(&mut conn, sql).await
    }

    /// Column metadata in ordinal order; empty for a missing table.
    pub async fn describe_table(&self, schema: &str, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let mut conn = self.provider.acquire().await?;
        let rows = catalog::columns(&mut conn, schema, table).await?;

        Ok(rows
            .into_iter()
            .map(|row| ColumnDescriptor {
                nullable: row.is_nullable == "YES",
                name: row.column_name,
                data_type: row.data_type,
                max_length: row.character_maximum_length,
            })
            .collect())
    }

    /// Grouped indexes plus outbound and inbound foreign keys.
    pub async fn describe_indexes_and_foreign_keys(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<TableRelationships> {
        let mut conn = self.provider.acquire().await?;
        let index_rows = catalog::index_statistics(&mut conn, schema, table).await?;
        let key_rows = catalog::foreign_key_usage(&mut conn, schema, table).await?;
        drop(conn);

        Ok(reconstruct(index_rows, key_rows))
    }
}
