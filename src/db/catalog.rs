//! Fixed INFORMATION_SCHEMA queries, bound by `(schema, table)`.
//!
//! Textual catalog columns are cast to CHAR and numeric ones to SIGNED:
//! catalog column types vary between server versions (some report binary
//! strings or unsigned widths), and the casts keep decoding uniform.

use sqlx::mysql::{MySql, MySqlConnection, MySqlRow};
use sqlx::FromRow;

use crate::error::{DatabaseError, Result};

const COLUMNS_QUERY: &str = r#"
    SELECT
        CAST(COLUMN_NAME AS CHAR) AS column_name,
        CAST(DATA_TYPE AS CHAR) AS data_type,
        CAST(IS_NULLABLE AS CHAR) AS is_nullable,
        CAST(CHARACTER_MAXIMUM_LENGTH AS SIGNED) AS character_maximum_length
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
"#;

const INDEX_QUERY: &str = r#"
    SELECT
        CAST(INDEX_NAME AS CHAR) AS index_name,
        CAST(NON_UNIQUE = 0 AS SIGNED) AS is_primary_or_unique,
        CAST(SEQ_IN_INDEX AS SIGNED) AS seq_in_index,
        CAST(COLUMN_NAME AS CHAR) AS column_name
    FROM INFORMATION_SCHEMA.STATISTICS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
    ORDER BY INDEX_NAME, SEQ_IN_INDEX
"#;

const KEY_USAGE_QUERY: &str = r#"
    SELECT
        CAST(CONSTRAINT_NAME AS CHAR) AS constraint_name,
        CAST(TABLE_SCHEMA AS CHAR) AS table_schema,
        CAST(TABLE_NAME AS CHAR) AS table_name,
        CAST(COLUMN_NAME AS CHAR) AS column_name,
        CAST(REFERENCED_TABLE_SCHEMA AS CHAR) AS referenced_table_schema,
        CAST(REFERENCED_TABLE_NAME AS CHAR) AS referenced_table_name,
        CAST(REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column_name,
        CAST(ORDINAL_POSITION AS SIGNED) AS ordinal_position
    FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE
    WHERE TABLE_SCHEMA = ?
      AND TABLE_NAME = ?
      AND REFERENCED_TABLE_NAME IS NOT NULL
    ORDER BY CONSTRAINT_NAME, ORDINAL_POSITION
"#;

/// One INFORMATION_SCHEMA.COLUMNS row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ColumnRow {
    pub column_name: String,
    pub data_type: String,
    /// `"YES"` or `"NO"`.
    pub is_nullable: String,
    pub character_maximum_length: Option<i64>,
}

/// One INFORMATION_SCHEMA.STATISTICS row: a single column of a single index.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct IndexStatRow {
    pub index_name: Option<String>,
    pub is_primary_or_unique: i64,
    pub seq_in_index: i64,
    /// NULL for expression index parts.
    pub column_name: Option<String>,
}

/// One INFORMATION_SCHEMA.KEY_COLUMN_USAGE row of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct KeyUsageRow {
    pub constraint_name: String,
    pub table_schema: String,
    pub table_name: String,
    pub column_name: String,
    pub referenced_table_schema: String,
    pub referenced_table_name: String,
    pub referenced_column_name: String,
    pub ordinal_position: i64,
}

pub async fn columns(
    conn: &mut MySqlConnection,
    schema: &str,
    table: &str,
) -> Result<Vec<ColumnRow>> {
    fetch(conn, COLUMNS_QUERY, schema, table).await
}

pub async fn index_statistics(
    conn: &mut MySqlConnection,
    schema: &str,
    table: &str,
) -> Result<Vec<IndexStatRow>> {
    fetch(conn, INDEX_QUERY, schema, table).await
}

/// Key-usage rows of real foreign keys only; plain unique keys have no
/// referenced table and are filtered out.
pub async fn foreign_key_usage(
    conn: &mut MySqlConnection,
    schema: &str,
    table: &str,
) -> Result<Vec<KeyUsageRow>> {
    fetch(conn, KEY_USAGE_QUERY, schema, table).await
}

async fn fetch<T>(
    conn: &mut MySqlConnection,
    query: &'static str,
    schema: &str,
    table: &str,
) -> Result<Vec<T>>
where
    T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
{
    let rows = sqlx::query_as::<MySql, T>(query)
        .bind(schema)
        .bind(table)
        .fetch_all(&mut *conn)
        .await
        .map_err(DatabaseError::query)?;

    log::debug!("Catalog query for {schema}.{table} returned {} row(s)", rows.len());
    Ok(rows)
}
