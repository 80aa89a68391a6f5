//! Single-statement execution for `run_query`.
//!
//! The SQL text is caller-supplied and runs unmodified with the privileges of
//! the configured account. Nothing here parses, validates or sandboxes it.
//! It goes to the server as a plain text-protocol query, so statements that
//! cannot be prepared (`CREATE PROCEDURE`, `LOCK TABLES`, ...) work too.

use futures::TryStreamExt;
use sqlx::mysql::MySqlConnection;
use sqlx::{Column, Either, Executor, Row};

use super::types::QueryResult;
use super::value::row_to_json;
use crate::error::{DatabaseError, Result};

/// Run one statement on an exclusively held connection.
///
/// The statement runs once and is classified by what comes back. Any result
/// row makes it row-producing, and its rows are returned eagerly. Only the
/// first result set is kept, as a `CALL` may return several. With no rows,
/// the statement's description decides: result columns mean an empty
/// row-producing result, anything else is a mutation and is committed, since
/// pooled connections do not autocommit.
pub async fn execute(conn: &mut MySqlConnection, sql: &str) -> Result<QueryResult> {
    log::debug!("Executing statement: {sql}");

    let mut columns: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut rows_affected = 0;
    let mut first_set_done = false;

    let mut results = (&mut *conn).fetch_many(sql);
    while let Some(item) = results.try_next().await.map_err(DatabaseError::query)? {
        match item {
            Either::Left(done) => {
                rows_affected += done.rows_affected();
                first_set_done |= columns.is_some();
            }
            Either::Right(_) if first_set_done => {}
            Either::Right(row) => {
                if columns.is_none() {
                    columns = Some(row.columns().iter().map(|c| c.name().to_owned()).collect());
                }
                rows.push(row_to_json(&row).map_err(DatabaseError::query)?);
            }
        }
    }
    drop(results);

    if let Some(columns) = columns {
        log::debug!("Statement returned {} row(s)", rows.len());
        return Ok(QueryResult::Rows { columns, rows });
    }

    if let Some(columns) = result_columns(conn, sql).await {
        log::debug!("Statement returned no rows");
        return Ok(QueryResult::Rows { columns, rows });
    }

    (&mut *conn)
        .execute("COMMIT")
        .await
        .map_err(DatabaseError::query)?;

    log::debug!("Statement committed, {rows_affected} row(s) affected");
    Ok(QueryResult::Mutation { rows_affected })
}

/// Result columns reported when preparing `sql`, if it has any.
///
/// Statements the server refuses to prepare already ran successfully above,
/// so they count as having no result columns.
async fn result_columns(conn: &mut MySqlConnection, sql: &str) -> Option<Vec<String>> {
    match (&mut *conn).describe(sql).await {
        Ok(describe) if !describe.columns().is_empty() => Some(
            describe
                .columns()
                .iter()
                .map(|column| column.name().to_owned())
                .collect(),
        ),
        Ok(_) => None,
        Err(e) => {
            log::debug!("Statement cannot be described, treating as mutation: {e}");
            None
        }
    }
}
