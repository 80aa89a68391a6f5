//! Pooled MySQL connections.
//!
//! A [`PoolConnection`] returned by [`ConnectionProvider::acquire`] is the
//! scope of exclusive use: dropping it hands the connection back to the pool,
//! whichever way the caller exits. On the way back any open transaction is
//! rolled back, so a connection never carries uncommitted work between calls.

use std::time::Duration;

use serde::Serialize;
use sqlx::Executor;
use sqlx::mysql::{MySql, MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;

use super::config::DatabaseConfig;
use crate::error::{DatabaseError, Result};

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    /// Open connections, idle or in use.
    pub size: u32,
    pub idle: usize,
}

/// Owns the process-wide pool. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    pool: MySqlPool,
    acquire_timeout: Duration,
}

impl ConnectionProvider {
    /// Build the pool and open its first connection, failing fast on bad
    /// credentials or an unreachable host.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = pool_options(config)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        log::info!(
            "Connected to MySQL at {}:{} (database: {}, pool size: {})",
            config.host,
            config.port,
            config.database,
            config.pool_size
        );

        Ok(Self {
            pool,
            acquire_timeout: config.acquire_timeout,
        })
    }

    /// Build the pool without opening any connection yet.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let pool = pool_options(config).connect_lazy_with(config.connect_options());
        Self {
            pool,
            acquire_timeout: config.acquire_timeout,
        }
    }

    /// Wait for an exclusive connection, at most the configured acquire timeout.
    pub async fn acquire(&self) -> Result<PoolConnection<MySql>> {
        self.pool.acquire().await.map_err(|e| {
            let err = DatabaseError::from_acquire(e, self.acquire_timeout);
            log::warn!("Failed to acquire connection: {err}");
            err
        })
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
        }
    }

    /// Close every connection. Pending and later acquisitions fail.
    pub async fn close(&self) {
        log::info!("Closing connection pool ({:?})", self.status());
        self.pool.close().await;
    }
}

fn pool_options(config: &DatabaseConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(config.pool_size)
        .acquire_timeout(config.acquire_timeout)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET autocommit = 0").await?;
                Ok(())
            })
        })
        .after_release(|conn, _meta| {
            Box::pin(async move {
                match conn.execute("ROLLBACK").await {
                    Ok(_) => Ok(true),
                    Err(e) => {
                        // Returning false drops the connection instead of reusing it.
                        log::warn!("Discarding connection after failed rollback: {e}");
                        Ok(false)
                    }
                }
            })
        })
}
