use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use crate::db::config::{DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_POOL_SIZE, DEFAULT_PORT, DatabaseConfig};

/// Toolset configuration loaded from JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsetConfig {
    /// List of individual tool names to enable
    pub tools: Vec<String>,
}

impl ToolsetConfig {
    /// Load toolset config from JSON file
    pub fn from_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read toolset file: {}", path.display()))?;

        let config: ToolsetConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse toolset file as JSON: {}", path.display()))?;

        Ok(config)
    }
}

/// MySQL MCP Server - run queries and inspect table structure over MCP stdio
///
/// Available tools:
/// - `run_query`: Execute arbitrary SQL (unrestricted)
/// - `describe_table`: Column metadata
/// - `describe_indexes_and_foreign_keys`: Indexes and foreign keys
#[derive(Parser)]
#[command(name = "mcp-mysql")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable specific tools by name (comma-separated)
    ///
    /// Example: --tools describe_table,describe_indexes_and_foreign_keys
    ///
    /// If not specified, all tools are enabled.
    #[arg(long, value_delimiter = ',', conflicts_with = "tool")]
    pub tools: Option<Vec<String>>,

    /// Enable specific tool by name (can be specified multiple times)
    ///
    /// Example: --tool describe_table --tool describe_indexes_and_foreign_keys
    ///
    /// If not specified, all tools are enabled.
    #[arg(long = "tool", conflicts_with = "tools")]
    pub tool: Vec<String>,

    /// Load tool names from JSON file
    ///
    /// JSON format:
    /// ```json
    /// {
    ///   "tools": [
    ///     "describe_table",
    ///     "describe_indexes_and_foreign_keys"
    ///   ]
    /// }
    /// ```
    #[arg(long, value_name = "PATH", conflicts_with_all = ["tool", "tools"])]
    pub toolset: Option<std::path::PathBuf>,

    /// List available tool names and exit
    #[arg(long)]
    pub list_tools: bool,

    // ============ Database Configuration ============
    /// Database server host
    #[arg(long, env = "MYSQL_HOST", required_unless_present = "list_tools")]
    pub host: Option<String>,

    /// Database server port
    #[arg(long, env = "MYSQL_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Database user
    #[arg(long, env = "MYSQL_USER", required_unless_present = "list_tools")]
    pub user: Option<String>,

    /// Database password
    #[arg(
        long,
        env = "MYSQL_PASSWORD",
        hide_env_values = true,
        required_unless_present = "list_tools"
    )]
    pub password: Option<String>,

    /// Database (schema) to connect to
    #[arg(long, env = "MYSQL_DB", required_unless_present = "list_tools")]
    pub database: Option<String>,

    /// Maximum number of pooled connections
    #[arg(long, env = "MYSQL_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: u32,

    /// Seconds to wait for a free pooled connection before failing
    #[arg(
        long,
        value_name = "SECONDS",
        env = "MYSQL_ACQUIRE_TIMEOUT_SECS",
        default_value_t = DEFAULT_ACQUIRE_TIMEOUT.as_secs()
    )]
    pub acquire_timeout: u64,
}

impl Cli {
    /// Get the set of enabled tool names
    ///
    /// Returns None if no filter specified (enable all tools)
    /// Returns Some(HashSet) if filter specified (enable only these tools)
    pub fn enabled_tools(&self) -> anyhow::Result<Option<HashSet<String>>> {
        // Priority 1: --toolset (JSON file)
        if let Some(ref path) = self.toolset {
            let config = ToolsetConfig::from_file(path)?;
            return Ok(Some(config.tools.into_iter().collect()));
        }

        // Priority 2: --tools (comma-separated)
        if let Some(tools) = &self.tools {
            return Ok(Some(tools.iter().cloned().collect()));
        }

        // Priority 3: --tool (repeated flags)
        if !self.tool.is_empty() {
            return Ok(Some(self.tool.iter().cloned().collect()));
        }

        Ok(None)
    }

    /// Build the connection configuration from flags and environment
    pub fn database_config(&self) -> anyhow::Result<DatabaseConfig> {
        let host = self.host.clone().context("MYSQL_HOST is not set")?;
        let user = self.user.clone().context("MYSQL_USER is not set")?;
        let password = self.password.clone().context("MYSQL_PASSWORD is not set")?;
        let database = self.database.clone().context("MYSQL_DB is not set")?;

        Ok(DatabaseConfig::new(host, user, password, database)
            .with_port(self.port)
            .with_pool_size(self.pool_size)
            .with_acquire_timeout(Duration::from_secs(self.acquire_timeout)))
    }
}

// Hand-written so the password never reaches logs or panic messages.
impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("tools", &self.tools)
            .field("tool", &self.tool)
            .field("toolset", &self.toolset)
            .field("list_tools", &self.list_tools)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("database", &self.database)
            .field("pool_size", &self.pool_size)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

/// Get all available tool names
pub fn available_tools() -> Vec<&'static str> {
    crate::stdio::metadata::available_tools()
}
