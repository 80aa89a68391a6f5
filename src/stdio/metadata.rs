//! Static tool metadata: names, descriptions and argument schemas.

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use crate::tools::{DESCRIBE_INDEXES_AND_FOREIGN_KEYS, DESCRIBE_TABLE, RUN_QUERY};

/// Metadata for a single tool.
#[derive(Debug, Clone)]
pub struct ToolMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Value,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RunQueryArgs {
    /// SQL statement to execute.
    pub sql: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DescribeTableArgs {
    /// Schema (database) containing the table.
    pub schema: String,
    /// Table name.
    pub table_name: String,
}

/// Helper to build schema from Args type.
fn build_schema<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or(Value::Null)
}

pub fn all_tool_metadata() -> Vec<ToolMetadata> {
    vec![
        ToolMetadata {
            name: RUN_QUERY,
            description: "Execute arbitrary SQL against the configured MySQL database. Statements run unrestricted with the server account's privileges. Row-producing statements return {\"columns\": [...], \"rows\": [...]}; all others are committed and return {\"rows_affected\": n}.",
            schema: build_schema::<RunQueryArgs>(),
        },
        ToolMetadata {
            name: DESCRIBE_TABLE,
            description: "Return column metadata for schema.table_name from INFORMATION_SCHEMA: column, type, nullable, length, in ordinal order. A missing table yields an empty list.",
            schema: build_schema::<DescribeTableArgs>(),
        },
        ToolMetadata {
            name: DESCRIBE_INDEXES_AND_FOREIGN_KEYS,
            description: "Return index definitions plus outbound and inbound foreign keys for schema.table_name, grouped per index and per constraint with ordered columns.",
            schema: build_schema::<DescribeTableArgs>(),
        },
    ]
}

/// Names of every tool this server can expose.
pub fn available_tools() -> Vec<&'static str> {
    all_tool_metadata().iter().map(|tool| tool.name).collect()
}
