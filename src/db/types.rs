//! Request-scoped result shapes returned to the invocation host.

use serde::Serialize;
use serde_json::{Map, Value};

/// Outcome of `run_query`.
///
/// Serializes untagged: `{"columns": [...], "rows": [...]}` for row-producing
/// statements, `{"rows_affected": n}` for everything else.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Rows {
        columns: Vec<String>,
        rows: Vec<Map<String, Value>>,
    },
    Mutation {
        rows_affected: u64,
    },
}

/// One column of `describe_table`, in ordinal position order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    #[serde(rename = "column")]
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    #[serde(rename = "length")]
    pub max_length: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexColumn {
    /// `None` for expression (functional) index parts.
    pub name: Option<String>,
    pub seq_in_index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub is_primary_or_unique: bool,
    pub columns: Vec<IndexColumn>,
}

/// A referencing column paired with the column it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyColumn {
    pub column: String,
    pub references: String,
}

/// Foreign key declared by the described table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundForeignKey {
    pub name: String,
    pub target_schema: String,
    pub target_table: String,
    pub columns: Vec<ForeignKeyColumn>,
}

/// Foreign key viewed from the referenced side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundForeignKey {
    pub name: String,
    pub source_schema: String,
    pub source_table: String,
    pub columns: Vec<ForeignKeyColumn>,
}

/// Output of `describe_indexes_and_foreign_keys`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableRelationships {
    pub indexes: Vec<IndexDescriptor>,
    pub foreign_keys_outbound: Vec<OutboundForeignKey>,
    pub foreign_keys_inbound: Vec<InboundForeignKey>,
}
