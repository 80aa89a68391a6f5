//! Folds denormalized catalog rows into grouped index and foreign key
//! descriptors.
//!
//! Both folds make a single pass over their input, keyed by insertion-ordered
//! maps, so descriptors come out in first-occurrence order. Since the catalog
//! queries sort by name, that order is stable for a given catalog state.
//! Columns inside a group are ordered by their catalog position, independent
//! of input order.

use indexmap::IndexMap;

use super::catalog::{IndexStatRow, KeyUsageRow};
use super::types::{
    ForeignKeyColumn, InboundForeignKey, IndexColumn, IndexDescriptor, OutboundForeignKey,
    TableRelationships,
};

/// Name given to indexes the catalog reports without a name.
///
/// Every unnamed index of a table folds into this one descriptor.
pub const UNNAMED_INDEX: &str = "(unnamed)";

/// Group index-statistics rows into one descriptor per index name.
///
/// The uniqueness flag of the first row seen for a name is kept for the
/// whole index.
pub fn fold_indexes(rows: impl IntoIterator<Item = IndexStatRow>) -> Vec<IndexDescriptor> {
    let mut indexes: IndexMap<String, IndexDescriptor> = IndexMap::new();

    for row in rows {
        let name = match row.index_name {
            Some(name) if !name.is_empty() => name,
            _ => UNNAMED_INDEX.to_string(),
        };
        let index = indexes.entry(name).or_insert_with_key(|name| IndexDescriptor {
            name: name.clone(),
            is_primary_or_unique: row.is_primary_or_unique != 0,
            columns: Vec::new(),
        });
        index.columns.push(IndexColumn {
            name: row.column_name,
            seq_in_index: row.seq_in_index,
        });
    }

    indexes
        .into_values()
        .map(|mut index| {
            index.columns.sort_by_key(|column| column.seq_in_index);
            index
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct InboundKey {
    source_schema: String,
    source_table: String,
    referenced_schema: String,
    referenced_table: String,
    constraint: String,
}

/// A descriptor's columns, each tagged with its ordinal position until the
/// fold finishes.
type Positioned<T> = (T, Vec<(i64, ForeignKeyColumn)>);

/// Group key-usage rows into outbound and inbound foreign key views.
///
/// Every row lands in exactly one outbound and one inbound descriptor.
/// Outbound descriptors are keyed by constraint name, which is unique within
/// the declaring table. Inbound descriptors are keyed by source and referenced
/// table together with the constraint name, because constraint names repeat
/// across schemas and tables.
pub fn fold_foreign_keys(
    rows: impl IntoIterator<Item = KeyUsageRow>,
) -> (Vec<OutboundForeignKey>, Vec<InboundForeignKey>) {
    let mut outbound: IndexMap<String, Positioned<OutboundForeignKey>> = IndexMap::new();
    let mut inbound: IndexMap<InboundKey, Positioned<InboundForeignKey>> = IndexMap::new();

    for row in rows {
        let pair = ForeignKeyColumn {
            column: row.column_name,
            references: row.referenced_column_name,
        };

        let (_, columns) = outbound
            .entry(row.constraint_name.clone())
            .or_insert_with(|| {
                (
                    OutboundForeignKey {
                        name: row.constraint_name.clone(),
                        target_schema: row.referenced_table_schema.clone(),
                        target_table: row.referenced_table_name.clone(),
                        columns: Vec::new(),
                    },
                    Vec::new(),
                )
            });
        columns.push((row.ordinal_position, pair.clone()));

        let key = InboundKey {
            source_schema: row.table_schema,
            source_table: row.table_name,
            referenced_schema: row.referenced_table_schema,
            referenced_table: row.referenced_table_name,
            constraint: row.constraint_name,
        };
        let (_, columns) = inbound.entry(key).or_insert_with_key(|key| {
            (
                InboundForeignKey {
                    name: key.constraint.clone(),
                    source_schema: key.source_schema.clone(),
                    source_table: key.source_table.clone(),
                    columns: Vec::new(),
                },
                Vec::new(),
            )
        });
        columns.push((row.ordinal_position, pair));
    }

    let outbound = outbound
        .into_values()
        .map(|(mut fk, columns)| {
            fk.columns = in_ordinal_order(columns);
            fk
        })
        .collect();
    let inbound = inbound
        .into_values()
        .map(|(mut fk, columns)| {
            fk.columns = in_ordinal_order(columns);
            fk
        })
        .collect();

    (outbound, inbound)
}

fn in_ordinal_order(mut columns: Vec<(i64, ForeignKeyColumn)>) -> Vec<ForeignKeyColumn> {
    columns.sort_by_key(|(position, _)| *position);
    columns.into_iter().map(|(_, column)| column).collect()
}

/// Both folds together, as returned by `describe_indexes_and_foreign_keys`.
pub fn reconstruct(index_rows: Vec<IndexStatRow>, key_rows: Vec<KeyUsageRow>) -> TableRelationships {
    let indexes = fold_indexes(index_rows);
    let (foreign_keys_outbound, foreign_keys_inbound) = fold_foreign_keys(key_rows);
    TableRelationships {
        indexes,
        foreign_keys_outbound,
        foreign_keys_inbound,
    }
}
