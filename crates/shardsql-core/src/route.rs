//! Sharding router: deterministic physical-partition resolution.
//!
//! The router is a pure function of table metadata, a statement
//! description, and partition configuration. Results are computed once
//! per statement compilation and never cached across statements, since
//! predicates differ per statement.

use crate::{
    model::{RouteSpec, TableModel},
    session::PartitionConfig,
    stmt::{CompareOp, Operand, Predicate, StatementDescription, TableRef},
    value::Value,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use xxhash_rust::xxh3::xxh3_64;

///
/// RouteError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RouteError {
    /// The statement's predicates and table references do not
    /// constrain a sharding key. Always a caller error; never retried
    /// and never defaulted to partition 0.
    #[error("no route to a physical partition of table '{table}'")]
    NotFound { table: &'static str },
}

///
/// RouteResult
/// Physical partition for one logical table.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RouteResult {
    /// Single-database deployment: table partition only.
    Table { table: usize },
    /// Cross-database deployment: database and table partitions.
    Sharded { db: usize, table: usize },
}

impl RouteResult {
    #[must_use]
    pub const fn table_index(&self) -> usize {
        match self {
            Self::Table { table } | Self::Sharded { table, .. } => *table,
        }
    }

    #[must_use]
    pub const fn db_index(&self) -> Option<usize> {
        match self {
            Self::Table { .. } => None,
            Self::Sharded { db, .. } => Some(*db),
        }
    }
}

///
/// Dimension
/// Which partition axis a search resolves.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Dimension {
    Db,
    Table,
}

/// Resolve the physical partition `table` occupies for `desc`.
///
/// Search order per axis: WHERE-clause equality on a declared route
/// column, then an explicitly pinned partition index, then the same
/// two rules recursively over subqueries, in declared order. Unsharded
/// tables always resolve to table index 0.
pub fn route(
    table: &'static TableModel,
    desc: &StatementDescription,
    config: &PartitionConfig,
) -> Result<RouteResult, RouteError> {
    match table.route {
        RouteSpec::Unsharded => Ok(RouteResult::Table { table: 0 }),
        RouteSpec::Sharded {
            db_column,
            table_column,
        } => {
            let table_index =
                resolve_dimension(table, table_column, Dimension::Table, desc, config.tables_per_db)?;

            match db_column {
                Some(column) if config.db_count > 1 => {
                    let db = resolve_dimension(table, column, Dimension::Db, desc, config.db_count)?;
                    Ok(RouteResult::Sharded {
                        db,
                        table: table_index,
                    })
                }
                _ => Ok(RouteResult::Table { table: table_index }),
            }
        }
    }
}

fn resolve_dimension(
    table: &'static TableModel,
    route_column: &str,
    dim: Dimension,
    desc: &StatementDescription,
    count: usize,
) -> Result<usize, RouteError> {
    search(table, route_column, dim, desc, count).ok_or(RouteError::NotFound { table: table.name })
}

/// One level of the ordered search; recurses into subqueries last.
fn search(
    table: &'static TableModel,
    route_column: &str,
    dim: Dimension,
    desc: &StatementDescription,
    count: usize,
) -> Option<usize> {
    if let Some(pred) = &desc.predicate {
        if let Some(index) = predicate_partition(table, route_column, pred, desc, count) {
            return Some(index);
        }
    }

    if let Some(index) = pinned_partition(table, dim, &desc.tables) {
        return Some(index);
    }

    if let Some(pred) = &desc.predicate {
        for sub in subqueries(pred) {
            if let Some(index) = search(table, route_column, dim, sub, count) {
                return Some(index);
            }
        }
    }

    None
}

/// First equality conjunct on the route column wins, in declared
/// predicate order. Disjuncts never route: an OR branch is not a
/// guarantee about the touched partition.
fn predicate_partition(
    table: &TableModel,
    route_column: &str,
    pred: &Predicate,
    desc: &StatementDescription,
    count: usize,
) -> Option<usize> {
    pred.conjuncts().into_iter().find_map(|conjunct| {
        let Predicate::Compare(cmp) = conjunct else {
            return None;
        };
        if cmp.op != CompareOp::Eq
            || cmp.column != route_column
            || !alias_targets_table(cmp.alias.as_deref(), table, &desc.tables)
        {
            return None;
        }
        match &cmp.operand {
            Operand::Value(value) => Some(partition_of(value, count)),
            _ => None,
        }
    })
}

fn alias_targets_table(alias: Option<&str>, table: &TableModel, tables: &[TableRef]) -> bool {
    match alias {
        None => tables.iter().any(|t| std::ptr::eq(t.table, table)),
        Some(a) => tables
            .iter()
            .any(|t| std::ptr::eq(t.table, table) && t.alias.as_deref() == Some(a)),
    }
}

fn pinned_partition(table: &TableModel, dim: Dimension, tables: &[TableRef]) -> Option<usize> {
    tables.iter().find_map(|t| {
        if !std::ptr::eq(t.table, table) {
            return None;
        }
        match dim {
            Dimension::Db => t.pinned_db,
            Dimension::Table => t.pinned_table,
        }
    })
}

fn subqueries(pred: &Predicate) -> Vec<&StatementDescription> {
    match pred {
        Predicate::And(preds) | Predicate::Or(preds) => {
            preds.iter().flat_map(subqueries).collect()
        }
        Predicate::Not(inner) => subqueries(inner),
        Predicate::InSubquery { subquery, .. } | Predicate::Exists { subquery, .. } => {
            vec![subquery]
        }
        Predicate::Compare(_) | Predicate::IsNull { .. } => Vec::new(),
    }
}

/// Map a bound route-key value onto `count` partitions. Numeric keys
/// partition by modulo; text and byte keys hash with xxh3 first.
#[must_use]
pub fn partition_of(value: &Value, count: usize) -> usize {
    if count <= 1 {
        return 0;
    }

    let hash = match value {
        Value::Int(v) => v.unsigned_abs(),
        Value::Uint(v) => *v,
        Value::Timestamp(v) => v.unsigned_abs(),
        Value::Bool(v) => u64::from(*v),
        Value::Float(v) => xxh3_64(&v.to_be_bytes()),
        Value::Text(v) => xxh3_64(v.as_bytes()),
        Value::Bytes(v) => xxh3_64(v),
        Value::Null => 0,
    };

    usize::try_from(hash % count as u64).unwrap_or(0)
}

/// Zero-padded table suffix for a partition index. The digit width is
/// the width of `count - 1`; index 0 is the empty suffix, so legacy
/// unsharded table names pass through unchanged.
#[must_use]
pub fn suffix_of(index: usize, count: usize) -> String {
    if index == 0 {
        return String::new();
    }

    let width = digit_width(count.saturating_sub(1));
    format!("_{index:0width$}")
}

/// Inverse of [`suffix_of`]. The empty suffix means partition 0.
#[must_use]
pub fn table_index_of(suffix: &str) -> Option<usize> {
    if suffix.is_empty() {
        return Some(0);
    }

    suffix.strip_prefix('_')?.parse().ok()
}

const fn digit_width(mut value: usize) -> usize {
    let mut width = 1;
    while value >= 10 {
        value /= 10;
        width += 1;
    }
    width
}
