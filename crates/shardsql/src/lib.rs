//! shardsql — a sharding-aware SQL statement compiler.
//!
//! Thin facade over [`shardsql_core`]: dialect-neutral statement
//! descriptions go in, immutable dialect-specific statements with
//! execution metadata (parameter lists, selection lists,
//! optimistic-lock flags, generated-key slots, shard targets) come
//! out. Driver execution, transactions, and schema DDL live elsewhere.

pub use shardsql_core as core;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::{CompileError, CompiledStatement, Value, compile, compile_multi, route};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        compiled::{
            BatchStatement, CompiledStatement, GeneratedKeyStatement, KeyedStatement,
            PairedStatement, SelectionInfo, SimpleStatement,
        },
        ctx::{ContextKind, StatementContext, compile, compile_multi},
        dialect::{AnsiDialect, Dialect as _, MySqlDialect},
        error::CompileError,
        model::{
            AccessorEntry, AccessorTable, AttributeAccess as _, ColumnModel, ColumnType,
            RouteSpec, TableModel,
        },
        param::{Param, ParamError},
        route::{RouteError, RouteResult, partition_of, route, suffix_of, table_index_of},
        session::{PartitionConfig, SessionOptions},
        stmt::{
            AssignSource, Assignment, BatchRow, CompareOp, ComparePredicate, Operand, Predicate,
            Selection, StatementDescription, StatementKind, TableRef,
        },
        trace::{CompileTraceEvent, CompileTraceSink, NoopTraceSink},
        value::Value,
    };
}
