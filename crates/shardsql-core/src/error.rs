use crate::{ctx::ContextKind, param::ParamError, route::RouteError, stmt::StatementKind};
use thiserror::Error as ThisError;

///
/// CompileError
///
/// Compile-time caller errors. Nothing here is transient: every
/// variant is a programming or configuration error, surfaced at the
/// point of detection with the statement kind and offending names, and
/// never retried or silently defaulted.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    /// A column reference escaped its context's visible table set.
    #[error("unknown column '{column}' (alias: {alias:?}) in {kind} statement")]
    UnknownColumn {
        column: String,
        alias: Option<String>,
        kind: StatementKind,
    },

    /// A statement kind was nested somewhere it cannot legally appear.
    #[error("{kind} statement cannot nest inside a {outer} context")]
    UnsupportedContext {
        kind: StatementKind,
        outer: ContextKind,
    },

    /// An unbound named placeholder survived into a non-batch build.
    #[error("named placeholder ':{name}' in a non-batch statement")]
    NamedParamInNonBatch { name: String },

    /// A batch row failed to bind a named placeholder.
    #[error("named placeholder ':{name}' has no bound value in batch row {row}")]
    UnboundNamedParam { name: String, row: usize },

    /// An operation was attempted on an already-built (frozen) context
    /// or an exhausted generated-key slot.
    #[error("illegal state: {operation}")]
    IllegalState { operation: String },

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Route(#[from] RouteError),
}
