//! Compile tracing boundary.
//!
//! Tracing is optional, injected by the caller, and must not affect
//! compilation semantics.

use crate::{route::RouteResult, stmt::StatementKind};

///
/// CompileTraceSink
///

pub trait CompileTraceSink: Send + Sync {
    fn on_event(&self, event: CompileTraceEvent);
}

///
/// CompileTraceEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompileTraceEvent {
    /// Emitted once per successful top-level compile.
    Compiled {
        kind: StatementKind,
        table: &'static str,
        route: Option<RouteResult>,
        sql_len: usize,
        batch_rows: usize,
        optimistic: bool,
    },
}

///
/// NoopTraceSink
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTraceSink;

impl CompileTraceSink for NoopTraceSink {
    fn on_event(&self, _event: CompileTraceEvent) {}
}
