//! shardsql-core — statement compilation and sharding routing for
//! relational persistence.
//!
//! ## Crate layout
//! - `stmt`: read-only statement descriptions (tables, predicates,
//!   assignments, batch rows).
//! - `ctx`: the statement context tree that renders descriptions into
//!   compiled statements.
//! - `compiled`: immutable compiled-statement values consumed by the
//!   execution layer.
//! - `route`: the sharding router and table-suffix codec.
//! - `param` / `value`: bound-parameter and value containers.
//! - `model`: static table/column metadata and the attribute accessor
//!   table.
//! - `dialect`: lexical rules injected per dialect.
//! - `session` / `trace`: partition configuration and the optional
//!   compile trace sink.
//!
//! Compilation is single-threaded and synchronous: each context tree
//! is built, mutated, and frozen within one call. Statements may be
//! compiled concurrently as long as each uses its own context tree;
//! dialects and the router are stateless and safe to share.

pub mod compiled;
pub mod ctx;
pub mod dialect;
pub mod error;
pub mod model;
pub mod param;
pub mod route;
pub mod session;
pub mod stmt;
pub mod trace;
pub mod value;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::{
    compiled::CompiledStatement,
    ctx::{StatementContext, compile, compile_multi},
    error::CompileError,
    route::route,
    value::Value,
};
