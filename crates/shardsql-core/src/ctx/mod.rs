//! The statement context tree: mutable builders that walk a statement
//! description and freeze into compiled-statement values.
//!
//! One context exists per statement and per nested scope (subquery,
//! cursor declaration, VALUES clause). A context is created, mutated
//! while the description is walked, and consumed exactly once by
//! `build()`; it is never reused. Per-kind scope rules live on
//! [`ContextKind`]; every kind shares the one state struct below.

mod compile;
mod paired;
mod render;

pub use compile::{compile, compile_multi};

use crate::{
    compiled::{
        BatchStatement, CompiledStatement, GeneratedKeyStatement, SelectionInfo, SimpleStatement,
    },
    dialect::Dialect,
    error::CompileError,
    model::{ColumnType, TableModel},
    param::Param,
    route::RouteResult,
    session::SessionOptions,
    stmt::{BatchRow, StatementDescription, StatementKind},
    trace::CompileTraceEvent,
};
use std::{collections::BTreeMap, fmt};

///
/// ContextKind
///
/// Scope variant of one rendering context. Statement contexts see only
/// their own tables; subqueries may also reference enclosing tables;
/// cursor and VALUES contexts never reference an enclosing scope.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContextKind {
    Statement,
    Subquery,
    Cursor,
    Values,
}

impl ContextKind {
    const fn top_level(kind: StatementKind) -> Self {
        match kind {
            StatementKind::CursorDeclare => Self::Cursor,
            StatementKind::Values => Self::Values,
            StatementKind::Select
            | StatementKind::Insert
            | StatementKind::Update
            | StatementKind::Delete => Self::Statement,
        }
    }

    /// Only SELECT may nest; everything else is a top-level shape.
    fn nested(kind: StatementKind, outer: Self) -> Result<Self, CompileError> {
        match kind {
            StatementKind::Select => Ok(Self::Subquery),
            other => Err(CompileError::UnsupportedContext { kind: other, outer }),
        }
    }

    /// Whether column lookups may fall back to enclosing scopes.
    const fn allows_outer_lookup(self) -> bool {
        matches!(self, Self::Subquery)
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Statement => "statement",
            Self::Subquery => "subquery",
            Self::Cursor => "cursor",
            Self::Values => "values",
        };
        write!(f, "{label}")
    }
}

///
/// Scope
/// Alias-to-table bindings visible to one context, in declared order.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct Scope {
    tables: Vec<(Option<String>, &'static TableModel)>,
}

impl Scope {
    fn push(&mut self, alias: Option<String>, table: &'static TableModel) {
        self.tables.push((alias, table));
    }

    /// Resolve a column to its owning table; first match in declared
    /// order wins.
    fn resolve(
        &self,
        alias: Option<&str>,
        column: &str,
    ) -> Option<(Option<&str>, &'static TableModel)> {
        self.tables.iter().find_map(|(a, table)| {
            let alias_ok = match alias {
                Some(want) => a.as_deref() == Some(want),
                None => true,
            };
            (alias_ok && table.owns_column(column)).then_some((a.as_deref(), *table))
        })
    }
}

///
/// PendingParam
///
/// Parameter slot accumulated in placeholder order. Named slots are
/// only legal in batch statements, where each row binds the value.
///

#[derive(Clone, Debug)]
pub(crate) enum PendingParam {
    Bound(Param),
    Named { name: String, ty: ColumnType },
}

///
/// StatementContext
///
/// One rendering context. State machine: open (accepting appends and
/// predicate walks) until `build()` consumes it; the `built` flag
/// backs that ownership transfer as a runtime defense.
///

pub struct StatementContext<'a> {
    kind: ContextKind,
    stmt_kind: StatementKind,
    dialect: &'a dyn Dialect,
    session: &'a SessionOptions,
    outer_scope: Scope,
    scope: Scope,
    /// Rewrites conditions stated against a child alias when the
    /// column physically lives on the parent row.
    alias_map: BTreeMap<String, Option<String>>,
    sql: String,
    pending: Vec<PendingParam>,
    selections: Vec<SelectionInfo>,
    batch_rows: Vec<BatchRow>,
    referenced: Vec<String>,
    optimistic: bool,
    placeholder_count: usize,
    param_offset: usize,
    route: Option<RouteResult>,
    target: Option<&'static TableModel>,
    built: bool,
}

impl<'a> StatementContext<'a> {
    /// Construct a context scoped either as a top-level statement or
    /// as a nested scope inside `outer`. The outer context must
    /// outlive compilation of the child; only its visible tables are
    /// captured here, never an owning reference.
    pub fn create(
        outer: Option<&Self>,
        desc: &StatementDescription,
        dialect: &'a dyn Dialect,
        session: &'a SessionOptions,
    ) -> Result<Self, CompileError> {
        let kind = match outer {
            Some(o) => ContextKind::nested(desc.kind, o.kind)?,
            None => ContextKind::top_level(desc.kind),
        };

        let mut scope = Scope::default();
        for tref in &desc.tables {
            scope.push(tref.alias.clone(), tref.table);
        }

        Ok(Self {
            kind,
            stmt_kind: desc.kind,
            dialect,
            session,
            outer_scope: outer.map(Self::visible_scope).unwrap_or_default(),
            scope,
            alias_map: BTreeMap::new(),
            sql: String::new(),
            pending: Vec::new(),
            selections: Vec::new(),
            batch_rows: desc.batch_rows.clone(),
            referenced: Vec::new(),
            optimistic: false,
            placeholder_count: 0,
            param_offset: 0,
            route: None,
            target: desc.target(),
            built: false,
        })
    }

    /// Tables visible to statements nested inside this context.
    fn visible_scope(&self) -> Scope {
        let mut scope = self.scope.clone();
        scope
            .tables
            .extend(self.outer_scope.tables.iter().cloned());
        scope
    }

    #[must_use]
    pub const fn kind(&self) -> ContextKind {
        self.kind
    }

    /// True iff a version-column equality predicate was detected while
    /// walking the WHERE clause.
    #[must_use]
    pub const fn has_optimistic(&self) -> bool {
        self.optimistic
    }

    /// Columns referenced so far in SET/WHERE clauses, in render order.
    #[must_use]
    pub fn referenced_columns(&self) -> &[String] {
        &self.referenced
    }

    pub(crate) fn map_alias(&mut self, from: String, to: Option<String>) {
        self.alias_map.insert(from, to);
    }

    pub(crate) const fn route_result(&self) -> Option<RouteResult> {
        self.route
    }

    pub(crate) fn sql_len(&self) -> usize {
        self.sql.len()
    }

    pub(crate) fn trace_event(&self) -> CompileTraceEvent {
        CompileTraceEvent::Compiled {
            kind: self.stmt_kind,
            table: self.target.map_or("", |t| t.name),
            route: self.route,
            sql_len: self.sql.len(),
            batch_rows: self.batch_rows.len(),
            optimistic: self.optimistic,
        }
    }

    /// Record a column reference and append its dialect-quoted,
    /// alias-qualified form. Subqueries may resolve against enclosing
    /// scopes; all other kinds see only their own tables.
    pub fn append_field(&mut self, alias: Option<&str>, column: &str) -> Result<(), CompileError> {
        self.append_field_inner(alias, column, false).map(|_| ())
    }

    /// Like [`Self::append_field`], but never consults an enclosing
    /// scope. Used where the outer scope's columns must not be
    /// conflated with this scope's own columns.
    pub fn append_field_local(
        &mut self,
        alias: Option<&str>,
        column: &str,
    ) -> Result<(), CompileError> {
        self.append_field_inner(alias, column, true).map(|_| ())
    }

    pub(crate) fn append_field_inner(
        &mut self,
        alias: Option<&str>,
        column: &str,
        local_only: bool,
    ) -> Result<(&'static TableModel, ColumnType), CompileError> {
        self.ensure_open("append_field")?;

        let alias = match alias.and_then(|a| self.alias_map.get(a)) {
            Some(mapped) => mapped.clone(),
            None => alias.map(str::to_string),
        };

        let mut hit = self.scope.resolve(alias.as_deref(), column);
        if hit.is_none() && !local_only && self.kind.allows_outer_lookup() {
            hit = self.outer_scope.resolve(alias.as_deref(), column);
        }

        let Some((resolved_alias, table)) = hit.map(|(a, t)| (a.map(str::to_string), t)) else {
            return Err(CompileError::UnknownColumn {
                column: column.to_string(),
                alias,
                kind: self.stmt_kind,
            });
        };

        let ty = table.column_type(column).unwrap_or(ColumnType::Text);
        self.push_column_ref(resolved_alias.as_deref(), column);
        self.referenced.push(column.to_string());

        Ok((table, ty))
    }

    /// Append a reference to an enclosing scope's column (correlated
    /// subqueries only).
    pub(crate) fn append_outer_field(
        &mut self,
        alias: Option<&str>,
        column: &str,
    ) -> Result<(), CompileError> {
        self.ensure_open("append_outer_field")?;

        if !self.kind.allows_outer_lookup() {
            return Err(CompileError::UnknownColumn {
                column: column.to_string(),
                alias: alias.map(str::to_string),
                kind: self.stmt_kind,
            });
        }

        let Some((resolved_alias, _)) = self
            .outer_scope
            .resolve(alias, column)
            .map(|(a, t)| (a.map(str::to_string), t))
        else {
            return Err(CompileError::UnknownColumn {
                column: column.to_string(),
                alias: alias.map(str::to_string),
                kind: self.stmt_kind,
            });
        };

        self.push_column_ref(resolved_alias.as_deref(), column);
        Ok(())
    }

    pub(crate) fn push_column_ref(&mut self, alias: Option<&str>, column: &str) {
        if let Some(alias) = alias {
            let quoted = self.dialect.quote_ident(alias);
            self.sql.push_str(&quoted);
            self.sql.push('.');
        }
        let quoted = self.dialect.quote_ident(column);
        self.sql.push_str(&quoted);
    }

    pub(crate) fn push_placeholder(&mut self) {
        self.placeholder_count += 1;
        let token = self
            .dialect
            .placeholder(self.param_offset + self.placeholder_count);
        self.sql.push_str(&token);
    }

    fn ensure_open(&self, operation: &str) -> Result<(), CompileError> {
        if self.built {
            return Err(CompileError::IllegalState {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// Terminal operation: freeze the accumulated buffers into an
    /// immutable compiled statement. Consuming `self` is the primary
    /// guarantee against reuse; the `built` flag backs it at runtime.
    pub fn build(mut self) -> Result<CompiledStatement, CompileError> {
        self.finish()
    }

    fn finish(&mut self) -> Result<CompiledStatement, CompileError> {
        self.ensure_open("build")?;
        self.built = true;

        let sql = std::mem::take(&mut self.sql);
        let selections = std::mem::take(&mut self.selections);
        let pending = std::mem::take(&mut self.pending);
        let optimistic = self.optimistic;
        let generated = self.stmt_kind == StatementKind::Insert
            && self.target.is_some_and(TableModel::has_generated_key);

        if self.batch_rows.is_empty() {
            let mut params = Vec::with_capacity(pending.len());
            for slot in pending {
                match slot {
                    PendingParam::Bound(param) => params.push(param),
                    PendingParam::Named { name, .. } => {
                        return Err(CompileError::NamedParamInNonBatch { name });
                    }
                }
            }

            let stmt = SimpleStatement::new(sql, params, selections, optimistic);
            Ok(if generated {
                CompiledStatement::GeneratedKey(GeneratedKeyStatement::simple(stmt))
            } else {
                CompiledStatement::Simple(stmt)
            })
        } else {
            let mut groups = Vec::with_capacity(self.batch_rows.len());
            for (row_index, row) in self.batch_rows.iter().enumerate() {
                let mut group = Vec::with_capacity(pending.len());
                for slot in &pending {
                    match slot {
                        PendingParam::Bound(param) => group.push(param.clone()),
                        PendingParam::Named { name, ty } => match row.value(name) {
                            Some(value) => group.push(Param::single(*ty, Some(value.clone()))),
                            None => {
                                return Err(CompileError::UnboundNamedParam {
                                    name: name.clone(),
                                    row: row_index,
                                });
                            }
                        },
                    }
                }
                groups.push(group);
            }

            let stmt = BatchStatement::new(sql, groups, selections, optimistic);
            Ok(if generated {
                CompiledStatement::GeneratedKey(GeneratedKeyStatement::batch(stmt))
            } else {
                CompiledStatement::Batch(stmt)
            })
        }
    }
}

// the dialect handle is a trait object, so the derive is unavailable
impl fmt::Debug for StatementContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementContext")
            .field("kind", &self.kind)
            .field("stmt_kind", &self.stmt_kind)
            .field("sql", &self.sql)
            .field("pending", &self.pending.len())
            .field("built", &self.built)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dialect::AnsiDialect,
        test_support::{ORDER, REGION},
        value::Value,
    };

    fn session() -> SessionOptions {
        SessionOptions::default()
    }

    #[test]
    fn unknown_column_is_rejected() {
        let desc = StatementDescription::select(&REGION);
        let dialect = AnsiDialect;
        let session = session();
        let mut ctx = StatementContext::create(None, &desc, &dialect, &session).unwrap();

        let err = ctx.append_field(None, "missing").unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownColumn {
                column: "missing".to_string(),
                alias: None,
                kind: StatementKind::Select,
            }
        );
    }

    #[test]
    fn local_lookup_never_consults_the_outer_scope() {
        let outer_desc = StatementDescription::select(&ORDER);
        let sub_desc = StatementDescription::select(&REGION);
        let dialect = AnsiDialect;
        let session = session();

        let outer = StatementContext::create(None, &outer_desc, &dialect, &session).unwrap();
        let mut sub =
            StatementContext::create(Some(&outer), &sub_desc, &dialect, &session).unwrap();

        // "status" lives on order, visible through the outer scope
        sub.append_field(None, "status").unwrap();
        let err = sub.append_field_local(None, "status").unwrap_err();
        assert!(matches!(err, CompileError::UnknownColumn { .. }));
    }

    #[test]
    fn only_select_may_nest() {
        let outer_desc = StatementDescription::select(&ORDER);
        let dialect = AnsiDialect;
        let session = session();
        let outer = StatementContext::create(None, &outer_desc, &dialect, &session).unwrap();

        let values = StatementDescription::values(vec![vec![Value::Int(1)]]);
        let err = StatementContext::create(Some(&outer), &values, &dialect, &session).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedContext {
                kind: StatementKind::Values,
                outer: ContextKind::Statement,
            }
        );

        let cursor = StatementDescription::cursor("cur", &REGION);
        let err = StatementContext::create(Some(&outer), &cursor, &dialect, &session).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedContext { .. }));
    }

    #[test]
    fn cursor_may_not_nest_inside_a_cursor() {
        let cursor_desc = StatementDescription::cursor("outer_cur", &REGION);
        let dialect = AnsiDialect;
        let session = session();
        let outer = StatementContext::create(None, &cursor_desc, &dialect, &session).unwrap();

        let inner = StatementDescription::cursor("inner_cur", &REGION);
        let err = StatementContext::create(Some(&outer), &inner, &dialect, &session).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedContext {
                kind: StatementKind::CursorDeclare,
                outer: ContextKind::Cursor,
            }
        );
    }

    #[test]
    fn frozen_context_rejects_further_work() {
        let desc = StatementDescription::select(&REGION).select_column("id");
        let dialect = AnsiDialect;
        let session = session();
        let mut ctx = StatementContext::create(None, &desc, &dialect, &session).unwrap();
        ctx.render(&desc).unwrap();

        ctx.finish().unwrap();
        let err = ctx.finish().unwrap_err();
        assert_eq!(
            err,
            CompileError::IllegalState {
                operation: "build".to_string(),
            }
        );
    }

    #[test]
    fn named_placeholder_fails_a_non_batch_build() {
        let desc = StatementDescription::update(&ORDER)
            .pin_table(0)
            .assign_named("status", "s");
        let dialect = AnsiDialect;
        let session = session();
        let mut ctx = StatementContext::create(None, &desc, &dialect, &session).unwrap();
        ctx.render(&desc).unwrap();

        let err = ctx.build().unwrap_err();
        assert_eq!(
            err,
            CompileError::NamedParamInNonBatch {
                name: "s".to_string(),
            }
        );
    }

    #[test]
    fn debug_output_reports_context_state() {
        let desc = StatementDescription::select(&REGION);
        let dialect = AnsiDialect;
        let session = session();
        let ctx = StatementContext::create(None, &desc, &dialect, &session).unwrap();

        let rendered = format!("{ctx:?}");
        assert!(rendered.contains("StatementContext"));
        assert!(rendered.contains("Select"));
        assert!(rendered.contains("built: false"));
    }

    #[test]
    fn referenced_columns_track_set_and_where() {
        let desc = StatementDescription::update(&ORDER)
            .assign("status", 2_i64)
            .filter(crate::stmt::Predicate::eq("id", Value::Uint(1)));
        let dialect = AnsiDialect;
        let session = SessionOptions::new(crate::session::PartitionConfig::new(1, 16));
        let mut ctx = StatementContext::create(None, &desc, &dialect, &session).unwrap();
        ctx.render(&desc).unwrap();

        assert_eq!(ctx.referenced_columns(), ["status", "id"]);
    }
}
