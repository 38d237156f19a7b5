//! Single-table-inheritance split: a DML statement against a child
//! table compiles into sibling parent/child contexts whose builds are
//! wrapped into one paired result.

use crate::{
    compiled::{CompiledStatement, PairedStatement},
    ctx::StatementContext,
    dialect::Dialect,
    error::CompileError,
    model::TableModel,
    session::SessionOptions,
    stmt::{Predicate, StatementDescription, StatementKind},
    trace::CompileTraceEvent,
};

///
/// Side
/// Which physical table a split fragment belongs to.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Side {
    Parent,
    Child,
    Both,
}

/// Compile a DML statement against a child table into a paired
/// parent/child result. Assignments and conjuncts are routed to the
/// table that physically stores their column; the shared primary key
/// goes to both sides.
pub(crate) fn compile_paired(
    desc: &StatementDescription,
    dialect: &dyn Dialect,
    session: &SessionOptions,
) -> Result<CompiledStatement, CompileError> {
    let tref = desc
        .tables
        .first()
        .ok_or_else(|| CompileError::IllegalState {
            operation: format!("{} statement has no target table", desc.kind),
        })?;
    let child_table = tref.table;
    let parent_table = child_table
        .parent
        .ok_or_else(|| CompileError::IllegalState {
            operation: format!("table '{}' has no parent link", child_table.name),
        })?;

    let mut parent_desc = StatementDescription::new(desc.kind, parent_table);
    let mut child_desc = StatementDescription::new(desc.kind, child_table);
    child_desc.tables[0].alias = tref.alias.clone();
    child_desc.tables[0].pinned_db = tref.pinned_db;
    child_desc.tables[0].pinned_table = tref.pinned_table;
    // pins constrain the logical statement, so both physical sides
    // route by them
    parent_desc.tables[0].pinned_db = tref.pinned_db;
    parent_desc.tables[0].pinned_table = tref.pinned_table;

    for assign in &desc.assignments {
        match classify_column(&assign.column, parent_table, child_table, desc.kind)? {
            Side::Both => {
                parent_desc.assignments.push(assign.clone());
                child_desc.assignments.push(assign.clone());
            }
            Side::Parent => parent_desc.assignments.push(assign.clone()),
            Side::Child => child_desc.assignments.push(assign.clone()),
        }
    }

    if let Some(pred) = &desc.predicate {
        let mut parent_preds = Vec::new();
        let mut child_preds = Vec::new();
        for conjunct in pred.conjuncts() {
            match classify_predicate(conjunct, parent_table, child_table, desc.kind)? {
                Side::Both => {
                    parent_preds.push(realias_for_parent(conjunct.clone(), tref.alias.as_deref()));
                    child_preds.push(conjunct.clone());
                }
                Side::Parent => {
                    parent_preds.push(realias_for_parent(conjunct.clone(), tref.alias.as_deref()));
                }
                Side::Child => child_preds.push(conjunct.clone()),
            }
        }
        parent_desc.predicate = predicate_of(parent_preds);
        child_desc.predicate = predicate_of(child_preds);
    }

    for column in &desc.returning {
        match classify_column(column, parent_table, child_table, desc.kind)? {
            Side::Both => {
                parent_desc.returning.push(column.clone());
                child_desc.returning.push(column.clone());
            }
            Side::Parent => parent_desc.returning.push(column.clone()),
            Side::Child => child_desc.returning.push(column.clone()),
        }
    }

    // an insert pair must surface the parent's generated key on both
    // sides so the execution layer can correlate the two rows
    if desc.kind == StatementKind::Insert
        && parent_table.has_generated_key()
        && !child_desc.returning.iter().any(|c| c == child_table.primary_key)
    {
        child_desc.returning.push(child_table.primary_key.to_string());
    }

    parent_desc.batch_rows = desc.batch_rows.clone();
    child_desc.batch_rows = desc.batch_rows.clone();

    let mut parent_ctx = StatementContext::create(None, &parent_desc, dialect, session)?;
    if let Some(alias) = &tref.alias {
        parent_ctx.map_alias(alias.clone(), None);
    }
    parent_ctx.render(&parent_desc)?;

    let mut child_ctx = StatementContext::create(None, &child_desc, dialect, session)?;
    child_ctx.render(&child_desc)?;

    let route = parent_ctx.route_result();
    let sql_len = parent_ctx.sql_len() + child_ctx.sql_len();
    let optimistic = parent_ctx.has_optimistic() || child_ctx.has_optimistic();

    let parent = parent_ctx.build()?;
    let child = child_ctx.build()?;

    let id_selection_index = shared_id_index(&parent, &child, child_table);

    if let Some(sink) = session.trace {
        sink.on_event(CompileTraceEvent::Compiled {
            kind: desc.kind,
            table: child_table.name,
            route,
            sql_len,
            batch_rows: desc.batch_rows.len(),
            optimistic,
        });
    }

    Ok(CompiledStatement::Paired(Box::new(PairedStatement::new(
        parent,
        child,
        id_selection_index,
    ))))
}

/// Rewrite a parent-side conjunct's own qualifier from the child alias
/// to the parent's (none). The router reads conjuncts from the
/// description, so this must happen at split time; aliases nested
/// deeper inside composite predicates are rewritten while rendering,
/// through the parent context's alias map.
fn realias_for_parent(mut pred: Predicate, child_alias: Option<&str>) -> Predicate {
    let Some(child_alias) = child_alias else {
        return pred;
    };
    match &mut pred {
        Predicate::Compare(cmp) => {
            if cmp.alias.as_deref() == Some(child_alias) {
                cmp.alias = None;
            }
        }
        Predicate::IsNull { alias, .. } | Predicate::InSubquery { alias, .. } => {
            if alias.as_deref() == Some(child_alias) {
                *alias = None;
            }
        }
        Predicate::And(_) | Predicate::Or(_) | Predicate::Not(_) | Predicate::Exists { .. } => {}
    }
    pred
}

fn classify_column(
    column: &str,
    parent: &TableModel,
    child: &TableModel,
    kind: StatementKind,
) -> Result<Side, CompileError> {
    let on_parent = parent.owns_column(column);
    let on_child = child.owns_column(column);

    if column == child.primary_key && on_parent && on_child {
        return Ok(Side::Both);
    }
    if on_parent {
        return Ok(Side::Parent);
    }
    if on_child {
        return Ok(Side::Child);
    }
    Err(CompileError::UnknownColumn {
        column: column.to_string(),
        alias: None,
        kind,
    })
}

/// Classify a conjunct by its first referenced column; conjuncts with
/// no column reference (bare EXISTS) stay on the child side, which is
/// the statement's declared target.
fn classify_predicate(
    pred: &Predicate,
    parent: &TableModel,
    child: &TableModel,
    kind: StatementKind,
) -> Result<Side, CompileError> {
    match primary_column(pred) {
        Some(column) => classify_column(column, parent, child, kind),
        None => Ok(Side::Child),
    }
}

fn primary_column(pred: &Predicate) -> Option<&str> {
    match pred {
        Predicate::Compare(cmp) => Some(&cmp.column),
        Predicate::IsNull { column, .. } | Predicate::InSubquery { column, .. } => Some(column),
        Predicate::And(preds) | Predicate::Or(preds) => preds.iter().find_map(primary_column),
        Predicate::Not(inner) => primary_column(inner),
        Predicate::Exists { .. } => None,
    }
}

fn predicate_of(mut preds: Vec<Predicate>) -> Option<Predicate> {
    match preds.len() {
        0 => None,
        1 => preds.pop(),
        _ => Some(Predicate::And(preds)),
    }
}

fn shared_id_index(
    parent: &CompiledStatement,
    child: &CompiledStatement,
    child_table: &TableModel,
) -> Option<usize> {
    let position = |stmt: &CompiledStatement| {
        stmt.selection_list()
            .iter()
            .position(|s| s.column == child_table.primary_key)
    };
    match (position(parent), position(child)) {
        (Some(a), Some(b)) if a == b => Some(a),
        _ => None,
    }
}
