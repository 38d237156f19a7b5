//! Top-level compile entry points.

use crate::{
    compiled::CompiledStatement,
    ctx::{StatementContext, paired},
    dialect::Dialect,
    error::CompileError,
    model::TableModel,
    session::SessionOptions,
    stmt::StatementDescription,
};

/// Compile one statement description. DML against a child table under
/// single-table inheritance yields a paired parent/child result;
/// everything else yields a simple, batch, or generated-key result.
pub fn compile(
    desc: &StatementDescription,
    dialect: &dyn Dialect,
    session: &SessionOptions,
) -> Result<CompiledStatement, CompileError> {
    if desc.kind.is_dml() && desc.target().is_some_and(TableModel::is_child) {
        return paired::compile_paired(desc, dialect, session);
    }

    let mut ctx = StatementContext::create(None, desc, dialect, session)?;
    ctx.render(desc)?;

    let event = ctx.trace_event();
    let compiled = ctx.build()?;

    if let Some(sink) = session.trace {
        sink.on_event(event);
    }

    Ok(compiled)
}

/// Compile an ordered description list into one multi-statement
/// result, preserving order.
pub fn compile_multi(
    descs: &[StatementDescription],
    dialect: &dyn Dialect,
    session: &SessionOptions,
) -> Result<CompiledStatement, CompileError> {
    let mut parts = Vec::with_capacity(descs.len());
    for desc in descs {
        parts.push(compile(desc, dialect, session)?);
    }
    Ok(CompiledStatement::Multi(parts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dialect::AnsiDialect,
        route::RouteResult,
        session::PartitionConfig,
        stmt::{BatchRow, Predicate, StatementKind},
        test_support::{EVENT, ORDER, REGION},
        trace::{CompileTraceEvent, CompileTraceSink},
        value::Value,
    };
    use proptest::prelude::*;
    use std::sync::Mutex;

    fn sharded() -> SessionOptions {
        SessionOptions::new(PartitionConfig::new(1, 16))
    }

    #[test]
    fn compiling_twice_is_byte_identical() {
        let desc = StatementDescription::update(&ORDER)
            .assign("status", 1_i64)
            .filter(Predicate::and(vec![
                Predicate::eq("id", Value::Uint(37)),
                Predicate::eq("version", Value::Uint(3)),
            ]));
        let session = sharded();

        let first = compile(&desc, &AnsiDialect, &session).unwrap();
        let second = compile(&desc, &AnsiDialect, &session).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.sql(), second.sql());
    }

    #[test]
    fn batch_insert_with_generated_keys_exposes_slots() {
        let desc = StatementDescription::insert(&EVENT)
            .assign_named("payload", "p")
            .batch_row(BatchRow::new().bind("p", "a"))
            .batch_row(BatchRow::new().bind("p", "b"))
            .batch_row(BatchRow::new().bind("p", "c"));
        let session = SessionOptions::default();

        let mut compiled = compile(&desc, &AnsiDialect, &session).unwrap();
        let keyed = compiled.as_generated_key_mut().unwrap();
        assert_eq!(keyed.row_size(), 3);
        assert_eq!(keyed.stmt().row_count(), 3);

        for row in 0..3 {
            keyed
                .set_generated_id_value(row, Value::Uint(500 + row as u64))
                .unwrap();
        }
        assert!(keyed.all_filled());

        let ids: Vec<_> = (0..3).map(|row| keyed.generated_id_value(row)).collect();
        assert_eq!(
            ids,
            [
                Some(&Value::Uint(500)),
                Some(&Value::Uint(501)),
                Some(&Value::Uint(502)),
            ]
        );
    }

    #[test]
    fn batch_groups_follow_row_order() {
        let desc = StatementDescription::update(&ORDER)
            .pin_table(2)
            .assign_named("status", "s")
            .batch_row(BatchRow::new().bind("s", 1_i64))
            .batch_row(BatchRow::new().bind("s", 2_i64));
        let session = sharded();

        let compiled = compile(&desc, &AnsiDialect, &session).unwrap();
        let CompiledStatement::Batch(stmt) = compiled else {
            panic!("expected a batch statement");
        };
        assert_eq!(stmt.row_count(), 2);
        assert_eq!(stmt.group_list()[0].len(), 1);
        assert_eq!(
            stmt.group_list()[0][0],
            crate::param::Param::single(crate::model::ColumnType::Int, Some(Value::Int(1)))
        );
        assert_eq!(
            stmt.group_list()[1][0],
            crate::param::Param::single(crate::model::ColumnType::Int, Some(Value::Int(2)))
        );
    }

    #[test]
    fn unbound_batch_placeholder_is_an_error() {
        let desc = StatementDescription::update(&ORDER)
            .pin_table(2)
            .assign_named("status", "s")
            .batch_row(BatchRow::new().bind("s", 1_i64))
            .batch_row(BatchRow::new().bind("wrong", 2_i64));
        let session = sharded();

        let err = compile(&desc, &AnsiDialect, &session).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnboundNamedParam {
                name: "s".to_string(),
                row: 1,
            }
        );
    }

    #[test]
    fn multi_compile_preserves_order() {
        let descs = [
            StatementDescription::delete(&REGION).filter(Predicate::eq("id", Value::Uint(1))),
            StatementDescription::insert(&REGION)
                .assign("id", 2_u64)
                .assign("name", "east"),
        ];
        let session = SessionOptions::default();

        let compiled = compile_multi(&descs, &AnsiDialect, &session).unwrap();
        let CompiledStatement::Multi(parts) = compiled else {
            panic!("expected a multi statement");
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].sql(), Some("DELETE FROM \"region\" WHERE \"id\" = ?"));
        assert!(parts[1].sql().unwrap().starts_with("INSERT INTO \"region\""));
    }

    proptest! {
        #[test]
        fn compiling_any_update_twice_is_identical(id in any::<u64>(), status in any::<i64>()) {
            let desc = StatementDescription::update(&ORDER)
                .assign("status", status)
                .filter(Predicate::eq("id", Value::Uint(id)));
            let session = sharded();

            let first = compile(&desc, &AnsiDialect, &session).unwrap();
            let second = compile(&desc, &AnsiDialect, &session).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.sql(), second.sql());
        }
    }

    ///
    /// RecordingSink
    ///

    struct RecordingSink(Mutex<Vec<CompileTraceEvent>>);

    impl CompileTraceSink for RecordingSink {
        fn on_event(&self, event: CompileTraceEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn trace_sink_sees_one_event_per_compile() {
        let sink: &'static RecordingSink = Box::leak(Box::new(RecordingSink(Mutex::new(vec![]))));
        let session = SessionOptions::new(PartitionConfig::new(1, 16)).with_trace(sink);

        let desc = StatementDescription::update(&ORDER)
            .assign("status", 1_i64)
            .filter(Predicate::eq("id", Value::Uint(37)));
        compile(&desc, &AnsiDialect, &session).unwrap();

        let events = sink.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        let CompileTraceEvent::Compiled {
            kind,
            table,
            route,
            batch_rows,
            optimistic,
            ..
        } = events[0];
        assert_eq!(kind, StatementKind::Update);
        assert_eq!(table, "order");
        assert_eq!(route, Some(RouteResult::Table { table: 5 }));
        assert_eq!(batch_rows, 0);
        assert!(!optimistic);
    }
}
