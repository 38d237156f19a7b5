//! Rendering walk: statement description in, SQL text and pending
//! parameters out.

use crate::{
    compiled::SelectionInfo,
    ctx::{ContextKind, PendingParam, StatementContext},
    error::CompileError,
    model::ColumnType,
    param::Param,
    route,
    stmt::{
        AssignSource, Assignment, ComparePredicate, Predicate, Selection, StatementDescription,
        StatementKind, TableRef,
    },
};

impl StatementContext<'_> {
    /// Walk `desc` and accumulate SQL, parameters, and metadata.
    pub fn render(&mut self, desc: &StatementDescription) -> Result<(), CompileError> {
        self.ensure_open("render")?;

        match desc.kind {
            StatementKind::Select => self.render_select(desc),
            StatementKind::Insert => self.render_insert(desc),
            StatementKind::Update => self.render_update(desc),
            StatementKind::Delete => self.render_delete(desc),
            StatementKind::CursorDeclare => self.render_cursor(desc),
            StatementKind::Values => self.render_values(desc),
        }
    }

    fn render_select(&mut self, desc: &StatementDescription) -> Result<(), CompileError> {
        self.sql.push_str("SELECT ");
        if desc.selections.is_empty() {
            self.sql.push('*');
        } else {
            for (i, selection) in desc.selections.iter().enumerate() {
                if i > 0 {
                    self.sql.push_str(", ");
                }
                self.append_selection(selection)?;
            }
        }

        self.sql.push_str(" FROM ");
        for (i, tref) in desc.tables.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_table(tref, desc)?;
        }

        self.render_where(desc)
    }

    /// Select lists bind to this scope's own tables; outer columns may
    /// only appear inside predicates.
    fn append_selection(&mut self, selection: &Selection) -> Result<(), CompileError> {
        let local_only = self.kind == ContextKind::Subquery;
        let (_, ty) =
            self.append_field_inner(selection.alias.as_deref(), &selection.column, local_only)?;
        self.selections.push(SelectionInfo {
            alias: selection.alias.clone(),
            column: selection.column.clone(),
            ty,
        });
        Ok(())
    }

    /// Append the physical (suffixed) table name, consulting the
    /// sharding router for the partition.
    fn push_table(
        &mut self,
        tref: &TableRef,
        desc: &StatementDescription,
    ) -> Result<(), CompileError> {
        let result = route::route(tref.table, desc, &self.session.partitions)?;
        if self.route.is_none() {
            self.route = Some(result);
        }

        let suffix = route::suffix_of(result.table_index(), self.session.partitions.tables_per_db);
        let physical = format!("{}{suffix}", tref.table.name);
        let quoted = self.dialect.quote_ident(&physical);
        self.sql.push_str(&quoted);

        if let Some(alias) = &tref.alias {
            self.sql.push_str(" AS ");
            let quoted = self.dialect.quote_ident(alias);
            self.sql.push_str(&quoted);
        }

        Ok(())
    }

    fn target_ref<'d>(
        &self,
        desc: &'d StatementDescription,
    ) -> Result<&'d TableRef, CompileError> {
        desc.tables.first().ok_or_else(|| CompileError::IllegalState {
            operation: format!("{} statement has no target table", desc.kind),
        })
    }

    fn render_insert(&mut self, desc: &StatementDescription) -> Result<(), CompileError> {
        let tref = self.target_ref(desc)?.clone();

        self.sql.push_str("INSERT INTO ");
        self.push_table(&tref, desc)?;

        self.sql.push_str(" (");
        for (i, assign) in desc.assignments.iter().enumerate() {
            self.check_assign_target(&tref, assign)?;
            if i > 0 {
                self.sql.push_str(", ");
            }
            let quoted = self.dialect.quote_ident(&assign.column);
            self.sql.push_str(&quoted);
            self.referenced.push(assign.column.clone());
        }
        self.sql.push_str(") VALUES (");
        for (i, assign) in desc.assignments.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            let ty = tref
                .table
                .column_type(&assign.column)
                .unwrap_or(ColumnType::Text);
            self.push_assign_source(&assign.source, ty);
        }
        self.sql.push(')');

        self.render_returning(desc, &tref)
    }

    fn render_update(&mut self, desc: &StatementDescription) -> Result<(), CompileError> {
        let tref = self.target_ref(desc)?.clone();

        self.sql.push_str("UPDATE ");
        self.push_table(&tref, desc)?;

        self.sql.push_str(" SET ");
        for (i, assign) in desc.assignments.iter().enumerate() {
            self.check_assign_target(&tref, assign)?;
            if i > 0 {
                self.sql.push_str(", ");
            }
            let quoted = self.dialect.quote_ident(&assign.column);
            self.sql.push_str(&quoted);
            self.sql.push_str(" = ");
            let ty = tref
                .table
                .column_type(&assign.column)
                .unwrap_or(ColumnType::Text);
            self.push_assign_source(&assign.source, ty);
            self.referenced.push(assign.column.clone());
        }

        self.render_where(desc)?;
        self.render_returning(desc, &tref)
    }

    fn render_delete(&mut self, desc: &StatementDescription) -> Result<(), CompileError> {
        let tref = self.target_ref(desc)?.clone();

        self.sql.push_str("DELETE FROM ");
        self.push_table(&tref, desc)?;
        self.render_where(desc)?;
        self.render_returning(desc, &tref)
    }

    fn render_cursor(&mut self, desc: &StatementDescription) -> Result<(), CompileError> {
        let name = desc.cursor_name.as_deref().unwrap_or("cur");
        self.sql.push_str("DECLARE ");
        let quoted = self.dialect.quote_ident(name);
        self.sql.push_str(&quoted);
        self.sql.push_str(" CURSOR FOR ");
        self.render_select(desc)
    }

    fn render_values(&mut self, desc: &StatementDescription) -> Result<(), CompileError> {
        self.sql.push_str("VALUES ");
        for (i, row) in desc.values_rows.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.sql.push('(');
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    self.sql.push_str(", ");
                }
                self.push_placeholder();
                self.pending.push(PendingParam::Bound(Param::single(
                    ColumnType::of_value(value),
                    Some(value.clone()),
                )));
            }
            self.sql.push(')');
        }
        Ok(())
    }

    fn check_assign_target(
        &self,
        tref: &TableRef,
        assign: &Assignment,
    ) -> Result<(), CompileError> {
        if tref.table.owns_column(&assign.column) {
            return Ok(());
        }
        Err(CompileError::UnknownColumn {
            column: assign.column.clone(),
            alias: tref.alias.clone(),
            kind: self.stmt_kind,
        })
    }

    fn push_assign_source(&mut self, source: &AssignSource, ty: ColumnType) {
        match source {
            AssignSource::Value(value) => {
                self.push_placeholder();
                self.pending
                    .push(PendingParam::Bound(Param::single(ty, Some(value.clone()))));
            }
            AssignSource::Named(name) => {
                self.push_placeholder();
                self.pending.push(PendingParam::Named {
                    name: name.clone(),
                    ty,
                });
            }
        }
    }

    /// RETURNING clause: explicit columns plus, for inserts into a
    /// table with a server-generated key, the key itself (first).
    /// Skipped entirely when the dialect has no RETURNING support for
    /// this statement kind.
    fn render_returning(
        &mut self,
        desc: &StatementDescription,
        tref: &TableRef,
    ) -> Result<(), CompileError> {
        if !self.dialect.supports_returning(desc.kind) {
            return Ok(());
        }

        let mut columns: Vec<&str> = Vec::new();
        if desc.kind == StatementKind::Insert {
            if let Some(key) = tref.table.generated_key {
                columns.push(key);
            }
        }
        for column in &desc.returning {
            if !columns.contains(&column.as_str()) {
                columns.push(column);
            }
        }
        if columns.is_empty() {
            return Ok(());
        }

        self.sql.push_str(" RETURNING ");
        for (i, column) in columns.iter().enumerate() {
            if !tref.table.owns_column(column) {
                return Err(CompileError::UnknownColumn {
                    column: (*column).to_string(),
                    alias: tref.alias.clone(),
                    kind: self.stmt_kind,
                });
            }
            if i > 0 {
                self.sql.push_str(", ");
            }
            let quoted = self.dialect.quote_ident(column);
            self.sql.push_str(&quoted);
            let ty = tref.table.column_type(column).unwrap_or(ColumnType::Text);
            self.selections.push(SelectionInfo {
                alias: None,
                column: (*column).to_string(),
                ty,
            });
        }

        Ok(())
    }

    fn render_where(&mut self, desc: &StatementDescription) -> Result<(), CompileError> {
        let Some(pred) = &desc.predicate else {
            return Ok(());
        };
        self.sql.push_str(" WHERE ");
        self.render_where_root(pred)
    }

    /// Top-level conjunctions render without outer parentheses.
    fn render_where_root(&mut self, pred: &Predicate) -> Result<(), CompileError> {
        if let Predicate::And(preds) = pred {
            for (i, p) in preds.iter().enumerate() {
                if i > 0 {
                    self.sql.push_str(" AND ");
                }
                self.render_predicate(p)?;
            }
            Ok(())
        } else {
            self.render_predicate(pred)
        }
    }

    fn render_predicate(&mut self, pred: &Predicate) -> Result<(), CompileError> {
        match pred {
            Predicate::And(preds) => self.render_group(preds, " AND "),
            Predicate::Or(preds) => self.render_group(preds, " OR "),
            Predicate::Not(inner) => {
                self.sql.push_str("NOT (");
                self.render_predicate(inner)?;
                self.sql.push(')');
                Ok(())
            }
            Predicate::Compare(cmp) => self.render_compare(cmp),
            Predicate::IsNull { alias, column } => {
                self.append_field(alias.as_deref(), column)?;
                self.sql.push_str(" IS NULL");
                Ok(())
            }
            Predicate::InSubquery {
                alias,
                column,
                negated,
                subquery,
            } => {
                self.append_field(alias.as_deref(), column)?;
                self.sql
                    .push_str(if *negated { " NOT IN (" } else { " IN (" });
                self.render_subquery(subquery)?;
                self.sql.push(')');
                Ok(())
            }
            Predicate::Exists { negated, subquery } => {
                self.sql
                    .push_str(if *negated { "NOT EXISTS (" } else { "EXISTS (" });
                self.render_subquery(subquery)?;
                self.sql.push(')');
                Ok(())
            }
        }
    }

    fn render_group(&mut self, preds: &[Predicate], sep: &str) -> Result<(), CompileError> {
        self.sql.push('(');
        for (i, p) in preds.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(sep);
            }
            self.render_predicate(p)?;
        }
        self.sql.push(')');
        Ok(())
    }

    fn render_compare(&mut self, cmp: &ComparePredicate) -> Result<(), CompileError> {
        use crate::stmt::{CompareOp, Operand};

        let (table, ty) = self.append_field_inner(cmp.alias.as_deref(), &cmp.column, false)?;
        if cmp.op == CompareOp::Eq && table.version_column == Some(cmp.column.as_str()) {
            self.optimistic = true;
        }

        self.sql.push(' ');
        self.sql.push_str(cmp.op.sql());
        self.sql.push(' ');

        match &cmp.operand {
            Operand::Value(value) => {
                self.push_placeholder();
                self.pending
                    .push(PendingParam::Bound(Param::single(ty, Some(value.clone()))));
            }
            Operand::Values(values) => {
                let param = Param::multi(ty, values.clone())?;
                self.sql.push('(');
                for i in 0..values.len() {
                    if i > 0 {
                        self.sql.push_str(", ");
                    }
                    self.push_placeholder();
                }
                self.sql.push(')');
                self.pending.push(PendingParam::Bound(param));
            }
            Operand::Named(name) => {
                self.push_placeholder();
                self.pending.push(PendingParam::Named {
                    name: name.clone(),
                    ty,
                });
            }
            Operand::OuterColumn { alias, column } => {
                self.append_outer_field(alias.as_deref(), column)?;
            }
        }

        Ok(())
    }

    /// Compile a nested scope inline. The child captures this
    /// context's visible tables and continues its placeholder
    /// numbering; its buffers are merged back afterwards.
    fn render_subquery(&mut self, sub: &StatementDescription) -> Result<(), CompileError> {
        let (dialect, session) = (self.dialect, self.session);
        let mut child = Self::create(Some(&*self), sub, dialect, session)?;
        child.param_offset = self.param_offset + self.placeholder_count;
        child.render(sub)?;

        self.placeholder_count += child.placeholder_count;
        self.sql.push_str(&child.sql);
        self.pending.append(&mut child.pending);
        Ok(())
    }
}
