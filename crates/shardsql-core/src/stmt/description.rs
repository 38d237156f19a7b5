use crate::{
    model::{AttributeAccess, TableModel},
    stmt::predicate::Predicate,
    value::Value,
};
use derive_more::Display;

///
/// StatementKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum StatementKind {
    #[display("SELECT")]
    Select,
    #[display("INSERT")]
    Insert,
    #[display("UPDATE")]
    Update,
    #[display("DELETE")]
    Delete,
    #[display("DECLARE CURSOR")]
    CursorDeclare,
    #[display("VALUES")]
    Values,
}

impl StatementKind {
    /// DML statements target one table and may split into a
    /// parent/child pair under single-table inheritance.
    #[must_use]
    pub const fn is_dml(self) -> bool {
        matches!(self, Self::Insert | Self::Update | Self::Delete)
    }
}

///
/// TableRef
///
/// One table reference in a statement's table list. Pinned partition
/// indices are consulted after route-key predicates, never before.
///

#[derive(Clone, Debug)]
pub struct TableRef {
    pub table: &'static TableModel,
    pub alias: Option<String>,
    pub pinned_db: Option<usize>,
    pub pinned_table: Option<usize>,
}

impl TableRef {
    #[must_use]
    pub const fn new(table: &'static TableModel) -> Self {
        Self {
            table,
            alias: None,
            pinned_db: None,
            pinned_table: None,
        }
    }
}

impl PartialEq for TableRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.table, other.table)
            && self.alias == other.alias
            && self.pinned_db == other.pinned_db
            && self.pinned_table == other.pinned_table
    }
}

///
/// Selection
/// One requested result column.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Selection {
    pub alias: Option<String>,
    pub column: String,
}

///
/// AssignSource
///

#[derive(Clone, Debug, PartialEq)]
pub enum AssignSource {
    /// A bound value, rendered as one positional placeholder.
    Value(Value),
    /// A named batch placeholder; each batch row binds the value.
    Named(String),
}

///
/// Assignment
/// One SET / insert-column entry.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub source: AssignSource,
}

///
/// BatchRow
/// Named-placeholder bindings for one batch row.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchRow {
    bindings: Vec<(String, Value)>,
}

impl BatchRow {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bindings.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }
}

///
/// StatementDescription
///
/// Read-only input tree for the compiler. The fluent front end that
/// applications call lives outside this crate; the builder helpers
/// below cover callers and tests.
///

#[derive(Clone, Debug, PartialEq)]
pub struct StatementDescription {
    pub kind: StatementKind,
    pub tables: Vec<TableRef>,
    pub selections: Vec<Selection>,
    pub assignments: Vec<Assignment>,
    pub predicate: Option<Predicate>,
    pub batch_rows: Vec<BatchRow>,
    pub values_rows: Vec<Vec<Value>>,
    /// Columns to return via a RETURNING-style clause, when the
    /// dialect supports one for this statement kind.
    pub returning: Vec<String>,
    pub cursor_name: Option<String>,
}

impl StatementDescription {
    #[must_use]
    pub fn new(kind: StatementKind, table: &'static TableModel) -> Self {
        Self {
            kind,
            tables: vec![TableRef::new(table)],
            selections: Vec::new(),
            assignments: Vec::new(),
            predicate: None,
            batch_rows: Vec::new(),
            values_rows: Vec::new(),
            returning: Vec::new(),
            cursor_name: None,
        }
    }

    #[must_use]
    pub fn select(table: &'static TableModel) -> Self {
        Self::new(StatementKind::Select, table)
    }

    #[must_use]
    pub fn insert(table: &'static TableModel) -> Self {
        Self::new(StatementKind::Insert, table)
    }

    #[must_use]
    pub fn update(table: &'static TableModel) -> Self {
        Self::new(StatementKind::Update, table)
    }

    #[must_use]
    pub fn delete(table: &'static TableModel) -> Self {
        Self::new(StatementKind::Delete, table)
    }

    #[must_use]
    pub fn cursor(name: impl Into<String>, table: &'static TableModel) -> Self {
        let mut desc = Self::new(StatementKind::CursorDeclare, table);
        desc.cursor_name = Some(name.into());
        desc
    }

    #[must_use]
    pub fn values(rows: Vec<Vec<Value>>) -> Self {
        Self {
            kind: StatementKind::Values,
            tables: Vec::new(),
            selections: Vec::new(),
            assignments: Vec::new(),
            predicate: None,
            batch_rows: Vec::new(),
            values_rows: rows,
            returning: Vec::new(),
            cursor_name: None,
        }
    }

    /// Alias the most recently added table reference.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        if let Some(tref) = self.tables.last_mut() {
            tref.alias = Some(alias.into());
        }
        self
    }

    /// Add another table to the FROM list.
    #[must_use]
    pub fn join(mut self, table: &'static TableModel) -> Self {
        self.tables.push(TableRef::new(table));
        self
    }

    #[must_use]
    pub fn select_column(mut self, column: impl Into<String>) -> Self {
        self.selections.push(Selection {
            alias: None,
            column: column.into(),
        });
        self
    }

    #[must_use]
    pub fn select_aliased(mut self, alias: impl Into<String>, column: impl Into<String>) -> Self {
        self.selections.push(Selection {
            alias: Some(alias.into()),
            column: column.into(),
        });
        self
    }

    #[must_use]
    pub fn assign(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.assignments.push(Assignment {
            column: column.into(),
            source: AssignSource::Value(value.into()),
        });
        self
    }

    /// Assign from a named batch placeholder.
    #[must_use]
    pub fn assign_named(mut self, column: impl Into<String>, name: impl Into<String>) -> Self {
        self.assignments.push(Assignment {
            column: column.into(),
            source: AssignSource::Named(name.into()),
        });
        self
    }

    /// Assign `columns` by reading each one from a domain object.
    /// Columns the object does not carry are skipped.
    #[must_use]
    pub fn assign_fields(mut self, obj: &impl AttributeAccess, columns: &[&str]) -> Self {
        for column in columns {
            if let Some(value) = obj.get(column) {
                self = self.assign(*column, value);
            }
        }
        self
    }

    /// AND-merge a predicate into the WHERE clause.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => Predicate::And(vec![existing, predicate]),
            None => predicate,
        });
        self
    }

    #[must_use]
    pub fn batch_row(mut self, row: BatchRow) -> Self {
        self.batch_rows.push(row);
        self
    }

    #[must_use]
    pub fn returning(mut self, column: impl Into<String>) -> Self {
        self.returning.push(column.into());
        self
    }

    /// Pin the most recently added table to a physical table partition.
    #[must_use]
    pub fn pin_table(mut self, index: usize) -> Self {
        if let Some(tref) = self.tables.last_mut() {
            tref.pinned_table = Some(index);
        }
        self
    }

    /// Pin the most recently added table to a database partition.
    #[must_use]
    pub fn pin_db(mut self, index: usize) -> Self {
        if let Some(tref) = self.tables.last_mut() {
            tref.pinned_db = Some(index);
        }
        self
    }

    /// The statement's target table (first in the table list).
    #[must_use]
    pub fn target(&self) -> Option<&'static TableModel> {
        self.tables.first().map(|t| t.table)
    }
}
