//! Immutable compiled-statement values: the contract the execution
//! layer consumes.
//!
//! Once built, SQL text and parameter lists never change; re-reading
//! is side-effect free. The only mutable surface is the generated-key
//! slot array, which the execution layer fills exactly once per row
//! after the database reports generated identifiers.

use crate::{
    error::CompileError,
    model::{AttributeAccess, ColumnType},
    param::Param,
    value::Value,
};

///
/// SelectionInfo
///
/// One result-column descriptor, ordered as the driver returns
/// columns. Enough for the execution layer to decode rows.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SelectionInfo {
    pub alias: Option<String>,
    pub column: String,
    pub ty: ColumnType,
}

///
/// SimpleStatement
/// One SQL string, one positional parameter list.
///

#[derive(Clone, Debug, PartialEq)]
pub struct SimpleStatement {
    sql: String,
    params: Vec<Param>,
    selections: Vec<SelectionInfo>,
    optimistic: bool,
}

impl SimpleStatement {
    pub(crate) const fn new(
        sql: String,
        params: Vec<Param>,
        selections: Vec<SelectionInfo>,
        optimistic: bool,
    ) -> Self {
        Self {
            sql,
            params,
            selections,
            optimistic,
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Positional parameter values, in placeholder order.
    #[must_use]
    pub fn param_group(&self) -> &[Param] {
        &self.params
    }

    #[must_use]
    pub fn selection_list(&self) -> &[SelectionInfo] {
        &self.selections
    }

    /// True iff a version-column equality predicate participated in
    /// this statement's WHERE clause.
    #[must_use]
    pub const fn has_optimistic(&self) -> bool {
        self.optimistic
    }
}

///
/// BatchStatement
/// One SQL string, one parameter group per batch row.
///

#[derive(Clone, Debug, PartialEq)]
pub struct BatchStatement {
    sql: String,
    groups: Vec<Vec<Param>>,
    selections: Vec<SelectionInfo>,
    optimistic: bool,
}

impl BatchStatement {
    pub(crate) const fn new(
        sql: String,
        groups: Vec<Vec<Param>>,
        selections: Vec<SelectionInfo>,
        optimistic: bool,
    ) -> Self {
        Self {
            sql,
            groups,
            selections,
            optimistic,
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// One group per batch row, each in placeholder order.
    #[must_use]
    pub fn group_list(&self) -> &[Vec<Param>] {
        &self.groups
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn selection_list(&self) -> &[SelectionInfo] {
        &self.selections
    }

    #[must_use]
    pub const fn has_optimistic(&self) -> bool {
        self.optimistic
    }
}

///
/// KeyedStatement
///
/// Inner statement of a generated-key result; only simple and batch
/// shapes can produce server-generated identifiers.
///

#[derive(Clone, Debug, PartialEq)]
pub enum KeyedStatement {
    Simple(SimpleStatement),
    Batch(BatchStatement),
}

impl KeyedStatement {
    #[must_use]
    pub fn sql(&self) -> &str {
        match self {
            Self::Simple(stmt) => stmt.sql(),
            Self::Batch(stmt) => stmt.sql(),
        }
    }

    #[must_use]
    pub fn selection_list(&self) -> &[SelectionInfo] {
        match self {
            Self::Simple(stmt) => stmt.selection_list(),
            Self::Batch(stmt) => stmt.selection_list(),
        }
    }

    #[must_use]
    pub const fn has_optimistic(&self) -> bool {
        match self {
            Self::Simple(stmt) => stmt.has_optimistic(),
            Self::Batch(stmt) => stmt.has_optimistic(),
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            Self::Simple(_) => 1,
            Self::Batch(stmt) => stmt.row_count(),
        }
    }
}

///
/// GeneratedKeyStatement
///
/// A statement plus write-once-per-row slots for server-generated
/// identifiers. The execution layer must write every slot in
/// `[0, row_size())` exactly once before handing the result back to
/// the application; reading an unfilled slot returns `None`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedKeyStatement {
    stmt: KeyedStatement,
    slots: Vec<Option<Value>>,
}

impl GeneratedKeyStatement {
    pub(crate) fn simple(stmt: SimpleStatement) -> Self {
        Self {
            stmt: KeyedStatement::Simple(stmt),
            slots: vec![None],
        }
    }

    pub(crate) fn batch(stmt: BatchStatement) -> Self {
        let rows = stmt.row_count();
        Self {
            stmt: KeyedStatement::Batch(stmt),
            slots: vec![None; rows],
        }
    }

    #[must_use]
    pub const fn stmt(&self) -> &KeyedStatement {
        &self.stmt
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        self.stmt.sql()
    }

    #[must_use]
    pub fn row_size(&self) -> usize {
        self.slots.len()
    }

    /// Fill the generated identifier for one row. Each row may be
    /// written exactly once; out-of-range rows and double writes are
    /// caller errors.
    pub fn set_generated_id_value(&mut self, row: usize, value: Value) -> Result<(), CompileError> {
        let rows = self.slots.len();
        match self.slots.get_mut(row) {
            None => Err(CompileError::IllegalState {
                operation: format!("generated-key row {row} out of range (rows: {rows})"),
            }),
            Some(slot) => {
                if slot.is_some() {
                    return Err(CompileError::IllegalState {
                        operation: format!("generated-key row {row} written twice"),
                    });
                }
                *slot = Some(value);
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn generated_id_value(&self, row: usize) -> Option<&Value> {
        self.slots.get(row).and_then(Option::as_ref)
    }

    /// True once every row's identifier has been written.
    #[must_use]
    pub fn all_filled(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Write each generated identifier back into its domain object's
    /// key field. Every slot must be filled and `rows` must match the
    /// slot count.
    pub fn write_back<T: AttributeAccess>(
        &self,
        key_column: &str,
        rows: &mut [T],
    ) -> Result<(), CompileError> {
        if rows.len() != self.slots.len() {
            return Err(CompileError::IllegalState {
                operation: format!(
                    "generated-key write-back over {} rows (slots: {})",
                    rows.len(),
                    self.slots.len()
                ),
            });
        }

        for (row, slot) in rows.iter_mut().zip(&self.slots) {
            match slot {
                Some(value) => row.set(key_column, value.clone()),
                None => {
                    return Err(CompileError::IllegalState {
                        operation: "generated-key write-back before every slot is filled"
                            .to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

///
/// PairedStatement
///
/// Parent/child pair produced when a logical statement spans a
/// single-table-inheritance split. The execution layer must treat the
/// pair as one logical unit; this core only produces the pairing.
///

#[derive(Clone, Debug, PartialEq)]
pub struct PairedStatement {
    parent: CompiledStatement,
    child: CompiledStatement,
    id_selection_index: Option<usize>,
}

impl PairedStatement {
    pub(crate) const fn new(
        parent: CompiledStatement,
        child: CompiledStatement,
        id_selection_index: Option<usize>,
    ) -> Self {
        Self {
            parent,
            child,
            id_selection_index,
        }
    }

    #[must_use]
    pub const fn parent_stmt(&self) -> &CompiledStatement {
        &self.parent
    }

    #[must_use]
    pub const fn child_stmt(&self) -> &CompiledStatement {
        &self.child
    }

    /// Index of the generated-identifier column in both selection
    /// lists, present only when both sides return it at the same
    /// position.
    #[must_use]
    pub const fn id_selection_index(&self) -> Option<usize> {
        self.id_selection_index
    }
}

///
/// CompiledStatement
///

#[derive(Clone, Debug, PartialEq)]
pub enum CompiledStatement {
    Simple(SimpleStatement),
    Batch(BatchStatement),
    Paired(Box<PairedStatement>),
    GeneratedKey(GeneratedKeyStatement),
    /// Ordered heterogeneous sub-results for multi-statement or
    /// stored-procedure execution.
    Multi(Vec<CompiledStatement>),
}

impl CompiledStatement {
    /// Rendered SQL, for variants with a single statement body.
    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Simple(stmt) => Some(stmt.sql()),
            Self::Batch(stmt) => Some(stmt.sql()),
            Self::GeneratedKey(stmt) => Some(stmt.sql()),
            Self::Paired(_) | Self::Multi(_) => None,
        }
    }

    #[must_use]
    pub fn has_optimistic(&self) -> bool {
        match self {
            Self::Simple(stmt) => stmt.has_optimistic(),
            Self::Batch(stmt) => stmt.has_optimistic(),
            Self::GeneratedKey(stmt) => stmt.stmt().has_optimistic(),
            Self::Paired(pair) => {
                pair.parent_stmt().has_optimistic() || pair.child_stmt().has_optimistic()
            }
            Self::Multi(parts) => parts.iter().any(Self::has_optimistic),
        }
    }

    #[must_use]
    pub fn selection_list(&self) -> &[SelectionInfo] {
        match self {
            Self::Simple(stmt) => stmt.selection_list(),
            Self::Batch(stmt) => stmt.selection_list(),
            Self::GeneratedKey(stmt) => stmt.stmt().selection_list(),
            Self::Paired(pair) => pair.parent_stmt().selection_list(),
            Self::Multi(_) => &[],
        }
    }

    #[must_use]
    pub const fn as_generated_key(&self) -> Option<&GeneratedKeyStatement> {
        match self {
            Self::GeneratedKey(stmt) => Some(stmt),
            _ => None,
        }
    }

    pub const fn as_generated_key_mut(&mut self) -> Option<&mut GeneratedKeyStatement> {
        match self {
            Self::GeneratedKey(stmt) => Some(stmt),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_paired(&self) -> Option<&PairedStatement> {
        match self {
            Self::Paired(pair) => Some(pair),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(rows: usize) -> GeneratedKeyStatement {
        let groups = (0..rows).map(|_| Vec::new()).collect();
        GeneratedKeyStatement::batch(BatchStatement::new(
            "INSERT INTO \"event\" (\"payload\") VALUES (?)".to_string(),
            groups,
            Vec::new(),
            false,
        ))
    }

    #[test]
    fn generated_key_slots_fill_exactly_once() {
        let mut stmt = keyed(3);
        assert_eq!(stmt.row_size(), 3);
        assert!(!stmt.all_filled());

        for row in 0..3 {
            stmt.set_generated_id_value(row, Value::Uint(100 + row as u64))
                .unwrap();
        }

        assert!(stmt.all_filled());
        assert_eq!(stmt.generated_id_value(0), Some(&Value::Uint(100)));
        assert_eq!(stmt.generated_id_value(2), Some(&Value::Uint(102)));
    }

    #[test]
    fn double_write_is_rejected() {
        let mut stmt = keyed(1);
        stmt.set_generated_id_value(0, Value::Uint(7)).unwrap();

        let err = stmt.set_generated_id_value(0, Value::Uint(8)).unwrap_err();
        assert!(matches!(err, CompileError::IllegalState { .. }));
        assert_eq!(stmt.generated_id_value(0), Some(&Value::Uint(7)));
    }

    #[test]
    fn out_of_range_row_is_rejected() {
        let mut stmt = keyed(2);
        let err = stmt.set_generated_id_value(2, Value::Uint(9)).unwrap_err();
        assert!(matches!(err, CompileError::IllegalState { .. }));
    }

    #[test]
    fn unfilled_slot_reads_none() {
        let stmt = keyed(2);
        assert_eq!(stmt.generated_id_value(0), None);
        assert_eq!(stmt.generated_id_value(5), None);
    }

    struct EventRow {
        id: u64,
    }

    impl AttributeAccess for EventRow {
        fn get(&self, column: &str) -> Option<Value> {
            (column == "id").then(|| Value::Uint(self.id))
        }

        fn set(&mut self, column: &str, value: Value) {
            if column == "id" {
                if let Value::Uint(id) = value {
                    self.id = id;
                }
            }
        }
    }

    #[test]
    fn write_back_fills_domain_keys() {
        let mut stmt = keyed(2);
        stmt.set_generated_id_value(0, Value::Uint(10)).unwrap();
        stmt.set_generated_id_value(1, Value::Uint(11)).unwrap();

        let mut rows = [EventRow { id: 0 }, EventRow { id: 0 }];
        stmt.write_back("id", &mut rows).unwrap();
        assert_eq!(rows[0].id, 10);
        assert_eq!(rows[1].id, 11);
    }

    #[test]
    fn write_back_requires_filled_slots_and_matching_rows() {
        let stmt = keyed(2);

        let mut rows = [EventRow { id: 0 }, EventRow { id: 0 }];
        let err = stmt.write_back("id", &mut rows).unwrap_err();
        assert!(matches!(err, CompileError::IllegalState { .. }));

        let mut short = [EventRow { id: 0 }];
        let err = stmt.write_back("id", &mut short).unwrap_err();
        assert!(matches!(err, CompileError::IllegalState { .. }));
    }

    #[test]
    fn rereading_a_simple_statement_is_stable() {
        let stmt = SimpleStatement::new(
            "SELECT \"id\" FROM \"region\"".to_string(),
            Vec::new(),
            Vec::new(),
            false,
        );
        let first = stmt.sql().to_string();
        let second = stmt.sql().to_string();
        assert_eq!(first, second);
    }
}
