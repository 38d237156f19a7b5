use crate::value::Value;

///
/// ColumnType
///
/// Declared column type, aligned with `Value` variants.
/// Dialect type names are resolved through the `Dialect` seam.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColumnType {
    Bool,
    Int,
    Uint,
    Float,
    Text,
    Bytes,
    Timestamp,
}

impl ColumnType {
    /// Coarse type of a bound value, used where no column metadata is
    /// in scope (VALUES rows). Untyped nulls default to text.
    #[must_use]
    pub const fn of_value(value: &Value) -> Self {
        match value {
            Value::Null | Value::Text(_) => Self::Text,
            Value::Bool(_) => Self::Bool,
            Value::Int(_) => Self::Int,
            Value::Uint(_) => Self::Uint,
            Value::Float(_) => Self::Float,
            Value::Bytes(_) => Self::Bytes,
            Value::Timestamp(_) => Self::Timestamp,
        }
    }
}

///
/// ColumnModel
/// Runtime column metadata used by rendering and routing.
///

#[derive(Debug)]
pub struct ColumnModel {
    /// Column name as used in predicates and assignments.
    pub name: &'static str,
    /// Declared type, kept for parameter encoding downstream.
    pub ty: ColumnType,
}

impl ColumnModel {
    #[must_use]
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self { name, ty }
    }
}
