use crate::{model::ColumnType, value::Value};
use thiserror::Error as ThisError;

///
/// ParamError
/// Invariant violations for parameter construction.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ParamError {
    /// A multi-valued parameter must carry at least one value; an empty
    /// IN-list is a caller error caught here, never rendered as `IN ()`.
    #[error("multi parameter of type {ty:?} constructed with an empty value list")]
    EmptyValueList { ty: ColumnType },
}

///
/// Param
///
/// One bound value, or an ordered value list sharing one declared type
/// (IN-list expansion, batch columns). Pure data: all rendering and
/// escaping belong to the dialect layer.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Single {
        ty: ColumnType,
        /// `None` is an absent value; `Some(Value::Null)` is a present
        /// null. Both encode as SQL NULL but are tracked separately for
        /// diagnostics.
        value: Option<Value>,
    },
    Multi {
        ty: ColumnType,
        values: Vec<Value>,
    },
}

impl Param {
    #[must_use]
    pub const fn single(ty: ColumnType, value: Option<Value>) -> Self {
        Self::Single { ty, value }
    }

    /// Construct a multi-valued parameter. The list length is fixed at
    /// construction and must not be empty.
    pub fn multi(ty: ColumnType, values: Vec<Value>) -> Result<Self, ParamError> {
        if values.is_empty() {
            return Err(ParamError::EmptyValueList { ty });
        }

        Ok(Self::Multi { ty, values })
    }

    #[must_use]
    pub const fn ty(&self) -> ColumnType {
        match self {
            Self::Single { ty, .. } | Self::Multi { ty, .. } => *ty,
        }
    }

    /// Number of placeholder slots this parameter occupies.
    #[must_use]
    pub const fn width(&self) -> usize {
        match self {
            Self::Single { .. } => 1,
            Self::Multi { values, .. } => values.len(),
        }
    }

    /// True for an absent single value (never set by the caller), as
    /// opposed to a present null.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Single { value: None, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_list_is_rejected() {
        let err = Param::multi(ColumnType::Uint, vec![]).unwrap_err();
        assert_eq!(err, ParamError::EmptyValueList { ty: ColumnType::Uint });
    }

    #[test]
    fn multi_width_matches_value_count() {
        let param = Param::multi(
            ColumnType::Int,
            vec![Value::Int(1), Value::Int(2), Value::Int(3)],
        )
        .unwrap();

        assert_eq!(param.width(), 3);
    }

    #[test]
    fn absent_is_distinct_from_present_null() {
        let absent = Param::single(ColumnType::Text, None);
        let null = Param::single(ColumnType::Text, Some(Value::Null));

        assert!(absent.is_absent());
        assert!(!null.is_absent());
        assert_ne!(absent, null);
    }
}
