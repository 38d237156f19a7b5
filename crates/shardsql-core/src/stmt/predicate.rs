use crate::{stmt::description::StatementDescription, value::Value};

///
/// Predicate AST
///
/// Pure representation of WHERE-clause conditions. This layer carries
/// no table resolution or rendering logic; all interpretation happens
/// in the context tree while a statement is compiled.
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    In,
    NotIn,
}

impl CompareOp {
    /// SQL operator token; IN/NOT IN render their own list syntax.
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Like => "LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        }
    }
}

///
/// Operand
/// Right-hand side of a comparison.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    /// A bound value, rendered as one positional placeholder.
    Value(Value),
    /// An ordered value list for IN/NOT IN expansion.
    Values(Vec<Value>),
    /// A named placeholder; legal only inside batch statements, where
    /// each batch row supplies the bound value.
    Named(String),
    /// A column of an enclosing statement (correlated subquery).
    OuterColumn {
        alias: Option<String>,
        column: String,
    },
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, PartialEq)]
pub struct ComparePredicate {
    pub alias: Option<String>,
    pub column: String,
    pub op: CompareOp,
    pub operand: Operand,
}

impl ComparePredicate {
    fn new(column: impl Into<String>, op: CompareOp, operand: Operand) -> Self {
        Self {
            alias: None,
            column: column.into(),
            op,
            operand,
        }
    }

    /// Qualify this comparison with a table alias.
    #[must_use]
    pub fn on_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

///
/// Predicate
///

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare(ComparePredicate),
    IsNull {
        alias: Option<String>,
        column: String,
    },
    InSubquery {
        alias: Option<String>,
        column: String,
        negated: bool,
        subquery: Box<StatementDescription>,
    },
    Exists {
        negated: bool,
        subquery: Box<StatementDescription>,
    },
}

impl Predicate {
    #[must_use]
    pub fn eq(column: impl Into<String>, value: Value) -> Self {
        Self::Compare(ComparePredicate::new(
            column,
            CompareOp::Eq,
            Operand::Value(value),
        ))
    }

    #[must_use]
    pub fn ne(column: impl Into<String>, value: Value) -> Self {
        Self::Compare(ComparePredicate::new(
            column,
            CompareOp::Ne,
            Operand::Value(value),
        ))
    }

    #[must_use]
    pub fn gt(column: impl Into<String>, value: Value) -> Self {
        Self::Compare(ComparePredicate::new(
            column,
            CompareOp::Gt,
            Operand::Value(value),
        ))
    }

    #[must_use]
    pub fn lt(column: impl Into<String>, value: Value) -> Self {
        Self::Compare(ComparePredicate::new(
            column,
            CompareOp::Lt,
            Operand::Value(value),
        ))
    }

    #[must_use]
    pub fn in_(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self::Compare(ComparePredicate::new(
            column,
            CompareOp::In,
            Operand::Values(values),
        ))
    }

    /// Equality against a named batch placeholder.
    #[must_use]
    pub fn eq_named(column: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Compare(ComparePredicate::new(
            column,
            CompareOp::Eq,
            Operand::Named(name.into()),
        ))
    }

    #[must_use]
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull {
            alias: None,
            column: column.into(),
        }
    }

    #[must_use]
    pub fn and(preds: Vec<Self>) -> Self {
        Self::And(preds)
    }

    #[must_use]
    pub fn or(preds: Vec<Self>) -> Self {
        Self::Or(preds)
    }

    #[must_use]
    pub fn in_subquery(column: impl Into<String>, subquery: StatementDescription) -> Self {
        Self::InSubquery {
            alias: None,
            column: column.into(),
            negated: false,
            subquery: Box::new(subquery),
        }
    }

    #[must_use]
    pub fn exists(subquery: StatementDescription) -> Self {
        Self::Exists {
            negated: false,
            subquery: Box::new(subquery),
        }
    }

    /// Qualify this predicate's column with a table alias. No-op for
    /// composite predicates and bare EXISTS.
    #[must_use]
    pub fn on_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        match &mut self {
            Self::Compare(cmp) => cmp.alias = Some(alias),
            Self::IsNull { alias: a, .. } | Self::InSubquery { alias: a, .. } => {
                *a = Some(alias);
            }
            Self::And(_) | Self::Or(_) | Self::Not(_) | Self::Exists { .. } => {}
        }
        self
    }

    /// Conjuncts of this predicate, flattening nested ANDs. A
    /// non-conjunction is its own single conjunct.
    #[must_use]
    pub fn conjuncts(&self) -> Vec<&Self> {
        match self {
            Self::And(preds) => preds.iter().flat_map(Self::conjuncts).collect(),
            other => vec![other],
        }
    }
}
