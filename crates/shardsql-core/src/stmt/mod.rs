//! Read-only statement descriptions: the compiler's input tree.
//!
//! The fluent front end that applications use to build these lives
//! outside this crate; everything here is plain data plus constructor
//! helpers, never mutated during compilation.

pub mod description;
pub mod predicate;

pub use description::{
    AssignSource, Assignment, BatchRow, Selection, StatementDescription, StatementKind, TableRef,
};
pub use predicate::{CompareOp, ComparePredicate, Operand, Predicate};
