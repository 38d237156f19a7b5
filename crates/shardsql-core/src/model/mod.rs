//! Static table and column metadata consumed during compilation.
//!
//! Models are plain `&'static` data supplied by the metadata loader;
//! the compiler never mutates them.

pub mod accessor;
pub mod column;
pub mod table;

pub use accessor::{AccessorEntry, AccessorTable, AttributeAccess};
pub use column::{ColumnModel, ColumnType};
pub use table::{RouteSpec, TableModel};
