use crate::model::column::{ColumnModel, ColumnType};

///
/// RouteSpec
///
/// Sharding declaration for one logical table. Unsharded tables have
/// exactly one partition and always resolve to table index 0.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RouteSpec {
    Unsharded,
    Sharded {
        /// Route column that selects the database partition, when the
        /// deployment shards across databases.
        db_column: Option<&'static str>,
        /// Route column that selects the physical table partition.
        table_column: &'static str,
    },
}

impl RouteSpec {
    #[must_use]
    pub const fn is_sharded(&self) -> bool {
        matches!(self, Self::Sharded { .. })
    }
}

///
/// TableModel
///
/// Minimal runtime model for one logical table, in the shape the
/// metadata loader supplies it. `parent` links a child table to its
/// single-table-inheritance parent; common columns live on the parent
/// row, subtype columns on the child row.
///

#[derive(Debug)]
pub struct TableModel {
    /// Physical base name; partition suffixes are appended to this.
    pub name: &'static str,
    /// Ordered column list (authoritative for rendering).
    pub columns: &'static [ColumnModel],
    /// Primary key column (must be an entry in `columns`).
    pub primary_key: &'static str,
    /// Server-generated key column, if the database assigns it.
    pub generated_key: Option<&'static str>,
    /// Version column used for optimistic-lock detection.
    pub version_column: Option<&'static str>,
    /// Parent table under single-table-inheritance mapping.
    pub parent: Option<&'static TableModel>,
    /// Sharding declaration.
    pub route: RouteSpec,
}

impl TableModel {
    /// Look up one of this table's own columns by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnModel> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// True when `name` is physically stored on this table's row.
    #[must_use]
    pub fn owns_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Declared type of an owned column.
    #[must_use]
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column(name).map(|c| c.ty)
    }

    #[must_use]
    pub const fn has_generated_key(&self) -> bool {
        self.generated_key.is_some()
    }

    #[must_use]
    pub const fn is_child(&self) -> bool {
        self.parent.is_some()
    }

    /// True when `name` is a declared route column of this table.
    #[must_use]
    pub fn is_route_column(&self, name: &str) -> bool {
        match self.route {
            RouteSpec::Unsharded => false,
            RouteSpec::Sharded {
                db_column,
                table_column,
            } => table_column == name || db_column == Some(name),
        }
    }
}
