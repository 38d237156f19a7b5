//! Shared static table fixtures for unit tests.

use crate::model::{ColumnModel, ColumnType, RouteSpec, TableModel};

/// Unsharded lookup table.
pub static REGION: TableModel = TableModel {
    name: "region",
    columns: &[
        ColumnModel::new("id", ColumnType::Uint),
        ColumnModel::new("name", ColumnType::Text),
    ],
    primary_key: "id",
    generated_key: None,
    version_column: None,
    parent: None,
    route: RouteSpec::Unsharded,
};

/// Sharded table with an optimistic-lock version column.
pub static ORDER: TableModel = TableModel {
    name: "order",
    columns: &[
        ColumnModel::new("id", ColumnType::Uint),
        ColumnModel::new("status", ColumnType::Int),
        ColumnModel::new("version", ColumnType::Uint),
    ],
    primary_key: "id",
    generated_key: None,
    version_column: Some("version"),
    parent: None,
    route: RouteSpec::Sharded {
        db_column: None,
        table_column: "id",
    },
};

/// Sharded across databases and tables.
pub static SHIPMENT: TableModel = TableModel {
    name: "shipment",
    columns: &[
        ColumnModel::new("id", ColumnType::Uint),
        ColumnModel::new("region_id", ColumnType::Uint),
        ColumnModel::new("status", ColumnType::Int),
    ],
    primary_key: "id",
    generated_key: None,
    version_column: None,
    parent: None,
    route: RouteSpec::Sharded {
        db_column: Some("region_id"),
        table_column: "id",
    },
};

/// Server-generated primary key.
pub static EVENT: TableModel = TableModel {
    name: "event",
    columns: &[
        ColumnModel::new("id", ColumnType::Uint),
        ColumnModel::new("payload", ColumnType::Text),
    ],
    primary_key: "id",
    generated_key: Some("id"),
    version_column: None,
    parent: None,
    route: RouteSpec::Unsharded,
};

/// Single-table-inheritance parent: common columns.
pub static CUSTOMER: TableModel = TableModel {
    name: "customer",
    columns: &[
        ColumnModel::new("id", ColumnType::Uint),
        ColumnModel::new("name", ColumnType::Text),
        ColumnModel::new("version", ColumnType::Uint),
    ],
    primary_key: "id",
    generated_key: Some("id"),
    version_column: Some("version"),
    parent: None,
    route: RouteSpec::Unsharded,
};

/// Sharded single-table-inheritance parent.
pub static ACCOUNT: TableModel = TableModel {
    name: "account",
    columns: &[
        ColumnModel::new("id", ColumnType::Uint),
        ColumnModel::new("name", ColumnType::Text),
    ],
    primary_key: "id",
    generated_key: None,
    version_column: None,
    parent: None,
    route: RouteSpec::Sharded {
        db_column: None,
        table_column: "id",
    },
};

/// Sharded child of [`ACCOUNT`], co-partitioned on the shared key.
pub static ACCOUNT_DETAIL: TableModel = TableModel {
    name: "account_detail",
    columns: &[
        ColumnModel::new("id", ColumnType::Uint),
        ColumnModel::new("notes", ColumnType::Text),
    ],
    primary_key: "id",
    generated_key: None,
    version_column: None,
    parent: Some(&ACCOUNT),
    route: RouteSpec::Sharded {
        db_column: None,
        table_column: "id",
    },
};

/// Single-table-inheritance child: subtype columns only, keyed by the
/// parent's identifier.
pub static CUSTOMER_DETAIL: TableModel = TableModel {
    name: "customer_detail",
    columns: &[
        ColumnModel::new("id", ColumnType::Uint),
        ColumnModel::new("loyalty_tier", ColumnType::Int),
        ColumnModel::new("notes", ColumnType::Text),
    ],
    primary_key: "id",
    generated_key: None,
    version_column: None,
    parent: Some(&CUSTOMER),
    route: RouteSpec::Unsharded,
};
