//! Dialect seam: lexical rules the context tree consults while
//! rendering.
//!
//! Implementations must be stateless after construction (or internally
//! synchronized); one dialect handle is shared read-only across
//! concurrent compilations.

use crate::{model::ColumnType, stmt::StatementKind};

///
/// Dialect
///

pub trait Dialect: Send + Sync {
    /// Quote an identifier for this dialect.
    fn quote_ident(&self, ident: &str) -> String;

    /// Escape a text literal body (quotes doubled, no surrounding
    /// quotes added).
    fn escape_text(&self, text: &str) -> String;

    /// Dialect type name for a declared column type.
    fn type_name(&self, ty: ColumnType) -> &'static str;

    /// Placeholder token for the 1-based parameter position.
    fn placeholder(&self, index: usize) -> String;

    /// Whether this dialect supports a RETURNING-style clause for
    /// `kind`.
    fn supports_returning(&self, kind: StatementKind) -> bool;
}

///
/// AnsiDialect
///

#[derive(Clone, Copy, Debug, Default)]
pub struct AnsiDialect;

impl Dialect for AnsiDialect {
    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn escape_text(&self, text: &str) -> String {
        text.replace('\'', "''")
    }

    fn type_name(&self, ty: ColumnType) -> &'static str {
        match ty {
            ColumnType::Bool => "BOOLEAN",
            ColumnType::Int | ColumnType::Uint => "BIGINT",
            ColumnType::Float => "DOUBLE PRECISION",
            ColumnType::Text => "TEXT",
            ColumnType::Bytes => "BLOB",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn supports_returning(&self, kind: StatementKind) -> bool {
        matches!(
            kind,
            StatementKind::Insert | StatementKind::Update | StatementKind::Delete
        )
    }
}

///
/// MySqlDialect
///

#[derive(Clone, Copy, Debug, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn quote_ident(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn escape_text(&self, text: &str) -> String {
        text.replace('\\', "\\\\").replace('\'', "''")
    }

    fn type_name(&self, ty: ColumnType) -> &'static str {
        match ty {
            ColumnType::Bool => "TINYINT(1)",
            ColumnType::Int => "BIGINT",
            ColumnType::Uint => "BIGINT UNSIGNED",
            ColumnType::Float => "DOUBLE",
            ColumnType::Text => "TEXT",
            ColumnType::Bytes => "BLOB",
            ColumnType::Timestamp => "DATETIME",
        }
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn supports_returning(&self, _kind: StatementKind) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi_quotes_double_embedded_quotes() {
        let dialect = AnsiDialect;
        assert_eq!(dialect.quote_ident("order"), "\"order\"");
        assert_eq!(dialect.quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn ansi_escapes_single_quotes() {
        let dialect = AnsiDialect;
        assert_eq!(dialect.escape_text("it's"), "it''s");
    }

    #[test]
    fn mysql_quotes_with_backticks() {
        let dialect = MySqlDialect;
        assert_eq!(dialect.quote_ident("order"), "`order`");
        assert_eq!(dialect.quote_ident("we`ird"), "`we``ird`");
    }

    #[test]
    fn returning_support_differs_per_dialect() {
        assert!(AnsiDialect.supports_returning(StatementKind::Insert));
        assert!(!AnsiDialect.supports_returning(StatementKind::Select));
        assert!(!MySqlDialect.supports_returning(StatementKind::Insert));
    }

    #[test]
    fn type_names_cover_every_column_type() {
        for ty in [
            ColumnType::Bool,
            ColumnType::Int,
            ColumnType::Uint,
            ColumnType::Float,
            ColumnType::Text,
            ColumnType::Bytes,
            ColumnType::Timestamp,
        ] {
            assert!(!AnsiDialect.type_name(ty).is_empty());
            assert!(!MySqlDialect.type_name(ty).is_empty());
        }
    }
}
