//! Query result rows.
use std::sync::Arc;

use crate::common::snake_to_camel;
use crate::pg_type::{self, Oid};
use crate::protocol::backend::FieldDescription;
use crate::value::Value;

/// One column of a result set, as described by the backend.
#[derive(Debug, Clone)]
pub struct ColumnDescription {
    /// The column name as the backend reported it.
    pub name: String,
    /// The key rows are indexed by. Equal to `name`, or its camelCase form
    /// when aliasing is enabled on the connection.
    pub alias: String,
    /// The object ID of the originating table, or zero.
    pub table_oid: i32,
    /// The attribute number within the originating table, or zero.
    pub column_id: i16,
    /// The object ID of the data type.
    pub type_oid: Oid,
    /// The data type name resolved from `type_oid`, `"unknown"` if unmapped.
    pub type_name: &'static str,
    pub type_size: i16,
    pub type_modifier: i32,
    /// 0 for text, 1 for binary. Simple queries always produce 0.
    pub format_code: i16,
}

impl ColumnDescription {
    pub(crate) fn new(field: FieldDescription, camel_case: bool) -> Self {
        let FieldDescription {
            name,
            table_oid,
            column_id,
            type_oid,
            type_size,
            type_modifier,
            format_code,
        } = field;
        let alias = match camel_case {
            true => snake_to_camel(&name),
            false => name.clone(),
        };
        Self {
            name,
            alias,
            table_oid,
            column_id,
            type_oid,
            type_name: pg_type::type_name(type_oid),
            type_size,
            type_modifier,
            format_code,
        }
    }
}

/// One decoded result row.
///
/// Rows share their column list; a row stays valid even after a later
/// statement in the same query string replaced the active columns.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[ColumnDescription]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[ColumnDescription]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Look a value up by its column alias.
    pub fn get(&self, alias: &str) -> Option<&Value> {
        let at = self.columns.iter().position(|c| c.alias == alias)?;
        self.values.get(at)
    }

    /// Look a value up by column position.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// The columns this row was decoded against.
    pub fn columns(&self) -> &[ColumnDescription] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column aliases paired with their values, in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(|c| c.alias.as_str())
            .zip(self.values.iter())
    }
}

/// The outcome of one `execute` call.
///
/// A query string may contain multiple statements; `rows` accumulates across
/// all of them while `columns` describes the last row set the backend
/// announced.
#[derive(Debug)]
pub struct QueryResult {
    /// Number of decoded rows, `rows.len()`.
    pub row_count: usize,
    pub rows: Vec<Row>,
    pub columns: Arc<[ColumnDescription]>,
    /// Command tags reported by `CommandComplete`, e.g. `SELECT 1`, in
    /// statement order.
    pub command_tags: Vec<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    fn field(name: &str, type_oid: Oid) -> FieldDescription {
        FieldDescription {
            name: name.to_owned(),
            table_oid: 0,
            column_id: 0,
            type_oid,
            type_size: -1,
            type_modifier: -1,
            format_code: 0,
        }
    }

    #[test]
    fn camel_case_alias() {
        let column = ColumnDescription::new(field("user_id", 23), true);
        assert_eq!(column.name, "user_id");
        assert_eq!(column.alias, "userId");
        assert_eq!(column.type_name, "int4");

        let column = ColumnDescription::new(field("user_id", 23), false);
        assert_eq!(column.alias, "user_id");
    }

    #[test]
    fn lookup_by_alias_and_index() {
        let columns: Arc<[ColumnDescription]> = vec![
            ColumnDescription::new(field("user_id", 23), true),
            ColumnDescription::new(field("note", 25), true),
        ]
        .into();
        let row = Row::new(columns, vec![Value::Int(7), Value::Null]);

        assert_eq!(row.get("userId"), Some(&Value::Int(7)));
        assert_eq!(row.get("user_id"), None);
        assert!(row.get("note").unwrap().is_null());
        assert_eq!(row.get_index(0), Some(&Value::Int(7)));
        assert_eq!(row.get_index(2), None);
        assert_eq!(row.len(), 2);
    }
}
