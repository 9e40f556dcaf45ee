//! Description of the table backing a store.
//!
//! A table always has the `id` column, an auto-incrementing integer primary key which sqlite assigns on insert.  After
//! that come value columns, one per declared field, in the order they were added.  Value columns have no declared
//! type: everything is stored as text.
use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::*;

/// Name of the implicit primary key column.
pub const ID_COLUMN: &str = "id";

lazy_static! {
    static ref IDENTIFIER: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Identifier regex is valid");
}

/// Check that `name` is usable as a column name.
///
/// We quote identifiers anyway, but limiting them to plain identifiers means that whatever shows up in the debug log
/// can be pasted into the sqlite shell as-is.
pub fn check_name(name: &str) -> Result<()> {
    if !IDENTIFIER.is_match(name) {
        return Err(Error::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Quote an identifier for sqlite.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// The value columns of a table, in table order.
#[derive(Debug)]
pub struct TableDescriptor {
    name: String,
    columns: Vec<String>,
}

impl TableDescriptor {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            columns: vec![],
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Iterate over the value columns. Doesn't include `id`.
    pub fn iter_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|x| x.as_str())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Does the table have a value column named `name`?  Case insensitive, like sqlite's own column lookup.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|x| x.eq_ignore_ascii_case(name))
    }

    /// Record a column which sqlite has already accepted.
    pub(crate) fn push_column(&mut self, name: String) {
        self.columns.push(name);
    }
}
