//! Rows, as read back out of a table.
//!
//! A row is the id sqlite assigned on insert followed by the value columns, in table order.  Values come back in their
//! stored string form; a NULL is `None`.
use serde::ser::SerializeMap;
use smallvec::SmallVec;

use crate::descriptor::{TableDescriptor, ID_COLUMN};

/// We anticipate reading rows in bulk, so instead of a hashmap per row we use a `SmallVec` map.  These are the entries
/// in that map.
#[derive(Clone, Debug, PartialEq, Eq)]
struct RowEntry {
    column: String,
    value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    id: i64,
    entries: SmallVec<[RowEntry; 16]>,
}

impl Row {
    /// Read a row produced by a select of `id` followed by every column of `descriptor`.
    pub(crate) fn from_rusqlite_row(
        descriptor: &TableDescriptor,
        row: &rusqlite::Row,
    ) -> rusqlite::Result<Row> {
        let id = row.get(0)?;
        let mut entries = SmallVec::new();

        for (i, c) in descriptor.iter_columns().enumerate() {
            entries.push(RowEntry {
                column: c.to_string(),
                value: row.get(i + 1)?,
            });
        }

        Ok(Row { id, entries })
    }

    pub fn get_id(&self) -> i64 {
        self.id
    }

    /// Get the value of a column.
    ///
    /// Returns `None` both for NULL and for columns this row doesn't have; use [Row::has_column] to tell them apart.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|x| x.column == column)
            .and_then(|x| x.value.as_deref())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.entries.iter().any(|x| x.column == column)
    }

    /// Iterate over `(column, value)` in table order, not including the id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|x| (x.column.as_str(), x.value.as_deref()))
    }

    /// Number of value columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rows serialize as a flat map including `id`, which is what pipeline consumers downstream of a fetch want.
impl serde::Serialize for Row {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() + 1))?;
        map.serialize_entry(ID_COLUMN, &self.id)?;
        for e in self.entries.iter() {
            map.serialize_entry(&e.column, &e.value)?;
        }
        map.end()
    }
}
