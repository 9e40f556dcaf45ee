//! Values on their way into the table.
//!
//! Records come in as anything serde can serialize to a JSON object.  Every value is stored in its string form, so by
//! the time we bind, a row is just a list of optional strings in table column order.
use serde_json::Value;
use smallvec::SmallVec;

use crate::descriptor::TableDescriptor;
use crate::errors::*;

/// A record: field name to value.
pub type Record = serde_json::Map<String, Value>;

/// Turn anything serializable into a record.
pub fn to_record<T: serde::Serialize + ?Sized>(value: &T) -> Result<Record> {
    // serde_json is a convenient way to get at something we can look at key by key.  If this proves to be too slow,
    // we can instead implement a custom serializer.
    match serde_json::to_value(value)? {
        Value::Object(m) => Ok(m),
        _ => Err(Error::NotAnObject),
    }
}

/// The string form of a value, as stored in the table.
///
/// Strings are stored verbatim rather than as JSON string literals; arrays and objects become compact JSON.  `null`
/// has no string form and is stored as SQL NULL.
pub fn string_form(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// A row ready to bind, one entry per value column.
#[derive(Debug)]
pub(crate) struct RowValue {
    values: SmallVec<[Option<String>; 16]>,
}

impl RowValue {
    /// Lay out `record` in the column order of `descriptor`.
    ///
    /// Fails unless the record has exactly one value per column.
    pub(crate) fn new(descriptor: &TableDescriptor, record: &Record) -> Result<RowValue> {
        if record.len() != descriptor.column_count() {
            return Err(Error::ColumnCountMismatch {
                table: descriptor.get_name().to_string(),
                expected: descriptor.column_count(),
                got: record.len(),
            });
        }

        let mut values = SmallVec::new();
        for c in descriptor.iter_columns() {
            let v = record.get(c).ok_or_else(|| Error::MissingColumn {
                table: descriptor.get_name().to_string(),
                column: c.to_string(),
            })?;
            values.push(string_form(v));
        }

        Ok(RowValue { values })
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Option<String>> {
        self.values.iter()
    }
}
