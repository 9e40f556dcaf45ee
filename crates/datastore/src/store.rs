//! The datastore: a record table plus the fields declared against it.
//!
//! Declaring a field adds a column.  Writes are validated against every declared field before they reach the table, so
//! a record which doesn't match never writes anything.  Reads go straight to the table.
use std::collections::HashMap;

use itertools::Itertools;
use log::*;
use serde_json::Value;

use crate::descriptor::ID_COLUMN;
use crate::errors::*;
use crate::field::{FieldDefinition, Rule};
use crate::row::Row;
use crate::row_value::{to_record, Record};
use crate::table::RecordTable;

/// How many rows [Datastore::fetch_default] reads.
pub const DEFAULT_FETCH_LIMIT: usize = 10;

pub struct Datastore {
    /// The name the store was made with.  The table gets the lowercased form.
    name: String,
    table: RecordTable,
    fields: HashMap<String, FieldDefinition>,
}

impl Datastore {
    /// Make a store backed by a fresh table named `name.to_lowercase()`.
    pub fn new(name: &str) -> Result<Self> {
        let table = RecordTable::open(name)?;
        info!("Opened datastore {}", table.get_name());
        Ok(Datastore {
            name: name.to_string(),
            table,
            fields: Default::default(),
        })
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_table_name(&self) -> &str {
        self.table.get_name()
    }

    /// The backing table, for inspection.
    pub fn table(&self) -> &RecordTable {
        &self.table
    }

    /// Declare a field, adding its column to the table.
    ///
    /// The column is added first; if sqlite refuses it (for example because the name is already taken) the field isn't
    /// recorded either, so the fields and the columns never disagree.
    pub fn add_field(&mut self, field: FieldDefinition) -> Result<()> {
        self.table.add_column(field.get_name())?;
        self.fields.insert(field.get_name().to_string(), field);
        debug!(
            "{} now has fields: {}",
            self.get_table_name(),
            self.table.get_descriptor().iter_columns().join(", ")
        );
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// Field names, in the order they were declared.
    pub fn field_names(&self) -> Vec<&str> {
        self.table.get_descriptor().iter_columns().collect()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub(crate) fn iter_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values()
    }

    /// Check one value against the field named `key_name`.
    pub fn validate_key(&self, key_name: &str, value: &Value) -> Result<()> {
        self.fields
            .get(key_name)
            .ok_or_else(|| Error::UnknownField {
                field: key_name.to_string(),
            })?
            .validate(value)
    }

    /// Check a whole record: every value must pass its field's rule, and every field must have a value.
    pub fn validate(&self, record: &Record) -> Result<()> {
        for (k, v) in record.iter() {
            self.validate_key(k, v)?;
        }

        if record.len() != self.fields.len() {
            return Err(Error::FieldCountMismatch {
                expected: self.fields.len(),
                got: record.len(),
            });
        }

        Ok(())
    }

    /// Validate and insert a record, returning the id of the new row.
    pub fn insert<T: serde::Serialize + ?Sized>(&mut self, value: &T) -> Result<i64> {
        let record = to_record(value)?;
        if let Err(e) = self.validate(&record) {
            warn!("Rejecting record for {}: {}", self.get_table_name(), e);
            return Err(e);
        }
        self.table.insert(&record)
    }

    /// The name for [Datastore::insert] when this store is the sink end of a pipeline edge.
    pub fn push<T: serde::Serialize + ?Sized>(&mut self, value: &T) -> Result<i64> {
        self.insert(value)
    }

    /// Read up to `limit` rows, oldest first.
    pub fn fetch(&self, limit: usize) -> Result<Vec<Row>> {
        self.table.fetch_first(limit)
    }

    pub fn fetch_default(&self) -> Result<Vec<Row>> {
        self.fetch(DEFAULT_FETCH_LIMIT)
    }

    /// Read the first row whose `key_name` column equals `key`.  `key_name` may be `id`.
    pub fn fetch_one<K: serde::Serialize + ?Sized>(
        &self,
        key: &K,
        key_name: &str,
    ) -> Result<Option<Row>> {
        self.table
            .fetch_by_key(key_name, &serde_json::to_value(key)?)
    }

    /// Replace the row whose `key_name` column equals `key`.
    ///
    /// The key and the replacement are validated as they would be for an insert, but updates aren't implemented by the
    /// table, so this always fails.
    pub fn replace<K, T>(&mut self, key: &K, key_name: &str, value: &T) -> Result<()>
    where
        K: serde::Serialize + ?Sized,
        T: serde::Serialize + ?Sized,
    {
        let key = serde_json::to_value(key)?;
        if key_name == ID_COLUMN {
            FieldDefinition::new(ID_COLUMN, Rule::Integer).validate(&key)?;
        } else {
            self.validate_key(key_name, &key)?;
        }

        let record = to_record(value)?;
        self.validate(&record)?;
        self.table.update(key_name, &key, &record)
    }
}

/// Build a store with a set of fields up front.
///
/// Fields are declared in the order they're added to the builder.
pub struct DatastoreBuilder {
    name: String,
    fields: Vec<FieldDefinition>,
}

impl DatastoreBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: vec![],
        }
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> Result<Datastore> {
        let mut store = Datastore::new(&self.name)?;
        for f in self.fields {
            store.add_field(f)?;
        }
        Ok(store)
    }
}
