//! The datastore crate.
//!
//! A datastore is a named table whose columns are declared one field at a time, backed by an in-memory sqlite
//! database.  There are 3 primary entities:
//!
//! - The record table, which owns the sqlite connection and one table in it.  It adds columns and reads and writes rows,
//!   but knows nothing about what values are allowed.
//! - Field definitions, which name a column and carry the rule its values must satisfy.
//! - The datastore, which owns a record table and its fields, and refuses any record which doesn't have exactly one
//!   valid value per field.
//!
//! Every value is stored as text.  Records go in as anything serde can turn into a JSON object, and come back out as
//! [Row]s of strings.
//!
//! A datastore is also a [Node]: a pipeline can push records into it and read them back out via [bulk_fetch].
mod descriptor;
mod errors;
mod field;
mod node;
mod row;
mod row_value;
mod store;
mod table;

pub use descriptor::{check_name, TableDescriptor, ID_COLUMN};
pub use errors::*;
pub use field::*;
pub use node::*;
pub use row::*;
pub use row_value::{string_form, to_record, Record};
pub use store::*;
pub use table::*;
