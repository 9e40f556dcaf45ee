//! Letting a store take part in a dataflow pipeline.
//!
//! The pipeline framework itself lives elsewhere.  What it needs from us is a name, whether we are a datasource, and a
//! handle to read from; [Node] is that contract.  The two free functions are the adapters a pipeline uses to read a
//! store in bulk and to look at its schema.
use std::collections::HashMap;

use crate::errors::*;
use crate::field::FieldDefinition;
use crate::row::Row;
use crate::store::Datastore;

/// Prefix of the node name of every datastore.
pub const NODE_NAME_PREFIX: &str = "DS-";

/// How many rows [bulk_fetch] reads.
pub const BULK_FETCH_LIMIT: usize = 1000;

/// A node in a pipeline graph.
pub trait Node {
    /// Name of this node in the graph.
    fn name(&self) -> String;

    /// Can this node be read from and pushed to?
    fn is_datasource(&self) -> bool {
        false
    }

    /// The endpoint other nodes read from.
    fn get(&self) -> &Self
    where
        Self: Sized;
}

impl Node for Datastore {
    fn name(&self) -> String {
        format!("{}{}", NODE_NAME_PREFIX, self.get_name())
    }

    fn is_datasource(&self) -> bool {
        true
    }

    fn get(&self) -> &Self {
        self
    }
}

/// Read up to [BULK_FETCH_LIMIT] rows from a store.
pub fn bulk_fetch(store: &Datastore) -> Result<Vec<Row>> {
    store.fetch(BULK_FETCH_LIMIT)
}

/// The fields of a store, by name.
pub fn schema(store: &Datastore) -> HashMap<String, FieldDefinition> {
    store
        .iter_fields()
        .map(|f| (f.get_name().to_string(), f.clone()))
        .collect()
}
