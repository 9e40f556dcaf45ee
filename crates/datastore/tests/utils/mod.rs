use anyhow::Result;

use flowstore_datastore::{Datastore, DatastoreBuilder, FieldDefinition};

/// The store from the people scenario: a numeric age and a non-empty name.
pub fn build_people_store() -> Result<Datastore> {
    flowstore_logging::log_for_tests();

    let store = DatastoreBuilder::new("People")
        .field(FieldDefinition::numeric("age"))
        .field(FieldDefinition::nonempty_text("name"))
        .build()?;
    Ok(store)
}

pub fn row_count(store: &Datastore) -> Result<u64> {
    Ok(store.table().row_count()?)
}
