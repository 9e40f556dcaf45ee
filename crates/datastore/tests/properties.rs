//! Property tests for schema growth and validation.
use std::collections::BTreeSet;

use itertools::Itertools;
use proptest::prelude::*;
use serde_json::{json, Value};

use flowstore_datastore::*;

/// Operations for the rule-based test: declare fields, then throw good and bad records at the store.
#[derive(Clone, Debug, proptest_derive::Arbitrary)]
enum TestOps {
    /// Declare a numeric field `f{index}`.  Indices collide on purpose, to exercise duplicate declarations.
    AddField {
        #[proptest(strategy = "0..8u8")]
        index: u8,
    },

    /// Insert a record with a valid value for every declared field.
    InsertValid { value: i32 },

    /// Insert a valid record with one field left out.
    InsertMissing {
        #[proptest(strategy = "0..8usize")]
        drop: usize,
    },

    /// Insert a valid record plus one undeclared field.
    InsertExtra,

    /// Insert a record where one field fails the numeric rule.
    InsertBadValue {
        #[proptest(strategy = "0..8usize")]
        which: usize,
    },
}

fn valid_record(fields: &[String], value: i32) -> Record {
    fields
        .iter()
        .map(|f| (f.clone(), json!(value)))
        .collect()
}

fn column_names(store: &Datastore) -> Vec<String> {
    store.table().column_names().unwrap()
}

fn row_count(store: &Datastore) -> u64 {
    store.table().row_count().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]
    #[test]
    fn fuzz_store(ops: Vec<TestOps>) {
        let mut store = Datastore::new("fuzz").unwrap();
        // Mirrors the declared fields in declaration order.
        let mut declared: Vec<String> = vec![];
        let mut rows: u64 = 0;

        for o in ops {
            match o {
                TestOps::AddField { index } => {
                    let name = format!("f{}", index);
                    let res = store.add_field(FieldDefinition::numeric(name.clone()));
                    if declared.contains(&name) {
                        prop_assert!(res.unwrap_err().is_persistence());
                    } else {
                        prop_assert!(res.is_ok());
                        declared.push(name);
                    }
                }
                TestOps::InsertValid { value } => {
                    store.insert(&valid_record(&declared, value)).unwrap();
                    rows += 1;
                }
                TestOps::InsertMissing { drop } => {
                    if declared.is_empty() {
                        continue;
                    }
                    let mut rec = valid_record(&declared, 1);
                    rec.remove(&declared[drop % declared.len()]);
                    let e = store.insert(&rec).unwrap_err();
                    let is_count_mismatch = matches!(e, Error::FieldCountMismatch { .. });
                    prop_assert!(is_count_mismatch);
                }
                TestOps::InsertExtra => {
                    let mut rec = valid_record(&declared, 1);
                    rec.insert("undeclared".into(), json!(1));
                    let e = store.insert(&rec).unwrap_err();
                    prop_assert!(e.is_schema_mismatch());
                }
                TestOps::InsertBadValue { which } => {
                    if declared.is_empty() {
                        continue;
                    }
                    let mut rec = valid_record(&declared, 1);
                    rec.insert(declared[which % declared.len()].clone(), json!("not a number"));
                    let e = store.insert(&rec).unwrap_err();
                    let is_rejected = matches!(e, Error::RuleRejected { .. });
                    prop_assert!(is_rejected);
                }
            }

            // Columns track declarations exactly, in order, after every step.
            let mut expected = vec![ID_COLUMN.to_string()];
            expected.extend(declared.iter().cloned());
            prop_assert_eq!(column_names(&store), expected);
            prop_assert_eq!(store.field_count(), declared.len());
            prop_assert_eq!(row_count(&store), rows);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]
    #[test]
    fn schema_growth(names in proptest::collection::vec("[a-z][a-z0-9_]{0,8}", 0..20usize)) {
        // Declaration order is whatever order the names were drawn in, minus repeats.
        let names: Vec<String> = names.into_iter().unique().filter(|n| n != ID_COLUMN).collect();
        let mut store = Datastore::new("growth").unwrap();
        for n in names.iter() {
            store.add_field(FieldDefinition::any(n.clone())).unwrap();
        }

        let columns = column_names(&store);
        prop_assert_eq!(columns.len(), names.len() + 1);
        prop_assert_eq!(&columns[1..], &names[..]);
        prop_assert_eq!(store.field_names(), names.iter().map(|x| x.as_str()).collect::<Vec<_>>());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]
    #[test]
    fn round_trip(age in any::<i64>(), name in "[a-zA-Z0-9 ]{1,32}", tags in proptest::collection::vec(any::<bool>(), 0..4)) {
        let mut store = DatastoreBuilder::new("RoundTrip")
            .field(FieldDefinition::integer("age"))
            .field(FieldDefinition::nonempty_text("name"))
            .field(FieldDefinition::any("tags"))
            .build()
            .unwrap();

        let value = json!({"age": age, "name": name, "tags": tags});
        let id = store.insert(&value).unwrap();
        let row = store.fetch_one(&id, ID_COLUMN).unwrap().unwrap();

        prop_assert_eq!(row.get_id(), id);
        for (column, stored) in row.iter() {
            prop_assert_eq!(stored.map(|x| x.to_string()), string_form(&value[column]));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]
    #[test]
    fn fetch_limit(inserted in 0..60usize, limit in 0..40usize) {
        let mut store = DatastoreBuilder::new("limits")
            .field(FieldDefinition::integer("n"))
            .build()
            .unwrap();
        for n in 0..inserted {
            store.insert(&json!({ "n": n })).unwrap();
        }

        let rows = store.fetch(limit).unwrap();
        prop_assert_eq!(rows.len(), limit.min(inserted));

        // Oldest first, and no duplicates.
        let seen = rows.iter().map(|r| r.get_id()).collect::<BTreeSet<_>>();
        prop_assert_eq!(seen.len(), rows.len());
        for (i, r) in rows.iter().enumerate() {
            prop_assert_eq!(r.get("n").map(|x| x.to_string()), Some(i.to_string()));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]
    #[test]
    fn rule_enforcement(bad in prop_oneof![
        any::<String>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ]) {
        let mut store = DatastoreBuilder::new("rules")
            .field(FieldDefinition::numeric("age"))
            .field(FieldDefinition::text("name"))
            .build()
            .unwrap();

        let e = store.insert(&json!({"age": bad, "name": "Ann"})).unwrap_err();
        prop_assert!(e.is_schema_mismatch());
        prop_assert_eq!(row_count(&store), 0);
    }
}
