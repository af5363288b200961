//! Property-based tests for the transform engine.
//!
//! These tests use proptest to generate random record streams and check
//! that operations keep their invariants.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p jsonpipe --test property_tests
//!
//! # More cases
//! PROPTEST_CASES=10000 cargo test -p jsonpipe --test property_tests
//! ```

use std::collections::HashSet;

use proptest::prelude::*;
use serde_json::{Value, json};

use jsonpipe::transform::{plain, render_template};
use jsonpipe::{OpArgs, Operation, Record, RecordReader, TransformEngine};

// =============================================================================
// Test Strategies
// =============================================================================

/// Small field values so collisions (for dedupe) are common.
fn field_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-c]{0,2}".prop_map(Value::String),
        (0i64..3).prop_map(|n| json!(n)),
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
    ]
}

/// A record over the fields `a`, `b` and `c`, each possibly absent.
fn record() -> impl Strategy<Value = Record> {
    (
        prop::option::of(field_value()),
        prop::option::of(field_value()),
        prop::option::of(field_value()),
        0u32..1000,
    )
        .prop_map(|(a, b, c, seq)| {
            let mut record = Record::new();
            record.insert("seq".to_string(), json!(seq));
            for (name, value) in [("a", a), ("b", b), ("c", c)] {
                if let Some(value) = value {
                    record.insert(name.to_string(), value);
                }
            }
            record
        })
}

fn records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(record(), 0..40)
}

fn seqs(records: &[Record]) -> Vec<Value> {
    records.iter().map(|r| r["seq"].clone()).collect()
}

// =============================================================================
// Length and Order
// =============================================================================

proptest! {
    #[test]
    fn non_filtering_operations_keep_length_and_order(records in records()) {
        let engine = TransformEngine::new();
        let steps = [
            OpArgs::builder(Operation::RenameField).field("a").target("z").build(),
            OpArgs::builder(Operation::RemoveFields).field("b,c").build(),
            OpArgs::builder(Operation::FixedValue).field("k").target("v").build(),
            OpArgs::builder(Operation::Extract).field("a").regex("[a-c]+").target("x").build(),
        ];

        for args in &steps {
            let out = engine.transform(records.clone(), args).unwrap();
            prop_assert_eq!(seqs(&out), seqs(&records));
        }
    }

    #[test]
    fn filters_keep_relative_order(records in records()) {
        let args = OpArgs::builder(Operation::FilterRegex).field("a").regex("a").build();
        let out = TransformEngine::new().transform(records.clone(), &args).unwrap();

        let mut expected = seqs(&records).into_iter();
        for seq in seqs(&out) {
            prop_assert!(expected.any(|s| s == seq));
        }
    }
}

// =============================================================================
// Filters
// =============================================================================

proptest! {
    #[test]
    fn regex_filters_partition_records_with_field(records in records(), pattern in "[a-c0-2]") {
        let engine = TransformEngine::new();
        let keep = OpArgs::builder(Operation::FilterRegex).field("a").regex(pattern.clone()).build();
        let drop = OpArgs::builder(Operation::FilterRegexNeg).field("a").regex(pattern).build();

        let with_field: Vec<Record> = records
            .into_iter()
            .filter(|r| r.contains_key("a"))
            .enumerate()
            .map(|(i, mut r)| {
                r.insert("seq".to_string(), json!(i));
                r
            })
            .collect();
        let kept = seqs(&engine.transform(with_field.clone(), &keep).unwrap());
        let dropped = seqs(&engine.transform(with_field.clone(), &drop).unwrap());

        prop_assert_eq!(kept.len() + dropped.len(), with_field.len());
        prop_assert!(kept.iter().all(|seq| !dropped.contains(seq)));
    }

    #[test]
    fn regex_filters_pass_records_without_field(records in records()) {
        let engine = TransformEngine::new();
        let without: Vec<Record> = records.into_iter().filter(|r| !r.contains_key("a")).collect();

        for op in [Operation::FilterRegex, Operation::FilterRegexNeg] {
            let args = OpArgs::builder(op).field("a").regex("a").build();
            prop_assert_eq!(engine.transform(without.clone(), &args).unwrap(), without.clone());
        }
    }

    #[test]
    fn filter_not_exists_keeps_exactly_records_with_field(records in records()) {
        let args = OpArgs::builder(Operation::FilterNotExists).field("b").build();
        let out = TransformEngine::new().transform(records.clone(), &args).unwrap();

        let expected: Vec<Record> = records.into_iter().filter(|r| r.contains_key("b")).collect();
        prop_assert_eq!(out, expected);
    }
}

// =============================================================================
// Dedupe and Remove Fields
// =============================================================================

proptest! {
    #[test]
    fn dedupe_yields_unique_first_occurrences(records in records()) {
        let args = OpArgs::builder(Operation::Dedupe).field("a").build();
        let out = TransformEngine::new().transform(records.clone(), &args).unwrap();

        let mut seen = HashSet::new();
        let expected: Vec<Record> = records
            .iter()
            .filter(|r| r.get("a").is_none_or(|v| seen.insert(v.to_string())))
            .cloned()
            .collect();
        prop_assert_eq!(&out, &expected);

        let values: Vec<String> = out.iter().filter_map(|r| r.get("a")).map(Value::to_string).collect();
        let unique: HashSet<&String> = values.iter().collect();
        prop_assert_eq!(values.len(), unique.len());
        prop_assert_eq!(
            out.iter().filter(|r| !r.contains_key("a")).count(),
            records.iter().filter(|r| !r.contains_key("a")).count()
        );
    }

    #[test]
    fn remove_fields_text_and_list_agree(records in records()) {
        let engine = TransformEngine::new();
        let text = OpArgs::builder(Operation::RemoveFields).field("a,b").build();
        let list = OpArgs::builder(Operation::RemoveFields).fields(["a", "b"]).build();

        let by_text = engine.transform(records.clone(), &text).unwrap();
        let by_list = engine.transform(records, &list).unwrap();
        prop_assert!(by_text.iter().all(|r| !r.contains_key("a") && !r.contains_key("b")));
        prop_assert_eq!(by_text, by_list);
    }
}

// =============================================================================
// Text Helpers
// =============================================================================

proptest! {
    #[test]
    fn plain_output_is_normalized(text in "[ -~\\t]{0,40}") {
        let out = plain(&text);
        prop_assert!(!out.chars().any(|c| c.is_whitespace() || c == '-'));
        prop_assert_eq!(plain(&out), out.clone());
    }

    #[test]
    fn template_without_placeholders_is_identity(text in "[^{}]{0,40}") {
        prop_assert_eq!(render_template(&text, &Record::new()).unwrap(), text);
    }

    #[test]
    fn reader_never_panics(input in "\\PC{0,200}") {
        for item in RecordReader::new(input.as_bytes()) {
            let _ = item;
        }
    }
}
