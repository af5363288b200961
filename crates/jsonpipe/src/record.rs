//! Records and datasets.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::error::Result;

/// One JSON object flowing through a pipeline.
///
/// Backed by `serde_json::Map` with `preserve_order`, so fields keep the
/// order they were read or inserted in.
pub type Record = Map<String, Value>;

/// A lazily evaluated sequence of records.
///
/// Errors travel through the sequence as `Err` items; operations pass them
/// along untouched and the consumer stops at the first one.
pub type Dataset<'a> = Box<dyn Iterator<Item = Result<Record>> + 'a>;

/// Wrap already-parsed records into a dataset.
pub fn dataset<'a, I>(records: I) -> Dataset<'a>
where
    I: IntoIterator<Item = Record>,
    I::IntoIter: 'a,
{
    Box::new(records.into_iter().map(Ok))
}

/// Text form of a field value.
///
/// Strings yield their content; any other value yields its compact JSON
/// rendering (`42`, `true`, `null`, `{"a":1}`).
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}
