//! Record functions for the `function` operation.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{JsonPipeError, Result};
use crate::record::{Record, value_text};

use super::args::OpArgs;

/// A transform applied to one record at a time.
///
/// Implementations must be thread-safe (Send + Sync) so an engine holding
/// them can be shared. Any `Fn(Record, &OpArgs) -> Result<Record>` closure
/// is a record function.
pub trait RecordFunction: Send + Sync {
    /// Transform `record`, returning its replacement.
    fn call(&self, record: Record, args: &OpArgs) -> Result<Record>;
}

impl<F> RecordFunction for F
where
    F: Fn(Record, &OpArgs) -> Result<Record> + Send + Sync,
{
    fn call(&self, record: Record, args: &OpArgs) -> Result<Record> {
        self(record, args)
    }
}

/// Shared handle to a record function.
pub type RecordFn = Arc<dyn RecordFunction>;

fn target_of<'a>(args: &'a OpArgs) -> Result<&'a str> {
    args.target().ok_or(JsonPipeError::MissingArgument {
        operation: args.operation().to_string(),
        argument: "target",
    })
}

/// Flatten the mapping at `target` into `"key: value"` pairs joined by
/// `separator`.
///
/// Records without the target field, or whose target is not a mapping,
/// pass through unchanged.
pub fn dict_to_text(mut record: Record, args: &OpArgs) -> Result<Record> {
    let target = target_of(args)?;
    let text = match record.get(target) {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value_text(value)))
            .collect::<Vec<_>>()
            .join(args.separator()),
        _ => return Ok(record),
    };
    record.insert(target.to_string(), Value::String(text));
    Ok(record)
}

/// Trim surrounding whitespace from the text at `target`.
pub fn strip(mut record: Record, args: &OpArgs) -> Result<Record> {
    let target = target_of(args)?;
    if let Some(Value::String(text)) = record.get_mut(target) {
        let trimmed = text.trim();
        if trimmed.len() != text.len() {
            *text = trimmed.to_string();
        }
    }
    Ok(record)
}
