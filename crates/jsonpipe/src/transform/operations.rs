//! The fixed catalog of record operations.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::de::IntoDeserializer;
use serde::de::value::{Error as ValueError, StrDeserializer};

use crate::error::JsonPipeError;

/// A named transform from a dataset and arguments to a new dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Keep records whose field matches a regex.
    FilterRegex,
    /// Keep records whose field does not match a regex.
    FilterRegexNeg,
    /// Keep records whose target value is a substring of the field value.
    CrossFilter,
    /// Keep only records that have the field.
    FilterNotExists,
    /// Move a field to a new name.
    RenameField,
    /// Copy regex groups from a field into a target field.
    Extract,
    /// Fill a target field from a `{field}` template.
    Template,
    /// Drop fields by name.
    RemoveFields,
    /// Keep the first record for each field value.
    Dedupe,
    /// Run a named pipeline of operations.
    Preset,
    /// Normalize a field to lowercase underscore text.
    Plaintext,
    /// Apply a record function.
    Function,
    /// Set a field to a literal value.
    #[serde(alias = "fixedvalue")]
    FixedValue,
}

impl Operation {
    /// Every operation, in catalog order.
    pub const ALL: [Operation; 13] = [
        Operation::FilterRegex,
        Operation::FilterRegexNeg,
        Operation::CrossFilter,
        Operation::FilterNotExists,
        Operation::RenameField,
        Operation::Extract,
        Operation::Template,
        Operation::RemoveFields,
        Operation::Dedupe,
        Operation::Preset,
        Operation::Plaintext,
        Operation::Function,
        Operation::FixedValue,
    ];

    /// Catalog name of the operation.
    pub fn name(self) -> &'static str {
        match self {
            Operation::FilterRegex => "filter_regex",
            Operation::FilterRegexNeg => "filter_regex_neg",
            Operation::CrossFilter => "cross_filter",
            Operation::FilterNotExists => "filter_not_exists",
            Operation::RenameField => "rename_field",
            Operation::Extract => "extract",
            Operation::Template => "template",
            Operation::RemoveFields => "remove_fields",
            Operation::Dedupe => "dedupe",
            Operation::Preset => "preset",
            Operation::Plaintext => "plaintext",
            Operation::Function => "function",
            Operation::FixedValue => "fixed_value",
        }
    }

    /// Get a human-readable description of the operation.
    pub fn description(self) -> &'static str {
        match self {
            Operation::FilterRegex => "Keep records whose field matches the regex",
            Operation::FilterRegexNeg => "Keep records whose field does not match the regex",
            Operation::CrossFilter => "Keep records whose target value is contained in the field",
            Operation::FilterNotExists => "Keep only records that have the field",
            Operation::RenameField => "Rename the field to the target",
            Operation::Extract => "Store regex groups of the field into the target",
            Operation::Template => "Fill the target from a {field} template",
            Operation::RemoveFields => "Remove the given fields",
            Operation::Dedupe => "Keep the first record for each field value",
            Operation::Preset => "Run the named preset pipeline",
            Operation::Plaintext => "Normalize the field to plain lowercase text",
            Operation::Function => "Apply a record function",
            Operation::FixedValue => "Set the field to the target value",
        }
    }

    /// Arguments that must be set for the operation to run.
    ///
    /// `extract` accepts either `regex` or `regex_per_item` and `preset`
    /// accepts either `target` or `preset`; those alternatives are checked
    /// by the engine and not listed here.
    pub fn required_args(self) -> &'static [&'static str] {
        match self {
            Operation::FilterRegex | Operation::FilterRegexNeg => &["field", "regex"],
            Operation::CrossFilter
            | Operation::RenameField
            | Operation::Template
            | Operation::FixedValue
            | Operation::Extract => &["field", "target"],
            Operation::FilterNotExists
            | Operation::RemoveFields
            | Operation::Dedupe
            | Operation::Plaintext
            | Operation::Function => &["field"],
            Operation::Preset => &[],
        }
    }

    /// Arguments the operation reads at all.
    pub fn relevant_args(self) -> &'static [&'static str] {
        match self {
            Operation::FilterRegex | Operation::FilterRegexNeg => {
                &["field", "regex", "regex_flags"]
            }
            Operation::CrossFilter
            | Operation::RenameField
            | Operation::Template
            | Operation::FixedValue => &["field", "target"],
            Operation::FilterNotExists
            | Operation::RemoveFields
            | Operation::Dedupe
            | Operation::Plaintext => &["field"],
            Operation::Extract => &[
                "field",
                "target",
                "regex",
                "regex_flags",
                "regex_per_item",
                "separator",
            ],
            Operation::Preset => &["target", "preset", "pipeline"],
            // Record functions receive every argument.
            Operation::Function => &[
                "field",
                "regex",
                "target",
                "separator",
                "regex_flags",
                "regex_per_item",
                "preset",
                "pipeline",
            ],
        }
    }
}

impl FromStr for Operation {
    type Err = JsonPipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let deserializer: StrDeserializer<'_, ValueError> = s.into_deserializer();
        Operation::deserialize(deserializer)
            .map_err(|_| JsonPipeError::UnknownOperation(s.to_string()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
