//! Operation arguments and their defaults.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{JsonPipeError, Result};

use super::function::{RecordFn, RecordFunction};
use super::operations::Operation;

/// Every argument an operation can be parameterized with.
pub const ARGUMENT_NAMES: [&str; 9] = [
    "operation",
    "field",
    "regex",
    "target",
    "separator",
    "regex_flags",
    "regex_per_item",
    "preset",
    "pipeline",
];

/// The `field` argument.
///
/// Most operations read a single field name (or, for `template`, a
/// pattern). `remove_fields` also takes an explicit list, and `function`
/// takes either a dotted reference or the function itself.
#[derive(Clone)]
pub enum FieldArg {
    /// A field name, comma-joined names, a template, or a reference.
    Text(String),
    /// An explicit list of field names.
    List(Vec<String>),
    /// A directly supplied record function.
    Function(RecordFn),
}

impl FieldArg {
    /// The text form, if this is not a list or a function.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldArg::Text(text) => Some(text),
            FieldArg::List(_) | FieldArg::Function(_) => None,
        }
    }

    /// Field names, splitting comma-joined text.
    pub fn names(&self) -> Vec<String> {
        match self {
            FieldArg::Text(text) => text.split(',').map(str::to_string).collect(),
            FieldArg::List(names) => names.clone(),
            FieldArg::Function(_) => Vec::new(),
        }
    }
}

impl fmt::Debug for FieldArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldArg::Text(text) => f.debug_tuple("Text").field(text).finish(),
            FieldArg::List(names) => f.debug_tuple("List").field(names).finish(),
            FieldArg::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl From<&str> for FieldArg {
    fn from(text: &str) -> Self {
        FieldArg::Text(text.to_string())
    }
}

impl From<String> for FieldArg {
    fn from(text: String) -> Self {
        FieldArg::Text(text)
    }
}

impl From<Vec<String>> for FieldArg {
    fn from(names: Vec<String>) -> Self {
        FieldArg::List(names)
    }
}

impl From<Vec<&str>> for FieldArg {
    fn from(names: Vec<&str>) -> Self {
        FieldArg::List(names.into_iter().map(str::to_string).collect())
    }
}

/// Fully populated, immutable arguments for one operation invocation.
///
/// Built with [`OpArgs::builder`] or [`OpArgs::from_map`]; unset arguments
/// take their defaults (empty `regex_flags`, empty `separator`, `None`
/// otherwise).
#[derive(Debug, Clone)]
pub struct OpArgs {
    operation: Operation,
    field: Option<FieldArg>,
    regex: Option<String>,
    target: Option<String>,
    separator: String,
    regex_flags: Vec<String>,
    regex_per_item: Option<String>,
    preset: Option<String>,
    pipeline: Option<String>,
}

impl OpArgs {
    /// Arguments for `operation` with every other argument defaulted.
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            field: None,
            regex: None,
            target: None,
            separator: String::new(),
            regex_flags: Vec::new(),
            regex_per_item: None,
            preset: None,
            pipeline: None,
        }
    }

    /// Start building arguments for `operation`.
    pub fn builder(operation: Operation) -> OpArgsBuilder {
        OpArgsBuilder {
            args: Self::new(operation),
        }
    }

    /// Build arguments from a loosely typed JSON mapping.
    ///
    /// `operation` is required. Recognized keys must have the right shape
    /// (`null` counts as unset); unrecognized keys are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use jsonpipe::{OpArgs, Operation};
    /// use serde_json::json;
    ///
    /// let map = json!({"operation": "dedupe", "field": "id", "note": "ignored"});
    /// let args = OpArgs::from_map(map.as_object().unwrap()).unwrap();
    /// assert_eq!(args.operation(), Operation::Dedupe);
    /// assert_eq!(args.separator(), "");
    /// ```
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        let operation = match map.get("operation") {
            Some(Value::String(name)) => name.parse::<Operation>()?,
            Some(Value::Null) | None => {
                return Err(JsonPipeError::Config(
                    "Operation arguments need an 'operation' name".to_string(),
                ));
            }
            Some(other) => {
                return Err(JsonPipeError::Config(format!(
                    "'operation' must be a string, got {}",
                    other
                )));
            }
        };

        for key in map.keys().filter(|key| !ARGUMENT_NAMES.contains(&key.as_str())) {
            debug!(operation = %operation, key = %key, "ignoring unrecognized argument");
        }

        let mut args = Self::new(operation);
        args.field = field_arg(map.get("field"))?;
        args.regex = optional_text(map, "regex")?;
        args.target = optional_text(map, "target")?;
        args.separator = optional_text(map, "separator")?.unwrap_or_default();
        args.regex_flags = text_list(map, "regex_flags")?;
        args.regex_per_item = optional_text(map, "regex_per_item")?;
        args.preset = optional_text(map, "preset")?;
        args.pipeline = optional_text(map, "pipeline")?;
        Ok(args)
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn field(&self) -> Option<&FieldArg> {
        self.field.as_ref()
    }

    /// The `field` argument as a single name or pattern.
    pub fn field_text(&self) -> Option<&str> {
        self.field.as_ref().and_then(FieldArg::as_text)
    }

    pub fn regex(&self) -> Option<&str> {
        self.regex.as_deref()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn regex_flags(&self) -> &[String] {
        &self.regex_flags
    }

    pub fn regex_per_item(&self) -> Option<&str> {
        self.regex_per_item.as_deref()
    }

    pub fn preset(&self) -> Option<&str> {
        self.preset.as_deref()
    }

    pub fn pipeline(&self) -> Option<&str> {
        self.pipeline.as_deref()
    }

    /// Whether the named argument differs from its default.
    pub fn is_set(&self, name: &str) -> bool {
        match name {
            "operation" => true,
            "field" => self.field.is_some(),
            "regex" => self.regex.is_some(),
            "target" => self.target.is_some(),
            "separator" => !self.separator.is_empty(),
            "regex_flags" => !self.regex_flags.is_empty(),
            "regex_per_item" => self.regex_per_item.is_some(),
            "preset" => self.preset.is_some(),
            "pipeline" => self.pipeline.is_some(),
            _ => false,
        }
    }

    /// Set arguments the operation never reads.
    pub fn irrelevant_args(&self) -> Vec<&'static str> {
        let relevant = self.operation.relevant_args();
        ARGUMENT_NAMES
            .into_iter()
            .filter(|name| *name != "operation")
            .filter(|name| !relevant.contains(name) && self.is_set(name))
            .collect()
    }

    /// Fail with `MissingArgument` for the first required argument not set.
    pub fn check_required(&self) -> Result<()> {
        match self
            .operation
            .required_args()
            .iter()
            .find(|name| !self.is_set(name))
        {
            Some(&argument) => Err(self.missing(argument)),
            None => Ok(()),
        }
    }

    pub(crate) fn missing(&self, argument: &'static str) -> JsonPipeError {
        JsonPipeError::MissingArgument {
            operation: self.operation.to_string(),
            argument,
        }
    }
}

/// Builder for [`OpArgs`].
#[derive(Debug, Clone)]
pub struct OpArgsBuilder {
    args: OpArgs,
}

impl OpArgsBuilder {
    /// Set the field name (or pattern, or reference).
    pub fn field(mut self, field: impl Into<FieldArg>) -> Self {
        self.args.field = Some(field.into());
        self
    }

    /// Set an explicit list of field names.
    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.field = Some(FieldArg::List(names.into_iter().map(Into::into).collect()));
        self
    }

    /// Supply a record function directly.
    pub fn function(mut self, function: impl RecordFunction + 'static) -> Self {
        self.args.field = Some(FieldArg::Function(Arc::new(function)));
        self
    }

    pub fn regex(mut self, regex: impl Into<String>) -> Self {
        self.args.regex = Some(regex.into());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.args.target = Some(target.into());
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.args.separator = separator.into();
        self
    }

    /// Add one regex flag name.
    pub fn regex_flag(mut self, flag: impl Into<String>) -> Self {
        self.args.regex_flags.push(flag.into());
        self
    }

    /// Add several regex flag names.
    pub fn regex_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.regex_flags.extend(flags.into_iter().map(Into::into));
        self
    }

    pub fn regex_per_item(mut self, template: impl Into<String>) -> Self {
        self.args.regex_per_item = Some(template.into());
        self
    }

    pub fn preset(mut self, preset: impl Into<String>) -> Self {
        self.args.preset = Some(preset.into());
        self
    }

    pub fn pipeline(mut self, reference: impl Into<String>) -> Self {
        self.args.pipeline = Some(reference.into());
        self
    }

    pub fn build(self) -> OpArgs {
        self.args
    }
}

fn field_arg(value: Option<&Value>) -> Result<Option<FieldArg>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(FieldArg::Text(text.clone()))),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    JsonPipeError::Config(format!("'field' list items must be strings, got {}", item))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(|names| Some(FieldArg::List(names))),
        Some(other) => Err(JsonPipeError::Config(format!(
            "'field' must be a string or a list of strings, got {}",
            other
        ))),
    }
}

fn optional_text(map: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(JsonPipeError::Config(format!(
            "'{}' must be a string, got {}",
            key, other
        ))),
    }
}

fn text_list(map: &Map<String, Value>, key: &str) -> Result<Vec<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(text)) => Ok(vec![text.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    JsonPipeError::Config(format!("'{}' items must be strings, got {}", key, item))
                })
            })
            .collect(),
        Some(other) => Err(JsonPipeError::Config(format!(
            "'{}' must be a list of strings, got {}",
            key, other
        ))),
    }
}
