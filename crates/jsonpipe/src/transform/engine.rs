//! Transform engine that applies catalog operations to datasets.

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::PipelineConfig;
use crate::error::{JsonPipeError, Result};
use crate::record::{Dataset, Record, dataset, value_text};
use crate::resolver::{LoadedObject, Registry, Resolver};

use super::args::{FieldArg, OpArgs};
use super::flags::RegexFlags;
use super::function::RecordFn;
use super::operations::Operation;
use super::pipeline::PipelineTable;
use super::plain::plain;
use super::template;

/// Presets may run presets; this bounds the nesting.
const MAX_PRESET_DEPTH: usize = 32;

/// Engine for applying operations to datasets.
///
/// Every operation returns a lazy dataset: nothing is read from the input
/// until the result is consumed. Setup problems (missing arguments, bad
/// regexes, unresolvable references) are returned before any record is
/// touched; problems with a specific record show up as an `Err` item.
///
/// # Example
///
/// ```
/// use jsonpipe::{OpArgs, Operation, TransformEngine};
/// use serde_json::json;
///
/// let records = vec![
///     json!({"name": "Office_A"}).as_object().cloned().unwrap(),
///     json!({"name": "Office_1"}).as_object().cloned().unwrap(),
/// ];
/// let args = OpArgs::builder(Operation::FilterRegex)
///     .field("name")
///     .regex(r"office_\d+")
///     .regex_flag("I")
///     .build();
///
/// let out = TransformEngine::new().transform(records, &args).unwrap();
/// assert_eq!(out.len(), 1);
/// assert_eq!(out[0]["name"], "Office_1");
/// ```
pub struct TransformEngine {
    resolver: Arc<dyn Resolver>,
    pipeline: Option<Arc<PipelineTable>>,
}

impl TransformEngine {
    /// Create an engine with the builtin resolver and no default pipeline.
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(Registry::with_builtins()),
            pipeline: None,
        }
    }

    /// Create an engine from configuration, loading the presets file and
    /// module directory it names.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let mut registry = Registry::with_builtins();
        if let Some(ref dir) = config.modules {
            let loaded = registry.load_dir(dir)?;
            debug!(dir = %dir.display(), modules = loaded, "loaded module directory");
        }

        let mut engine = Self::new().with_resolver(registry);
        if let Some(ref path) = config.presets {
            let table = PipelineTable::load(path)?;
            debug!(path = %path.display(), presets = table.len(), "loaded default pipeline");
            engine = engine.with_pipeline(table);
        }

        Ok(engine)
    }

    /// Use a different resolver for `function` and `preset` references.
    pub fn with_resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Set the default pipeline table used by `preset`.
    pub fn with_pipeline(mut self, table: PipelineTable) -> Self {
        self.pipeline = Some(Arc::new(table));
        self
    }

    /// The default pipeline table, if any.
    pub fn pipeline(&self) -> Option<&PipelineTable> {
        self.pipeline.as_deref()
    }

    /// Apply the operation named in `args` to a dataset.
    pub fn run<'a>(&self, dataset: Dataset<'a>, args: &OpArgs) -> Result<Dataset<'a>> {
        self.apply(dataset, args, 0)
    }

    /// Apply an operation to in-memory records and collect the result.
    pub fn transform(&self, records: Vec<Record>, args: &OpArgs) -> Result<Vec<Record>> {
        self.run(dataset(records), args)?.collect()
    }

    /// Fold a dataset through the operations of a preset.
    pub fn apply_preset<'a>(&self, dataset: Dataset<'a>, args: &OpArgs) -> Result<Dataset<'a>> {
        self.preset(dataset, args, 0)
    }

    fn apply<'a>(&self, dataset: Dataset<'a>, args: &OpArgs, depth: usize) -> Result<Dataset<'a>> {
        args.check_required()?;
        debug!(operation = %args.operation(), depth, "applying operation");

        match args.operation() {
            Operation::FilterRegex => self.filter_regex(dataset, args, true),
            Operation::FilterRegexNeg => self.filter_regex(dataset, args, false),
            Operation::CrossFilter => self.cross_filter(dataset, args),
            Operation::FilterNotExists => self.filter_not_exists(dataset, args),
            Operation::RenameField => self.rename_field(dataset, args),
            Operation::Extract => self.extract(dataset, args),
            Operation::Template => self.template(dataset, args),
            Operation::RemoveFields => Ok(self.remove_fields(dataset, args)),
            Operation::Dedupe => self.dedupe(dataset, args),
            Operation::Preset => self.preset(dataset, args, depth),
            Operation::Plaintext => self.plaintext(dataset, args),
            Operation::Function => self.function(dataset, args),
            Operation::FixedValue => self.fixed_value(dataset, args),
        }
    }

    /// Keep records whose field matches (or, with `keep_matches` false,
    /// does not match) the regex. Records without the field pass.
    fn filter_regex<'a>(
        &self,
        dataset: Dataset<'a>,
        args: &OpArgs,
        keep_matches: bool,
    ) -> Result<Dataset<'a>> {
        let field = single_field(args)?;
        let regex = compile_static(args)?.ok_or_else(|| args.missing("regex"))?;

        Ok(Box::new(dataset.filter(move |item| match item {
            Ok(record) => match record.get(&field) {
                Some(value) => {
                    let keep = regex.is_match(&value_text(value)) == keep_matches;
                    if !keep {
                        trace!(field = %field, "record filtered out");
                    }
                    keep
                }
                None => true,
            },
            Err(_) => true,
        })))
    }

    /// Keep records whose target text is a substring of the field text.
    fn cross_filter<'a>(&self, dataset: Dataset<'a>, args: &OpArgs) -> Result<Dataset<'a>> {
        let field = single_field(args)?;
        let target = required_target(args)?;

        Ok(Box::new(dataset.filter(move |item| match item {
            Ok(record) => match (record.get(&field), record.get(&target)) {
                (Some(haystack), Some(needle)) => {
                    value_text(haystack).contains(&*value_text(needle))
                }
                _ => true,
            },
            Err(_) => true,
        })))
    }

    /// Keep only records that have the field.
    fn filter_not_exists<'a>(&self, dataset: Dataset<'a>, args: &OpArgs) -> Result<Dataset<'a>> {
        let field = single_field(args)?;

        Ok(Box::new(dataset.filter(move |item| match item {
            Ok(record) => record.contains_key(&field),
            Err(_) => true,
        })))
    }

    fn rename_field<'a>(&self, dataset: Dataset<'a>, args: &OpArgs) -> Result<Dataset<'a>> {
        let field = single_field(args)?;
        let target = required_target(args)?;

        Ok(Box::new(dataset.map(move |item| {
            let mut record = item?;
            if let Some(value) = record.shift_remove(&field) {
                record.insert(target.clone(), value);
            }
            Ok(record)
        })))
    }

    /// Store regex captures of the field into the target.
    ///
    /// With capture groups, the groups are joined with the separator
    /// (groups that did not participate count as empty text); without
    /// groups the whole match is stored.
    fn extract<'a>(&self, dataset: Dataset<'a>, args: &OpArgs) -> Result<Dataset<'a>> {
        let field = single_field(args)?;
        let target = required_target(args)?;
        let flags = RegexFlags::from_names(args.regex_flags())?;
        let static_regex = compile_static(args)?;
        let per_item = args.regex_per_item().map(str::to_string);
        if static_regex.is_none() && per_item.is_none() {
            return Err(args.missing("regex"));
        }
        let separator = args.separator().to_string();

        Ok(Box::new(dataset.map(move |item| {
            let mut record = item?;
            let Some(value) = record.get(&field) else {
                return Ok(record);
            };

            let compiled;
            let regex = match (&per_item, &static_regex) {
                (Some(template_text), _) => {
                    compiled = flags.compile(&template::render(template_text, &record)?)?;
                    &compiled
                }
                (None, Some(regex)) => regex,
                (None, None) => return Ok(record),
            };

            let extracted = regex.captures(&value_text(value)).map(|caps| {
                if caps.len() > 1 {
                    caps.iter()
                        .skip(1)
                        .map(|group| group.map_or("", |m| m.as_str()))
                        .collect::<Vec<_>>()
                        .join(separator.as_str())
                } else {
                    caps.get(0).map_or("", |m| m.as_str()).to_string()
                }
            });

            if let Some(text) = extracted {
                record.insert(target.clone(), Value::String(text));
            }
            Ok(record)
        })))
    }

    /// Fill the target from the `{field}` template held in the field argument.
    fn template<'a>(&self, dataset: Dataset<'a>, args: &OpArgs) -> Result<Dataset<'a>> {
        let pattern = single_field(args)?;
        let target = required_target(args)?;

        Ok(Box::new(dataset.map(move |item| {
            let mut record = item?;
            let text = template::render(&pattern, &record)?;
            record.insert(target.clone(), Value::String(text));
            Ok(record)
        })))
    }

    fn remove_fields<'a>(&self, dataset: Dataset<'a>, args: &OpArgs) -> Dataset<'a> {
        let names = args.field().map(FieldArg::names).unwrap_or_default();

        Box::new(dataset.map(move |item| {
            let mut record = item?;
            for name in &names {
                record.shift_remove(name);
            }
            Ok(record)
        }))
    }

    /// Keep the first record for each value of the field.
    ///
    /// Values compare as JSON, so `"1"` and `1` are distinct. Records
    /// without the field are never deduplicated.
    fn dedupe<'a>(&self, dataset: Dataset<'a>, args: &OpArgs) -> Result<Dataset<'a>> {
        let field = single_field(args)?;
        let mut seen: HashSet<String> = HashSet::new();

        Ok(Box::new(dataset.filter(move |item| match item {
            Ok(record) => match record.get(&field) {
                Some(value) => seen.insert(value.to_string()),
                None => true,
            },
            Err(_) => true,
        })))
    }

    /// Run the operations of a preset in order, each feeding the next.
    fn preset<'a>(&self, dataset: Dataset<'a>, args: &OpArgs, depth: usize) -> Result<Dataset<'a>> {
        if depth >= MAX_PRESET_DEPTH {
            return Err(JsonPipeError::Config(format!(
                "Presets nested deeper than {} levels",
                MAX_PRESET_DEPTH
            )));
        }

        let name = args
            .target()
            .or(args.preset())
            .ok_or_else(|| args.missing("target"))?;

        let table = match args.pipeline() {
            Some(reference) => match self.resolver.resolve(reference)? {
                LoadedObject::Pipeline(table) => table,
                other => {
                    return Err(JsonPipeError::Config(format!(
                        "'{}' is a {}, not a pipeline table",
                        reference,
                        other.kind()
                    )));
                }
            },
            None => self.pipeline.clone().ok_or(JsonPipeError::NoPipeline)?,
        };
        if table.is_empty() {
            return Err(JsonPipeError::NoPipeline);
        }

        let steps = table
            .get(name)
            .ok_or_else(|| JsonPipeError::UnknownPreset(name.to_string()))?;
        debug!(preset = name, steps = steps.len(), "expanding preset");

        steps
            .iter()
            .try_fold(dataset, |acc, step| self.apply(acc, step, depth + 1))
    }

    /// Normalize the field with [`plain`]. A record without the field is
    /// an error.
    fn plaintext<'a>(&self, dataset: Dataset<'a>, args: &OpArgs) -> Result<Dataset<'a>> {
        let field = single_field(args)?;

        Ok(Box::new(dataset.map(move |item| {
            let mut record = item?;
            let value = record
                .get_mut(&field)
                .ok_or_else(|| JsonPipeError::MissingField {
                    field: field.clone(),
                })?;
            let text = plain(&value_text(value));
            *value = Value::String(text);
            Ok(record)
        })))
    }

    /// Replace each record with the output of a record function.
    fn function<'a>(&self, dataset: Dataset<'a>, args: &OpArgs) -> Result<Dataset<'a>> {
        let function = self.record_function(args)?;
        let args = args.clone();

        Ok(Box::new(
            dataset.map(move |item| function.call(item?, &args)),
        ))
    }

    fn fixed_value<'a>(&self, dataset: Dataset<'a>, args: &OpArgs) -> Result<Dataset<'a>> {
        let field = single_field(args)?;
        let value = Value::String(required_target(args)?);

        Ok(Box::new(dataset.map(move |item| {
            let mut record = item?;
            record.insert(field.clone(), value.clone());
            Ok(record)
        })))
    }

    /// The function given directly in the field argument, or resolved from
    /// the reference held there.
    fn record_function(&self, args: &OpArgs) -> Result<RecordFn> {
        match args.field() {
            Some(FieldArg::Function(function)) => Ok(Arc::clone(function)),
            Some(FieldArg::Text(reference)) => match self.resolver.resolve(reference)? {
                LoadedObject::Function(function) => {
                    debug!(reference = %reference, "resolved record function");
                    Ok(function)
                }
                other => Err(JsonPipeError::Config(format!(
                    "'{}' is a {}, not a record function",
                    reference,
                    other.kind()
                ))),
            },
            Some(FieldArg::List(_)) => Err(JsonPipeError::Config(
                "'function' expects a function reference, not a list".to_string(),
            )),
            None => Err(args.missing("field")),
        }
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The field argument as one name (or pattern).
fn single_field(args: &OpArgs) -> Result<String> {
    match args.field() {
        Some(FieldArg::Text(text)) => Ok(text.clone()),
        Some(_) => Err(JsonPipeError::Config(format!(
            "'{}' expects a single field name",
            args.operation()
        ))),
        None => Err(args.missing("field")),
    }
}

fn required_target(args: &OpArgs) -> Result<String> {
    args.target()
        .map(str::to_string)
        .ok_or_else(|| args.missing("target"))
}

/// Compile the static `regex` argument with the argument's flags.
fn compile_static(args: &OpArgs) -> Result<Option<Regex>> {
    let flags = RegexFlags::from_names(args.regex_flags())?;
    args.regex().map(|pattern| flags.compile(pattern)).transpose()
}
