//! CLI argument definitions using clap.

use clap::builder::{PossibleValue, PossibleValuesParser, TypedValueParser};
use clap::{ArgAction, Parser};
use jsonpipe::Operation;
use std::path::PathBuf;

/// jsonpipe: apply a record operation to a stream of JSON objects
#[derive(Parser, Debug)]
#[command(name = "jsonpipe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Operation to apply
    #[arg(value_name = "OPERATION", value_parser = operation_parser())]
    pub operation: Operation,

    /// Field to operate on; repeat to pass a list of names
    #[arg(short, long, value_name = "FIELD")]
    pub field: Vec<String>,

    /// Regular expression for filter_regex, filter_regex_neg and extract
    #[arg(short, long)]
    pub regex: Option<String>,

    /// Regex flag (I, M, S, X, U, A or their long names); may repeat
    #[arg(long = "regex-flags", value_name = "FLAG")]
    pub regex_flags: Vec<String>,

    /// Target field (or preset name for `preset`)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Separator used to join extracted groups or function output
    #[arg(short, long)]
    pub separator: Option<String>,

    /// Regex template filled from each record's fields
    #[arg(long = "regex-per-item", value_name = "TEMPLATE")]
    pub regex_per_item: Option<String>,

    /// Preset name for `preset` when no target is given
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Dotted reference to a pipeline table (e.g. presets.usps.pipeline)
    #[arg(long, value_name = "REF")]
    pub pipeline: Option<String>,

    /// JSON file holding the default pipeline table
    #[arg(long, env = "JSONPIPE_PRESETS", value_name = "FILE")]
    pub presets: Option<PathBuf>,

    /// Directory of JSON modules for references
    #[arg(long, env = "JSONPIPE_MODULES", value_name = "DIR")]
    pub modules: Option<PathBuf>,

    /// Input JSONL file (default: stdin)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output JSONL file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Catalog operations as possible values, each with its description.
fn operation_parser() -> impl TypedValueParser<Value = Operation> {
    let values = Operation::ALL.map(|op| {
        let value = PossibleValue::new(op.name()).help(op.description());
        match op {
            Operation::FixedValue => value.alias("fixedvalue"),
            _ => value,
        }
    });
    PossibleValuesParser::new(values).try_map(|name: String| name.parse::<Operation>())
}
