//! Run command - stream records through one operation.

use std::io::{self, BufWriter};

use jsonpipe::{Dataset, OpArgs, PipelineConfig, RecordReader, RecordWriter, TransformEngine};
use tracing::{info, warn};

use crate::cli::Cli;

pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let args = op_args(&cli);
    for name in args.irrelevant_args() {
        warn!(
            operation = %args.operation(),
            option = name,
            "option is not used by this operation; ignoring"
        );
    }

    let mut config = PipelineConfig::new();
    if let Some(ref path) = cli.presets {
        config = config.with_presets(path);
    }
    if let Some(ref dir) = cli.modules {
        config = config.with_modules(dir);
    }
    let engine = TransformEngine::from_config(&config)?;

    let input: Dataset<'_> = match cli.input {
        Some(ref path) => RecordReader::open(path)?.into_dataset(),
        None => RecordReader::new(io::stdin().lock())
            .with_source("<stdin>")
            .into_dataset(),
    };
    let output = engine.run(input, &args)?;

    let written = match cli.output {
        Some(ref path) => RecordWriter::create(path)?.write_all(output)?,
        None => RecordWriter::new(BufWriter::new(io::stdout().lock()))
            .with_destination("<stdout>")
            .write_all(output)?,
    };
    info!(operation = %args.operation(), records = written, "finished");

    Ok(())
}

/// Translate command-line options into operation arguments.
fn op_args(cli: &Cli) -> OpArgs {
    let mut builder = OpArgs::builder(cli.operation);

    builder = match cli.field.as_slice() {
        [] => builder,
        [single] => builder.field(single.as_str()),
        many => builder.fields(many.iter().cloned()),
    };
    if let Some(ref regex) = cli.regex {
        builder = builder.regex(regex);
    }
    if let Some(ref target) = cli.target {
        builder = builder.target(target);
    }
    if let Some(ref separator) = cli.separator {
        builder = builder.separator(separator);
    }
    if let Some(ref template) = cli.regex_per_item {
        builder = builder.regex_per_item(template);
    }
    if let Some(ref preset) = cli.preset {
        builder = builder.preset(preset);
    }
    if let Some(ref reference) = cli.pipeline {
        builder = builder.pipeline(reference);
    }

    builder.regex_flags(cli.regex_flags.iter().cloned()).build()
}
