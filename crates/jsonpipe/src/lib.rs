//! jsonpipe: line-oriented JSON record transformation pipeline.
//!
//! jsonpipe reads a stream of JSON objects, applies one named operation
//! (regex filters, field renames and extraction, templates, dedupe, record
//! functions) and emits the transformed stream. Operations can be chained
//! into named presets that are looked up and applied in order.
//!
//! # Core Principles
//!
//! - **Lazy**: datasets are iterators; records are pulled one at a time
//! - **Order preserving**: output order is input order, minus filtered records
//! - **Injected loading**: functions and pipeline tables come from a [`Resolver`]
//!
//! # Example
//!
//! ```no_run
//! use jsonpipe::{OpArgs, Operation, RecordReader, RecordWriter, TransformEngine};
//!
//! let engine = TransformEngine::new();
//! let args = OpArgs::builder(Operation::Dedupe).field("id").build();
//!
//! let input = RecordReader::open("offices.jsonl").unwrap();
//! let output = engine.run(input.into_dataset(), &args).unwrap();
//!
//! let mut writer = RecordWriter::create("deduped.jsonl").unwrap();
//! let written = writer.write_all(output).unwrap();
//! println!("Records: {}", written);
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod resolver;
pub mod transform;

mod record;

pub use config::PipelineConfig;
pub use error::{JsonPipeError, Result};
pub use input::RecordReader;
pub use output::RecordWriter;
pub use record::{Dataset, Record, dataset, value_text};
pub use resolver::{LoadedObject, Registry, Resolver};
pub use transform::{
    FieldArg, OpArgs, OpArgsBuilder, Operation, PipelineTable, RecordFn, RecordFunction,
    RegexFlags, TransformEngine,
};
