//! Record operations, their arguments, and the engine that runs them.

mod args;
mod engine;
mod flags;
mod function;
mod operations;
mod pipeline;
mod plain;
mod template;

pub use args::{ARGUMENT_NAMES, FieldArg, OpArgs, OpArgsBuilder};
pub use engine::TransformEngine;
pub use flags::RegexFlags;
pub use function::{RecordFn, RecordFunction, dict_to_text, strip};
pub use operations::Operation;
pub use pipeline::PipelineTable;
pub use plain::plain;
pub use template::render as render_template;
