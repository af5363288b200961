//! Resolution of dotted `module.path.objectname` references.
//!
//! The engine never looks objects up itself; it asks a [`Resolver`]. The
//! bundled [`Registry`] keeps modules in memory, registered from code or
//! loaded from a directory of JSON files.

mod registry;

pub use registry::{BUILTINS_MODULE, Registry};

use std::fmt;
use std::sync::Arc;

use crate::error::{JsonPipeError, Result};
use crate::transform::{PipelineTable, RecordFn};

/// An object a reference can resolve to.
#[derive(Clone)]
pub enum LoadedObject {
    /// A record function, usable by the `function` operation.
    Function(RecordFn),
    /// A pipeline table, usable by the `preset` operation.
    Pipeline(Arc<PipelineTable>),
}

impl LoadedObject {
    /// Short name of the object kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadedObject::Function(_) => "function",
            LoadedObject::Pipeline(_) => "pipeline",
        }
    }
}

impl fmt::Debug for LoadedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadedObject::Function(_) => f.write_str("Function(..)"),
            LoadedObject::Pipeline(table) => f.debug_tuple("Pipeline").field(table).finish(),
        }
    }
}

/// Trait for reference resolvers.
///
/// Implementations must be thread-safe (Send + Sync) so an engine holding
/// one can be shared.
pub trait Resolver: Send + Sync {
    /// Resolve `module.path.objectname` to the named object.
    ///
    /// # Errors
    /// - `InvalidReference` if the reference has no `.`
    /// - `ModuleNotFound` if the module part is unknown
    /// - `AttributeNotFound` if the module lacks the object
    fn resolve(&self, reference: &str) -> Result<LoadedObject>;
}

/// Split a reference at its last `.` into `(module, name)`.
pub fn split_reference(reference: &str) -> Result<(&str, &str)> {
    reference
        .rsplit_once('.')
        .ok_or_else(|| JsonPipeError::InvalidReference(reference.to_string()))
}
