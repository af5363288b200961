//! Named presets: ordered lists of operations.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{JsonPipeError, Result};

use super::args::OpArgs;

/// Mapping from preset name to the operations it runs, in order.
#[derive(Debug, Clone, Default)]
pub struct PipelineTable {
    presets: IndexMap<String, Vec<OpArgs>>,
}

impl PipelineTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a preset.
    pub fn with_preset(mut self, name: impl Into<String>, steps: Vec<OpArgs>) -> Self {
        self.insert(name, steps);
        self
    }

    /// Add (or replace) a preset.
    pub fn insert(&mut self, name: impl Into<String>, steps: Vec<OpArgs>) {
        self.presets.insert(name.into(), steps);
    }

    /// Steps of a preset.
    pub fn get(&self, name: &str) -> Option<&[OpArgs]> {
        self.presets.get(name).map(Vec::as_slice)
    }

    /// Preset names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Build a table from JSON of the form
    /// `{"preset": [{"operation": "...", ...}, ...], ...}`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            JsonPipeError::Config("A pipeline table must be a JSON object".to_string())
        })?;

        let mut table = Self::new();
        for (name, steps) in object {
            let steps = steps.as_array().ok_or_else(|| {
                JsonPipeError::Config(format!("Preset '{}' must be a list of operations", name))
            })?;
            let steps = steps
                .iter()
                .enumerate()
                .map(|(i, step)| {
                    let map = step.as_object().ok_or_else(|| {
                        JsonPipeError::Config(format!(
                            "Step {} of preset '{}' must be an object",
                            i + 1,
                            name
                        ))
                    })?;
                    OpArgs::from_map(map)
                })
                .collect::<Result<Vec<_>>>()?;
            table.insert(name.clone(), steps);
        }

        Ok(table)
    }

    /// Load a table from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| JsonPipeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let value: Value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            JsonPipeError::Config(format!(
                "Failed to parse pipeline table '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_value(&value)
    }
}
