//! In-memory module registry.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::error::{JsonPipeError, Result};
use crate::transform::{PipelineTable, RecordFunction, dict_to_text, strip};

use super::{LoadedObject, Resolver, split_reference};

/// Module holding the record functions shipped with jsonpipe.
pub const BUILTINS_MODULE: &str = "builtins";

type Module = IndexMap<String, LoadedObject>;

/// Resolver backed by modules kept in memory.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    modules: IndexMap<String, Module>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the `builtins` module.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert(BUILTINS_MODULE, "dict_to_text", LoadedObject::Function(Arc::new(dict_to_text)));
        registry.insert(BUILTINS_MODULE, "strip", LoadedObject::Function(Arc::new(strip)));
        registry
    }

    /// Register a record function under a dotted reference.
    pub fn register_function(
        &mut self,
        reference: &str,
        function: impl RecordFunction + 'static,
    ) -> Result<()> {
        let (module, name) = split_reference(reference)?;
        self.insert(module, name, LoadedObject::Function(Arc::new(function)));
        Ok(())
    }

    /// Register a pipeline table under a dotted reference.
    pub fn register_pipeline(&mut self, reference: &str, table: PipelineTable) -> Result<()> {
        let (module, name) = split_reference(reference)?;
        self.insert(module, name, LoadedObject::Pipeline(Arc::new(table)));
        Ok(())
    }

    /// Load every `*.json` file under `root` as a module.
    ///
    /// `root/presets/usps.json` becomes module `presets.usps`, and each
    /// top-level key of the file is a pipeline table in that module.
    /// Returns the number of modules loaded.
    pub fn load_dir(&mut self, root: impl AsRef<Path>) -> Result<usize> {
        let root = root.as_ref();
        let mut files = Vec::new();
        collect_json_files(root, &mut files)?;
        files.sort();

        for path in &files {
            let module = module_name(root, path)?;
            let text = fs::read_to_string(path).map_err(|e| JsonPipeError::Io {
                path: path.clone(),
                source: e,
            })?;
            let value: Value = serde_json::from_str(&text).map_err(|e| {
                JsonPipeError::Config(format!(
                    "Failed to parse module '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            let objects = value.as_object().ok_or_else(|| {
                JsonPipeError::Config(format!(
                    "Module '{}' must be a JSON object",
                    path.display()
                ))
            })?;

            for (name, table) in objects {
                let table = PipelineTable::from_value(table)?;
                self.insert(&module, name, LoadedObject::Pipeline(Arc::new(table)));
            }
            debug!(module = %module, objects = objects.len(), "loaded module");
        }

        Ok(files.len())
    }

    /// Registered module names.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    fn insert(&mut self, module: &str, name: &str, object: LoadedObject) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(name.to_string(), object);
    }
}

impl Resolver for Registry {
    fn resolve(&self, reference: &str) -> Result<LoadedObject> {
        let (module, name) = split_reference(reference)?;
        let objects = self
            .modules
            .get(module)
            .ok_or_else(|| JsonPipeError::ModuleNotFound(module.to_string()))?;
        objects
            .get(name)
            .cloned()
            .ok_or_else(|| JsonPipeError::AttributeNotFound {
                module: module.to_string(),
                name: name.to_string(),
            })
    }
}

fn collect_json_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| JsonPipeError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let path = entry
            .map_err(|e| JsonPipeError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?
            .path();
        if path.is_dir() {
            collect_json_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }

    Ok(())
}

fn module_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str().to_str().map(str::to_string).ok_or_else(|| {
                JsonPipeError::Config(format!("Non UTF-8 module path '{}'", path.display()))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("."))
}
