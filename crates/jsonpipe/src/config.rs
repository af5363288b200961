//! Engine configuration.

use std::path::PathBuf;

/// Where the engine's pipeline tables come from.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// JSON file holding the default pipeline table for `preset`.
    pub presets: Option<PathBuf>,
    /// Directory of JSON modules available to `--pipeline` references.
    pub modules: Option<PathBuf>,
}

impl PipelineConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default pipeline table file.
    pub fn with_presets(mut self, path: impl Into<PathBuf>) -> Self {
        self.presets = Some(path.into());
        self
    }

    /// Set the module directory.
    pub fn with_modules(mut self, dir: impl Into<PathBuf>) -> Self {
        self.modules = Some(dir.into());
        self
    }
}
