use std::path::PathBuf;

use serde::Deserialize;

use crate::captures::{CaptureDefinition, CaptureError, CaptureRegistry};
use crate::compiler::TemplateCompiler;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Capture declarations, applied in file order.
    #[serde(default)]
    pub captures: Vec<CaptureDefinition>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Path the config was loaded from.
    pub path: PathBuf,
    pub logging: LoggingConfig,
    pub captures: Vec<CaptureDefinition>,
}

impl ResolvedConfig {
    /// Declare every configured capture into a fresh registry.
    ///
    /// Stops at the first declaration that is rejected.
    pub fn build_registry<C: TemplateCompiler>(
        &self,
        compiler: C,
    ) -> Result<CaptureRegistry<C>, CaptureError> {
        CaptureRegistry::from_definitions(compiler, &self.captures)
    }
}
