//! Boundary to the capture template compiler.
//!
//! The registry hands every resolved root tree to a [`TemplateCompiler`] and
//! stores whatever it returns as the template list the editor reads. The
//! registry never looks inside the declarations; only compilers do.

pub mod org;

use serde_json::Value;
use thiserror::Error;

use crate::captures::CaptureTree;

pub use org::{CaptureTemplate, OrgTemplateCompiler};

/// Turns resolved declaration trees into the editor's template config.
pub trait TemplateCompiler {
    /// The generated config. `Default` is the state before the first sync.
    type Output: Default;

    fn compile(&self, trees: &[CaptureTree]) -> Result<Self::Output, CompileError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to compile capture \"{description}\": {message}")]
pub struct CompileError {
    pub description: String,
    pub message: String,
}

impl CompileError {
    pub fn new(description: impl Into<String>, message: impl Into<String>) -> Self {
        Self { description: description.into(), message: message.into() }
    }
}

/// Passes the nested trees through unchanged, as JSON values.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeCompiler;

impl TemplateCompiler for TreeCompiler {
    type Output = Vec<Value>;

    fn compile(&self, trees: &[CaptureTree]) -> Result<Self::Output, CompileError> {
        Ok(trees.iter().map(CaptureTree::to_value).collect())
    }
}
