//! Named capture declarations with parent/child relationships.
//!
//! Captures are declared by name, optionally under one or more parents that
//! must already exist. Every change rebuilds the generated template list
//! from the root captures, with children nested under their parents.
//!
//! # Example
//!
//! ```
//! use capdef_core::captures::{CaptureRegistry, Declaration};
//!
//! let mut registry = CaptureRegistry::new();
//! registry.define("work", vec![], Declaration::new("Work").with("keys", "w")).unwrap();
//! registry
//!     .define(
//!         "bug",
//!         vec!["work".to_string()],
//!         Declaration::new("Bug").with("keys", "b").with("file", "bugs.org"),
//!     )
//!     .unwrap();
//!
//! let keys: Vec<&str> = registry.templates().iter().map(|t| t.keys.as_str()).collect();
//! assert_eq!(keys, ["w", "wb"]);
//! ```

pub mod registry;
pub mod resolver;
pub mod types;

// Re-export primary API
pub use registry::CaptureRegistry;
pub use types::{
    CaptureDefinition, CaptureError, CaptureRecord, CaptureTree, Declaration, DeclarationBody,
};
