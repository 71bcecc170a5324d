use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::compiler::CompileError;

/// Key/value clauses of a declaration, kept in declared order.
pub type DeclarationBody = Map<String, Value>;

/// JSON key holding the description of a declaration tree.
pub const DESCRIPTION_KEY: &str = "desc";

/// JSON key holding the resolved children of a declaration tree.
pub const CHILDREN_KEY: &str = "children";

/// Opaque capture declaration handed to the template compiler verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    /// Human-readable description shown in the capture menu
    pub description: String,

    /// Clauses consumed by the compiler (target, template text, hooks, ...)
    #[serde(default)]
    pub body: DeclarationBody,
}

impl Declaration {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), body: DeclarationBody::new() }
    }

    /// Builder-style helper to append a clause.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    /// Look up a body clause.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// The `keys` clause, when it is a string.
    pub fn keys(&self) -> Option<&str> {
        self.body.get("keys").and_then(Value::as_str)
    }
}

/// One declared capture, keyed by name in the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRecord {
    pub name: String,
    pub parents: Vec<String>,
    /// Fixed at definition time; never recomputed when parents disappear.
    pub is_child: bool,
    pub declaration: Declaration,
}

impl CaptureRecord {
    pub fn new(name: impl Into<String>, parents: Vec<String>, declaration: Declaration) -> Self {
        let is_child = !parents.is_empty();
        Self { name: name.into(), parents, is_child, declaration }
    }

    /// Whether `name` appears in this record's parent list.
    pub fn has_parent(&self, name: &str) -> bool {
        self.parents.iter().any(|p| p == name)
    }
}

/// A declaration with its children resolved recursively.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureTree {
    pub name: String,
    pub declaration: Declaration,
    pub children: Vec<CaptureTree>,
}

impl CaptureTree {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Render the tree the way the capture compiler expects it: the
    /// declaration object, extended with `children` when there are any.
    ///
    /// The description always wins over a body clause named `desc`.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(
            DESCRIPTION_KEY.to_string(),
            Value::String(self.declaration.description.clone()),
        );
        for (k, v) in &self.declaration.body {
            if k != DESCRIPTION_KEY {
                obj.insert(k.clone(), v.clone());
            }
        }
        if self.has_children() {
            let children = self.children.iter().map(CaptureTree::to_value).collect();
            obj.insert(CHILDREN_KEY.to_string(), Value::Array(children));
        }
        Value::Object(obj)
    }
}

impl Serialize for CaptureTree {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Re-declarable form of a record.
///
/// Feeding it back through [`CaptureRegistry::define_from`] reproduces the
/// record it was generated from. This is also the shape of a `[[captures]]`
/// entry in the config file.
///
/// [`CaptureRegistry::define_from`]: super::CaptureRegistry::define_from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureDefinition {
    pub name: String,

    #[serde(default)]
    pub parents: Vec<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub body: DeclarationBody,
}

impl CaptureDefinition {
    pub fn declaration(&self) -> Declaration {
        Declaration { description: self.description.clone(), body: self.body.clone() }
    }
}

impl From<&CaptureRecord> for CaptureDefinition {
    fn from(record: &CaptureRecord) -> Self {
        Self {
            name: record.name.clone(),
            parents: record.parents.clone(),
            description: record.declaration.description.clone(),
            body: record.declaration.body.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture {0} is not defined")]
    UnknownName(String),

    #[error("parent {0} is not defined")]
    UnknownParent(String),

    #[error("cyclic capture graph: {}", .cycle.join(" -> "))]
    CyclicGraph { cycle: Vec<String> },

    #[error(transparent)]
    Compile(#[from] CompileError),
}
