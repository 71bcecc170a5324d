//! Flattening compiler producing an org-style capture template list.
//!
//! Nested trees become a flat list in which a parent with children turns
//! into a key-prefix group, and every leaf turns into a full entry whose key
//! sequence is the concatenation of its ancestors' keys and its own.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::Serialize;
use serde_json::{Map, Value};

use super::{CompileError, TemplateCompiler};
use crate::captures::CaptureTree;
use crate::captures::types::{CHILDREN_KEY, DESCRIPTION_KEY};

const KEYS_KEY: &str = "keys";

/// Kind of an entry in the generated template list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Key prefix shown as a sub-menu; carries no properties.
    Group,
    /// Selectable capture template.
    Entry,
}

/// One element of the editor's capture template list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureTemplate {
    pub keys: String,
    pub description: String,
    pub kind: TemplateKind,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl CaptureTemplate {
    pub fn is_group(&self) -> bool {
        self.kind == TemplateKind::Group
    }

    /// Render as a list form, e.g. `("pc" "Child" :file "inbox.org")`.
    pub fn render(&self) -> String {
        let mut out = format!("({} {}", quote(&self.keys), quote(&self.description));
        for (k, v) in &self.properties {
            let _ = write!(out, " :{k} {}", render_value(v));
        }
        out.push(')');
        out
    }
}

/// Compiler for the flat, key-prefixed template list.
///
/// Properties declared on a parent are inherited by all of its descendants;
/// a descendant's own clauses take precedence.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrgTemplateCompiler;

impl TemplateCompiler for OrgTemplateCompiler {
    type Output = Vec<CaptureTemplate>;

    fn compile(&self, trees: &[CaptureTree]) -> Result<Self::Output, CompileError> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let inherited = Map::new();
        for tree in trees {
            flatten(tree, "", &inherited, &mut seen, &mut out)?;
        }
        Ok(out)
    }
}

fn flatten(
    tree: &CaptureTree,
    prefix: &str,
    inherited: &Map<String, Value>,
    seen: &mut HashSet<String>,
    out: &mut Vec<CaptureTemplate>,
) -> Result<(), CompileError> {
    let description = &tree.declaration.description;
    let own_keys = tree
        .declaration
        .keys()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| CompileError::new(description, "missing :keys"))?;

    let keys = format!("{prefix}{own_keys}");
    if !seen.insert(keys.clone()) {
        return Err(CompileError::new(description, format!("duplicate keys \"{keys}\"")));
    }

    let mut properties = inherited.clone();
    for (k, v) in &tree.declaration.body {
        if k != KEYS_KEY && k != CHILDREN_KEY && k != DESCRIPTION_KEY {
            properties.insert(k.clone(), v.clone());
        }
    }

    if !tree.has_children() {
        out.push(CaptureTemplate {
            keys,
            description: description.clone(),
            kind: TemplateKind::Entry,
            properties,
        });
        return Ok(());
    }

    out.push(CaptureTemplate {
        keys: keys.clone(),
        description: description.clone(),
        kind: TemplateKind::Group,
        properties: Map::new(),
    });
    for child in &tree.children {
        flatten(child, &keys, &properties, seen, out)?;
    }
    Ok(())
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => "nil".to_string(),
        Value::Bool(true) => "t".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(render_value).collect();
            format!("({})", inner.join(" "))
        }
        Value::Object(map) => {
            let inner: Vec<String> =
                map.iter().map(|(k, v)| format!(":{k} {}", render_value(v))).collect();
            format!("({})", inner.join(" "))
        }
    }
}
