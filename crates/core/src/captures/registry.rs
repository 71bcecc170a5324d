//! Capture registry keeping the generated template list in sync.

use std::fmt;

use tracing::{debug, warn};

use super::resolver::{self, Records};
use super::types::{CaptureDefinition, CaptureError, CaptureRecord, CaptureTree, Declaration};
use crate::compiler::{OrgTemplateCompiler, TemplateCompiler};

/// Registry of declared captures.
///
/// The registry maintains:
/// - The capture records, keyed by name in declaration order
/// - The template list generated from them by the compiler
///
/// Every successful `define`/`remove` rebuilds the template list from
/// scratch before returning. A failed operation leaves both untouched.
pub struct CaptureRegistry<C: TemplateCompiler = OrgTemplateCompiler> {
    records: Records,
    compiler: C,
    templates: C::Output,
}

impl CaptureRegistry<OrgTemplateCompiler> {
    /// Create an empty registry generating org capture templates.
    pub fn new() -> Self {
        Self::with_compiler(OrgTemplateCompiler)
    }
}

impl Default for CaptureRegistry<OrgTemplateCompiler> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TemplateCompiler> CaptureRegistry<C> {
    /// Create an empty registry feeding the given compiler.
    pub fn with_compiler(compiler: C) -> Self {
        Self { records: Records::new(), compiler, templates: Default::default() }
    }

    /// Create a registry by declaring each definition in order.
    pub fn from_definitions<'a, I>(compiler: C, definitions: I) -> Result<Self, CaptureError>
    where
        I: IntoIterator<Item = &'a CaptureDefinition>,
    {
        let mut registry = Self::with_compiler(compiler);
        for def in definitions {
            registry.define_from(def)?;
        }
        Ok(registry)
    }

    /// Declare a capture, replacing any previous one with the same name.
    ///
    /// Every parent must already be declared. On the first missing parent
    /// (in declared order) a single notice naming it is emitted, nothing
    /// changes and no sync happens.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        parents: Vec<String>,
        declaration: Declaration,
    ) -> Result<(), CaptureError> {
        let name = name.into();

        if let Some(missing) = parents.iter().find(|p| !self.records.contains_key(p.as_str())) {
            warn!(capture = %name, "parent {missing} is not defined");
            return Err(CaptureError::UnknownParent(missing.clone()));
        }

        let record = CaptureRecord::new(name.clone(), parents, declaration);
        let previous = self.records.insert(name.clone(), record);

        if let Err(e) = self.sync() {
            match previous {
                Some(prev) => {
                    self.records.insert(name.clone(), prev);
                }
                None => {
                    self.records.shift_remove(&name);
                }
            }
            warn!(capture = %name, "definition rejected: {e}");
            return Err(e);
        }

        debug!(capture = %name, "capture defined");
        Ok(())
    }

    /// Declare a capture from its re-declarable form.
    pub fn define_from(&mut self, definition: &CaptureDefinition) -> Result<(), CaptureError> {
        self.define(
            definition.name.clone(),
            definition.parents.clone(),
            definition.declaration(),
        )
    }

    /// Check if a capture is declared.
    ///
    /// Emits a notice when it is not.
    pub fn exists(&self, name: &str) -> bool {
        let found = self.records.contains_key(name);
        if !found {
            warn!("capture {name} is not defined");
        }
        found
    }

    /// Remove a capture and rebuild the template list.
    ///
    /// Children of the removed capture stay declared but are no longer
    /// reachable from any root.
    pub fn remove(&mut self, name: &str) -> Result<(), CaptureError> {
        if !self.exists(name) {
            return Err(CaptureError::UnknownName(name.to_string()));
        }

        let Some((index, key, record)) = self.records.shift_remove_full(name) else {
            return Err(CaptureError::UnknownName(name.to_string()));
        };

        if let Err(e) = self.sync() {
            self.records.shift_insert(index, key, record);
            warn!(capture = %name, "removal rejected: {e}");
            return Err(e);
        }

        debug!(capture = %name, "capture removed");
        Ok(())
    }

    /// Resolved declaration tree of a capture, or `None` if it is not declared.
    ///
    /// A cyclic graph is reported as a notice and also yields `None`; use
    /// [`Self::try_export`] to get the error.
    pub fn export(&self, name: &str) -> Option<CaptureTree> {
        match self.try_export(name) {
            Ok(tree) => tree,
            Err(e) => {
                warn!(capture = %name, "{e}");
                None
            }
        }
    }

    /// Resolved declaration tree of a capture, surfacing resolution errors.
    pub fn try_export(&self, name: &str) -> Result<Option<CaptureTree>, CaptureError> {
        if !self.exists(name) {
            return Ok(None);
        }
        resolver::resolve(&self.records, name).map(Some)
    }

    /// Re-declarable form of a capture, or `None` if it is not declared.
    pub fn generate_definition(&self, name: &str) -> Option<CaptureDefinition> {
        if !self.exists(name) {
            return None;
        }
        self.records.get(name).map(CaptureDefinition::from)
    }

    /// Rebuild the template list from every root capture.
    ///
    /// The list is replaced only when resolution and compilation both succeed.
    pub fn sync(&mut self) -> Result<(), CaptureError> {
        let trees = self.resolve_roots()?;
        let templates = self.compiler.compile(&trees)?;
        self.templates = templates;
        debug!(captures = self.records.len(), roots = trees.len(), "capture templates rebuilt");
        Ok(())
    }

    /// The trees `sync` hands to the compiler, in registry order.
    pub fn resolve_roots(&self) -> Result<Vec<CaptureTree>, CaptureError> {
        resolver::resolve_roots(&self.records)
    }

    /// Names of every capture declaring `name` as a parent.
    pub fn children_of(&self, name: &str) -> Vec<&str> {
        resolver::children_of(&self.records, name)
    }

    /// Drop every capture and rebuild the (now empty) template list.
    pub fn reset(&mut self) -> Result<(), CaptureError> {
        self.records.clear();
        self.sync()
    }

    /// The template list generated by the last successful sync.
    pub fn templates(&self) -> &C::Output {
        &self.templates
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Get a capture record by name.
    pub fn get(&self, name: &str) -> Option<&CaptureRecord> {
        self.records.get(name)
    }

    /// All records in declaration order.
    pub fn records(&self) -> impl Iterator<Item = &CaptureRecord> {
        self.records.values()
    }

    /// All capture names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.records.keys().map(String::as_str).collect()
    }

    /// Names of captures declared without parents.
    pub fn roots(&self) -> Vec<&str> {
        self.records.values().filter(|r| !r.is_child).map(|r| r.name.as_str()).collect()
    }

    /// Child captures none of whose parents are declared anymore.
    pub fn orphans(&self) -> Vec<&str> {
        self.records
            .values()
            .filter(|r| r.is_child && !r.parents.iter().any(|p| self.records.contains_key(p)))
            .map(|r| r.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<C> fmt::Debug for CaptureRegistry<C>
where
    C: TemplateCompiler + fmt::Debug,
    C::Output: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureRegistry")
            .field("records", &self.records)
            .field("compiler", &self.compiler)
            .field("templates", &self.templates)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CompileError, TreeCompiler};
    use serde_json::{Value, json};

    fn tree_registry() -> CaptureRegistry<TreeCompiler> {
        CaptureRegistry::with_compiler(TreeCompiler)
    }

    fn decl(description: &str, keys: &str) -> Declaration {
        Declaration::new(description).with("keys", keys)
    }

    fn parents(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_empty_registry() {
        let registry = tree_registry();
        assert!(registry.is_empty());
        assert!(registry.templates().is_empty());
        assert!(!registry.exists("anything"));
    }

    #[test]
    fn test_define_root() {
        let mut registry = tree_registry();
        registry.define("p", vec![], decl("Parent", "p")).unwrap();

        assert!(registry.exists("p"));
        assert_eq!(registry.roots(), vec!["p"]);
        assert!(!registry.get("p").unwrap().is_child);
        assert_eq!(registry.templates(), &vec![json!({"desc": "Parent", "keys": "p"})]);
    }

    #[test]
    fn test_define_with_unknown_parent_is_rejected() {
        let mut registry = tree_registry();
        registry.define("p", vec![], decl("Parent", "p")).unwrap();
        let before = registry.templates().clone();

        let err =
            registry.define("x", parents(&["p", "ghost", "other"]), decl("X", "x")).unwrap_err();

        assert!(matches!(&err, CaptureError::UnknownParent(p) if p == "ghost"));
        assert_eq!(err.to_string(), "parent ghost is not defined");
        assert!(!registry.exists("x"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.templates(), &before);
    }

    #[test]
    fn test_redefinition_keeps_position() {
        let mut registry = tree_registry();
        registry.define("a", vec![], decl("A", "a")).unwrap();
        registry.define("b", vec![], decl("B", "b")).unwrap();
        registry.define("a", vec![], decl("A2", "a")).unwrap();

        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.templates()[0]["desc"], Value::from("A2"));
    }

    #[test]
    fn test_redefining_root_as_child() {
        let mut registry = tree_registry();
        registry.define("a", vec![], decl("A", "a")).unwrap();
        registry.define("b", vec![], decl("B", "b")).unwrap();
        registry.define("b", parents(&["a"]), decl("B", "b")).unwrap();

        assert_eq!(registry.roots(), vec!["a"]);
        assert_eq!(registry.templates().len(), 1);
        assert_eq!(registry.templates()[0]["children"][0]["desc"], Value::from("B"));
    }

    #[test]
    fn test_cycle_is_rejected_and_rolled_back() {
        let mut registry = tree_registry();
        registry.define("r", vec![], decl("R", "r")).unwrap();
        registry.define("a", parents(&["r"]), decl("A", "a")).unwrap();
        registry.define("b", parents(&["a"]), decl("B", "b")).unwrap();
        let before = registry.templates().clone();

        let err = registry.define("a", parents(&["r", "b"]), decl("A", "a")).unwrap_err();

        assert!(matches!(err, CaptureError::CyclicGraph { .. }));
        assert_eq!(registry.get("a").unwrap().parents, parents(&["r"]));
        assert_eq!(registry.templates(), &before);
    }

    #[test]
    fn test_new_name_rolled_back_on_failure() {
        struct Failing;
        impl TemplateCompiler for Failing {
            type Output = usize;
            fn compile(&self, trees: &[CaptureTree]) -> Result<usize, CompileError> {
                if trees.len() > 1 {
                    return Err(CompileError::new("second", "too many"));
                }
                Ok(trees.len())
            }
        }

        let mut registry = CaptureRegistry::with_compiler(Failing);
        registry.define("a", vec![], decl("A", "a")).unwrap();
        registry.define("z", vec![], decl("Z", "z")).unwrap_err();

        assert_eq!(registry.names(), vec!["a"]);
        assert_eq!(*registry.templates(), 1);
    }

    #[test]
    fn test_remove_unknown() {
        let mut registry = tree_registry();
        registry.define("p", vec![], decl("Parent", "p")).unwrap();
        registry.define("c", parents(&["p"]), decl("Child", "c")).unwrap();
        let names_before: Vec<String> = registry.names().iter().map(|n| n.to_string()).collect();
        let templates_before = registry.templates().clone();

        let err = registry.remove("ghost").unwrap_err();

        assert!(matches!(err, CaptureError::UnknownName(n) if n == "ghost"));
        assert_eq!(registry.names(), names_before);
        assert_eq!(registry.templates(), &templates_before);
    }

    #[test]
    fn test_desc_clause_does_not_replace_description() {
        let mut registry = tree_registry();
        registry
            .define("a", vec![], Declaration::new("Real").with("keys", "a").with("desc", "Body"))
            .unwrap();

        assert_eq!(registry.templates(), &vec![json!({"desc": "Real", "keys": "a"})]);
        let tree = registry.export("a").unwrap();
        assert_eq!(tree.to_value()["desc"], json!("Real"));
        // The clause itself is kept on the record for re-declaration.
        let def = registry.generate_definition("a").unwrap();
        assert_eq!(def.body.get("desc"), Some(&json!("Body")));
    }

    #[test]
    fn test_remove_parent_orphans_children() {
        let mut registry = tree_registry();
        registry.define("p", vec![], decl("Parent", "p")).unwrap();
        registry.define("c", parents(&["p"]), decl("Child", "c")).unwrap();
        registry.define("q", vec![], decl("Other", "q")).unwrap();

        registry.remove("p").unwrap();

        assert!(registry.exists("c"));
        assert_eq!(registry.orphans(), vec!["c"]);
        assert_eq!(registry.templates(), &vec![json!({"desc": "Other", "keys": "q"})]);

        // Orphans stay removable.
        registry.remove("c").unwrap();
        assert_eq!(registry.names(), vec!["q"]);
    }

    #[test]
    fn test_orphan_reattaches_when_parent_returns() {
        let mut registry = tree_registry();
        registry.define("p", vec![], decl("Parent", "p")).unwrap();
        registry.define("c", parents(&["p"]), decl("Child", "c")).unwrap();
        registry.remove("p").unwrap();
        registry.define("p", vec![], decl("Parent", "p")).unwrap();

        assert!(registry.orphans().is_empty());
        assert_eq!(registry.children_of("p"), vec!["c"]);
    }

    #[test]
    fn test_export_and_generate_unknown() {
        let registry = tree_registry();
        assert!(registry.export("ghost").is_none());
        assert!(registry.generate_definition("ghost").is_none());
        assert!(registry.try_export("ghost").unwrap().is_none());
    }

    #[test]
    fn test_generate_definition_roundtrip() {
        let mut registry = tree_registry();
        registry.define("p", vec![], decl("Parent", "p")).unwrap();
        registry
            .define("c", parents(&["p"]), decl("Child", "c").with("file", "inbox.org"))
            .unwrap();

        let def = registry.generate_definition("c").unwrap();
        assert_eq!(def.parents, parents(&["p"]));

        let original = registry.get("c").unwrap().clone();
        registry.remove("c").unwrap();
        registry.define_from(&def).unwrap();
        assert_eq!(registry.get("c").unwrap(), &original);
    }

    #[test]
    fn test_reset() {
        let mut registry = tree_registry();
        registry.define("p", vec![], decl("Parent", "p")).unwrap();
        registry.reset().unwrap();
        assert!(registry.is_empty());
        assert!(registry.templates().is_empty());
    }
}
