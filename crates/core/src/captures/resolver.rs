//! Parent/child resolution over the capture records.
//!
//! Children are never stored. They are recomputed on every call by scanning
//! the records for those listing the name as a parent, in registry order.

use indexmap::IndexMap;

use super::types::{CaptureError, CaptureRecord, CaptureTree};

/// Records keyed by capture name, in insertion order.
pub type Records = IndexMap<String, CaptureRecord>;

/// Names of every record listing `name` as a parent.
pub fn children_of<'a>(records: &'a Records, name: &str) -> Vec<&'a str> {
    records
        .values()
        .filter(|r| r.has_parent(name))
        .map(|r| r.name.as_str())
        .collect()
}

/// Resolve `name` into a nested declaration tree.
///
/// Fails with [`CaptureError::CyclicGraph`] when a name is met again while
/// it is still being resolved. A capture reachable through two parents is
/// embedded under both.
pub fn resolve(records: &Records, name: &str) -> Result<CaptureTree, CaptureError> {
    let mut path = Vec::new();
    resolve_inner(records, name, &mut path)
}

fn resolve_inner<'a>(
    records: &'a Records,
    name: &'a str,
    path: &mut Vec<&'a str>,
) -> Result<CaptureTree, CaptureError> {
    let record =
        records.get(name).ok_or_else(|| CaptureError::UnknownName(name.to_string()))?;

    if let Some(start) = path.iter().position(|n| *n == name) {
        let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
        cycle.push(name.to_string());
        return Err(CaptureError::CyclicGraph { cycle });
    }

    path.push(record.name.as_str());
    let mut children = Vec::new();
    for child in children_of(records, name) {
        children.push(resolve_inner(records, child, path)?);
    }
    path.pop();

    Ok(CaptureTree {
        name: record.name.clone(),
        declaration: record.declaration.clone(),
        children,
    })
}

/// Resolve every root record (`is_child == false`), in registry order.
pub fn resolve_roots(records: &Records) -> Result<Vec<CaptureTree>, CaptureError> {
    records
        .values()
        .filter(|r| !r.is_child)
        .map(|r| resolve(records, &r.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captures::types::Declaration;

    fn records(entries: &[(&str, &[&str])]) -> Records {
        entries
            .iter()
            .map(|(name, parents)| {
                let parents = parents.iter().map(|p| p.to_string()).collect();
                let record = CaptureRecord::new(*name, parents, Declaration::new(*name));
                (name.to_string(), record)
            })
            .collect()
    }

    fn names(tree: &CaptureTree) -> Vec<&str> {
        tree.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_children_in_registry_order() {
        let recs = records(&[("p", &[]), ("b", &["p"]), ("a", &["p"]), ("x", &[])]);
        assert_eq!(children_of(&recs, "p"), vec!["b", "a"]);
        assert!(children_of(&recs, "x").is_empty());
    }

    #[test]
    fn test_leaf_is_bare_declaration() {
        let recs = records(&[("p", &[])]);
        let tree = resolve(&recs, "p").unwrap();
        assert!(!tree.has_children());
        assert_eq!(tree.declaration, Declaration::new("p"));
    }

    #[test]
    fn test_nested_resolution() {
        let recs = records(&[("p", &[]), ("c", &["p"]), ("g", &["c"])]);
        let tree = resolve(&recs, "p").unwrap();
        assert_eq!(names(&tree), vec!["c"]);
        assert_eq!(names(&tree.children[0]), vec!["g"]);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let recs = records(&[("a", &[]), ("b", &[]), ("d", &["a", "b"])]);
        let roots = resolve_roots(&recs).unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(names(&roots[0]), vec!["d"]);
        assert_eq!(names(&roots[1]), vec!["d"]);
    }

    #[test]
    fn test_self_parent_is_cycle() {
        let recs = records(&[("a", &["a"])]);
        let err = resolve(&recs, "a").unwrap_err();
        match err {
            CaptureError::CyclicGraph { cycle } => assert_eq!(cycle, vec!["a", "a"]),
            other => panic!("expected CyclicGraph, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_below_root_names_the_loop() {
        let recs = records(&[("r", &[]), ("a", &["r", "b"]), ("b", &["a"])]);
        let err = resolve_roots(&recs).unwrap_err();
        match err {
            CaptureError::CyclicGraph { cycle } => assert_eq!(cycle, vec!["a", "b", "a"]),
            other => panic!("expected CyclicGraph, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_name() {
        let recs = records(&[]);
        let result = resolve(&recs, "ghost");
        assert!(matches!(result, Err(CaptureError::UnknownName(n)) if n == "ghost"));
    }
}
