//! List declared captures.

use std::path::Path;

use capdef_core::captures::CaptureRegistry;
use tabled::{Table, Tabled, settings::Style};

use super::load_registry;

/// Row for the capture list table.
#[derive(Tabled)]
struct CaptureRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: &'static str,
    #[tabled(rename = "Parents")]
    parents: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn run(config: Option<&Path>) {
    let (_, registry) = load_registry(config, "list");

    if registry.is_empty() {
        println!("(no captures declared)");
        return;
    }

    let rows = rows(&registry);
    println!("{}", Table::new(&rows).with(Style::rounded()));
    println!("-- {} captures --", rows.len());
}

fn rows(registry: &CaptureRegistry) -> Vec<CaptureRow> {
    let orphans = registry.orphans();
    registry
        .records()
        .map(|r| {
            let role = if !r.is_child {
                "root"
            } else if orphans.contains(&r.name.as_str()) {
                "orphan"
            } else {
                "child"
            };
            CaptureRow {
                name: r.name.clone(),
                role,
                parents: r.parents.join(", "),
                description: r.declaration.description.clone(),
            }
        })
        .collect()
}
