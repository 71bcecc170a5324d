use std::path::Path;

use super::load_registry;

pub fn run(config: Option<&Path>) {
    let (rc, registry) = load_registry(config, "doctor");

    let orphans = registry.orphans();

    println!("OK   capdef doctor");
    println!("path: {}", rc.path.display());
    println!("version: {}", capdef_core::version());
    println!("captures: {}", registry.len());
    println!("roots: {}", registry.roots().len());
    if orphans.is_empty() {
        println!("orphans: 0");
    } else {
        println!("orphans: {} ({})", orphans.len(), orphans.join(", "));
    }
    println!("templates: {}", registry.templates().len());
}
