use std::path::Path;

use capdef_core::captures::CaptureDefinition;
use serde::Serialize;

use super::load_registry;

/// Wrapper so the output is a ready-to-paste `[[captures]]` entry.
#[derive(Serialize)]
struct Entry<'a> {
    captures: [&'a CaptureDefinition; 1],
}

pub fn run(config: Option<&Path>, name: &str) {
    let (_, registry) = load_registry(config, "definition");

    let Some(def) = registry.generate_definition(name) else {
        println!("FAIL capdef definition");
        println!("capture {name} is not defined");
        std::process::exit(1);
    };

    match toml::to_string(&Entry { captures: [&def] }) {
        Ok(text) => print!("{text}"),
        Err(e) => {
            println!("FAIL capdef definition");
            println!("{e}");
            std::process::exit(1);
        }
    }
}
