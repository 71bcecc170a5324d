use std::path::Path;

use super::load_registry;

pub fn run(config: Option<&Path>, name: &str) {
    let (_, registry) = load_registry(config, "export");

    let tree = match registry.try_export(name) {
        Ok(Some(tree)) => tree,
        Ok(None) => {
            println!("FAIL capdef export");
            println!("capture {name} is not defined");
            std::process::exit(1);
        }
        Err(e) => {
            println!("FAIL capdef export");
            println!("{e}");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&tree) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            println!("FAIL capdef export");
            println!("{e}");
            std::process::exit(1);
        }
    }
}
