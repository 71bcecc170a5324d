use std::path::Path;

use super::load_registry;

pub fn run(config: Option<&Path>, json: bool) {
    let (_, registry) = load_registry(config, "templates");
    let templates = registry.templates();

    if json {
        match serde_json::to_string_pretty(templates) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                println!("FAIL capdef templates");
                println!("{e}");
                std::process::exit(1);
            }
        }
        return;
    }

    if templates.is_empty() {
        println!("(no templates generated)");
        return;
    }
    for t in templates {
        println!("{}", t.render());
    }
    println!("-- {} templates --", templates.len());
}
