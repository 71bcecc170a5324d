pub mod definition;
pub mod doctor;
pub mod export;
pub mod list;
pub mod templates;

use capdef_core::captures::CaptureRegistry;
use capdef_core::compiler::OrgTemplateCompiler;
use capdef_core::config::{ConfigLoader, ResolvedConfig, default_config_path};
use std::path::Path;

/// Load config, install logging and declare every configured capture.
///
/// Prints a `FAIL` report and exits on error.
pub fn load_registry(config: Option<&Path>, command: &str) -> (ResolvedConfig, CaptureRegistry) {
    let rc = match ConfigLoader::load(config) {
        Ok(rc) => rc,
        Err(e) => {
            println!("FAIL capdef {command}");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    };

    crate::logging::init(&rc);

    match rc.build_registry(OrgTemplateCompiler) {
        Ok(registry) => (rc, registry),
        Err(e) => {
            println!("FAIL capdef {command}");
            println!("{e}");
            std::process::exit(1);
        }
    }
}
