mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "capdef",
    version,
    about = "Declare nested capture templates and keep the template list in sync"
)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and report registry state
    Doctor,

    /// List declared captures with their role (root, child or orphan)
    List,

    /// Print the resolved declaration tree of a capture as JSON
    Export(NameArgs),

    /// Print the re-declarable definition of a capture as TOML
    Definition(NameArgs),

    /// Print the generated capture template list
    Templates(TemplatesArgs),
}

#[derive(Debug, Args)]
pub struct NameArgs {
    /// Capture name
    pub name: String,
}

#[derive(Debug, Args)]
pub struct TemplatesArgs {
    /// Emit JSON instead of list forms
    #[arg(long)]
    pub json: bool,
}

fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(config),
        Commands::List => cmd::list::run(config),
        Commands::Export(args) => cmd::export::run(config, &args.name),
        Commands::Definition(args) => cmd::definition::run(config, &args.name),
        Commands::Templates(args) => cmd::templates::run(config, args.json),
    }
}
