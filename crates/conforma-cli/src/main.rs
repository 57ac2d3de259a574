mod rules;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process;

use rules::{BuildRule, run_rules};

/// Run build rules described by a YAML configuration file
#[derive(Parser, Debug)]
#[command(name = "conforma")]
#[command(about = "Schema-checked, YAML-driven build rule runner", long_about = None)]
struct Args {
    /// YAML configuration file with the build rules
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write an example configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    emit_example: Option<PathBuf>,

    /// Print each rule's command instead of running it
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.emit_example {
        let example = conforma_schema::emit_example(&BuildRule::list_schema());
        fs::write(path, example)
            .with_context(|| format!("failed to write example to {}", path.display()))?;
        eprintln!("Wrote example configuration to {}", path.display());
        return Ok(());
    }

    let Some(config) = &args.config else {
        anyhow::bail!("either --config or --emit-example is required");
    };

    // The decode resolves computed functions (Wildcard, Matrix, the
    // file-path queries) before the rules ever run.
    let document = conforma_schema::load(&BuildRule::list_schema(), config)
        .with_context(|| format!("failed to load rules from {}", config.display()))?;
    let rules = BuildRule::from_document(&document)?;

    eprintln!("Loaded {} rules from {}", rules.len(), config.display());
    run_rules(&rules, args.dry_run)
}
