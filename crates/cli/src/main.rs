//! `pyts` command line: generate TypeScript bindings from a probe manifest.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use pyts_core::{GenerateConfig, generate};

#[derive(Parser, Debug)]
#[command(name = "pyts", version, about = "Typed TypeScript bindings for Python libraries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a bindings tree from an introspection manifest.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Path to the manifest JSON produced by the introspection probe.
    #[arg(long, short = 'm')]
    manifest: PathBuf,

    /// Destination directory for the generated tree.
    #[arg(long, short = 'o')]
    out_dir: PathBuf,

    /// Module specifier the generated code imports the runtime from.
    #[arg(long, default_value = "@pyts/runtime")]
    runtime_import: String,

    /// Dotted prefix to strip from the library module path before it
    /// becomes directories.
    #[arg(long)]
    strip_prefix: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter);

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn run_generate(args: &GenerateArgs) -> Result<(), String> {
    let manifest_json = fs::read_to_string(&args.manifest)
        .map_err(|e| format!("failed to read {}: {e}", args.manifest.display()))?;

    let config = GenerateConfig {
        out_dir: args.out_dir.clone(),
        runtime_import: args.runtime_import.clone(),
        strip_prefix: args.strip_prefix.clone(),
    };
    let report = generate(&manifest_json, &config).map_err(|e| e.to_string())?;
    info!(
        written = report.written,
        unchanged = report.unchanged,
        out_dir = %args.out_dir.display(),
        "bindings generated"
    );
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Generate(args) => run_generate(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
