//! Quarry CLI — the command-line interface for the Quarry metadata tool.
//!
//! Provides `quarry init` for project scaffolding, `quarry build` for
//! incremental metadata extraction, and `quarry clean` for dropping the
//! build cache.

#![warn(missing_docs)]

mod build;
mod clean;
mod init;
mod project;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Quarry — an incremental API metadata extractor for .NET workspaces.
#[derive(Parser, Debug)]
#[command(name = "quarry", version, about = "Quarry metadata build tool")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output (include informational progress).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `quarry.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract metadata for the configured targets.
    Build(BuildArgs),
    /// Create a new Quarry project configuration.
    Init {
        /// Project name (creates a subdirectory). If omitted, initializes
        /// in the current directory.
        name: Option<String>,
    },
    /// Delete the build cache.
    Clean,
}

/// Arguments for the `quarry build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Target name to build. Builds every configured target if omitted.
    #[arg(short, long)]
    pub target: Option<String>,

    /// Ignore both cache tiers and rebuild everything.
    #[arg(short, long)]
    pub force: bool,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print informational progress.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::env::var("TERM").is_ok(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Init { name } => init::run(name),
        Command::Clean => clean::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
