//! schmid-rules CLI tool.
//!
//! Usage:
//! ```bash
//! schmid-rules assert [OPTIONS]
//! schmid-rules export [OPTIONS]
//! ```

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use schmid_rules_core::{AssertSettings, ExportSettings, DEFAULT_CONFIGURATION_FILE_NAME};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod project_source;

/// Build-time architecture rule assertions and XMI export
#[derive(Parser)]
#[command(name = "schmid-rules")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the project descriptor (default: ./schmid-project.toml if present)
    #[arg(long, global = true, env = "SCHMID_RULES_PROJECT")]
    project: Option<PathBuf>,

    /// Rule configuration file name or path
    #[arg(
        short,
        long,
        global = true,
        env = "SCHMID_RULES_CONFIG",
        default_value = DEFAULT_CONFIGURATION_FILE_NAME
    )]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the architecture rules and fail the build on errors
    Assert {
        /// Only run on the execution root of a multi-module run
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        skip_root: bool,

        /// Fail when at least one error-severity violation is found
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        fail_on_error: bool,

        /// Skip the check entirely
        #[arg(long)]
        skip: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Export the rule model as an XMI file
    #[command(alias = "create-xmi")]
    Export {
        /// Output file name (default: <project identifier>.xml)
        #[arg(short, long)]
        output: Option<String>,

        /// Output directory (default: the project's build directory)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Only run on the execution root of a multi-module run
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        skip_root: bool,
    },
}

/// Output format for the violation report.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // --verbose wins over RUST_LOG; otherwise RUST_LOG, then info
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let source = project_source::resolve(cli.project.as_deref())?;
    let project = source.load()?;

    match cli.command {
        Commands::Assert {
            skip_root,
            fail_on_error,
            skip,
            format,
        } => {
            let settings = AssertSettings {
                config_name: cli.config,
                skip_root,
                fail_on_error,
                skip,
            };
            commands::assert::run(&project, settings, format)
        }
        Commands::Export {
            output,
            output_dir,
            skip_root,
        } => {
            let settings = ExportSettings {
                config_name: cli.config,
                output,
                output_dir,
                skip_root,
            };
            commands::export::run(&project, settings)
        }
    }
}
