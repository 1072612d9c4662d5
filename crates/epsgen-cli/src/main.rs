//! `epsgen` command-line interface.
//!
//! Generates TypeScript service declarations from a backend's EPS schema
//! and rewrites Tailwind output for the cross-platform UI target.
//!
//! # Examples
//!
//! ```bash
//! # Generate declarations for the admin console
//! epsgen generate --req-url http://127.0.0.1:8001
//!
//! # Rewrite a page for the cross-platform target
//! epsgen transform src/pages/index.uvue --write
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use epsgen_cli::commands::generate::GenerateOverrides;
use epsgen_cli::commands::rewrite::RewriteKind;
use epsgen_cli::commands::{completions, config, generate, rewrite};
use epsgen_cli::{ConfigAction, TargetArg};
use epsgen_cli::{ExitCode, OutputFormat};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// EPS type generator and Tailwind rewriter.
#[derive(Parser, Debug)]
#[command(name = "epsgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long = "format", global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Configuration file (default: ./epsgen.toml, then the user config)
    #[arg(long, global = true, env = "EPSGEN_CONFIG")]
    config: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate `eps.json` and the service declaration file.
    ///
    /// Fetches the schema from the backend, falling back to the cached
    /// `eps.json` when it is unreachable.
    Generate {
        /// Target platform
        #[arg(long, value_enum)]
        target: Option<TargetArg>,

        /// Backend base URL
        #[arg(long)]
        req_url: Option<String>,

        /// Output directory, relative to the project root
        #[arg(long)]
        dist: Option<PathBuf>,

        /// Schema endpoint override (`admin`, `app`, or a path)
        #[arg(long)]
        api: Option<String>,
    },

    /// Rewrite Tailwind class names in a `.uvue` page.
    Transform {
        /// Page to rewrite
        file: PathBuf,

        /// Update the file instead of printing the result
        #[arg(short, long)]
        write: bool,
    },

    /// Rewrite a stylesheet for the cross-platform style engine.
    Css {
        /// Stylesheet to rewrite
        file: PathBuf,

        /// Update the file instead of printing the result
        #[arg(short, long)]
        write: bool,
    },

    /// Sanitize JSON module keys and pack locale tables.
    Locale {
        /// JSON file to rewrite
        file: PathBuf,

        /// Update the file instead of printing the result
        #[arg(short, long)]
        write: bool,
    },

    /// Manage the configuration file.
    Config {
        /// Configuration action
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let exit_code = execute_command(cli.command, cli.config, cli.format).await?;

    std::process::exit(exit_code.code());
}

/// Installs the stderr subscriber. `--verbose` forces debug level;
/// otherwise `RUST_LOG` applies, defaulting to info.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Routes a command to its handler.
async fn execute_command(
    command: Commands,
    config_path: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let config_path = config_path.as_deref();

    match command {
        Commands::Generate {
            target,
            req_url,
            dist,
            api,
        } => {
            let overrides = GenerateOverrides {
                target: target.map(Into::into),
                req_url,
                dist,
                api,
            };
            let config = config::load_config(config_path)?;
            generate::run(config, overrides, output_format).await
        }
        Commands::Transform { file, write } => {
            let config = config::load_config(config_path)?;
            rewrite::run(RewriteKind::Markup, &file, write, &config, output_format).await
        }
        Commands::Css { file, write } => {
            let config = config::load_config(config_path)?;
            rewrite::run(RewriteKind::Css, &file, write, &config, output_format).await
        }
        Commands::Locale { file, write } => {
            let config = config::load_config(config_path)?;
            rewrite::run(RewriteKind::Locale, &file, write, &config, output_format).await
        }
        Commands::Config { action } => config::run(action, config_path, output_format),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            completions::run(shell, &mut cmd)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_generate() {
        let cli = Cli::parse_from(["epsgen", "generate"]);
        assert!(matches!(cli.command, Commands::Generate { target: None, .. }));
    }

    #[test]
    fn test_cli_parsing_generate_overrides() {
        let cli = Cli::parse_from([
            "epsgen",
            "generate",
            "--target",
            "uniapp-x",
            "--req-url",
            "http://127.0.0.1:8001",
            "--dist",
            "build/eps",
        ]);
        if let Commands::Generate {
            target,
            req_url,
            dist,
            api,
        } = cli.command
        {
            assert_eq!(target, Some(TargetArg::UniappX));
            assert_eq!(req_url.as_deref(), Some("http://127.0.0.1:8001"));
            assert_eq!(dist, Some(PathBuf::from("build/eps")));
            assert!(api.is_none());
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn test_cli_parsing_rewrite_commands() {
        let cli = Cli::parse_from(["epsgen", "transform", "pages/index.uvue", "--write"]);
        assert!(matches!(cli.command, Commands::Transform { write: true, .. }));

        let cli = Cli::parse_from(["epsgen", "css", "app.css"]);
        assert!(matches!(cli.command, Commands::Css { write: false, .. }));

        let cli = Cli::parse_from(["epsgen", "locale", "locale/en.json", "-w"]);
        assert!(matches!(cli.command, Commands::Locale { write: true, .. }));
    }

    #[test]
    fn test_cli_parsing_config() {
        let cli = Cli::parse_from(["epsgen", "config", "init", "--force"]);
        if let Commands::Config { action } = cli.command {
            assert_eq!(action, ConfigAction::Init { force: true });
        } else {
            panic!("Expected Config command");
        }

        let cli = Cli::parse_from(["epsgen", "--config", "custom.toml", "config", "show"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from(["epsgen", "--verbose", "--format", "json", "generate"]);
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(Cli::try_parse_from(["epsgen", "--format", "yaml", "generate"]).is_err());
    }

    #[test]
    fn test_cli_output_format_default() {
        let cli = Cli::parse_from(["epsgen", "generate"]);
        assert_eq!(cli.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_cli_parsing_completions() {
        let cli = Cli::parse_from(["epsgen", "completions", "zsh"]);
        if let Commands::Completions { shell } = cli.command {
            assert_eq!(shell, Shell::Zsh);
        } else {
            panic!("Expected Completions command");
        }
    }

    #[test]
    fn test_invalid_target_rejected() {
        assert!(Cli::try_parse_from(["epsgen", "generate", "--target", "desktop"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
