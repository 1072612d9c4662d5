//! Generate command implementation.
//!
//! Runs one generation cycle against the configured backend: fetch the
//! schema (or its cached copy), write `eps.json` and the declaration file,
//! and print the run report.

use super::config::{apply_input_dir, input_dir_from_env};
use anyhow::{Context, Result};
use epsgen_codegen::{EpsGenerator, GenerationOutcome};
use crate::{ExitCode, OutputFormat};
use epsgen_core::{GeneratorConfig, Target};
use epsgen_schema::{HttpTransport, SchemaTransport};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOverrides {
    /// Target platform.
    pub target: Option<Target>,
    /// Backend base URL.
    pub req_url: Option<String>,
    /// Output directory.
    pub dist: Option<PathBuf>,
    /// Schema endpoint override.
    pub api: Option<String>,
}

impl GenerateOverrides {
    /// Applies the set values to `config`.
    pub fn apply(self, config: &mut GeneratorConfig) {
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(req_url) = self.req_url {
            config.req_url = req_url;
        }
        if let Some(dist) = self.dist {
            config.eps.dist = dist;
        }
        if let Some(api) = self.api {
            config.eps.api = api;
        }
    }
}

/// Printed when a run produced no report.
#[derive(Debug, Serialize)]
struct Skipped {
    status: &'static str,
    reason: &'static str,
}

/// Runs the generate command against the HTTP backend.
pub async fn run(
    mut config: GeneratorConfig,
    overrides: GenerateOverrides,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    overrides.apply(&mut config);
    apply_input_dir(&mut config, input_dir_from_env());
    run_with(config, HttpTransport::new(), output_format).await
}

/// Runs the generate command with an explicit transport.
pub async fn run_with<T: SchemaTransport>(
    config: GeneratorConfig,
    transport: T,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    if config.req_url.is_empty() {
        warn!("req_url is empty; only the local cache can be used");
    }

    let generator = match EpsGenerator::new(config, transport) {
        Ok(generator) => generator,
        Err(e) if e.is_config_error() => {
            error!("{e}");
            return Ok(ExitCode::InvalidInput);
        }
        Err(e) => return Err(e).context("failed to initialize generator"),
    };

    let printed = match generator.generate().await {
        Ok(GenerationOutcome::Completed(report)) => {
            info!(
                entities = report.entity_count,
                written = report.declaration_written,
                "generation complete"
            );
            crate::formatters::format_output(&report, output_format)?
        }
        Ok(GenerationOutcome::Disabled) => crate::formatters::format_output(
            &Skipped {
                status: "skipped",
                reason: "eps generation is disabled",
            },
            output_format,
        )?,
        Ok(GenerationOutcome::Coalesced) => crate::formatters::format_output(
            &Skipped {
                status: "coalesced",
                reason: "a run was already in flight",
            },
            output_format,
        )?,
        Err(e) if e.is_invariant_violation() => {
            error!("generation aborted: {e}");
            return Ok(ExitCode::GenerationFailed);
        }
        Err(e) => return Err(e).context("generation failed"),
    };

    println!("{printed}");
    Ok(ExitCode::Success)
}
