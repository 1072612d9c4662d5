//! Configuration loading and the config command.
//!
//! The configuration is looked up in order:
//! 1. the `--config` path
//! 2. `epsgen.toml` in the working directory
//! 3. `epsgen/config.toml` under the platform config directory
//!    (`~/.config` on Linux)
//!
//! and falls back to defaults when none exists. For client targets the
//! project root defaults to `$UNI_INPUT_DIR`, which the uni-app toolchain
//! sets to the source directory.

use crate::actions::ConfigAction;
use anyhow::{Context, Result};
use epsgen_core::GeneratorConfig;
use crate::{ExitCode, OutputFormat};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project-local configuration file name.
pub const PROJECT_CONFIG_FILE: &str = "epsgen.toml";

/// Environment variable holding the uni-app source directory.
pub const INPUT_DIR_VAR: &str = "UNI_INPUT_DIR";

/// Per-user configuration file, if the platform has a config directory.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("epsgen").join("config.toml"))
}

/// The file configuration is read from, or `None` for defaults.
#[must_use]
pub fn config_source(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let project = PathBuf::from(PROJECT_CONFIG_FILE);
    if project.exists() {
        return Some(project);
    }

    user_config_path().filter(|path| path.exists())
}

/// Parses a TOML configuration file.
pub fn read_config(path: &Path) -> Result<GeneratorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

/// Loads the configuration from the first file found, or defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<GeneratorConfig> {
    match config_source(explicit) {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            read_config(&path)
        }
        None => {
            debug!("no configuration file found, using defaults");
            Ok(GeneratorConfig::default())
        }
    }
}

/// Roots client targets at the uni-app input directory unless the
/// configuration names a root of its own.
pub fn apply_input_dir(config: &mut GeneratorConfig, input_dir: Option<PathBuf>) {
    if !config.target.is_client() || config.root_dir != Path::new(".") {
        return;
    }
    if let Some(dir) = input_dir.filter(|dir| !dir.as_os_str().is_empty()) {
        debug!(root = %dir.display(), "using {INPUT_DIR_VAR} as project root");
        config.root_dir = dir;
    }
}

/// Input directory from the environment.
#[must_use]
pub fn input_dir_from_env() -> Option<PathBuf> {
    std::env::var_os(INPUT_DIR_VAR).map(PathBuf::from)
}

/// Result of `config init`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InitResult {
    /// Whether a file was written.
    pub created: bool,
    /// Status message.
    pub message: String,
    /// Target path.
    pub path: String,
}

/// Runs the config command.
pub fn run(
    action: ConfigAction,
    explicit: Option<&Path>,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    match action {
        ConfigAction::Init { force } => {
            let path = explicit.map_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE), Path::to_path_buf);
            let result = init_config(&path, force)?;
            println!("{}", crate::formatters::format_output(&result, output_format)?);
            Ok(ExitCode::Success)
        }
        ConfigAction::Show => {
            let mut config = load_config(explicit)?;
            apply_input_dir(&mut config, input_dir_from_env());
            println!("{}", crate::formatters::format_output(&config, output_format)?);
            Ok(ExitCode::Success)
        }
    }
}

/// Writes a default configuration to `path`. An existing file is kept
/// unless `force` is set.
pub fn init_config(path: &Path, force: bool) -> Result<InitResult> {
    if path.exists() && !force {
        return Ok(InitResult {
            created: false,
            message: "configuration file already exists (use --force to overwrite)".to_string(),
            path: path.display().to_string(),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(&GeneratorConfig::default())
        .context("failed to serialize default configuration")?;
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), "wrote default configuration");

    Ok(InitResult {
        created: true,
        message: "configuration file created with default values".to_string(),
        path: path.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use epsgen_core::Target;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(PROJECT_CONFIG_FILE);

        let result = init_config(&path, false).unwrap();
        assert!(result.created);
        assert_eq!(read_config(&path).unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        fs::write(&path, "target = \"app\"\n").unwrap();

        assert!(!init_config(&path, false).unwrap().created);
        assert_eq!(read_config(&path).unwrap().target, Target::App);

        assert!(init_config(&path, true).unwrap().created);
        assert_eq!(read_config(&path).unwrap().target, Target::Admin);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        fs::write(
            &path,
            "req_url = \"http://127.0.0.1:8001\"\n\n[tailwind]\nrem_unit = 16.0\n\n[[eps.mapping]]\ntype = \"number\"\ntest = [\"smallint\"]\n",
        )
        .unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.req_url, "http://127.0.0.1:8001");
        assert!((config.tailwind.rem_unit - 16.0).abs() < f64::EPSILON);
        assert_eq!(config.tailwind.rem_precision, 6);
        assert_eq!(config.eps.mapping[0].target_type, "number");
        assert_eq!(config.eps.timeout_ms, epsgen_core::DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        fs::write(&path, "target = [").unwrap();

        let err = read_config(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn test_explicit_source_wins() {
        let explicit = Path::new("/tmp/custom.toml");
        assert_eq!(config_source(Some(explicit)), Some(explicit.to_path_buf()));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_input_dir_applies_to_client_targets() {
        let mut config = GeneratorConfig {
            target: Target::UniappX,
            ..GeneratorConfig::default()
        };
        apply_input_dir(&mut config, Some(PathBuf::from("/work/src")));
        assert_eq!(config.root_dir, PathBuf::from("/work/src"));

        let mut admin = GeneratorConfig::default();
        apply_input_dir(&mut admin, Some(PathBuf::from("/work/src")));
        assert_eq!(admin.root_dir, PathBuf::from("."));
    }

    #[test]
    fn test_explicit_root_not_overridden() {
        let mut config = GeneratorConfig {
            target: Target::App,
            root_dir: PathBuf::from("/project"),
            ..GeneratorConfig::default()
        };
        apply_input_dir(&mut config, Some(PathBuf::from("/work/src")));
        assert_eq!(config.root_dir, PathBuf::from("/project"));
    }
}
