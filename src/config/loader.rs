//! TOML configuration for a run
//!
//! Every section and field is optional; anything missing falls back to
//! the values in [`default_config`].

use super::defaults::default_config;
use crate::core::types::Profile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading, writing or checking a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for one run against one memory image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_tool")]
    pub tool: ToolConfig,

    #[serde(default = "default_image")]
    pub image: ImageConfig,

    #[serde(default = "default_output")]
    pub output: OutputConfig,

    #[serde(default = "default_execution")]
    pub execution: ExecutionConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// How the analysis tool is started
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Program spawned for every invocation, e.g. the Python interpreter
    #[serde(default = "default_runner")]
    pub runner: String,
    /// Entry script passed as the runner's first argument
    #[serde(default = "default_binary")]
    pub binary: String,
}

/// The memory image under analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_image_path")]
    pub path: PathBuf,
    #[serde(default = "default_profile")]
    pub profile: String,
}

/// Where artifacts and results are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_folder")]
    pub folder: PathBuf,
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: String,
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: String,
    #[serde(default = "default_analytics_dir")]
    pub analytics_dir: String,
}

/// Re-run and concurrency settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default = "default_force_rerun")]
    pub force_rerun: bool,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Where log lines go and how verbose they are
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file; empty logs to stderr
    #[serde(default = "default_log_file")]
    pub file: String,
}

impl Config {
    /// Directory holding one text artifact per plugin
    pub fn artifacts_path(&self) -> PathBuf {
        self.output.folder.join(&self.output.artifacts_dir)
    }

    /// Directory for output of unnamed invocations
    pub fn scratch_path(&self) -> PathBuf {
        self.output.folder.join(&self.output.scratch_dir)
    }

    /// Directory for derived results
    pub fn analytics_path(&self) -> PathBuf {
        self.output.folder.join(&self.output.analytics_dir)
    }

    pub fn profile(&self) -> Profile {
        Profile::new(self.image.profile.clone())
    }
}

/// Reads and writes a configuration file
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Parses the file, failing if it does not exist
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Like [`ConfigLoader::load`] but any failure yields the defaults
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|_| Config::default())
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Reads `vola-auto.toml` from the working directory, or the defaults
pub fn load_config() -> Result<Config, ConfigError> {
    let loader = ConfigLoader::new("vola-auto.toml");
    Ok(loader.load_or_default())
}

// Section defaults used by serde
fn default_tool() -> ToolConfig {
    let defaults = default_config();
    ToolConfig {
        runner: defaults.tool.runner,
        binary: defaults.tool.binary,
    }
}

fn default_image() -> ImageConfig {
    let defaults = default_config();
    ImageConfig {
        path: PathBuf::from(defaults.image.path),
        profile: defaults.image.profile,
    }
}

fn default_output() -> OutputConfig {
    let defaults = default_config();
    OutputConfig {
        folder: PathBuf::from(defaults.output.folder),
        artifacts_dir: defaults.output.artifacts_dir,
        scratch_dir: defaults.output.scratch_dir,
        analytics_dir: defaults.output.analytics_dir,
    }
}

fn default_execution() -> ExecutionConfig {
    let defaults = default_config();
    ExecutionConfig {
        force_rerun: defaults.execution.force_rerun,
        workers: defaults.execution.workers,
    }
}

fn default_logging() -> LoggingConfig {
    let defaults = default_config();
    LoggingConfig {
        level: defaults.logging.level,
        file: defaults.logging.file,
    }
}

fn default_runner() -> String {
    default_config().tool.runner
}

fn default_binary() -> String {
    default_config().tool.binary
}

fn default_image_path() -> PathBuf {
    PathBuf::from(default_config().image.path)
}

fn default_profile() -> String {
    default_config().image.profile
}

fn default_output_folder() -> PathBuf {
    PathBuf::from(default_config().output.folder)
}

fn default_artifacts_dir() -> String {
    default_config().output.artifacts_dir
}

fn default_scratch_dir() -> String {
    default_config().output.scratch_dir
}

fn default_analytics_dir() -> String {
    default_config().output.analytics_dir
}

fn default_force_rerun() -> bool {
    default_config().execution.force_rerun
}

fn default_workers() -> usize {
    default_config().execution.workers
}

fn default_log_level() -> String {
    default_config().logging.level
}

fn default_log_file() -> String {
    default_config().logging.file
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tool: default_tool(),
            image: default_image(),
            output: default_output(),
            execution: default_execution(),
            logging: default_logging(),
        }
    }
}
