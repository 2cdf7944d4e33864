//! Run configuration: which tool to start, which image to read, where
//! results go and how many dump workers to use.

mod defaults;
mod loader;
mod validator;

pub use defaults::{default_config, ConfigDefaults};
pub use loader::{load_config, ConfigError, ConfigLoader};
pub use loader::{Config, ExecutionConfig, ImageConfig, LoggingConfig, OutputConfig, ToolConfig};
pub use validator::{validate_config, ConfigValidator};

pub type ConfigResult<T> = Result<T, ConfigError>;
