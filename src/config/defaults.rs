//! Default configuration values for Vola-Auto

use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub tool: ToolDefaults,
    pub image: ImageDefaults,
    pub output: OutputDefaults,
    pub execution: ExecutionDefaults,
    pub logging: LoggingDefaults,
}

/// Default tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefaults {
    pub runner: String,
    pub binary: String,
}

/// Default image configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDefaults {
    pub path: String,
    pub profile: String,
}

/// Default output layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDefaults {
    pub folder: String,
    pub artifacts_dir: String,
    pub scratch_dir: String,
    pub analytics_dir: String,
}

/// Default execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionDefaults {
    pub force_rerun: bool,
    pub workers: usize,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
    pub file: String,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        tool: ToolDefaults {
            runner: "python3".to_string(),
            binary: "vol.py".to_string(),
        },
        image: ImageDefaults {
            path: String::new(),
            profile: "win10".to_string(),
        },
        output: OutputDefaults {
            folder: "vola-output".to_string(),
            artifacts_dir: "artifacts".to_string(),
            scratch_dir: "batch".to_string(),
            analytics_dir: "analytics".to_string(),
        },
        execution: ExecutionDefaults {
            force_rerun: false,
            workers: num_cpus::get().min(8),
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
            file: String::new(), // stderr
        },
    }
}
