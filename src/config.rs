use crate::error::{CertSplitError, Result};
use crate::sink::SinkMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reserved input source name for standard input.
pub const STDIN_SOURCE: &str = "-";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub bare: bool,
    pub source: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub base_name: String,
    pub directory: PathBuf,
    pub stdout: bool,
    pub json: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            bare: false,
            source: STDIN_SOURCE.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_name: "cert".to_string(),
            directory: PathBuf::from("."),
            stdout: false,
            json: false,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CertSplitError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CertSplitError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| CertSplitError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["certsplit.toml", ".certsplit.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if cli_args.bare {
            self.input.bare = true;
        }

        if let Some(ref source) = cli_args.source {
            self.input.source = source.clone();
        }

        if let Some(ref base_name) = cli_args.base_name {
            self.output.base_name = base_name.clone();
        }

        if let Some(ref directory) = cli_args.directory {
            self.output.directory = directory.clone();
        }

        if cli_args.stdout {
            self.output.stdout = true;
        }

        if cli_args.json {
            self.output.json = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.source.is_empty() {
            return Err(CertSplitError::Config {
                message: "Input source must not be empty (use \"-\" for standard input)".to_string(),
            });
        }

        if self.output.base_name.is_empty() {
            return Err(CertSplitError::Config {
                message: "Output base name must not be empty".to_string(),
            });
        }

        // Only file output touches the directory.
        if self.sink_mode() == SinkMode::Files && !self.output.directory.is_dir() {
            return Err(CertSplitError::Config {
                message: format!(
                    "Output directory does not exist: {}",
                    self.output.directory.display()
                ),
            });
        }

        Ok(())
    }

    pub fn sink_mode(&self) -> SinkMode {
        SinkMode::from_flags(self.output.stdout, self.output.json)
    }

    pub fn reads_stdin(&self) -> bool {
        self.input.source == STDIN_SOURCE
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub bare: bool,
    pub source: Option<String>,
    pub base_name: Option<String>,
    pub directory: Option<PathBuf>,
    pub stdout: bool,
    pub json: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bare(mut self, bare: bool) -> Self {
        self.bare = bare;
        self
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    pub fn with_base_name(mut self, base_name: Option<String>) -> Self {
        self.base_name = base_name;
        self
    }

    pub fn with_directory(mut self, directory: Option<PathBuf>) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_stdout(mut self, stdout: bool) -> Self {
        self.stdout = stdout;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}
