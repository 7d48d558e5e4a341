use crate::core::config::data::{path_display, Config};
use directories::BaseDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const APP_NAME: &str = "yoo";
const CONFIG_FILE_NAME: &str = "config.yml";

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// No home directory could be determined for the current user.
    NoHomeDir,

    /// The configuration file does not exist.
    Missing {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Failed to read the configuration file from disk.
    Read {
        /// Path to the configuration file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid YAML.
    Parse {
        /// Path to the configuration file with invalid YAML.
        path: PathBuf,
        /// The YAML deserialization error.
        source: serde_yaml::Error,
    },

    /// Neither the config file nor the environment provides an API key.
    MissingApiKey,
}

impl ConfigError {
    fn display_path(path: &Path) -> String {
        path_display(path)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoHomeDir => write!(
                f,
                "{APP_NAME} keeps its configuration in the home directory, and no home directory was found"
            ),
            ConfigError::Missing { path } => write!(
                f,
                "{APP_NAME} depends on {}, and it was not found",
                Self::display_path(path)
            ),
            ConfigError::Read { path, source } => {
                write!(
                    f,
                    "Failed to read config at {}: {}",
                    Self::display_path(path),
                    source
                )
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse config at {}: {}",
                    Self::display_path(path),
                    source
                )
            }
            ConfigError::MissingApiKey => write!(
                f,
                "No API key configured. Set secrets.openai-key in the config file or export OPENAI_API_KEY"
            ),
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::NoHomeDir | ConfigError::Missing { .. } | ConfigError::MissingApiKey => {
                None
            }
        }
    }
}

/// Filesystem locations the application reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub home: PathBuf,
    pub config_file: PathBuf,
    /// Directory holding persona system-prompt files
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    /// Resolve paths relative to the current user's home directory.
    pub fn resolve(config_override: Option<&Path>) -> Result<Self, ConfigError> {
        let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::from_home(base_dirs.home_dir(), config_override))
    }

    /// `~/.config/yoo/config.yml` and `~/.yoo/` unless a config file is given,
    /// in which case persona prompts are read from that file's directory.
    pub fn from_home(home: &Path, config_override: Option<&Path>) -> Self {
        let default_config_dir = home.join(".config").join(APP_NAME);
        let (config_file, config_dir) = match config_override {
            Some(path) => {
                let dir = path
                    .parent()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                (path.to_path_buf(), dir)
            }
            None => (
                default_config_dir.join(CONFIG_FILE_NAME),
                default_config_dir,
            ),
        };

        Self {
            home: home.to_path_buf(),
            config_file,
            config_dir,
            log_dir: home.join(format!(".{APP_NAME}")),
        }
    }

    pub fn system_prompt_path(&self, persona_name: &str) -> PathBuf {
        self.config_dir.join(format!("{persona_name}.txt"))
    }
}

impl Config {
    /// Load the config file, failing when it does not exist.
    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::Missing {
                path: config_path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, config_path)
    }

    /// Load the config file, treating a missing file as an empty config.
    pub fn load_or_default(config_path: &Path) -> Result<Config, ConfigError> {
        match Self::load_from_path(config_path) {
            Err(ConfigError::Missing { .. }) => Ok(Config::default()),
            other => other,
        }
    }

    fn parse(contents: &str, config_path: &Path) -> Result<Config, ConfigError> {
        // An empty YAML document deserializes as unit, not as an empty mapping.
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = serde_yaml::to_string(self)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };

        temp_file.write_all(contents.as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file
            .persist(config_path)
            .map_err(|err| -> Box<dyn std::error::Error> { Box::new(err) })?;
        Ok(())
    }
}
