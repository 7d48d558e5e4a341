//! Runtime settings assembled once at startup.
//!
//! A [`Settings`] value combines the parsed config file, the resolved
//! filesystem paths, the command-line flags, and environment overrides. It is
//! built in the CLI entry point and handed to every command by reference.

use std::path::{Path, PathBuf};

use crate::core::config::data::{expand_home, Config};
use crate::core::config::defaults::DEFAULT_API_BASE;
use crate::core::config::io::{AppPaths, ConfigError};

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_PERSONA: &str = "YOO_PERSONA";

/// Process-wide switches supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeFlags {
    pub persona: Option<String>,
    pub quiet: bool,
    pub no_log: bool,
}

/// Environment variables that override config file values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub persona: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty_var(ENV_API_KEY),
            base_url: non_empty_var(ENV_BASE_URL),
            persona: non_empty_var(ENV_PERSONA),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub config: Config,
    pub paths: AppPaths,
    pub flags: RuntimeFlags,
    pub env: EnvOverrides,
}

impl Settings {
    pub fn new(
        config: Config,
        mut paths: AppPaths,
        flags: RuntimeFlags,
        env: EnvOverrides,
    ) -> Self {
        if let Some(raw) = config.log_dir.as_deref().filter(|dir| !dir.trim().is_empty()) {
            paths.log_dir = expand_home(raw.trim(), &paths.home);
        }
        Self {
            config,
            paths,
            flags,
            env,
        }
    }

    /// Load settings for commands that talk to the model; the config file must exist.
    pub fn load(config_override: Option<&Path>, flags: RuntimeFlags) -> Result<Self, ConfigError> {
        let paths = AppPaths::resolve(config_override)?;
        let config = Config::load_from_path(&paths.config_file)?;
        Ok(Self::new(config, paths, flags, EnvOverrides::from_env()))
    }

    /// Load settings for commands that can work without a config file.
    pub fn load_or_default(
        config_override: Option<&Path>,
        flags: RuntimeFlags,
    ) -> Result<Self, ConfigError> {
        let paths = AppPaths::resolve(config_override)?;
        let config = Config::load_or_default(&paths.config_file)?;
        Ok(Self::new(config, paths, flags, EnvOverrides::from_env()))
    }

    /// Persona requested for chat: flag, then environment, then config default.
    pub fn requested_persona(&self) -> Option<&str> {
        self.flags
            .persona
            .as_deref()
            .or(self.env.persona.as_deref())
            .or(self.config.default_persona.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn requested_title_persona(&self) -> Option<&str> {
        self.config
            .title_persona
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.env
            .api_key
            .as_deref()
            .or(self.config.secrets.openai_key.as_deref())
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn api_base(&self) -> &str {
        self.env
            .base_url
            .as_deref()
            .or(self.config.configured_api_base())
            .unwrap_or(DEFAULT_API_BASE)
    }

    pub fn log_dir(&self) -> &Path {
        &self.paths.log_dir
    }

    pub fn system_prompt_path(&self, persona_name: &str) -> PathBuf {
        self.paths.system_prompt_path(persona_name)
    }

    pub fn quiet(&self) -> bool {
        self.flags.quiet
    }

    pub fn no_log(&self) -> bool {
        self.flags.no_log
    }
}
