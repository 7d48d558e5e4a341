use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    #[serde(
        rename = "openai-key",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub openai_key: Option<String>,
}

impl Secrets {
    fn is_empty(&self) -> bool {
        self.openai_key.is_none()
    }
}

/// A persona as declared in the config file. The system prompt lives in a
/// sibling `<name>.txt` file and is loaded by the persona registry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PersonaEntry {
    pub name: String,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Secrets::is_empty")]
    pub secrets: Secrets,
    /// Persona used for chat when no flag or environment override is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_persona: Option<String>,
    /// Persona used to summarize a session into a filename slug
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_persona: Option<String>,
    #[serde(default)]
    pub personas: Vec<PersonaEntry>,
    /// Base URL of the chat-completion API (e.g., "https://api.openai.com/v1")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Transcript directory; a leading `~/` expands to the home directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
    /// Top-level keys this version does not know about, kept so saving
    /// the config does not drop them
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/yoo/config.yml` → `~/.config/yoo/config.yml`
/// - macOS: `/Users/user/.yoo/2024-01-01--10-00-00-+0000.topic.md` → `~/.yoo/...`
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

/// Expand a leading `~` or `~/` against `home`; other paths are returned as-is.
pub fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}
