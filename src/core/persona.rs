use crate::core::config::data::path_display;
use crate::core::config::defaults::{
    DEFAULT_MODEL, DEFAULT_PERSONA_NAME, DEFAULT_TITLE_MODEL, DEFAULT_TITLE_PERSONA_NAME,
};
use crate::core::config::{PersonaEntry, Settings};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// A persona ready for use: model plus loaded system prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub name: String,
    pub model: String,
    pub system_prompt: String,
}

#[derive(Debug)]
pub enum PersonaError {
    /// The persona's system-prompt file could not be read.
    SystemPromptMissing {
        persona: String,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for PersonaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonaError::SystemPromptMissing {
                persona,
                path,
                source,
            } => write!(
                f,
                "Could not read the system prompt for persona '{}' at {}: {}",
                persona,
                path_display(path),
                source
            ),
        }
    }
}

impl StdError for PersonaError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PersonaError::SystemPromptMissing { source, .. } => Some(source),
        }
    }
}

/// Resolves persona names against the configured list and loads their
/// system prompts from `<prompt_dir>/<name>.txt`.
pub struct PersonaRegistry {
    personas: Vec<PersonaEntry>,
    prompt_dir: PathBuf,
}

impl PersonaRegistry {
    pub fn new(personas: Vec<PersonaEntry>, prompt_dir: PathBuf) -> Self {
        Self {
            personas,
            prompt_dir,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.config.personas.clone(),
            settings.paths.config_dir.clone(),
        )
    }

    /// First configured persona with the given name
    pub fn find_persona_by_name(&self, name: &str) -> Option<&PersonaEntry> {
        self.personas.iter().find(|p| p.name == name)
    }

    /// Pick the entry for `requested`, or the fallback when nothing matches.
    pub fn select(
        &self,
        requested: Option<&str>,
        fallback_name: &str,
        fallback_model: &str,
    ) -> PersonaEntry {
        if let Some(name) = requested {
            if let Some(entry) = self.find_persona_by_name(name) {
                return entry.clone();
            }
            debug!(
                requested = name,
                fallback = fallback_name,
                "persona not configured, using fallback"
            );
        }

        PersonaEntry {
            name: fallback_name.to_string(),
            model: fallback_model.to_string(),
        }
    }

    pub fn select_chat(&self, requested: Option<&str>) -> PersonaEntry {
        self.select(requested, DEFAULT_PERSONA_NAME, DEFAULT_MODEL)
    }

    pub fn select_title(&self, requested: Option<&str>) -> PersonaEntry {
        self.select(requested, DEFAULT_TITLE_PERSONA_NAME, DEFAULT_TITLE_MODEL)
    }

    pub fn system_prompt_path(&self, name: &str) -> PathBuf {
        self.prompt_dir.join(format!("{name}.txt"))
    }

    /// Load the system prompt for an entry, verbatim.
    pub fn load(&self, entry: &PersonaEntry) -> Result<Persona, PersonaError> {
        let path = self.system_prompt_path(&entry.name);
        let system_prompt =
            fs::read_to_string(&path).map_err(|source| PersonaError::SystemPromptMissing {
                persona: entry.name.clone(),
                path,
                source,
            })?;

        Ok(Persona {
            name: entry.name.clone(),
            model: entry.model.clone(),
            system_prompt,
        })
    }

    /// Chat persona; an unreadable system prompt is an error.
    pub fn resolve_chat(&self, requested: Option<&str>) -> Result<Persona, PersonaError> {
        self.load(&self.select_chat(requested))
    }

    /// Title persona; an unreadable system prompt yields `None`.
    pub fn resolve_title(&self, requested: Option<&str>) -> Option<Persona> {
        match self.load(&self.select_title(requested)) {
            Ok(persona) => Some(persona),
            Err(err) => {
                warn!("{err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(name: &str, model: &str) -> PersonaEntry {
        PersonaEntry {
            name: name.to_string(),
            model: model.to_string(),
        }
    }

    fn create_test_registry() -> (TempDir, PersonaRegistry) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("archie.txt"), "You are Archie.")
            .expect("Failed to write prompt");
        fs::write(temp_dir.path().join("sage.txt"), "You are Sage.\nBe brief.\n")
            .expect("Failed to write prompt");
        fs::write(temp_dir.path().join("summer-slug.txt"), "Summarize as a slug.")
            .expect("Failed to write prompt");

        let registry = PersonaRegistry::new(
            vec![
                entry("archie", "gpt-4"),
                entry("sage", "gpt-4o"),
                entry("sage", "ignored-duplicate"),
                entry("ghost", "gpt-4"),
            ],
            temp_dir.path().to_path_buf(),
        );
        (temp_dir, registry)
    }

    #[test]
    fn test_configured_persona_loads_prompt_verbatim() {
        let (_dir, registry) = create_test_registry();

        let persona = registry.resolve_chat(Some("sage")).expect("persona should resolve");
        assert_eq!(persona.name, "sage");
        assert_eq!(persona.model, "gpt-4o");
        assert_eq!(persona.system_prompt, "You are Sage.\nBe brief.\n");
    }

    #[test]
    fn test_unmatched_name_falls_back_to_default_persona() {
        let (_dir, registry) = create_test_registry();

        let persona = registry
            .resolve_chat(Some("nobody"))
            .expect("fallback persona should resolve");
        assert_eq!(persona.name, DEFAULT_PERSONA_NAME);
        assert_eq!(persona.model, "gpt-4");
        assert_eq!(persona.system_prompt, "You are Archie.");

        let unset = registry.select_chat(None);
        assert_eq!(unset, entry(DEFAULT_PERSONA_NAME, DEFAULT_MODEL));
    }

    #[test]
    fn test_fallback_uses_hardcoded_model_even_if_name_configured_differently() {
        let registry = PersonaRegistry::new(
            vec![entry("archie", "gpt-4o")],
            PathBuf::from("/nonexistent"),
        );
        // An unmatched request ignores the list entirely.
        assert_eq!(registry.select_chat(Some("zed")), entry("archie", DEFAULT_MODEL));
        // A matched request uses the configured model.
        assert_eq!(registry.select_chat(Some("archie")), entry("archie", "gpt-4o"));
    }

    #[test]
    fn test_missing_prompt_file_is_fatal_for_chat() {
        let (_dir, registry) = create_test_registry();

        let err = registry
            .resolve_chat(Some("ghost"))
            .expect_err("missing prompt should fail");
        let PersonaError::SystemPromptMissing { persona, path, .. } = &err;
        assert_eq!(persona, "ghost");
        assert!(path.ends_with("ghost.txt"));
        assert!(err.to_string().contains("'ghost'"));
    }

    #[test]
    fn test_missing_prompt_file_is_recoverable_for_title() {
        let (_dir, registry) = create_test_registry();

        assert!(registry.resolve_title(Some("ghost")).is_none());

        let title = registry
            .resolve_title(Some("unconfigured"))
            .expect("fallback title persona should resolve");
        assert_eq!(title.name, DEFAULT_TITLE_PERSONA_NAME);
        assert_eq!(title.model, DEFAULT_TITLE_MODEL);
        assert_eq!(title.system_prompt, "Summarize as a slug.");
    }

    #[test]
    fn test_find_persona_by_name() {
        let (_dir, registry) = create_test_registry();
        assert_eq!(
            registry.find_persona_by_name("sage").map(|p| p.model.as_str()),
            Some("gpt-4o")
        );
        assert!(registry.find_persona_by_name("nonexistent").is_none());
    }
}
