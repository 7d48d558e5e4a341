use crate::core::config::data::{Config, PersonaEntry};

pub const DEFAULT_PERSONA_NAME: &str = "archie";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TITLE_PERSONA_NAME: &str = "summer-slug";
pub const DEFAULT_TITLE_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

impl Config {
    /// First configured persona with the given name.
    pub fn find_persona(&self, name: &str) -> Option<&PersonaEntry> {
        self.personas.iter().find(|p| p.name == name)
    }

    /// Add a persona or change the model of an existing one.
    ///
    /// Returns `true` when a new entry was created.
    pub fn upsert_persona(&mut self, name: &str, model: Option<&str>) -> bool {
        if let Some(existing) = self.personas.iter_mut().find(|p| p.name == name) {
            if let Some(model) = model {
                existing.model = model.to_string();
            }
            return false;
        }

        self.personas.push(PersonaEntry {
            name: name.to_string(),
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
        });
        true
    }

    pub fn set_default_persona(&mut self, name: &str) {
        self.default_persona = Some(name.to_string());
    }

    pub fn configured_api_base(&self) -> Option<&str> {
        self.api_base
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
    }
}
