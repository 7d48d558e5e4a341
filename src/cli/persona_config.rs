//! Create or update a persona from the command line

use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::core::config::data::path_display;
use crate::core::config::defaults::DEFAULT_PERSONA_NAME;
use crate::core::config::{Config, Settings};
use crate::utils::editor::open_in_editor;

/// Requested changes to one persona.
#[derive(Debug, Clone, Default)]
pub struct PersonaEdit {
    pub name: Option<String>,
    pub model: Option<String>,
    pub system: Option<String>,
    pub edit: bool,
    pub make_default: bool,
    pub assume_yes: bool,
}

/// Ask a yes/no question until the user answers.
///
/// End of input, `quit` and `exit` count as no.
pub fn confirm_with_user<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool> {
    loop {
        write!(out, "{question} (y/n): ")?;
        out.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            writeln!(out)?;
            return Ok(false);
        }

        match answer.trim() {
            "y" | "Y" => return Ok(true),
            "n" | "N" | "quit" | "exit" => return Ok(false),
            _ => writeln!(out, "please enter 'y' or 'n'")?,
        }
    }
}

fn validate_persona_name(name: &str) -> Result<(), Box<dyn Error>> {
    if name.is_empty() {
        return Err("Persona name cannot be empty".into());
    }
    if name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(format!("Invalid persona name '{name}': it is used as a file name").into());
    }
    Ok(())
}

/// Apply model and default changes to `config`. Returns `true` when the persona is new.
pub fn apply_persona_edit(config: &mut Config, name: &str, edit: &PersonaEdit) -> bool {
    let created = config.upsert_persona(name, edit.model.as_deref());
    if edit.make_default {
        config.set_default_persona(name);
    }
    created
}

pub fn run_persona_config(settings: &Settings, edit: PersonaEdit) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let Some(prompt_path) = configure_persona(settings, &edit, &mut input, &mut io::stdout())?
    else {
        return Ok(());
    };

    if edit.edit {
        open_in_editor(&prompt_path)?;
    }
    Ok(())
}

/// Update the config file and the persona's system prompt file.
///
/// Returns the system prompt path, or `None` when the user declined to create
/// a new persona.
pub fn configure_persona<R: BufRead, W: Write>(
    settings: &Settings,
    edit: &PersonaEdit,
    input: &mut R,
    out: &mut W,
) -> Result<Option<PathBuf>, Box<dyn Error>> {
    let name = edit
        .name
        .as_deref()
        .map(str::trim)
        .or(settings.requested_persona())
        .unwrap_or(DEFAULT_PERSONA_NAME)
        .to_string();
    validate_persona_name(&name)?;

    let is_new = settings.config.find_persona(&name).is_none();
    if is_new && !edit.assume_yes {
        let question = format!("Persona '{name}' does not exist. Create it?");
        if !confirm_with_user(&question, input, out)? {
            writeln!(out, "Cancelled.")?;
            return Ok(None);
        }
    }

    let mut config = settings.config.clone();
    let created = apply_persona_edit(&mut config, &name, edit);

    let prompt_path = settings.system_prompt_path(&name);
    if let Some(system) = &edit.system {
        write_system_prompt(&prompt_path, system)?;
        writeln!(out, "✅ Wrote system prompt to {}", path_display(&prompt_path))?;
    } else if created && !prompt_path.exists() {
        // A persona without a prompt file cannot be used for chat.
        write_system_prompt(&prompt_path, "")?;
    }

    if config != settings.config {
        config.save_to_path(&settings.paths.config_file)?;
        debug!(persona = %name, created, "config saved");
    }

    let model = config
        .find_persona(&name)
        .map(|entry| entry.model.as_str())
        .unwrap_or_default();
    if created {
        writeln!(out, "✅ Created persona '{name}' ({model})")?;
    } else {
        writeln!(out, "✅ Persona '{name}' uses {model}")?;
    }
    if edit.make_default {
        writeln!(out, "✅ Default persona set to '{name}'")?;
    }

    Ok(Some(prompt_path))
}

fn write_system_prompt(path: &std::path::Path, text: &str) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AppPaths, EnvOverrides, PersonaEntry, RuntimeFlags};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn settings_with(home: &TempDir, config: Config) -> Settings {
        Settings::new(
            config,
            AppPaths::from_home(home.path(), None),
            RuntimeFlags::default(),
            EnvOverrides::default(),
        )
    }

    fn archie_config() -> Config {
        Config {
            default_persona: Some("archie".to_string()),
            personas: vec![PersonaEntry {
                name: "archie".to_string(),
                model: "gpt-4".to_string(),
            }],
            ..Config::default()
        }
    }

    #[test]
    fn confirmation_accepts_only_y_or_n() {
        let mut input = Cursor::new("maybe\nY\n");
        let mut out: Vec<u8> = Vec::new();
        assert!(confirm_with_user("Create?", &mut input, &mut out).unwrap());
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("please enter 'y' or 'n'"));

        for answer in ["n\n", "N\n", "quit\n", "exit\n", ""] {
            let mut input = Cursor::new(answer);
            assert!(!confirm_with_user("Create?", &mut input, &mut Vec::<u8>::new()).unwrap());
        }
    }

    #[test]
    fn declining_leaves_everything_untouched() {
        let home = TempDir::new().expect("Failed to create temp directory");
        let settings = settings_with(&home, archie_config());
        let edit = PersonaEdit {
            name: Some("sage".to_string()),
            ..PersonaEdit::default()
        };

        let mut out: Vec<u8> = Vec::new();
        let result = configure_persona(&settings, &edit, &mut Cursor::new("n\n"), &mut out)
            .expect("declining is not an error");

        assert_eq!(result, None);
        assert!(!settings.paths.config_file.exists());
        assert!(!settings.system_prompt_path("sage").exists());
    }

    #[test]
    fn creating_a_persona_writes_config_and_prompt() {
        let home = TempDir::new().expect("Failed to create temp directory");
        let settings = settings_with(&home, archie_config());
        let edit = PersonaEdit {
            name: Some("sage".to_string()),
            model: Some("gpt-4o".to_string()),
            system: Some("You are Sage.".to_string()),
            make_default: true,
            assume_yes: true,
            ..PersonaEdit::default()
        };
        let mut out: Vec<u8> = Vec::new();

        let prompt_path = configure_persona(&settings, &edit, &mut Cursor::new(""), &mut out)
            .unwrap()
            .expect("persona configured");

        assert_eq!(fs::read_to_string(&prompt_path).unwrap(), "You are Sage.");
        let saved = Config::load_from_path(&settings.paths.config_file).unwrap();
        assert_eq!(saved.default_persona.as_deref(), Some("sage"));
        assert_eq!(saved.find_persona("sage").unwrap().model, "gpt-4o");
        assert_eq!(saved.find_persona("archie").unwrap().model, "gpt-4");

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Created persona 'sage' (gpt-4o)"));
    }

    #[test]
    fn new_persona_without_system_text_gets_empty_prompt_file() {
        let home = TempDir::new().expect("Failed to create temp directory");
        let settings = settings_with(&home, Config::default());
        let edit = PersonaEdit {
            name: Some("blank".to_string()),
            ..PersonaEdit::default()
        };

        let mut out: Vec<u8> = Vec::new();
        let prompt_path = configure_persona(&settings, &edit, &mut Cursor::new("y\n"), &mut out)
            .unwrap()
            .unwrap();

        assert_eq!(fs::read_to_string(prompt_path).unwrap(), "");
        let saved = Config::load_from_path(&settings.paths.config_file).unwrap();
        assert_eq!(saved.find_persona("blank").unwrap().model, "gpt-4");
    }

    #[test]
    fn name_defaults_to_active_persona_and_existing_needs_no_confirmation() {
        let home = TempDir::new().expect("Failed to create temp directory");
        let settings = settings_with(&home, archie_config());
        let edit = PersonaEdit {
            model: Some("gpt-4o-mini".to_string()),
            ..PersonaEdit::default()
        };

        let mut out: Vec<u8> = Vec::new();
        let prompt_path = configure_persona(&settings, &edit, &mut Cursor::new(""), &mut out)
            .unwrap()
            .unwrap();

        assert_eq!(prompt_path, settings.system_prompt_path("archie"));
        let saved = Config::load_from_path(&settings.paths.config_file).unwrap();
        assert_eq!(saved.find_persona("archie").unwrap().model, "gpt-4o-mini");
        assert_eq!(saved.personas.len(), 1);
    }

    #[test]
    fn rejects_names_that_are_not_file_names() {
        let home = TempDir::new().expect("Failed to create temp directory");
        let settings = settings_with(&home, Config::default());
        let edit = PersonaEdit {
            name: Some("../evil".to_string()),
            assume_yes: true,
            ..PersonaEdit::default()
        };

        let mut out: Vec<u8> = Vec::new();
        let result = configure_persona(&settings, &edit, &mut Cursor::new(""), &mut out);
        assert!(result.is_err());
    }
}
