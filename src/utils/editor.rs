//! External editor and pager integration
//!
//! Transcripts are opened in `$PAGER` and persona system prompts in `$EDITOR`.

use std::error::Error;
use std::path::Path;
use std::process::Command;

pub const EDITOR_ENV: &str = "EDITOR";
pub const PAGER_ENV: &str = "PAGER";
pub const DEFAULT_EDITOR: &str = "vi";
pub const DEFAULT_PAGER: &str = "less";

/// Pick the program from an environment value, falling back when unset or blank.
pub fn program_from_value(value: Option<String>, fallback: &str) -> String {
    match value {
        Some(program) if !program.trim().is_empty() => program.trim().to_string(),
        _ => fallback.to_string(),
    }
}

pub fn program_from_env(var: &str, fallback: &str) -> String {
    program_from_value(std::env::var(var).ok(), fallback)
}

/// Run `program` on `path` and wait for it to exit.
///
/// The program string may carry arguments (`code --wait`, `less -R`).
pub fn open_with(program: &str, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut parts = program.split_whitespace();
    let Some(binary) = parts.next() else {
        return Err("No program given to open the file with".into());
    };

    let mut command = Command::new(binary);
    command.args(parts).arg(path);

    let status = command
        .status()
        .map_err(|err| format!("Failed to run {binary}: {err}"))?;
    if !status.success() {
        return Err(format!("{binary} exited with non-zero status: {status}").into());
    }
    Ok(())
}

pub fn open_in_editor(path: &Path) -> Result<(), Box<dyn Error>> {
    open_with(&program_from_env(EDITOR_ENV, DEFAULT_EDITOR), path)
}

pub fn open_in_pager(path: &Path) -> Result<(), Box<dyn Error>> {
    open_with(&program_from_env(PAGER_ENV, DEFAULT_PAGER), path)
}
