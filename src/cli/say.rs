//! One-shot prompt: ask once, print the reply, log the exchange

use std::error::Error;
use std::io;

use chrono::Local;

use crate::cli::report_log_result;
use crate::core::completion::{CompletionClient, OpenAiClient};
use crate::core::config::Settings;
use crate::core::persona::{Persona, PersonaRegistry};
use crate::core::session::{Session, SessionMode, SessionOptions};
use crate::utils::logging::{format_timestamp, LogStore};

pub fn session_options(settings: &Settings) -> SessionOptions {
    SessionOptions {
        quiet: settings.quiet(),
        no_log: settings.no_log(),
    }
}

/// Chat persona (fatal if unreadable) plus title persona (absent when logging is off).
pub fn resolve_personas(
    settings: &Settings,
) -> Result<(Persona, Option<Persona>), Box<dyn Error>> {
    let registry = PersonaRegistry::from_settings(settings);
    let chat = registry.resolve_chat(settings.requested_persona())?;
    let title = if settings.no_log() {
        None
    } else {
        registry.resolve_title(settings.requested_title_persona())
    };
    Ok((chat, title))
}

pub async fn run_say(settings: &Settings, prompt: &str) -> Result<(), Box<dyn Error>> {
    if prompt.trim().is_empty() {
        return Err("Nothing to ask. Usage: yoo <prompt> (or pipe text into yoo)".into());
    }

    let (chat, title) = resolve_personas(settings)?;
    let client = OpenAiClient::from_settings(settings)?;
    let store = LogStore::new(settings.log_dir());

    say_with_client(&client, chat, title, session_options(settings), &store, prompt).await
}

pub async fn say_with_client<C: CompletionClient + ?Sized>(
    client: &C,
    chat: Persona,
    title: Option<Persona>,
    options: SessionOptions,
    store: &LogStore,
    prompt: &str,
) -> Result<(), Box<dyn Error>> {
    if !options.quiet {
        println!("asking {}...", chat.name);
    }

    let mut session = Session::new(client, chat, title, options);
    let reply = session.submit(prompt).await?;
    session.print_reply(&mut io::stdout(), &reply)?;

    let timestamp = format_timestamp(&Local::now());
    let result = session.finish(SessionMode::OneShot, store, &timestamp).await;
    report_log_result(result, options.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::completion::CompletionError;
    use crate::utils::test_utils::{archie, summer_slug, StubClient};
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn ping_pong_scenario_writes_expected_log() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = LogStore::new(temp_dir.path());
        let client = StubClient::replying(&["pong", "ping-topic"]);
        let options = SessionOptions {
            quiet: true,
            no_log: false,
        };

        say_with_client(&client, archie(), Some(summer_slug()), options, &store, "ping")
            .await
            .expect("say should succeed");

        let latest = store
            .find_latest()
            .expect("scan should succeed")
            .expect("a log should exist");
        assert!(latest.to_string_lossy().ends_with(".ping-topic.md"));
        let content = fs::read_to_string(latest).expect("read log");
        assert!(content.contains(
            "## prompt\n\nping\n\n## response\n\npong\n\n## system\n\nYou are Archie."
        ));
    }

    #[tokio::test]
    async fn chat_failure_is_fatal_and_writes_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = LogStore::new(temp_dir.path());
        let client = StubClient::new(vec![Err(CompletionError::EmptyResponse)]);
        let options = SessionOptions {
            quiet: true,
            no_log: false,
        };

        let result =
            say_with_client(&client, archie(), Some(summer_slug()), options, &store, "ping").await;
        assert!(result.is_err());
        assert_eq!(store.find_latest().unwrap(), None);
    }
}
