//! Interactive chat on the terminal

use std::error::Error;
use std::io::{self, Write};

use chrono::Local;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::cli::report_log_result;
use crate::cli::say::{resolve_personas, session_options};
use crate::core::completion::{CompletionClient, OpenAiClient};
use crate::core::config::Settings;
use crate::core::persona::Persona;
use crate::core::session::{Session, SessionEnd, SessionMode, SessionOptions};
use crate::utils::logging::{format_timestamp, LogStore};

/// Resolves on Ctrl-C. If the handler cannot be installed it never resolves.
async fn interrupt_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// `initial` is sent first when non-empty. With `stdin_consumed` set (input
/// was piped) the session ends after that first exchange.
pub async fn run_chat(
    settings: &Settings,
    initial: &str,
    stdin_consumed: bool,
) -> Result<(), Box<dyn Error>> {
    let (chat, title) = resolve_personas(settings)?;
    let client = OpenAiClient::from_settings(settings)?;
    let store = LogStore::new(settings.log_dir());
    let input = (!stdin_consumed).then(|| BufReader::new(tokio::io::stdin()));

    chat_with_client(
        &client,
        chat,
        title,
        session_options(settings),
        &store,
        initial,
        input,
        &mut io::stdout(),
    )
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn chat_with_client<C, R, W>(
    client: &C,
    chat: Persona,
    title: Option<Persona>,
    options: SessionOptions,
    store: &LogStore,
    initial: &str,
    input: Option<R>,
    out: &mut W,
) -> Result<(), Box<dyn Error>>
where
    C: CompletionClient + ?Sized,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if !options.quiet {
        writeln!(out, "chatting with {}! (type 'exit' or 'quit' to leave)", chat.name)?;
    }

    let mut session = Session::new(client, chat, title, options);

    if !initial.trim().is_empty() {
        let reply = session.submit(initial).await?;
        session.print_reply(out, &reply)?;
    }

    let end = match input {
        Some(reader) => {
            let mut lines = reader.lines();
            session
                .run_interactive(&mut lines, out, interrupt_signal())
                .await?
        }
        None => SessionEnd::EndOfInput,
    };

    if !options.quiet && end != SessionEnd::EndOfInput {
        writeln!(out, "chat ended!")?;
    }

    let timestamp = format_timestamp(&Local::now());
    let result = session
        .finish(SessionMode::Interactive, store, &timestamp)
        .await;
    report_log_result(result, options.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{archie, summer_slug, StubClient};
    use std::fs;
    use tempfile::TempDir;

    type NoInput = BufReader<&'static [u8]>;

    #[tokio::test]
    async fn chat_logs_conversation_and_ends_on_exit() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = LogStore::new(temp_dir.path());
        let client = StubClient::replying(&["hi", "weather-chat"]);
        let mut out: Vec<u8> = Vec::new();

        chat_with_client(
            &client,
            archie(),
            Some(summer_slug()),
            SessionOptions::default(),
            &store,
            "",
            Some(BufReader::new("hello\nexit\n".as_bytes())),
            &mut out,
        )
        .await
        .expect("chat should succeed");

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("chatting with archie!"));
        assert!(printed.contains("╰─ hi"));
        assert!(printed.contains("chat ended!"));

        let latest = store.find_latest().unwrap().expect("log written");
        assert!(latest.to_string_lossy().ends_with(".weather-chat.md"));
        let content = fs::read_to_string(latest).unwrap();
        assert!(content.contains("## chat conversation\n\nuser:\nhello\n\nassistant:\nhi\n\n"));
    }

    #[tokio::test]
    async fn piped_chat_sends_initial_prompt_only() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = LogStore::new(temp_dir.path());
        let client = StubClient::replying(&["summary", "diff-review"]);
        let mut out: Vec<u8> = Vec::new();

        chat_with_client(
            &client,
            archie(),
            Some(summer_slug()),
            SessionOptions {
                quiet: true,
                no_log: false,
            },
            &store,
            "review this\n\n+added line",
            None::<NoInput>,
            &mut out,
        )
        .await
        .expect("chat should succeed");

        assert_eq!(String::from_utf8(out).unwrap(), "summary\n");
        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1.turns()[1].content, "review this\n\n+added line");
    }

    #[tokio::test]
    async fn chat_without_turns_writes_no_log() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = LogStore::new(temp_dir.path());
        let client = StubClient::replying(&[]);
        let mut out: Vec<u8> = Vec::new();

        chat_with_client(
            &client,
            archie(),
            Some(summer_slug()),
            SessionOptions::default(),
            &store,
            "   ",
            Some(BufReader::new("quit\n".as_bytes())),
            &mut out,
        )
        .await
        .expect("chat should succeed");

        assert!(client.calls().is_empty());
        assert_eq!(store.find_latest().unwrap(), None);
    }
}
