//! Chat session engine.
//!
//! A [`Session`] owns the conversation history for one run of the program. It
//! drives either a single prompt/response exchange or an interactive loop, and
//! at the end derives a topic title and writes the transcript to the log store.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, Lines};
use tracing::{debug, warn};

use crate::core::completion::{CompletionClient, CompletionError};
use crate::core::message::{History, Role};
use crate::core::persona::Persona;
use crate::core::transcript::{render_chat, render_one_shot, title_request};
use crate::utils::input::{sanitize_title, UNKNOWN_TOPIC};
use crate::utils::logging::{LogStore, LogStoreError};
use crate::utils::spinner::Spinner;

pub const PROMPT_MARKER: &str = "≫ ";
pub const RESPONSE_MARKER: &str = "╰─ ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    OneShot,
    Interactive,
}

/// Why an interactive loop stopped reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user typed `exit` or `quit`.
    Exit,
    /// An interrupt signal arrived while waiting for input.
    Interrupted,
    /// Standard input was closed.
    EndOfInput,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub quiet: bool,
    pub no_log: bool,
}

#[derive(Debug)]
pub enum SessionError {
    Completion(CompletionError),
    Io(std::io::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Completion(err) => write!(f, "{err}"),
            SessionError::Io(err) => write!(f, "Terminal I/O failed: {err}"),
        }
    }
}

impl StdError for SessionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SessionError::Completion(err) => Some(err),
            SessionError::Io(err) => Some(err),
        }
    }
}

impl From<CompletionError> for SessionError {
    fn from(err: CompletionError) -> Self {
        SessionError::Completion(err)
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Io(err)
    }
}

pub fn is_exit_command(line: &str) -> bool {
    line == "exit" || line == "quit"
}

pub struct Session<'a, C: CompletionClient + ?Sized> {
    client: &'a C,
    chat: Persona,
    title: Option<Persona>,
    history: History,
    options: SessionOptions,
}

impl<'a, C: CompletionClient + ?Sized> Session<'a, C> {
    /// Start a session; `title` is `None` when the title persona could not be loaded.
    pub fn new(
        client: &'a C,
        chat: Persona,
        title: Option<Persona>,
        options: SessionOptions,
    ) -> Self {
        let history = History::new(chat.system_prompt.clone());
        Self {
            client,
            chat,
            title,
            history,
            options,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Send one user turn with the full history and record the reply.
    pub async fn submit(&mut self, input: &str) -> Result<String, CompletionError> {
        self.history.push_user(input);
        let waiting = format!("{} is thinking...", self.chat.name);
        let mut spinner = Spinner::start(&waiting, !self.options.quiet);
        let reply = self.client.complete(&self.chat.model, &self.history).await;
        spinner.stop();
        let reply = reply?;
        self.history.push_assistant(reply.clone());
        Ok(reply)
    }

    pub fn print_reply<W: Write>(&self, out: &mut W, reply: &str) -> std::io::Result<()> {
        if self.options.quiet {
            writeln!(out, "{reply}")?;
        } else {
            writeln!(out, "{RESPONSE_MARKER}{reply}")?;
        }
        out.flush()
    }

    /// Read lines until `exit`/`quit`, end of input, or `interrupt` resolves.
    ///
    /// Every other line, including an empty one, is trimmed and submitted as a
    /// user turn. A completion failure aborts the loop with an error.
    pub async fn run_interactive<R, W, S>(
        &mut self,
        lines: &mut Lines<R>,
        out: &mut W,
        interrupt: S,
    ) -> Result<SessionEnd, SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
        S: Future<Output = ()>,
    {
        tokio::pin!(interrupt);

        loop {
            if !self.options.quiet {
                write!(out, "\n{PROMPT_MARKER}")?;
                out.flush()?;
            }

            let line = tokio::select! {
                _ = &mut interrupt => {
                    debug!("interrupt received while awaiting input");
                    if !self.options.quiet {
                        writeln!(out)?;
                    }
                    return Ok(SessionEnd::Interrupted);
                }
                line = lines.next_line() => line?,
            };

            let Some(line) = line else {
                return Ok(SessionEnd::EndOfInput);
            };

            let input = line.trim();
            if is_exit_command(input) {
                return Ok(SessionEnd::Exit);
            }

            let reply = self.submit(input).await?;
            self.print_reply(out, &reply)?;
        }
    }

    /// Ask the title persona for a filename-safe topic slug.
    ///
    /// Never fails: a missing title persona, a failed request, or an empty
    /// reply all produce `unknown-topic`.
    pub async fn derive_title(&self) -> String {
        let Some(title_persona) = &self.title else {
            return UNKNOWN_TOPIC.to_string();
        };

        let mut request = History::new(title_persona.system_prompt.clone());
        request.push_user(title_request(&self.history));

        match self.client.complete(&title_persona.model, &request).await {
            Ok(title) => sanitize_title(&title),
            Err(err) => {
                warn!("could not generate a title: {err}");
                if !self.options.quiet {
                    eprintln!("⚠️  Could not generate a title for the log: {err}");
                }
                UNKNOWN_TOPIC.to_string()
            }
        }
    }

    pub fn render(&self, mode: SessionMode, title: &str, timestamp: &str) -> String {
        match mode {
            SessionMode::OneShot => {
                let conversation = self.history.conversation();
                let content_of = |role: Role| {
                    conversation
                        .iter()
                        .find(|turn| turn.role == role)
                        .map(|turn| turn.content.as_str())
                        .unwrap_or_default()
                };
                render_one_shot(
                    title,
                    timestamp,
                    content_of(Role::User),
                    content_of(Role::Assistant),
                    self.history.system_prompt(),
                )
            }
            SessionMode::Interactive => render_chat(title, timestamp, &self.history),
        }
    }

    /// Derive the title, render the transcript, and write it.
    ///
    /// Returns `Ok(None)` when logging is disabled or nothing was said.
    pub async fn finish(
        self,
        mode: SessionMode,
        store: &LogStore,
        timestamp: &str,
    ) -> Result<Option<PathBuf>, LogStoreError> {
        if self.options.no_log {
            debug!("logging disabled, skipping transcript");
            return Ok(None);
        }
        if !self.history.has_user_turns() {
            debug!("no user turns, skipping transcript");
            return Ok(None);
        }

        let title = self.derive_title().await;
        let content = self.render(mode, &title, timestamp);
        store.write(timestamp, &title, &content).map(Some)
    }
}
