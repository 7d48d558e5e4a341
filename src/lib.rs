//! yoo is a small command-line assistant for OpenAI-compatible chat APIs.
//!
//! The crate is organized around a few collaborating layers:
//! - [`core`] owns configuration, persona resolution, the completion client,
//!   the chat session engine, and transcript rendering.
//! - [`cli`] parses arguments and dispatches one handler per subcommand.
//! - [`api`] defines the chat-completion request/response payloads.
//! - [`utils`] holds input assembly, the transcript log store, and editor/pager
//!   launching.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;
