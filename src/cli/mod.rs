//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod chat;
pub mod latest;
pub mod persona_config;
pub mod say;

use std::error::Error;
use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cli::chat::run_chat;
use crate::cli::latest::run_latest;
use crate::cli::persona_config::{run_persona_config, PersonaEdit};
use crate::cli::say::run_say;
use crate::core::config::data::path_display;
use crate::core::config::{RuntimeFlags, Settings};
use crate::core::persona::PersonaRegistry;
use crate::utils::input::{append_piped_input, prompt_from_args, read_piped_stdin};
use crate::utils::logging::LogStoreError;

pub const LOG_FILTER_ENV: &str = "YOO_LOG";

#[derive(Parser)]
#[command(name = "yoo")]
#[command(version)]
#[command(about = "Ask a chat model something under a persona and keep a markdown log")]
#[command(
    long_about = "yoo sends a prompt (plus anything piped on stdin) to an OpenAI-compatible \
chat API under a persona's system prompt, prints the reply, and saves a timestamped \
markdown transcript.\n\n\
Configuration:\n\
  ~/.config/yoo/config.yml    API key, personas, default and title persona\n\
  ~/.config/yoo/<name>.txt    System prompt for persona <name>\n\
  ~/.yoo/                     Transcript directory\n\n\
Environment Variables:\n\
  OPENAI_API_KEY    Overrides secrets.openai-key\n\
  OPENAI_BASE_URL   Overrides api-base (defaults to https://api.openai.com/v1)\n\
  YOO_PERSONA       Overrides default-persona\n\
  YOO_LOG           Diagnostic log filter (e.g. debug)\n\n\
Flags must come before the prompt; every word after the first prompt word is part of the prompt."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Prompt to send; words are joined with spaces
    #[arg(trailing_var_arg = true, value_name = "PROMPT")]
    pub prompt: Vec<String>,

    /// Prompt text, used when no positional prompt is given
    #[arg(long = "prompt", value_name = "TEXT")]
    pub prompt_text: Option<String>,

    /// Persona to chat with
    #[arg(long, global = true, value_name = "NAME")]
    pub persona: Option<String>,

    /// Only print model output (e.g. for commit messages)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Do not write a transcript
    #[arg(long, global = true)]
    pub no_log: bool,

    /// Config file (default is ~/.config/yoo/config.yml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat; type 'exit' or 'quit' to leave
    Chat {
        /// Optional first message
        #[arg(trailing_var_arg = true, value_name = "PROMPT")]
        prompt: Vec<String>,
    },
    /// Show the most recent transcript
    #[command(visible_alias = "peep")]
    Latest {
        /// Open it in $PAGER instead of printing its path
        #[arg(long)]
        open: bool,
    },
    /// Print the active persona name
    Who,
    /// Create or edit a persona
    Config {
        /// Persona to edit (defaults to the active persona)
        name: Option<String>,
        /// Model for the persona
        #[arg(long)]
        model: Option<String>,
        /// System prompt text to write to the persona's prompt file
        #[arg(long, value_name = "TEXT")]
        system: Option<String>,
        /// Open the persona's system prompt in $EDITOR
        #[arg(long)]
        edit: bool,
        /// Make this persona the default-persona
        #[arg(long = "default")]
        make_default: bool,
        /// Create the persona without asking
        #[arg(short, long)]
        yes: bool,
    },
}

impl Args {
    pub fn flags(&self) -> RuntimeFlags {
        RuntimeFlags {
            persona: self.persona.clone(),
            quiet: self.quiet,
            no_log: self.no_log,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing();

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async_main(args));
    // A pending stdin read keeps a blocking thread alive after an interrupt.
    runtime.shutdown_background();
    result
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let flags = args.flags();
    let config_path = args.config.as_deref();

    match args.command {
        None => {
            let settings = Settings::load(config_path, flags)?;
            let piped = read_piped_stdin()?;
            let prompt = append_piped_input(
                &prompt_from_args(&args.prompt, args.prompt_text.as_deref()),
                piped.as_deref(),
            );
            run_say(&settings, &prompt).await
        }
        Some(Commands::Chat { prompt }) => {
            let settings = Settings::load(config_path, flags)?;
            let piped = read_piped_stdin()?;
            let initial = append_piped_input(&prompt_from_args(&prompt, None), piped.as_deref());
            run_chat(&settings, &initial, piped.is_some()).await
        }
        Some(Commands::Latest { open }) => {
            let settings = Settings::load_or_default(config_path, flags)?;
            run_latest(&settings, open)
        }
        Some(Commands::Who) => {
            let settings = Settings::load_or_default(config_path, flags)?;
            println!("{}", active_persona_name(&settings));
            Ok(())
        }
        Some(Commands::Config {
            name,
            model,
            system,
            edit,
            make_default,
            yes,
        }) => {
            let settings = Settings::load_or_default(config_path, flags)?;
            run_persona_config(
                &settings,
                PersonaEdit {
                    name,
                    model,
                    system,
                    edit,
                    make_default,
                    assume_yes: yes,
                },
            )
        }
    }
}

/// Name of the persona a chat would use, after flag, environment, and config
/// precedence and the fallback for unconfigured names.
pub fn active_persona_name(settings: &Settings) -> String {
    PersonaRegistry::from_settings(settings)
        .select_chat(settings.requested_persona())
        .name
}

/// Tell the user where the transcript went, or warn that it could not be written.
pub(crate) fn report_log_result(result: Result<Option<PathBuf>, LogStoreError>, quiet: bool) {
    match result {
        Ok(Some(path)) => {
            if !quiet {
                println!("📝 Logged to {}", path_display(&path));
            }
        }
        Ok(None) => {}
        Err(err) => {
            tracing::warn!("{err}");
            eprintln!("⚠️  {err}");
        }
    }
}
