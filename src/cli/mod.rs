//! Command-line interface parsing and handling
//!
//! This module parses arguments, installs logging and dispatches to the
//! chat REPL, the one-shot `say` command, model listing or config edits.

pub mod chat;
pub mod model_list;
pub mod say;
pub mod settings;

use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::core::chat_stream::{GeminiService, GeminiSettings};
use crate::core::config::data::{path_display, Config};
use crate::core::orchestrator::TurnOrchestrator;
use crate::core::session::GeminiModel;
use settings::{SetContext, SettingRegistry};

/// Environment variable holding the tracing filter directives.
pub const LOG_ENV: &str = "QUILL_LOG";

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "A terminal chat client for Gemini with prompt enhancement")]
#[command(
    long_about = "Quill streams Gemini replies into the terminal, can rewrite your prompt \
with the model before sending it, and pulls fenced code blocks out of each answer.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    Your Gemini API key (API_KEY is used as a fallback)\n\
  QUILL_LOG         Log filter, e.g. 'debug' or 'quill=trace' (default: warn)\n\n\
Commands inside chat:\n\
  /enhance <prompt> Rewrite the prompt, then send the rewrite\n\
  /continue         Ask the model to keep going\n\
  /model [id]       Show or switch the model\n\
  /help             List every command"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for this run
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// System instruction for this run
    #[arg(short = 's', long, global = true, value_name = "TEXT")]
    pub system: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Read and write configuration at this path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat (default)
    Chat {
        /// Enhance every plain message before sending it
        #[arg(long)]
        enhance: bool,
    },
    /// Send one prompt and print the reply
    Say {
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
        /// Enhance the prompt before sending it
        #[arg(long)]
        enhance: bool,
        /// Print the reply as an HTML fragment
        #[arg(long)]
        html: bool,
    },
    /// List the available models
    Models,
    /// Show or change persistent settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print every setting and the config file location
    Show,
    /// Set a configuration value
    Set {
        key: String,
        /// Value to set (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset a configuration value
    Unset { key: String },
}

/// Per-run overrides from the command line.
#[derive(Debug, Default, Clone)]
pub struct SessionOverrides {
    pub model: Option<String>,
    pub system: Option<String>,
}

pub fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("{}", error_line(err.as_ref()));
        std::process::exit(1);
    }
}

/// How a failure that ends the process is shown on stderr.
pub fn error_line(err: &dyn Error) -> String {
    format!("❌ {err}")
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    init_logging(args.log.as_deref())?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main(args))
}

fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let config = Config::load(args.config.as_deref())?;
    let overrides = SessionOverrides {
        model: args.model,
        system: args.system,
    };

    match args.command.unwrap_or(Commands::Chat { enhance: false }) {
        Commands::Chat { enhance } => {
            let enhance = enhance || config.enhance_by_default();
            chat::run_chat(&config, &overrides, enhance).await
        }
        Commands::Say {
            prompt,
            enhance,
            html,
        } => say::run_say(&config, &overrides, &prompt.join(" "), enhance, html).await,
        Commands::Models => {
            model_list::list_models(&config);
            Ok(())
        }
        Commands::Config { action } => {
            let path = match args.config {
                Some(path) => path,
                None => Config::get_config_path()?,
            };
            run_config(&config, &path, action.unwrap_or(ConfigAction::Show))
        }
    }
}

fn run_config(config: &Config, path: &Path, action: ConfigAction) -> Result<(), Box<dyn Error>> {
    let registry = SettingRegistry::new();
    let ctx = SetContext { config_path: path };

    let result = match action {
        ConfigAction::Show => {
            println!("Config file: {}", path_display(path));
            println!("{}", settings::describe_all(&registry, config));
            return Ok(());
        }
        ConfigAction::Set { key, value } => settings::set_value(&registry, &key, &value, &ctx),
        ConfigAction::Unset { key } => settings::unset_value(&registry, &key, &ctx),
    };

    match result {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(err) => {
            err.print();
            std::process::exit(1);
        }
    }
}

/// Build an orchestrator over the Gemini service from config and overrides.
///
/// An unknown `--model` is an error here; the config file's model falls
/// back to the default instead.
pub fn build_orchestrator(
    config: &Config,
    overrides: &SessionOverrides,
) -> Result<TurnOrchestrator, Box<dyn Error>> {
    let mut session = config.session_config();
    if let Some(model) = overrides.model.as_deref() {
        session.set_model(model.parse::<GeminiModel>()?);
    }
    if let Some(system) = overrides.system.as_deref() {
        session.set_system_instruction(system);
    }

    let service = GeminiService::new(GeminiSettings::from_env(config.base_url.as_deref()));
    if let Some(message) = service.initialization_error() {
        eprintln!("⚠️  {message}");
    }

    Ok(TurnOrchestrator::with_backend(Arc::new(service), session))
}
