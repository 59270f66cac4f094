// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thoth - a retrieval-augmented research assistant.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod chat;
mod documents;
mod models;
mod threads;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use thoth_agent::TurnOptions;
use thoth_config::ThothConfig;
use thoth_core::types::RetrievalFlags;
use thoth_core::ThothError;

use crate::app::App;

/// Thoth - a retrieval-augmented research assistant.
#[derive(Parser, Debug)]
#[command(name = "thoth", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Per-turn retrieval and model switches.
#[derive(Args, Debug, Clone, Default)]
struct TurnArgs {
    /// Resume this thread instead of picking one.
    #[arg(long)]
    thread: Option<String>,
    /// Model for this session. Defaults to `ollama.default_model`.
    #[arg(long)]
    model: Option<String>,
    /// Skip the local document index.
    #[arg(long)]
    no_documents: bool,
    /// Skip Wikipedia.
    #[arg(long)]
    no_wikipedia: bool,
    /// Skip arXiv.
    #[arg(long)]
    no_arxiv: bool,
    /// Skip web search.
    #[arg(long)]
    no_web: bool,
}

impl TurnArgs {
    fn options(&self) -> TurnOptions {
        TurnOptions {
            flags: RetrievalFlags {
                documents: !self.no_documents,
                encyclopedia: !self.no_wikipedia,
                academic: !self.no_arxiv,
                web: !self.no_web,
            },
            model: self.model.clone(),
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive chat session.
    Chat(TurnArgs),
    /// Ask a single question and print the answer.
    Ask {
        #[command(flatten)]
        turn: TurnArgs,
        /// The question.
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Manage conversation threads.
    Threads {
        #[command(subcommand)]
        action: ThreadsCommand,
    },
    /// Index .txt, .md and .pdf files into the local document store.
    Ingest {
        /// Re-index files that are already indexed.
        #[arg(long)]
        force: bool,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Inspect or clear the document index.
    Documents {
        #[command(subcommand)]
        action: DocumentsCommand,
    },
    /// List or download Ollama models.
    Models {
        #[command(subcommand)]
        action: ModelsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ThreadsCommand {
    /// List threads, most recent first.
    List,
    /// Create a thread.
    New {
        /// Display name. Omit to name it from the first question.
        name: Option<String>,
    },
    /// Rename a thread.
    Rename { id: String, name: String },
    /// Print a thread's messages.
    Show {
        id: String,
        /// Also print the accumulated context.
        #[arg(long)]
        context: bool,
    },
    /// Delete a thread and its saved state.
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum DocumentsCommand {
    /// List indexed documents.
    List,
    /// Remove every indexed document.
    Reset,
}

#[derive(Subcommand, Debug)]
enum ModelsCommand {
    /// Show downloaded and popular models.
    List,
    /// Download a model.
    Pull { model: String },
}

fn load_config(path: Option<&PathBuf>) -> ThothConfig {
    let loaded = match path {
        Some(path) => thoth_config::load_and_validate_path(path),
        None => thoth_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            thoth_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    init_tracing(&config.agent.log_level);

    let Some(command) = cli.command else {
        println!("thoth: use --help for available commands");
        return;
    };

    if let Err(e) = run(command, config).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: ThothConfig) -> Result<(), ThothError> {
    let app = App::open(config).await?;
    let result = match command {
        Commands::Chat(turn) => {
            app.check_provider().await;
            chat::run_chat(&app.engine, turn.thread.clone(), turn.options()).await
        }
        Commands::Ask { turn, question } => {
            chat::run_ask(
                &app.engine,
                turn.thread.clone(),
                &question.join(" "),
                turn.options(),
            )
            .await
        }
        Commands::Threads { action } => match action {
            ThreadsCommand::List => threads::list(&app.engine).await,
            ThreadsCommand::New { name } => threads::create(&app.engine, name.as_deref()).await,
            ThreadsCommand::Rename { id, name } => threads::rename(&app.engine, &id, &name).await,
            ThreadsCommand::Show { id, context } => threads::show(&app.engine, &id, context).await,
            ThreadsCommand::Delete { id } => threads::delete(&app.engine, &id).await,
        },
        Commands::Ingest { force, paths } => documents::ingest(&app.library, &paths, force).await,
        Commands::Documents { action } => match action {
            DocumentsCommand::List => documents::list(&app.library).await,
            DocumentsCommand::Reset => documents::reset(&app.library).await,
        },
        Commands::Models { action } => match action {
            ModelsCommand::List => models::list(&app.provider).await,
            ModelsCommand::Pull { model } => models::pull(&app.provider, &model).await,
        },
    };
    app.close().await?;
    result
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so answers on stdout stay pipeable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("thoth={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn source_switches_map_to_flags() {
        let cli = Cli::parse_from(["thoth", "ask", "--no-arxiv", "--no-web", "what", "is", "rust"]);
        let Some(Commands::Ask { turn, question }) = cli.command else {
            panic!("expected ask");
        };
        let options = turn.options();
        assert!(options.flags.documents);
        assert!(options.flags.encyclopedia);
        assert!(!options.flags.academic);
        assert!(!options.flags.web);
        assert_eq!(question.join(" "), "what is rust");
    }

    #[test]
    fn chat_accepts_thread_and_model() {
        let cli = Cli::parse_from(["thoth", "chat", "--thread", "abc123", "--model", "qwen3:4b"]);
        let Some(Commands::Chat(turn)) = cli.command else {
            panic!("expected chat");
        };
        assert_eq!(turn.thread.as_deref(), Some("abc123"));
        assert_eq!(turn.options().model.as_deref(), Some("qwen3:4b"));
        assert_eq!(turn.options().flags, RetrievalFlags::all());
    }
}
