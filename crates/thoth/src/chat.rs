// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `thoth chat` and `thoth ask` command implementations.
//!
//! The REPL keeps one active thread. Every line is a full turn; the answer
//! is printed once the turn is checkpointed.

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use thoth_agent::{ConversationEngine, TurnOptions, TurnOutcome};
use thoth_core::types::{SourceKind, ThreadId};
use thoth_core::ThothError;
use tracing::debug;

use crate::threads;

/// Slash commands understood by the REPL.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand<'a> {
    Quit,
    Switch,
    Threads,
    Model(Option<&'a str>),
    Sources,
    Help,
    Unknown(&'a str),
}

fn parse_command(line: &str) -> Option<ReplCommand<'_>> {
    let rest = line.strip_prefix('/')?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };
    Some(match name {
        "quit" | "exit" => ReplCommand::Quit,
        "switch" => ReplCommand::Switch,
        "threads" => ReplCommand::Threads,
        "model" => ReplCommand::Model(arg),
        "sources" => ReplCommand::Sources,
        "help" => ReplCommand::Help,
        other => ReplCommand::Unknown(other),
    })
}

fn print_help() {
    println!("  {}          leave", "/quit".yellow());
    println!("  {}        pick another thread", "/switch".yellow());
    println!("  {}       list threads", "/threads".yellow());
    println!("  {} [name]  show or change the model", "/model".yellow());
    println!("  {}       show enabled sources", "/sources".yellow());
}

fn print_sources(options: &TurnOptions) {
    let enabled: Vec<String> = [
        SourceKind::Documents,
        SourceKind::Encyclopedia,
        SourceKind::Academic,
        SourceKind::Web,
    ]
    .into_iter()
    .map(|kind| {
        if options.flags.is_enabled(kind) {
            kind.to_string().green().to_string()
        } else {
            kind.to_string().dimmed().strikethrough().to_string()
        }
    })
    .collect();
    println!("sources: {}", enabled.join(" "));
}

fn print_answer(outcome: &TurnOutcome) {
    println!("\n{}: {}\n", "thoth".green().bold(), outcome.answer);
    debug!(
        retrieved = outcome.retrieved,
        fragments = outcome.fragments,
        version = outcome.version,
        "turn printed"
    );
}

/// Runs the interactive REPL.
pub async fn run_chat(
    engine: &ConversationEngine,
    thread: Option<String>,
    mut options: TurnOptions,
) -> Result<(), ThothError> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| ThothError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "thoth chat".bold().green());
    println!(
        "Type {} to exit, {} for commands.",
        "/quit".yellow(),
        "/help".yellow()
    );

    let mut thread_id = match thread {
        Some(id) => ThreadId::new(id),
        None => threads::pick_or_create(engine, &mut rl).await?,
    };
    print_sources(&options);
    println!();

    let prompt = format!("{}> ", "you".cyan());
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);

        if let Some(command) = parse_command(trimmed) {
            match command {
                ReplCommand::Quit => break,
                ReplCommand::Switch => {
                    thread_id = threads::pick_or_create(engine, &mut rl).await?;
                }
                ReplCommand::Threads => threads::list(engine).await?,
                ReplCommand::Model(Some(model)) => {
                    options.model = Some(model.to_string());
                    println!("model set to {}", model.bold());
                }
                ReplCommand::Model(None) => {
                    let model = options.model.as_deref().unwrap_or(engine.default_model());
                    println!("model: {}", model.bold());
                }
                ReplCommand::Sources => print_sources(&options),
                ReplCommand::Help => print_help(),
                ReplCommand::Unknown(name) => {
                    println!("unknown command /{name}, try {}", "/help".yellow());
                }
            }
            continue;
        }

        match engine.run_turn(&thread_id, trimmed, options.clone()).await {
            Ok(outcome) => print_answer(&outcome),
            Err(e) => eprintln!("{}: {e}", "error".red()),
        }
    }
    Ok(())
}

/// Runs a single turn and prints the answer.
pub async fn run_ask(
    engine: &ConversationEngine,
    thread: Option<String>,
    question: &str,
    options: TurnOptions,
) -> Result<(), ThothError> {
    let thread_id = match thread {
        Some(id) => ThreadId::new(id),
        None => engine.new_thread(None).await?.id,
    };
    let outcome = engine.run_turn(&thread_id, question, options).await?;
    println!("{}", outcome.answer);
    eprintln!("{}", format!("thread {thread_id}").dimmed());
    Ok(())
}
