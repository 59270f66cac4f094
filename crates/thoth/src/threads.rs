// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `thoth threads` command implementation and the thread picker.

use colored::Colorize;
use rustyline::DefaultEditor;
use thoth_agent::ConversationEngine;
use thoth_core::types::{Role, Thread, ThreadId};
use thoth_core::ThothError;

/// One listing line: id, name, last update.
pub fn format_thread(thread: &Thread) -> String {
    format!(
        "{}  {}  {}",
        thread.id.as_str().yellow(),
        thread.name.bold(),
        thread.updated_at.dimmed()
    )
}

pub async fn list(engine: &ConversationEngine) -> Result<(), ThothError> {
    let threads = engine.list_threads().await?;
    if threads.is_empty() {
        println!("No threads yet. Start one with {}.", "thoth chat".yellow());
        return Ok(());
    }
    for thread in &threads {
        println!("{}", format_thread(thread));
    }
    Ok(())
}

pub async fn create(engine: &ConversationEngine, name: Option<&str>) -> Result<(), ThothError> {
    let thread = engine.new_thread(name).await?;
    println!("created {}", format_thread(&thread));
    Ok(())
}

pub async fn rename(engine: &ConversationEngine, id: &str, name: &str) -> Result<(), ThothError> {
    let id = ThreadId::new(id);
    if engine.thread(&id).await?.is_none() {
        return Err(ThothError::InvalidInput(format!("no thread with id {id}")));
    }
    engine.rename_thread(&id, name).await?;
    println!("renamed {} to {}", id.as_str().yellow(), name.trim().bold());
    Ok(())
}

/// Prints the thread's messages and, when present, its accumulated context.
pub async fn show(engine: &ConversationEngine, id: &str, context: bool) -> Result<(), ThothError> {
    let id = ThreadId::new(id);
    let Some(thread) = engine.thread(&id).await? else {
        return Err(ThothError::InvalidInput(format!("no thread with id {id}")));
    };
    println!("{}\n", format_thread(&thread));

    let Some(state) = engine.state(&id).await else {
        println!("{}", "(no messages yet)".dimmed());
        return Ok(());
    };
    for message in &state.messages {
        let who = match message.role {
            Role::User => "you".cyan().bold(),
            Role::Assistant => "thoth".green().bold(),
        };
        println!("{who}: {}\n", message.content);
    }
    if context {
        println!("{}", "accumulated context".bold());
        if state.context.is_empty() {
            println!("{}", "(none)".dimmed());
        }
        for (i, block) in state.context.iter().enumerate() {
            println!("{} {block}\n", format!("[{}]", i + 1).dimmed());
        }
    }
    Ok(())
}

pub async fn delete(engine: &ConversationEngine, id: &str) -> Result<(), ThothError> {
    let id = ThreadId::new(id);
    if engine.delete_thread(&id).await? {
        println!("deleted {}", id.as_str().yellow());
    } else {
        println!("no thread with id {}", id.as_str().yellow());
    }
    Ok(())
}

/// Lists threads and reads a choice: a number picks an existing thread,
/// `n` starts a new one.
pub async fn pick_or_create(
    engine: &ConversationEngine,
    rl: &mut DefaultEditor,
) -> Result<ThreadId, ThothError> {
    let threads = engine.list_threads().await?;
    println!("\n{}", "Thread manager".bold());
    if threads.is_empty() {
        println!("{}", "No saved threads.".dimmed());
    }
    for (i, thread) in threads.iter().enumerate() {
        println!("  {}. {}", i + 1, format_thread(thread));
    }
    println!("  {}. start a new thread\n", "n".yellow());

    loop {
        let line = rl
            .readline("Pick a thread: ")
            .map_err(|e| ThothError::Internal(format!("failed to read input: {e}")))?;
        let choice = line.trim();
        if choice.eq_ignore_ascii_case("n") || (choice.is_empty() && threads.is_empty()) {
            let name = rl
                .readline("Give this conversation a name (blank for automatic): ")
                .map_err(|e| ThothError::Internal(format!("failed to read input: {e}")))?;
            let thread = engine.new_thread(Some(name.trim())).await?;
            println!("started {}", format_thread(&thread));
            return Ok(thread.id);
        }
        match choice.parse::<usize>() {
            Ok(n) if (1..=threads.len()).contains(&n) => {
                let thread = &threads[n - 1];
                println!("resuming {}", thread.name.bold());
                return Ok(thread.id.clone());
            }
            _ => println!("{}", "enter a listed number or n".yellow()),
        }
    }
}
