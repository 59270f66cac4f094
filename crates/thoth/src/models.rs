// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `thoth models` command implementation.

use colored::Colorize;
use thoth_core::ThothError;
use thoth_ollama::{OllamaProvider, is_model_local};

/// Lists local and popular models, marking which are downloaded.
pub async fn list(provider: &OllamaProvider) -> Result<(), ThothError> {
    let local = match provider.client().list_models().await {
        Ok(local) => local,
        Err(e) => {
            eprintln!("{}: cannot reach Ollama: {e}", "warning".yellow());
            Vec::new()
        }
    };
    for model in provider.list_all_models().await {
        let mut line = if is_model_local(&model, &local) {
            format!("{} {model}", "*".green())
        } else {
            format!("  {}", model.dimmed())
        };
        if model == provider.default_model() {
            line.push_str(&format!(" {}", "(default)".cyan()));
        }
        println!("{line}");
    }
    println!("\n{} downloaded", "*".green());
    Ok(())
}

/// Downloads `model` unless it is already present.
pub async fn pull(provider: &OllamaProvider, model: &str) -> Result<(), ThothError> {
    let local = provider.client().list_models().await?;
    if is_model_local(model, &local) {
        println!("{model} is already downloaded");
        return Ok(());
    }
    println!("pulling {model}, this can take a while...");
    let status = provider.client().pull_model(model).await?;
    println!("{} {model}: {status}", "done".green());
    Ok(())
}
