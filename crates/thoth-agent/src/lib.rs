// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn orchestration for the Thoth assistant.
//!
//! [`ConversationEngine`] drives each user question through the
//! classify, retrieve and generate states of [`TurnState`], compressing
//! retrieved context and checkpointing the thread once the answer exists.

pub mod compression;
pub mod engine;
pub mod machine;
pub mod prompts;
pub mod retention;

pub use engine::{ConversationEngine, TurnOptions, TurnOutcome, auto_thread_name};
pub use machine::TurnState;
pub use retention::RetentionPolicy;
