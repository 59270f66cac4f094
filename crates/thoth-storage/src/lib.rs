// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Thoth assistant.
//!
//! One WAL-mode database holds the thread ledger, the append-only checkpoint
//! log, and the FTS5 document index. All access goes through a single
//! `tokio-rusqlite` connection.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
