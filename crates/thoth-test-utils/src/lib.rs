// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Thoth integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock answer engine with pre-configured replies
//! - [`MockRetriever`] - Mock retrieval source with a call counter
//! - [`MockContextStore`] - In-memory document index
//! - [`TestHarness`] - Engine over a temp SQLite database

pub mod harness;
pub mod mock_provider;
pub mod mock_retriever;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_provider::MockProvider;
pub use mock_retriever::{MockContextStore, MockRetriever};
