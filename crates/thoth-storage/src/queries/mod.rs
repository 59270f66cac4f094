// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the thread ledger, checkpoints, and the document index.

pub mod checkpoints;
pub mod documents;
pub mod threads;
