// SPDX-FileCopyrightText: 2026 Thoth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-turn state machine.
//!
//! A turn always starts in [`TurnState::Classify`] and ends in
//! [`TurnState::Done`]. The only branch is after classification; there is
//! no path back to `Classify` within a turn.

/// States of a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Decide whether the question needs new context.
    Classify,
    /// Fan out to the enabled sources and compress the results.
    Retrieve,
    /// Produce the answer from the accumulated context.
    Generate,
    /// Terminal.
    Done,
}

impl TurnState {
    pub fn initial() -> Self {
        TurnState::Classify
    }

    /// Transition function.
    ///
    /// `needs_context` is the classification result and only matters when
    /// leaving `Classify`.
    pub fn next(self, needs_context: bool) -> TurnState {
        match self {
            TurnState::Classify if needs_context => TurnState::Retrieve,
            TurnState::Classify => TurnState::Generate,
            TurnState::Retrieve => TurnState::Generate,
            TurnState::Generate | TurnState::Done => TurnState::Done,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == TurnState::Done
    }
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnState::Classify => write!(f, "classify"),
            TurnState::Retrieve => write!(f, "retrieve"),
            TurnState::Generate => write!(f, "generate"),
            TurnState::Done => write!(f, "done"),
        }
    }
}
