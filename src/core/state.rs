//! Ticket lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a ticket within its lifecycle.
///
/// The wire and storage representation uses the human-readable labels
/// (`"In progress"`, `"Awaiting information"`, ...). `New` is only ever
/// the initial state; transitions back to it are rejected upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketState {
    #[default]
    New,
    #[serde(rename = "In progress")]
    InProgress,
    Awaiting,
    #[serde(rename = "Awaiting information")]
    AwaitingInformation,
    #[serde(rename = "Awaiting validation")]
    AwaitingValidation,
    Closed,
    Abandoned,
}

impl TicketState {
    /// Every state, in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::New,
        Self::InProgress,
        Self::Awaiting,
        Self::AwaitingInformation,
        Self::AwaitingValidation,
        Self::Closed,
        Self::Abandoned,
    ];

    /// States covered by the `open` listing scope.
    pub const OPEN: [Self; 5] = [
        Self::New,
        Self::InProgress,
        Self::Awaiting,
        Self::AwaitingInformation,
        Self::AwaitingValidation,
    ];

    /// Parse a wire label; unknown labels yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.as_str() == value)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::InProgress => "In progress",
            Self::Awaiting => "Awaiting",
            Self::AwaitingInformation => "Awaiting information",
            Self::AwaitingValidation => "Awaiting validation",
            Self::Closed => "Closed",
            Self::Abandoned => "Abandoned",
        }
    }

    /// Suspended classification used by the time tracker: every state
    /// except `New` and `In progress`. Entering a suspended state from an
    /// active one stamps `suspendedAt`; `Closed` and `Abandoned` count as
    /// suspended here so closing a ticket stops its clock too.
    #[must_use]
    pub const fn is_suspended(self) -> bool {
        !matches!(self, Self::New | Self::InProgress)
    }

    /// Terminal states, excluded from the `open` listing scope.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Abandoned)
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
