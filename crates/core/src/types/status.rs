//! Order lifecycle status.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when an order status transition is not permitted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusTransitionError {
    /// The order is already in the requested state.
    #[error("Order is already {0}")]
    AlreadyInState(OrderStatus),

    /// The requested transition crosses between terminal states.
    #[error("{from} orders cannot be {to}")]
    TerminalState {
        /// Current (terminal) status, capitalized for the message.
        from: &'static str,
        /// Requested target, lowercase past participle.
        to: &'static str,
    },
}

/// Order status.
///
/// Stored on the wire and in the database as an integer:
/// 0 = active, 1 = completed, 2 = canceled. `Active` is the only
/// non-terminal state; `Completed` and `Canceled` are final and
/// mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Active,
    Completed,
    Canceled,
}

impl OrderStatus {
    /// Wire/database encoding of the status.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Active => 0,
            Self::Completed => 1,
            Self::Canceled => 2,
        }
    }

    /// Decode a status from its integer encoding.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Active),
            1 => Some(Self::Completed),
            2 => Some(Self::Canceled),
            _ => None,
        }
    }

    /// Whether this status permits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }

    /// Validate a transition from `self` to `target`.
    ///
    /// Only `Active -> Completed` and `Active -> Canceled` are permitted.
    ///
    /// # Errors
    ///
    /// Returns `StatusTransitionError::AlreadyInState` if the order is
    /// already in `target`, or `StatusTransitionError::TerminalState` when
    /// the transition would cross between terminal states.
    pub const fn transition_to(self, target: Self) -> Result<Self, StatusTransitionError> {
        match (self, target) {
            (Self::Active, Self::Completed | Self::Canceled) => Ok(target),
            (Self::Completed, Self::Completed) | (Self::Canceled, Self::Canceled) => {
                Err(StatusTransitionError::AlreadyInState(target))
            }
            (Self::Completed, _) => Err(StatusTransitionError::TerminalState {
                from: "Completed",
                to: "canceled",
            }),
            (Self::Canceled, _) => Err(StatusTransitionError::TerminalState {
                from: "Canceled",
                to: "completed",
            }),
            // Reactivation is never exposed; an active order asked to
            // become active again counts as "already in state".
            (Self::Active, Self::Active) => {
                Err(StatusTransitionError::AlreadyInState(Self::Active))
            }
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "canceled" => Ok(Self::Canceled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}
