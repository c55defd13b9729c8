//! Error types for the ticketing crate.
//!
//! All fallible operations return [`Result`], an alias over
//! [`TicketingError`]. Validation failures carry the exact reason string
//! surfaced to callers; not-found and permission variants map onto the
//! 404/403 responses of the HTTP layer.

use crate::core::{ContractId, OrganizationId, SoftwareId, TicketId, UserId};
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TicketingError>;

#[derive(Debug, Error)]
pub enum TicketingError {
    /// Input failed a structural, relational, or contract check.
    ///
    /// The message is the reason string given to the caller verbatim,
    /// e.g. `description must be a string with minimum length of 50`.
    #[error("{0}")]
    Validation(String),

    #[error("Ticket not found")]
    TicketNotFound { id: TicketId },

    #[error("contract not found")]
    ContractNotFound { id: ContractId },

    #[error("Software not found")]
    SoftwareNotFound { id: SoftwareId },

    #[error("Organization not found")]
    OrganizationNotFound { id: OrganizationId },

    #[error("User not found")]
    UserNotFound { id: UserId },

    /// Caller could not be resolved to a known ticketing user.
    #[error("authentication required")]
    Unauthenticated,

    /// Caller lacks the administrator role required by the endpoint.
    #[error("User is not the administrator")]
    NotAdministrator,

    /// Caller is not involved with the ticket in the way the action needs.
    /// `action` is either `edit` or `update`.
    #[error("User does not have permission to {action} ticket: {id}")]
    TicketPermission { action: &'static str, id: TicketId },

    #[error("storage error: {0}")]
    Persistence(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_yaml::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("configuration error: {source}")]
    Config {
        #[from]
        source: config::ConfigError,
    },
}

impl TicketingError {
    /// Build a validation rejection from any printable reason.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// Short operator-facing description, used by the CLI error display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(reason) => format!("Invalid request: {reason}"),
            Self::TicketNotFound { id } => format!("Ticket {id} does not exist"),
            Self::ContractNotFound { id } => format!("Contract {id} does not exist"),
            Self::SoftwareNotFound { id } => format!("Software {id} does not exist"),
            Self::OrganizationNotFound { id } => {
                format!("Organization {id} does not exist")
            },
            Self::UserNotFound { id } => format!("User {id} does not exist"),
            Self::Unauthenticated => "No ticketing user for this request".to_string(),
            Self::NotAdministrator | Self::TicketPermission { .. } => {
                format!("Permission denied: {self}")
            },
            Self::Persistence(_) | Self::Io { .. } | Self::Serialization { .. } | Self::Json { .. } => {
                format!("Storage failure: {self}")
            },
            Self::Config { source } => format!("Configuration problem: {source}"),
        }
    }

    /// True for failures the caller can fix by changing the request.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::TicketNotFound { .. }
                | Self::ContractNotFound { .. }
                | Self::SoftwareNotFound { .. }
                | Self::OrganizationNotFound { .. }
                | Self::UserNotFound { .. }
                | Self::Unauthenticated
                | Self::NotAdministrator
                | Self::TicketPermission { .. }
        )
    }
}
