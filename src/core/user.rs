//! Ticketing users and their roles.

use crate::core::UserId;
use crate::error::TicketingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role granted to a user within the ticketing module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketingRole {
    Administrator,
    Supporter,
    User,
}

impl TicketingRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::Supporter => "supporter",
            Self::User => "user",
        }
    }

    #[must_use]
    pub const fn is_administrator(self) -> bool {
        matches!(self, Self::Administrator)
    }
}

impl fmt::Display for TicketingRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketingRole {
    type Err = TicketingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "administrator" => Ok(Self::Administrator),
            "supporter" => Ok(Self::Supporter),
            "user" => Ok(Self::User),
            _ => Err(TicketingError::validation("Invalid TicketingUser role")),
        }
    }
}

/// A user known to the ticketing module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketingUser {
    pub id: UserId,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub role: TicketingRole,
}

impl TicketingUser {
    /// Human-readable name used in activity changesets.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
            .trim()
            .to_string()
    }
}

/// Join display names for a technician list, in input order.
#[must_use]
pub fn display_names(users: &[TicketingUser]) -> String {
    users
        .iter()
        .map(TicketingUser::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(firstname: &str, lastname: &str) -> TicketingUser {
        TicketingUser {
            id: UserId::new(),
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            email: format!("{firstname}@open-paas.org").to_lowercase(),
            role: TicketingRole::Supporter,
        }
    }

    #[test]
    fn parses_known_roles() {
        assert_eq!(
            "administrator".parse::<TicketingRole>().ok(),
            Some(TicketingRole::Administrator)
        );
        assert_eq!(
            "supporter".parse::<TicketingRole>().ok(),
            Some(TicketingRole::Supporter)
        );
        assert_eq!(
            "user".parse::<TicketingRole>().ok(),
            Some(TicketingRole::User)
        );
    }

    #[test]
    fn unknown_role_is_rejected_with_reason() {
        let err = "manager".parse::<TicketingRole>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid TicketingUser role");
    }

    #[test]
    fn display_name_joins_first_and_last() {
        assert_eq!(user("Amy", "Wolsh").display_name(), "Amy Wolsh");
    }

    #[test]
    fn technician_names_join_in_order() {
        let users = vec![user("Amy", "Wolsh"), user("John", "Doe")];
        assert_eq!(display_names(&users), "Amy Wolsh, John Doe");
    }
}
