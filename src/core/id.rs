//! Entity identifiers.
//!
//! Every stored entity gets its own uuid-backed newtype so references
//! cannot be mixed up across collections. Identifiers serialize as plain
//! uuid strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Ticket`](crate::core::Ticket).
    TicketId
);
entity_id!(
    /// Identifier of a [`Contract`](crate::core::Contract).
    ContractId
);
entity_id!(
    /// Identifier of a [`TicketingUser`](crate::core::TicketingUser).
    UserId
);
entity_id!(
    /// Identifier of a [`Software`](crate::core::Software) template.
    SoftwareId
);
entity_id!(
    /// Identifier of an [`Organization`](crate::core::Organization).
    OrganizationId
);
entity_id!(
    /// Opaque reference to an attachment held by the external file store.
    AttachmentId
);
