//! Core domain types: identifiers, users, organizations, software
//! templates, contracts, and tickets with their lifecycle rules.

mod builders;
mod contract;
mod id;
mod organization;
mod software;
mod state;
mod ticket;
mod user;

pub use builders::{ContractBuilder, TicketBuilder};
pub use contract::{Contract, ContractPermissions, ContractSoftware, Demand};
pub use id::{AttachmentId, ContractId, OrganizationId, SoftwareId, TicketId, UserId};
pub use organization::Organization;
pub use software::Software;
pub use state::TicketState;
pub use ticket::{Ticket, TicketSoftware, TicketTimes, TimeField};
pub use user::{display_names, TicketingRole, TicketingUser};
