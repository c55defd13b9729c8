//! Request orchestration: permissions, validation, storage, events.
//!
//! [`TicketingService`] is the single entry point the HTTP handlers and
//! the CLI talk to. Each method checks the caller's permissions first,
//! then validates, then touches storage, and finally publishes an event
//! when the mutation produced a visible change.

mod catalog;
mod contracts;
mod tickets;

pub use catalog::{NewOrganizationPayload, NewSoftwarePayload, NewUserPayload};
pub use contracts::{CatalogEntryPayload, NewContractPayload, PermissionsPayload};
pub use tickets::{ActivityQuery, TicketListQuery, TicketUpdateRequest};

use crate::core::{Contract, Ticket, TicketingUser};
use crate::error::{Result, TicketingError};
use crate::events::EventBus;
use crate::storage::FileStorage;
use std::sync::Arc;

/// Orchestrates ticket and catalog operations over the store and the
/// event bus. Cloning shares both.
#[derive(Debug, Clone)]
pub struct TicketingService {
    storage: Arc<FileStorage>,
    bus: EventBus,
}

impl TicketingService {
    #[must_use]
    pub fn new(storage: Arc<FileStorage>, bus: EventBus) -> Self {
        Self { storage, bus }
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<FileStorage> {
        &self.storage
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub(crate) fn require_administrator(actor: &TicketingUser) -> Result<()> {
        if actor.role.is_administrator() {
            return Ok(());
        }
        Err(TicketingError::NotAdministrator)
    }

    /// Basic-field edits are reserved to administrators and the owning
    /// contract's default support manager.
    pub(crate) fn require_edit(
        actor: &TicketingUser,
        contract: &Contract,
        ticket: &Ticket,
    ) -> Result<()> {
        if actor.role.is_administrator() || contract.default_support_manager == actor.id {
            return Ok(());
        }
        Err(TicketingError::TicketPermission {
            action: "edit",
            id: ticket.id,
        })
    }

    /// State transitions and time flags are additionally open to the
    /// ticket's own support manager and technicians.
    pub(crate) fn require_update(
        actor: &TicketingUser,
        contract: &Contract,
        ticket: &Ticket,
    ) -> Result<()> {
        if actor.role.is_administrator()
            || contract.default_support_manager == actor.id
            || ticket.involves_as_support(actor.id)
        {
            return Ok(());
        }
        Err(TicketingError::TicketPermission {
            action: "update",
            id: ticket.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContractBuilder, TicketBuilder, TicketingRole, UserId};

    fn actor(role: TicketingRole) -> TicketingUser {
        TicketingUser {
            id: UserId::new(),
            firstname: "Amy".to_string(),
            lastname: "Wolsh".to_string(),
            email: "amy@open-paas.org".to_string(),
            role,
        }
    }

    #[test]
    fn only_administrators_pass_the_admin_gate() {
        assert!(TicketingService::require_administrator(&actor(TicketingRole::Administrator)).is_ok());
        assert!(TicketingService::require_administrator(&actor(TicketingRole::Supporter)).is_err());
        assert!(TicketingService::require_administrator(&actor(TicketingRole::User)).is_err());
    }

    #[test]
    fn the_default_support_manager_may_edit() {
        let manager = actor(TicketingRole::Supporter);
        let contract = ContractBuilder::new()
            .default_support_manager(manager.id)
            .build();
        let ticket = TicketBuilder::new().contract(contract.id).build();

        assert!(TicketingService::require_edit(&manager, &contract, &ticket).is_ok());

        let other = actor(TicketingRole::Supporter);
        let denied = TicketingService::require_edit(&other, &contract, &ticket);
        assert!(matches!(
            denied,
            Err(TicketingError::TicketPermission { action: "edit", .. })
        ));
    }

    #[test]
    fn ticket_support_staff_may_update_but_not_edit() {
        let technician = actor(TicketingRole::Supporter);
        let contract = ContractBuilder::new().build();
        let ticket = TicketBuilder::new()
            .contract(contract.id)
            .support_technician(technician.id)
            .build();

        assert!(TicketingService::require_update(&technician, &contract, &ticket).is_ok());
        assert!(TicketingService::require_edit(&technician, &contract, &ticket).is_err());

        let plain = actor(TicketingRole::User);
        let denied = TicketingService::require_update(&plain, &contract, &ticket);
        assert!(matches!(
            denied,
            Err(TicketingError::TicketPermission { action: "update", .. })
        ));
    }
}
