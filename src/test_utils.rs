//! Shared test fixtures.
//!
//! [`TestProject`] seeds a temporary store with the cast the ticket
//! flows need: an administrator, a support manager owning the contract,
//! a second supporter, a plain user, one software template, and a
//! contract whose demand catalog covers two triples.

#![cfg(test)]

use crate::core::{
    Contract, ContractBuilder, ContractSoftware, Demand, Organization, OrganizationId,
    Software, SoftwareId, Ticket, TicketBuilder, TicketSoftware, TicketingRole, TicketingUser,
    UserId,
};
use crate::events::EventBus;
use crate::service::TicketingService;
use crate::storage::FileStorage;
use std::sync::Arc;
use tempfile::TempDir;

/// A description long enough to pass the minimum-length check.
pub const DESCRIPTION: &str =
    "The shared calendar stopped syncing for every member of the accounting team this morning.";

/// Test fixture holding a seeded temporary store.
pub struct TestProject {
    pub temp_dir: TempDir,
    pub storage: Arc<FileStorage>,
    pub admin: TicketingUser,
    pub manager: TicketingUser,
    pub supporter: TicketingUser,
    pub plain_user: TicketingUser,
    pub organization: Organization,
    pub software: Software,
    pub contract: Contract,
}

/// Demand entry covering (Info1, Blocking1, Normal1) with short
/// engagement times.
pub fn demand1() -> Demand {
    Demand {
        demand_type: "Info1".to_string(),
        issue_type: Some("Blocking1".to_string()),
        software_type: Some("Normal1".to_string()),
        response_time: Some(1),
        workaround_time: Some(2),
        correction_time: Some(3),
    }
}

/// Demand entry covering (Info2, Blocking2, Normal2) with longer
/// engagement times.
pub fn demand2() -> Demand {
    Demand {
        demand_type: "Info2".to_string(),
        issue_type: Some("Blocking2".to_string()),
        software_type: Some("Normal2".to_string()),
        response_time: Some(10),
        workaround_time: Some(20),
        correction_time: Some(30),
    }
}

pub fn test_user(firstname: &str, lastname: &str, role: TicketingRole) -> TicketingUser {
    TicketingUser {
        id: UserId::new(),
        firstname: firstname.to_string(),
        lastname: lastname.to_string(),
        email: format!("{}@open-paas.org", firstname.to_lowercase()),
        role,
    }
}

impl TestProject {
    /// Create a temporary store seeded with users, an organization, a
    /// software template, and a contract.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = Arc::new(FileStorage::new(temp_dir.path()));
        storage
            .ensure_directories()
            .expect("Failed to initialize storage");

        let admin = seed_user(&storage, "Amy", "Wolsh", TicketingRole::Administrator);
        let manager = seed_user(&storage, "John", "Doe", TicketingRole::Supporter);
        let supporter = seed_user(&storage, "Kim", "Gardner", TicketingRole::Supporter);
        let plain_user = seed_user(&storage, "Lea", "Moreau", TicketingRole::User);

        let software = storage
            .create_software(&Software {
                id: SoftwareId::new(),
                name: "OpenPaaS".to_string(),
                category: "Collaboration".to_string(),
                versions: vec!["1".to_string(), "2".to_string(), "3".to_string()],
                active: true,
            })
            .expect("Failed to seed software");

        let organization = storage
            .create_organization(&Organization {
                id: OrganizationId::new(),
                short_name: "linagora".to_string(),
                parent: None,
            })
            .expect("Failed to seed organization");

        let contract = storage
            .create_contract(
                &ContractBuilder::new()
                    .title("OpenPaaS support")
                    .organization(organization.id)
                    .default_support_manager(manager.id)
                    .demand(demand1())
                    .demand(demand2())
                    .software_entry(ContractSoftware {
                        template: software.id,
                        versions: software.versions.clone(),
                        software_type: "Normal1".to_string(),
                    })
                    .software_entry(ContractSoftware {
                        template: software.id,
                        versions: software.versions.clone(),
                        software_type: "Normal2".to_string(),
                    })
                    .build(),
            )
            .expect("Failed to seed contract");

        Self {
            temp_dir,
            storage,
            admin,
            manager,
            supporter,
            plain_user,
            organization,
            software,
            contract,
        }
    }

    /// Service over the seeded store with a fresh event bus.
    pub fn service(&self) -> TicketingService {
        self.service_with_bus(EventBus::default())
    }

    pub fn service_with_bus(&self, bus: EventBus) -> TicketingService {
        TicketingService::new(Arc::clone(&self.storage), bus)
    }

    /// Store a ticket matching the contract's first demand, requested
    /// by the plain user and worked by the second supporter.
    pub fn seed_ticket(&self) -> Ticket {
        let ticket = TicketBuilder::new()
            .contract(self.contract.id)
            .title("Calendar sync broken")
            .demand_type("Info1")
            .severity("Blocking1")
            .software(TicketSoftware {
                template: self.software.id,
                version: "1".to_string(),
                criticality: "Normal1".to_string(),
            })
            .description(DESCRIPTION)
            .requester(self.plain_user.id)
            .support_manager(self.supporter.id)
            .support_technician(self.supporter.id)
            .build();
        self.storage
            .create_ticket(&ticket)
            .expect("Failed to seed ticket")
    }
}

fn seed_user(
    storage: &FileStorage,
    firstname: &str,
    lastname: &str,
    role: TicketingRole,
) -> TicketingUser {
    storage
        .create_user(&test_user(firstname, lastname, role))
        .expect("Failed to seed user")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_entities_are_readable_back() {
        let project = TestProject::new();

        let contract = project
            .storage
            .contract_by_id(project.contract.id)
            .expect("Failed to read contract")
            .expect("Contract should exist");
        assert_eq!(contract.demands.len(), 2);
        assert_eq!(contract.default_support_manager, project.manager.id);

        let users = project.storage.list_users().expect("Failed to list users");
        assert_eq!(users.len(), 4);
    }

    #[test]
    fn seeded_ticket_matches_the_first_demand() {
        let project = TestProject::new();
        let ticket = project.seed_ticket();

        let demand = project
            .contract
            .demand_for(
                &ticket.demand_type,
                ticket.severity.as_deref(),
                ticket.software.as_ref().map(|s| s.criticality.as_str()),
            )
            .expect("Seeded ticket should match a demand");
        assert_eq!(demand.response_time, Some(1));
    }
}
