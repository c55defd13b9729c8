use super::{
    Contract, ContractId, ContractPermissions, ContractSoftware, Demand, OrganizationId,
    Ticket, TicketId, TicketSoftware, TicketState, TicketTimes, UserId,
};
use chrono::{DateTime, Utc};

/// Builder for creating Ticket instances
#[derive(Default)]
pub struct TicketBuilder {
    id: Option<TicketId>,
    contract: Option<ContractId>,
    title: Option<String>,
    demand_type: Option<String>,
    severity: Option<String>,
    software: Option<TicketSoftware>,
    description: Option<String>,
    environment: Option<String>,
    requester: Option<UserId>,
    support_manager: Option<UserId>,
    support_technicians: Vec<UserId>,
    state: Option<TicketState>,
    times: Option<TicketTimes>,
    creation: Option<DateTime<Utc>>,
}

impl TicketBuilder {
    /// Create a new ticket builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ticket ID
    #[must_use]
    pub const fn id(mut self, id: TicketId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the owning contract
    #[must_use]
    pub const fn contract(mut self, contract: ContractId) -> Self {
        self.contract = Some(contract);
        self
    }

    /// Set the title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the demand type
    #[must_use]
    pub fn demand_type(mut self, demand_type: impl Into<String>) -> Self {
        self.demand_type = Some(demand_type.into());
        self
    }

    /// Set the severity
    #[must_use]
    pub fn severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    /// Set the software selection
    #[must_use]
    pub fn software(mut self, software: TicketSoftware) -> Self {
        self.software = Some(software);
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the environment
    #[must_use]
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Set the requester
    #[must_use]
    pub const fn requester(mut self, requester: UserId) -> Self {
        self.requester = Some(requester);
        self
    }

    /// Set the support manager
    #[must_use]
    pub const fn support_manager(mut self, support_manager: UserId) -> Self {
        self.support_manager = Some(support_manager);
        self
    }

    /// Set the support technicians
    #[must_use]
    pub fn support_technicians(mut self, technicians: Vec<UserId>) -> Self {
        self.support_technicians = technicians;
        self
    }

    /// Add a single support technician
    #[must_use]
    pub fn support_technician(mut self, technician: UserId) -> Self {
        self.support_technicians.push(technician);
        self
    }

    /// Set the state
    #[must_use]
    pub const fn state(mut self, state: TicketState) -> Self {
        self.state = Some(state);
        self
    }

    /// Set the SLA times
    #[must_use]
    pub const fn times(mut self, times: TicketTimes) -> Self {
        self.times = Some(times);
        self
    }

    /// Set the creation timestamp
    #[must_use]
    pub const fn creation(mut self, creation: DateTime<Utc>) -> Self {
        self.creation = Some(creation);
        self
    }

    /// Build the ticket
    pub fn build(self) -> Ticket {
        let creation = self.creation.unwrap_or_else(Utc::now);

        Ticket {
            id: self.id.unwrap_or_default(),
            contract: self.contract.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            demand_type: self.demand_type.unwrap_or_default(),
            severity: self.severity,
            software: self.software,
            description: self.description.unwrap_or_default(),
            environment: self.environment,
            attachments: Vec::new(),
            requester: self.requester.unwrap_or_default(),
            support_manager: self.support_manager.unwrap_or_default(),
            support_technicians: self.support_technicians,
            state: self.state.unwrap_or_default(),
            times: self.times.unwrap_or_default(),
            creation,
            updated: creation,
        }
    }
}

/// Builder for creating Contract instances
#[derive(Default)]
pub struct ContractBuilder {
    id: Option<ContractId>,
    title: Option<String>,
    organization: Option<OrganizationId>,
    default_support_manager: Option<UserId>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    demands: Vec<Demand>,
    software: Vec<ContractSoftware>,
    permissions: Option<ContractPermissions>,
}

impl ContractBuilder {
    /// Create a new contract builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the contract ID
    #[must_use]
    pub const fn id(mut self, id: ContractId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the organization
    #[must_use]
    pub const fn organization(mut self, organization: OrganizationId) -> Self {
        self.organization = Some(organization);
        self
    }

    /// Set the default support manager
    #[must_use]
    pub const fn default_support_manager(mut self, manager: UserId) -> Self {
        self.default_support_manager = Some(manager);
        self
    }

    /// Set the start date
    #[must_use]
    pub const fn start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Set the end date
    #[must_use]
    pub const fn end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Set the demand catalog
    #[must_use]
    pub fn demands(mut self, demands: Vec<Demand>) -> Self {
        self.demands = demands;
        self
    }

    /// Add a single demand entry
    #[must_use]
    pub fn demand(mut self, demand: Demand) -> Self {
        self.demands.push(demand);
        self
    }

    /// Set the software catalog
    #[must_use]
    pub fn software(mut self, software: Vec<ContractSoftware>) -> Self {
        self.software = software;
        self
    }

    /// Add a single software catalog entry
    #[must_use]
    pub fn software_entry(mut self, entry: ContractSoftware) -> Self {
        self.software.push(entry);
        self
    }

    /// Set the entity permissions
    #[must_use]
    pub fn permissions(mut self, permissions: ContractPermissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Build the contract
    pub fn build(self) -> Contract {
        Contract {
            id: self.id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            organization: self.organization.unwrap_or_default(),
            default_support_manager: self.default_support_manager.unwrap_or_default(),
            start_date: self.start_date,
            end_date: self.end_date,
            demands: self.demands,
            software: self.software,
            permissions: self.permissions.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_builder_fills_defaults() {
        let contract = ContractId::new();
        let ticket = TicketBuilder::new()
            .contract(contract)
            .title("Mail relay rejects attachments")
            .demand_type("Info1")
            .severity("Blocking1")
            .description("Outgoing mail with any attachment above 1MB bounces with a 552 error.")
            .build();

        assert_eq!(ticket.contract, contract);
        assert_eq!(ticket.title, "Mail relay rejects attachments");
        assert_eq!(ticket.state, TicketState::New);
        assert_eq!(ticket.times, TicketTimes::default());
        assert_eq!(ticket.updated, ticket.creation);
        assert!(ticket.support_technicians.is_empty());
    }

    #[test]
    fn contract_builder_collects_catalogs() {
        let manager = UserId::new();
        let contract = ContractBuilder::new()
            .title("OpenPaaS support")
            .default_support_manager(manager)
            .demand(Demand {
                demand_type: "Info1".to_string(),
                ..Demand::default()
            })
            .build();

        assert_eq!(contract.default_support_manager, manager);
        assert_eq!(contract.demands.len(), 1);
        assert_eq!(contract.permissions, ContractPermissions::All);
    }
}
