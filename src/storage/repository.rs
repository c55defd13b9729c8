use crate::core::{
    Contract, Software, Ticket, TicketId, TicketSoftware, TicketTimes, TicketingUser, UserId,
};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Filter and paging options for ticket listing.
///
/// `states` carries the raw labels from the caller; labels outside the
/// state enumeration are dropped, and if none survive, the listing is
/// empty without touching storage. The role filters combine with OR.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub states: Option<Vec<String>>,
    pub requester: Option<UserId>,
    pub support_manager: Option<UserId>,
    pub support_technician: Option<UserId>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl TicketFilter {
    /// True when at least one role filter is present.
    #[must_use]
    pub const fn has_role_filter(&self) -> bool {
        self.requester.is_some()
            || self.support_manager.is_some()
            || self.support_technician.is_some()
    }
}

/// Partial-field merge applied by [`TicketRepository::update_by_id`].
///
/// Absent fields are left alone; double-option fields distinguish
/// "leave alone" from "clear". Kept separate from [`Ticket`] so partial
/// updates and whole-entity saves cannot be confused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub demand_type: Option<String>,
    pub severity: Option<Option<String>>,
    pub software: Option<Option<TicketSoftware>>,
    pub description: Option<String>,
    pub environment: Option<Option<String>>,
    pub requester: Option<UserId>,
    pub support_manager: Option<UserId>,
    pub support_technicians: Option<Vec<UserId>>,
    pub times: Option<TicketTimes>,
}

impl TicketPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.demand_type.is_none()
            && self.severity.is_none()
            && self.software.is_none()
            && self.description.is_none()
            && self.environment.is_none()
            && self.requester.is_none()
            && self.support_manager.is_none()
            && self.support_technicians.is_none()
            && self.times.is_none()
    }

    /// Merge the present fields into `ticket`.
    pub fn apply(&self, ticket: &mut Ticket) {
        if let Some(title) = &self.title {
            ticket.title = title.clone();
        }
        if let Some(demand_type) = &self.demand_type {
            ticket.demand_type = demand_type.clone();
        }
        if let Some(severity) = &self.severity {
            ticket.severity = severity.clone();
        }
        if let Some(software) = &self.software {
            ticket.software = software.clone();
        }
        if let Some(description) = &self.description {
            ticket.description = description.clone();
        }
        if let Some(environment) = &self.environment {
            ticket.environment = environment.clone();
        }
        if let Some(requester) = self.requester {
            ticket.requester = requester;
        }
        if let Some(support_manager) = self.support_manager {
            ticket.support_manager = support_manager;
        }
        if let Some(technicians) = &self.support_technicians {
            ticket.support_technicians = technicians.clone();
        }
        if let Some(times) = self.times {
            ticket.times = times;
        }
    }
}

/// Reference fields a caller may ask the store to expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketExpand {
    Contract,
    Requester,
    SupportManager,
    SupportTechnicians,
    SoftwareTemplate,
}

impl TicketExpand {
    /// Expansion set used by the read endpoints.
    pub const ALL: [Self; 5] = [
        Self::Contract,
        Self::Requester,
        Self::SupportManager,
        Self::SupportTechnicians,
        Self::SoftwareTemplate,
    ];
}

/// A ticket together with whatever references were expanded.
///
/// Unresolvable references stay `None` rather than failing the read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_details: Option<Contract>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_details: Option<TicketingUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_manager_details: Option<TicketingUser>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub support_technician_details: Vec<TicketingUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_template_details: Option<Software>,
}

impl TicketView {
    /// Wrap a ticket with nothing expanded.
    #[must_use]
    pub const fn bare(ticket: Ticket) -> Self {
        Self {
            ticket,
            contract_details: None,
            requester_details: None,
            support_manager_details: None,
            support_technician_details: Vec::new(),
            software_template_details: None,
        }
    }
}

/// Persistence contract for tickets.
///
/// Implementations must keep the `updated` timestamp current on every
/// write, since listings sort by it.
pub trait TicketRepository: Send + Sync {
    /// Persists a new ticket and returns the stored entity.
    fn create(&self, ticket: &Ticket) -> Result<Ticket>;

    /// Loads a ticket by ID, `None` when absent.
    fn get_by_id(&self, id: TicketId) -> Result<Option<Ticket>>;

    /// Lists tickets most-recently-updated first.
    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>>;

    /// Merges the patch into the stored ticket, `None` when absent.
    fn update_by_id(&self, id: TicketId, patch: &TicketPatch) -> Result<Option<Ticket>>;

    /// Writes a whole entity back and returns the stored copy.
    fn save(&self, ticket: &Ticket) -> Result<Ticket>;

    /// Expands the requested reference fields.
    fn populate(&self, ticket: Ticket, expand: &[TicketExpand]) -> Result<TicketView>;
}

/// User lookups backing the relational validation checks.
///
/// Lookups may be issued concurrently; a missing user is `None`, not an
/// error, so callers can aggregate which identifiers were unresolvable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_by_id(&self, id: UserId) -> Result<Option<TicketingUser>>;
}

use super::file::FileStorage;

impl TicketRepository for FileStorage {
    fn create(&self, ticket: &Ticket) -> Result<Ticket> {
        self.create_ticket(ticket)
    }

    fn get_by_id(&self, id: TicketId) -> Result<Option<Ticket>> {
        self.ticket_by_id(id)
    }

    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        self.list_tickets(filter)
    }

    fn update_by_id(&self, id: TicketId, patch: &TicketPatch) -> Result<Option<Ticket>> {
        self.update_ticket_by_id(id, patch)
    }

    fn save(&self, ticket: &Ticket) -> Result<Ticket> {
        self.save_ticket(ticket)
    }

    fn populate(&self, ticket: Ticket, expand: &[TicketExpand]) -> Result<TicketView> {
        self.populate_ticket(ticket, expand)
    }
}

#[async_trait]
impl UserDirectory for FileStorage {
    async fn user_by_id(&self, id: UserId) -> Result<Option<TicketingUser>> {
        self.load_user(id)
    }
}
