//! YAML file storage.
//!
//! Every entity is one YAML document under a per-collection directory:
//!
//! ```text
//! <data_dir>/
//!   tickets/<ticket-id>.yaml
//!   contracts/<contract-id>.yaml
//!   software/<software-id>.yaml
//!   organizations/<organization-id>.yaml
//!   users/<user-id>.yaml
//!   timeline/<ticket-id>.yaml
//! ```
//!
//! Timeline files hold the full entry list for one ticket; everything
//! else is one entity per file.

use crate::core::{
    Contract, ContractId, Organization, OrganizationId, Software, SoftwareId, Ticket, TicketId,
    TicketState, TicketingUser, UserId,
};
use crate::error::Result;
use crate::events::timeline::{ActivityTimeline, TimelineEntry, TimelineQuery};
use crate::storage::{TicketExpand, TicketFilter, TicketPatch, TicketView};
use crate::storage::{DEFAULT_LIST_LIMIT, DEFAULT_LIST_OFFSET};
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const TICKETS_DIR: &str = "tickets";
const CONTRACTS_DIR: &str = "contracts";
const SOFTWARE_DIR: &str = "software";
const ORGANIZATIONS_DIR: &str = "organizations";
const USERS_DIR: &str = "users";
const TIMELINE_DIR: &str = "timeline";

/// File-based storage for all ticketing collections.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory the collections live under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create every collection directory.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            TICKETS_DIR,
            CONTRACTS_DIR,
            SOFTWARE_DIR,
            ORGANIZATIONS_DIR,
            USERS_DIR,
            TIMELINE_DIR,
        ] {
            fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }

    fn doc_path(&self, collection: &str, id: impl std::fmt::Display) -> PathBuf {
        self.root.join(collection).join(format!("{id}.yaml"))
    }

    fn write_doc<T: Serialize>(&self, collection: &str, id: impl std::fmt::Display, doc: &T) -> Result<()> {
        let dir = self.root.join(collection);
        fs::create_dir_all(&dir)?;
        let content = serde_yaml::to_string(doc)?;
        fs::write(dir.join(format!("{id}.yaml")), content)?;
        Ok(())
    }

    fn read_doc<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    fn read_doc_opt<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        self.read_doc(path).map(Some)
    }

    /// Read every YAML document in a collection. A missing directory is
    /// an empty collection, not an error.
    fn read_collection<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let dir = self.root.join(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut docs = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("yaml") {
                docs.push(self.read_doc(&path)?);
            }
        }
        Ok(docs)
    }

    fn page<T>(items: Vec<T>, offset: Option<usize>, limit: Option<usize>) -> Vec<T> {
        let offset = offset.unwrap_or(DEFAULT_LIST_OFFSET);
        // A zero limit falls back to the default page size.
        let limit = limit.filter(|limit| *limit > 0).unwrap_or(DEFAULT_LIST_LIMIT);
        items.into_iter().skip(offset).take(limit).collect()
    }

    // --- tickets ---

    pub fn create_ticket(&self, ticket: &Ticket) -> Result<Ticket> {
        self.write_doc(TICKETS_DIR, ticket.id, ticket)?;
        Ok(ticket.clone())
    }

    pub fn ticket_by_id(&self, id: TicketId) -> Result<Option<Ticket>> {
        self.read_doc_opt(&self.doc_path(TICKETS_DIR, id))
    }

    /// List tickets most-recently-updated first.
    ///
    /// Requested state labels that are not real states are dropped; when
    /// none survive, the result is empty without scanning the store. An
    /// empty label list means no state filter at all. Role filters
    /// combine with OR, so a supporter sees tickets they manage plus
    /// tickets they work as technician.
    pub fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let states = match &filter.states {
            Some(labels) if !labels.is_empty() => {
                let states: Vec<TicketState> = labels
                    .iter()
                    .filter_map(|label| TicketState::parse(label))
                    .collect();
                if states.is_empty() {
                    return Ok(Vec::new());
                }
                Some(states)
            },
            _ => None,
        };

        let mut tickets: Vec<Ticket> = self
            .read_collection(TICKETS_DIR)?
            .into_iter()
            .filter(|ticket: &Ticket| {
                states
                    .as_ref()
                    .is_none_or(|states| states.contains(&ticket.state))
            })
            .filter(|ticket| Self::matches_roles(ticket, filter))
            .collect();

        tickets.sort_by(|a, b| b.updated.cmp(&a.updated));
        Ok(Self::page(tickets, filter.offset, filter.limit))
    }

    fn matches_roles(ticket: &Ticket, filter: &TicketFilter) -> bool {
        if !filter.has_role_filter() {
            return true;
        }
        filter
            .requester
            .is_some_and(|user| ticket.requester == user)
            || filter
                .support_manager
                .is_some_and(|user| ticket.support_manager == user)
            || filter
                .support_technician
                .is_some_and(|user| ticket.support_technicians.contains(&user))
    }

    /// Merge a patch into a stored ticket and stamp `updated`.
    pub fn update_ticket_by_id(&self, id: TicketId, patch: &TicketPatch) -> Result<Option<Ticket>> {
        let Some(mut ticket) = self.ticket_by_id(id)? else {
            return Ok(None);
        };
        patch.apply(&mut ticket);
        ticket.updated = Utc::now();
        self.write_doc(TICKETS_DIR, ticket.id, &ticket)?;
        Ok(Some(ticket))
    }

    /// Write a whole ticket back, stamping `updated`.
    pub fn save_ticket(&self, ticket: &Ticket) -> Result<Ticket> {
        let mut stored = ticket.clone();
        stored.updated = Utc::now();
        self.write_doc(TICKETS_DIR, stored.id, &stored)?;
        Ok(stored)
    }

    /// Expand reference fields into their entities. References that no
    /// longer resolve stay unexpanded.
    pub fn populate_ticket(&self, ticket: Ticket, expand: &[TicketExpand]) -> Result<TicketView> {
        let mut view = TicketView::bare(ticket);
        for field in expand {
            match field {
                TicketExpand::Contract => {
                    view.contract_details = self.contract_by_id(view.ticket.contract)?;
                },
                TicketExpand::Requester => {
                    view.requester_details = self.load_user(view.ticket.requester)?;
                },
                TicketExpand::SupportManager => {
                    view.support_manager_details = self.load_user(view.ticket.support_manager)?;
                },
                TicketExpand::SupportTechnicians => {
                    let mut technicians =
                        Vec::with_capacity(view.ticket.support_technicians.len());
                    for id in &view.ticket.support_technicians {
                        if let Some(user) = self.load_user(*id)? {
                            technicians.push(user);
                        }
                    }
                    view.support_technician_details = technicians;
                },
                TicketExpand::SoftwareTemplate => {
                    view.software_template_details = match &view.ticket.software {
                        Some(software) => self.software_by_id(software.template)?,
                        None => None,
                    };
                },
            }
        }
        Ok(view)
    }

    // --- contracts ---

    pub fn create_contract(&self, contract: &Contract) -> Result<Contract> {
        self.write_doc(CONTRACTS_DIR, contract.id, contract)?;
        Ok(contract.clone())
    }

    pub fn contract_by_id(&self, id: ContractId) -> Result<Option<Contract>> {
        self.read_doc_opt(&self.doc_path(CONTRACTS_DIR, id))
    }

    pub fn list_contracts(&self) -> Result<Vec<Contract>> {
        let mut contracts: Vec<Contract> = self.read_collection(CONTRACTS_DIR)?;
        contracts.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(contracts)
    }

    pub fn save_contract(&self, contract: &Contract) -> Result<Contract> {
        self.write_doc(CONTRACTS_DIR, contract.id, contract)?;
        Ok(contract.clone())
    }

    // --- software templates ---

    pub fn create_software(&self, software: &Software) -> Result<Software> {
        self.write_doc(SOFTWARE_DIR, software.id, software)?;
        Ok(software.clone())
    }

    pub fn software_by_id(&self, id: SoftwareId) -> Result<Option<Software>> {
        self.read_doc_opt(&self.doc_path(SOFTWARE_DIR, id))
    }

    /// Case-insensitive name lookup, used by the availability check.
    pub fn software_by_name(&self, name: &str) -> Result<Option<Software>> {
        let wanted = name.trim().to_lowercase();
        let softwares: Vec<Software> = self.read_collection(SOFTWARE_DIR)?;
        Ok(softwares
            .into_iter()
            .find(|software| software.name.trim().to_lowercase() == wanted))
    }

    pub fn list_software(&self) -> Result<Vec<Software>> {
        let mut softwares: Vec<Software> = self.read_collection(SOFTWARE_DIR)?;
        softwares.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(softwares)
    }

    // --- organizations ---

    pub fn create_organization(&self, organization: &Organization) -> Result<Organization> {
        self.write_doc(ORGANIZATIONS_DIR, organization.id, organization)?;
        Ok(organization.clone())
    }

    pub fn organization_by_id(&self, id: OrganizationId) -> Result<Option<Organization>> {
        self.read_doc_opt(&self.doc_path(ORGANIZATIONS_DIR, id))
    }

    pub fn list_organizations(&self) -> Result<Vec<Organization>> {
        let mut organizations: Vec<Organization> = self.read_collection(ORGANIZATIONS_DIR)?;
        organizations.sort_by(|a, b| a.short_name.cmp(&b.short_name));
        Ok(organizations)
    }

    /// Sub-organizations of the given organization.
    pub fn entities_of(&self, organization: OrganizationId) -> Result<Vec<Organization>> {
        let organizations: Vec<Organization> = self.read_collection(ORGANIZATIONS_DIR)?;
        Ok(organizations
            .into_iter()
            .filter(|entity| entity.is_entity_of(organization))
            .collect())
    }

    // --- users ---

    pub fn create_user(&self, user: &TicketingUser) -> Result<TicketingUser> {
        self.write_doc(USERS_DIR, user.id, user)?;
        Ok(user.clone())
    }

    pub fn load_user(&self, id: UserId) -> Result<Option<TicketingUser>> {
        self.read_doc_opt(&self.doc_path(USERS_DIR, id))
    }

    pub fn list_users(&self) -> Result<Vec<TicketingUser>> {
        let mut users: Vec<TicketingUser> = self.read_collection(USERS_DIR)?;
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }
}

#[async_trait]
impl ActivityTimeline for FileStorage {
    async fn add_entry(&self, entry: TimelineEntry) -> Result<TimelineEntry> {
        let ticket = entry.object.id;
        let mut entries: Vec<TimelineEntry> = self
            .read_doc_opt(&self.doc_path(TIMELINE_DIR, ticket))?
            .unwrap_or_default();
        entries.push(entry.clone());
        self.write_doc(TIMELINE_DIR, ticket, &entries)?;
        Ok(entry)
    }

    async fn entries_for(
        &self,
        ticket: TicketId,
        query: &TimelineQuery,
    ) -> Result<Vec<TimelineEntry>> {
        let mut entries: Vec<TimelineEntry> = self
            .read_doc_opt(&self.doc_path(TIMELINE_DIR, ticket))?
            .unwrap_or_default();
        entries.sort_by(|a, b| b.published.cmp(&a.published));
        Ok(Self::page(entries, query.offset, query.limit))
    }
}
