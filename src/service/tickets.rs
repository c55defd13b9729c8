//! Ticket operations: create, list, read, update, and the activity
//! feed.

use super::TicketingService;
use crate::core::{Contract, TicketBuilder, TicketId, TicketState, TicketingUser};
use crate::error::{Result, TicketingError};
use crate::events::{
    ActivityTimeline, ChangesetEntry, TicketUpdatedEvent, TimelineEntry, TimelineQuery, Verb,
};
use crate::storage::{TicketExpand, TicketFilter, TicketView};
use crate::validation::{
    self, NewTicketPayload, TicketAction, TicketUpdatePayload,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

/// Scope value selecting only tickets involving the caller.
pub const SCOPE_MINE: &str = "mine";

/// State value selecting every non-terminal state.
pub const STATE_OPEN: &str = "open";

/// Listing parameters accepted by the ticket list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketListQuery {
    pub state: Option<String>,
    pub scope: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

/// Paging parameters for the activity feed.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ActivityQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

/// A ticket update: the optional action and field selectors plus the
/// body.
#[derive(Debug, Clone, Default)]
pub struct TicketUpdateRequest {
    pub action: Option<String>,
    pub field: Option<String>,
    pub payload: TicketUpdatePayload,
}

impl TicketingService {
    /// Create a ticket under a contract.
    ///
    /// The caller becomes the requester and the contract's default
    /// support manager takes the ticket; the matched demand's
    /// engagement times seed the SLA targets.
    pub fn create_ticket(
        &self,
        actor: &TicketingUser,
        payload: &NewTicketPayload,
    ) -> Result<TicketView> {
        Self::require_administrator(actor)?;

        let contract_id = validation::parse_contract_ref(payload.contract.as_deref())?;
        let contract = self
            .storage()
            .contract_by_id(contract_id)?
            .ok_or(TicketingError::ContractNotFound { id: contract_id })?;

        let validated = validation::validate_new_ticket(&contract, payload)?;

        let mut ticket = TicketBuilder::new()
            .contract(contract.id)
            .title(validated.title)
            .demand_type(validated.demand_type)
            .description(validated.description)
            .requester(actor.id)
            .support_manager(contract.default_support_manager)
            .build();
        ticket.severity = validated.severity;
        ticket.software = validated.software;
        ticket.environment = validated.environment;
        ticket.attachments = validated.attachments;
        ticket.apply_engagements(Some(&validated.demand));

        let created = self.storage().create_ticket(&ticket)?;
        info!(ticket = %created.id, contract = %contract.id, "created ticket");
        self.storage().populate_ticket(created, &TicketExpand::ALL)
    }

    /// List tickets, most recently updated first.
    pub fn list_tickets(
        &self,
        actor: &TicketingUser,
        query: &TicketListQuery,
    ) -> Result<Vec<TicketView>> {
        Self::require_administrator(actor)?;

        let mut filter = TicketFilter {
            offset: query.offset,
            limit: query.limit,
            ..TicketFilter::default()
        };

        match query.state.as_deref().filter(|state| !state.is_empty()) {
            Some(STATE_OPEN) => {
                filter.states = Some(
                    TicketState::OPEN
                        .iter()
                        .map(|state| state.as_str().to_string())
                        .collect(),
                );
            }
            Some(state) => filter.states = Some(vec![state.to_string()]),
            None => {}
        }

        if query.scope.as_deref() == Some(SCOPE_MINE) {
            filter.requester = Some(actor.id);
            filter.support_manager = Some(actor.id);
            filter.support_technician = Some(actor.id);
        }

        let tickets = self.storage().list_tickets(&filter)?;
        debug!(count = tickets.len(), "listed tickets");
        tickets
            .into_iter()
            .map(|ticket| self.storage().populate_ticket(ticket, &TicketExpand::ALL))
            .collect()
    }

    /// Read one ticket with its references expanded.
    pub fn get_ticket(&self, actor: &TicketingUser, id: TicketId) -> Result<TicketView> {
        Self::require_administrator(actor)?;
        let ticket = self
            .storage()
            .ticket_by_id(id)?
            .ok_or(TicketingError::TicketNotFound { id })?;
        self.storage().populate_ticket(ticket, &TicketExpand::ALL)
    }

    /// Apply an update: a basic-field edit when no action is given,
    /// otherwise a state transition or a time flag.
    pub async fn update_ticket(
        &self,
        actor: &TicketingUser,
        id: TicketId,
        request: &TicketUpdateRequest,
    ) -> Result<TicketView> {
        let ticket = self
            .storage()
            .ticket_by_id(id)?
            .ok_or(TicketingError::TicketNotFound { id })?;
        let view = self.storage().populate_ticket(ticket, &TicketExpand::ALL)?;
        let contract_id = view.ticket.contract;
        let contract = self
            .storage()
            .contract_by_id(contract_id)?
            .ok_or(TicketingError::ContractNotFound { id: contract_id })?;

        match request.action.as_deref().filter(|action| !action.is_empty()) {
            None => {
                Self::require_edit(actor, &contract, &view.ticket)?;
                self.apply_basic_update(actor, view, &contract, &request.payload)
                    .await
            }
            Some(action) => {
                Self::require_update(actor, &contract, &view.ticket)?;
                self.apply_action(
                    actor,
                    view,
                    action,
                    request.field.as_deref(),
                    request.payload.state.as_deref(),
                )
            }
        }
    }

    async fn apply_basic_update(
        &self,
        actor: &TicketingUser,
        view: TicketView,
        contract: &Contract,
        payload: &TicketUpdatePayload,
    ) -> Result<TicketView> {
        let validation = validation::validate_ticket_update(
            contract,
            &view,
            payload,
            self.storage().as_ref(),
        )
        .await?;

        let mut patch = validation.patch;
        let mut changeset = validation.actor_changes;
        changeset.extend(validation::tracked_field_changes(&view.ticket, &patch));

        if let Some(proposed) = &patch.software {
            let proposed_name = match proposed {
                Some(software) => self
                    .storage()
                    .software_by_id(software.template)?
                    .map(|template| template.name),
                None => None,
            };
            changeset.extend(validation::software_change(
                &view,
                proposed.as_ref(),
                proposed_name.as_deref(),
            ));
        }

        // Re-derive the SLA targets from the (possibly new) matched
        // demand; the measured fields ride along untouched.
        let mut times = view.ticket.times;
        times.apply_engagements(Some(&validation.demand));
        patch.times = Some(times);

        let id = view.ticket.id;
        let updated = self
            .storage()
            .update_ticket_by_id(id, &patch)?
            .ok_or(TicketingError::TicketNotFound { id })?;

        if changeset.is_empty() {
            debug!(ticket = %updated.id, "update produced no visible change");
        } else {
            info!(ticket = %updated.id, entries = changeset.len(), "updated ticket");
            self.bus().publish_ticket_updated(TicketUpdatedEvent {
                actor: actor.clone(),
                ticket_id: updated.id,
                verb: Verb::Update,
                changeset,
            });
        }

        self.storage().populate_ticket(updated, &TicketExpand::ALL)
    }

    fn apply_action(
        &self,
        actor: &TicketingUser,
        view: TicketView,
        action: &str,
        field: Option<&str>,
        state: Option<&str>,
    ) -> Result<TicketView> {
        let resolved = validation::validate_ticket_action(&view.ticket, action, field, state)?;
        let mut ticket = view.ticket.clone();
        let now = Utc::now();

        let (verb, changeset) = match resolved {
            TicketAction::UpdateState(target) => {
                let from = ticket.state.as_str();
                if !ticket.apply_state(target, now) {
                    // Same state: nothing to write, nothing to announce.
                    return Ok(view);
                }
                (
                    Verb::Update,
                    vec![ChangesetEntry::change("state", "state", from, target.as_str())],
                )
            }
            TicketAction::SetTime(field) => {
                ticket.set_time(field, true, now);
                (
                    Verb::Set,
                    vec![ChangesetEntry::new(field.as_str(), field.display_name())],
                )
            }
            TicketAction::UnsetTime(field) => {
                ticket.set_time(field, false, now);
                (
                    Verb::Unset,
                    vec![ChangesetEntry::new(field.as_str(), field.display_name())],
                )
            }
        };

        let saved = self.storage().save_ticket(&ticket)?;
        info!(ticket = %saved.id, verb = %verb, "applied ticket action");
        self.bus().publish_ticket_updated(TicketUpdatedEvent {
            actor: actor.clone(),
            ticket_id: saved.id,
            verb,
            changeset,
        });

        self.storage().populate_ticket(saved, &TicketExpand::ALL)
    }

    /// Activity entries recorded for a ticket, newest first.
    pub async fn ticket_activities(
        &self,
        actor: &TicketingUser,
        id: TicketId,
        query: &ActivityQuery,
    ) -> Result<Vec<TimelineEntry>> {
        Self::require_administrator(actor)?;
        if self.storage().ticket_by_id(id)?.is_none() {
            return Err(TicketingError::TicketNotFound { id });
        }
        self.storage()
            .entries_for(
                id,
                &TimelineQuery {
                    offset: query.offset,
                    limit: query.limit,
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimeField;
    use crate::events::{ActivityActor, ActivityObject, EventBus};
    use crate::test_utils::{DESCRIPTION, TestProject};
    use crate::validation::SoftwarePayload;
    use tokio::sync::broadcast::error::TryRecvError;
    use uuid::Uuid;

    fn creation_payload(project: &TestProject) -> NewTicketPayload {
        NewTicketPayload {
            contract: Some(project.contract.id.to_string()),
            title: Some("Calendar sync broken".to_string()),
            demand_type: Some("Info1".to_string()),
            severity: Some("Blocking1".to_string()),
            software: Some(SoftwarePayload {
                template: Some(project.software.id.to_string()),
                version: Some("1".to_string()),
                criticality: Some("Normal1".to_string()),
            }),
            description: Some(DESCRIPTION.to_string()),
            ..NewTicketPayload::default()
        }
    }

    #[test]
    fn creation_assigns_roles_and_sla_targets() {
        let project = TestProject::new();
        let service = project.service();

        let view = service
            .create_ticket(&project.admin, &creation_payload(&project))
            .expect("Failed to create ticket");

        assert_eq!(view.ticket.requester, project.admin.id);
        assert_eq!(view.ticket.support_manager, project.manager.id);
        assert_eq!(view.ticket.state, TicketState::New);
        assert_eq!(view.ticket.times.response_sla, Some(1));
        assert_eq!(view.ticket.times.workaround_sla, Some(2));
        assert_eq!(view.ticket.times.correction_sla, Some(3));
        assert!(view.contract_details.is_some());
        assert_eq!(
            view.software_template_details.as_ref().map(|s| s.name.as_str()),
            Some("OpenPaaS")
        );
    }

    #[test]
    fn creation_is_reserved_to_administrators() {
        let project = TestProject::new();
        let service = project.service();

        let denied = service.create_ticket(&project.supporter, &creation_payload(&project));
        assert!(matches!(denied, Err(TicketingError::NotAdministrator)));
    }

    #[test]
    fn creation_fails_on_unknown_contract() {
        let project = TestProject::new();
        let service = project.service();
        let mut payload = creation_payload(&project);
        payload.contract = Some(crate::core::ContractId::new().to_string());

        let missing = service.create_ticket(&project.admin, &payload);
        assert!(matches!(
            missing,
            Err(TicketingError::ContractNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn basic_update_publishes_the_changeset() {
        let project = TestProject::new();
        let bus = EventBus::default();
        let mut events = bus.subscribe_ticket_updated();
        let service = project.service_with_bus(bus);
        let ticket = project.seed_ticket();

        let request = TicketUpdateRequest {
            payload: TicketUpdatePayload {
                title: Some(Some("Calendar sync still broken".to_string())),
                ..TicketUpdatePayload::default()
            },
            ..TicketUpdateRequest::default()
        };
        let view = service
            .update_ticket(&project.manager, ticket.id, &request)
            .await
            .expect("Failed to update ticket");

        assert_eq!(view.ticket.title, "Calendar sync still broken");
        assert_eq!(view.ticket.times.response_sla, Some(1));

        let event = events.try_recv().expect("Expected an update event");
        assert_eq!(event.ticket_id, ticket.id);
        assert_eq!(event.verb, Verb::Update);
        assert_eq!(event.changeset.len(), 1);
        assert_eq!(event.changeset[0].key, "title");
        assert_eq!(event.changeset[0].from.as_deref(), Some("Calendar sync broken"));
    }

    #[tokio::test]
    async fn silent_update_publishes_nothing() {
        let project = TestProject::new();
        let bus = EventBus::default();
        let mut events = bus.subscribe_ticket_updated();
        let service = project.service_with_bus(bus);
        let ticket = project.seed_ticket();

        let request = TicketUpdateRequest {
            payload: TicketUpdatePayload {
                title: Some(Some(ticket.title.clone())),
                ..TicketUpdatePayload::default()
            },
            ..TicketUpdateRequest::default()
        };
        service
            .update_ticket(&project.manager, ticket.id, &request)
            .await
            .expect("Failed to update ticket");

        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn edit_requires_the_default_support_manager() {
        let project = TestProject::new();
        let service = project.service();
        let ticket = project.seed_ticket();

        // The supporter manages this ticket but does not hold the
        // contract, so plain edits stay out of reach.
        let request = TicketUpdateRequest {
            payload: TicketUpdatePayload {
                title: Some(Some("Renamed".to_string())),
                ..TicketUpdatePayload::default()
            },
            ..TicketUpdateRequest::default()
        };
        let denied = service
            .update_ticket(&project.supporter, ticket.id, &request)
            .await;
        assert!(matches!(
            denied,
            Err(TicketingError::TicketPermission { action: "edit", .. })
        ));
    }

    #[tokio::test]
    async fn switching_demand_retargets_the_sla() {
        let project = TestProject::new();
        let bus = EventBus::default();
        let mut events = bus.subscribe_ticket_updated();
        let service = project.service_with_bus(bus);
        let ticket = project.seed_ticket();

        let request = TicketUpdateRequest {
            payload: TicketUpdatePayload {
                demand_type: Some(Some("Info2".to_string())),
                severity: Some(Some("Blocking2".to_string())),
                software: Some(Some(SoftwarePayload {
                    template: Some(project.software.id.to_string()),
                    version: Some("2".to_string()),
                    criticality: Some("Normal2".to_string()),
                })),
                ..TicketUpdatePayload::default()
            },
            ..TicketUpdateRequest::default()
        };
        let view = service
            .update_ticket(&project.admin, ticket.id, &request)
            .await
            .expect("Failed to update ticket");

        assert_eq!(view.ticket.times.response_sla, Some(10));
        assert_eq!(view.ticket.times.workaround_sla, Some(20));
        assert_eq!(view.ticket.times.correction_sla, Some(30));

        let event = events.try_recv().expect("Expected an update event");
        let keys: Vec<&str> = event.changeset.iter().map(|entry| entry.key.as_str()).collect();
        assert_eq!(keys, ["demandType", "severity", "software"]);
        let software = &event.changeset[2];
        assert_eq!(software.from.as_deref(), Some("OpenPaaS 1 - (Normal1)"));
        assert_eq!(software.to.as_deref(), Some("OpenPaaS 2 - (Normal2)"));
    }

    #[tokio::test]
    async fn starting_progress_stamps_response_and_publishes() {
        let project = TestProject::new();
        let bus = EventBus::default();
        let mut events = bus.subscribe_ticket_updated();
        let service = project.service_with_bus(bus);
        let ticket = project.seed_ticket();

        let request = TicketUpdateRequest {
            action: Some("updateState".to_string()),
            payload: TicketUpdatePayload {
                state: Some("In progress".to_string()),
                ..TicketUpdatePayload::default()
            },
            ..TicketUpdateRequest::default()
        };
        let view = service
            .update_ticket(&project.supporter, ticket.id, &request)
            .await
            .expect("Failed to update state");

        assert_eq!(view.ticket.state, TicketState::InProgress);
        assert_eq!(view.ticket.times.response, Some(0));

        let event = events.try_recv().expect("Expected an update event");
        assert_eq!(event.verb, Verb::Update);
        assert_eq!(event.changeset.len(), 1);
        assert_eq!(event.changeset[0].key, "state");
        assert_eq!(event.changeset[0].from.as_deref(), Some("New"));
        assert_eq!(event.changeset[0].to.as_deref(), Some("In progress"));
    }

    #[tokio::test]
    async fn same_state_transition_stays_silent() {
        let project = TestProject::new();
        let bus = EventBus::default();
        let mut events = bus.subscribe_ticket_updated();
        let service = project.service_with_bus(bus);
        let ticket = project.seed_ticket();

        let request = TicketUpdateRequest {
            action: Some("updateState".to_string()),
            payload: TicketUpdatePayload {
                state: Some("New".to_string()),
                ..TicketUpdatePayload::default()
            },
            ..TicketUpdateRequest::default()
        };
        let view = service
            .update_ticket(&project.admin, ticket.id, &request)
            .await
            .expect("Failed to update state");

        assert_eq!(view.ticket.updated, ticket.updated);
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn time_flags_set_and_clear_with_matching_verbs() {
        let project = TestProject::new();
        let bus = EventBus::default();
        let mut events = bus.subscribe_ticket_updated();
        let service = project.service_with_bus(bus);
        let ticket = project.seed_ticket();

        let set = TicketUpdateRequest {
            action: Some("set".to_string()),
            field: Some("workaround".to_string()),
            ..TicketUpdateRequest::default()
        };
        let view = service
            .update_ticket(&project.supporter, ticket.id, &set)
            .await
            .expect("Failed to set workaround time");
        assert!(view.ticket.times.workaround.is_some());

        let event = events.try_recv().expect("Expected a set event");
        assert_eq!(event.verb, Verb::Set);
        assert_eq!(event.changeset[0].display_name, "workaround time");
        assert_eq!(event.changeset[0].from, None);

        let unset = TicketUpdateRequest {
            action: Some("unset".to_string()),
            field: Some("workaround".to_string()),
            ..TicketUpdateRequest::default()
        };
        let view = service
            .update_ticket(&project.supporter, ticket.id, &unset)
            .await
            .expect("Failed to unset workaround time");
        assert_eq!(view.ticket.times.workaround, None);

        let event = events.try_recv().expect("Expected an unset event");
        assert_eq!(event.verb, Verb::Unset);
    }

    #[tokio::test]
    async fn resetting_a_set_time_is_rejected() {
        let project = TestProject::new();
        let service = project.service();
        let mut ticket = project.seed_ticket();
        ticket.set_time(TimeField::Workaround, true, Utc::now() + chrono::Duration::minutes(5));
        project
            .storage
            .save_ticket(&ticket)
            .expect("Failed to save ticket");

        let request = TicketUpdateRequest {
            action: Some("set".to_string()),
            field: Some("workaround".to_string()),
            ..TicketUpdateRequest::default()
        };
        let denied = service
            .update_ticket(&project.admin, ticket.id, &request)
            .await;
        assert!(matches!(
            denied,
            Err(TicketingError::Validation(reason)) if reason == "Field workaround already set"
        ));
    }

    #[test]
    fn listing_filters_by_state_and_scope() {
        let project = TestProject::new();
        let service = project.service();
        let seeded = project.seed_ticket();

        let mut mine = project.seed_ticket();
        mine.requester = project.admin.id;
        project
            .storage
            .save_ticket(&mine)
            .expect("Failed to save ticket");

        let all = service
            .list_tickets(&project.admin, &TicketListQuery::default())
            .expect("Failed to list tickets");
        assert_eq!(all.len(), 2);

        let open = service
            .list_tickets(
                &project.admin,
                &TicketListQuery {
                    state: Some(STATE_OPEN.to_string()),
                    ..TicketListQuery::default()
                },
            )
            .expect("Failed to list open tickets");
        assert_eq!(open.len(), 2);

        let closed = service
            .list_tickets(
                &project.admin,
                &TicketListQuery {
                    state: Some("Closed".to_string()),
                    ..TicketListQuery::default()
                },
            )
            .expect("Failed to list closed tickets");
        assert!(closed.is_empty());

        let mine_only = service
            .list_tickets(
                &project.admin,
                &TicketListQuery {
                    scope: Some(SCOPE_MINE.to_string()),
                    ..TicketListQuery::default()
                },
            )
            .expect("Failed to list my tickets");
        assert_eq!(mine_only.len(), 1);
        assert_eq!(mine_only[0].ticket.id, mine.id);
        assert_ne!(mine_only[0].ticket.id, seeded.id);
    }

    #[test]
    fn reads_are_reserved_to_administrators() {
        let project = TestProject::new();
        let service = project.service();
        let ticket = project.seed_ticket();

        assert!(matches!(
            service.get_ticket(&project.plain_user, ticket.id),
            Err(TicketingError::NotAdministrator)
        ));
        assert!(matches!(
            service.list_tickets(&project.supporter, &TicketListQuery::default()),
            Err(TicketingError::NotAdministrator)
        ));
    }

    #[tokio::test]
    async fn activities_read_back_newest_first() {
        let project = TestProject::new();
        let service = project.service();
        let ticket = project.seed_ticket();

        for (index, verb) in [Verb::Update, Verb::Set].iter().enumerate() {
            let entry = TimelineEntry {
                id: Uuid::new_v4(),
                verb: *verb,
                actor: ActivityActor::from(&project.admin),
                object: ActivityObject::ticket(ticket.id),
                changeset: vec![ChangesetEntry::new("workaround", "workaround time")],
                published: Utc::now() + chrono::Duration::seconds(index as i64),
            };
            project
                .storage
                .add_entry(entry)
                .await
                .expect("Failed to record entry");
        }

        let entries = service
            .ticket_activities(&project.admin, ticket.id, &ActivityQuery::default())
            .await
            .expect("Failed to read activities");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].verb, Verb::Set);
        assert_eq!(entries[1].verb, Verb::Update);

        let missing = service
            .ticket_activities(&project.admin, TicketId::new(), &ActivityQuery::default())
            .await;
        assert!(matches!(missing, Err(TicketingError::TicketNotFound { .. })));
    }
}
