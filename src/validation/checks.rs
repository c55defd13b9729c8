//! Structural, relational, and contract cross-checks for ticket payloads.
//!
//! Every rejection carries the exact reason string surfaced to the
//! caller. Checks run in three phases — structural first, then the
//! user-directory lookups, then the software and demand cross-checks —
//! and the first failure short-circuits the rest. The update validator
//! also collects the actor changeset entries while it resolves users,
//! since that is the only place the old and new display names are both
//! at hand.

use crate::core::{
    AttachmentId, Contract, ContractId, Demand, SoftwareId, Ticket, TicketSoftware,
    TicketState, TicketingUser, TimeField, display_names,
};
use crate::error::{Result, TicketingError};
use crate::events::ChangesetEntry;
use crate::storage::{TicketPatch, TicketView, UserDirectory};
use crate::validation::payload::{
    NewTicketPayload, SoftwarePayload, TicketUpdatePayload, UpdateAction,
};

/// Minimum description length, counted in characters.
pub const MIN_DESCRIPTION_CHARS: usize = 50;

/// A creation payload that passed every check.
///
/// Carries the matched demand entry so the caller can seed the SLA
/// targets without a second catalog scan.
#[derive(Debug, Clone)]
pub struct ValidatedNewTicket {
    pub title: String,
    pub demand_type: String,
    pub severity: Option<String>,
    pub software: Option<TicketSoftware>,
    pub description: String,
    pub environment: Option<String>,
    pub attachments: Vec<AttachmentId>,
    pub demand: Demand,
}

/// An update payload that passed every check.
#[derive(Debug, Clone)]
pub struct UpdateValidation {
    /// Fields to merge into the stored ticket.
    pub patch: TicketPatch,
    /// Changeset entries for requester/support manager/support
    /// technicians, in that order.
    pub actor_changes: Vec<ChangesetEntry>,
    /// The demand entry the updated triple matched.
    pub demand: Demand,
}

/// What an `action` update request resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAction {
    UpdateState(TicketState),
    SetTime(TimeField),
    UnsetTime(TimeField),
}

fn required<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(TicketingError::validation(format!("{key} is required"))),
    }
}

/// Resolves a double-option field: absent key is `None`, a present key
/// must carry a non-empty value or the field is reported missing.
fn provided<'a>(field: &'a Option<Option<String>>, key: &str) -> Result<Option<&'a str>> {
    match field {
        None => Ok(None),
        Some(value) => required(value.as_deref(), key).map(Some),
    }
}

fn check_description(description: &str) -> Result<()> {
    if description.chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(TicketingError::validation(
            "description must be a string with minimum length of 50",
        ));
    }
    Ok(())
}

// Anything other than a JSON string or null is refused; there is no
// meaningful way to store a number or object in the environment field.
fn check_environment(value: &serde_json::Value) -> Result<Option<String>> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(text) => Ok(Some(text.clone())),
        _ => Err(TicketingError::validation("environment must be a string")),
    }
}

fn unsupported_pair() -> TicketingError {
    TicketingError::validation("The pair (software template, software version) is not supported")
}

fn check_software(contract: &Contract, payload: &SoftwarePayload) -> Result<TicketSoftware> {
    let (Some(template), Some(version), Some(criticality)) = (
        payload.template.as_deref().filter(|value| !value.is_empty()),
        payload.version.as_deref().filter(|value| !value.is_empty()),
        payload.criticality.as_deref().filter(|value| !value.is_empty()),
    ) else {
        return Err(TicketingError::validation(
            "software is invalid: template, version and criticality are required",
        ));
    };

    let template: SoftwareId = template.parse().map_err(|_| unsupported_pair())?;
    if !contract.matches_software(template, version, criticality) {
        return Err(unsupported_pair());
    }

    Ok(TicketSoftware {
        template,
        version: version.to_string(),
        criticality: criticality.to_string(),
    })
}

fn check_demand(
    contract: &Contract,
    demand_type: &str,
    severity: Option<&str>,
    software_criticality: Option<&str>,
) -> Result<Demand> {
    contract
        .demand_for(demand_type, severity, software_criticality)
        .cloned()
        .ok_or_else(|| {
            TicketingError::validation(
                "The triple (demandType, severity, software criticality) is not supported",
            )
        })
}

fn parse_attachments(raw: Option<&[String]>) -> Result<Vec<AttachmentId>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.iter()
        .map(|value| value.parse::<AttachmentId>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| TicketingError::validation("Attachments are invalid"))
}

/// Parses the contract reference of a creation request.
pub fn parse_contract_ref(raw: Option<&str>) -> Result<ContractId> {
    let raw = required(raw, "contract")?;
    raw.parse()
        .map_err(|_| TicketingError::validation("contract is invalid"))
}

/// Validates a creation payload against its contract.
///
/// The demand lookup uses the provided software's criticality when one
/// is given; a ticket without software leaves the criticality unset and
/// relies on the catalog's wildcard behavior.
pub fn validate_new_ticket(
    contract: &Contract,
    payload: &NewTicketPayload,
) -> Result<ValidatedNewTicket> {
    let title = required(payload.title.as_deref(), "title")?;
    let demand_type = required(payload.demand_type.as_deref(), "demandType")?;
    let description = required(payload.description.as_deref(), "description")?;
    let attachments = parse_attachments(payload.attachments.as_deref())?;
    check_description(description)?;

    let environment = match &payload.environment {
        Some(value) => check_environment(value)?,
        None => None,
    };

    let severity = payload
        .severity
        .as_deref()
        .filter(|value| !value.is_empty());

    let software = payload
        .software
        .as_ref()
        .filter(|software| !software.is_empty())
        .map(|software| check_software(contract, software))
        .transpose()?;

    let software_criticality = software.as_ref().map(|entry| entry.criticality.as_str());
    let demand = check_demand(contract, demand_type, severity, software_criticality)?;

    Ok(ValidatedNewTicket {
        title: title.to_string(),
        demand_type: demand_type.to_string(),
        severity: severity.map(str::to_string),
        software,
        description: description.to_string(),
        environment,
        attachments,
        demand,
    })
}

fn invalid_actor(key: &str) -> TicketingError {
    TicketingError::validation(format!("{key} is invalid"))
}

async fn resolve_actor(
    directory: &dyn UserDirectory,
    key: &str,
    raw: &str,
) -> Result<TicketingUser> {
    let id = raw.parse().map_err(|_| invalid_actor(key))?;
    directory
        .user_by_id(id)
        .await?
        .ok_or_else(|| TicketingError::validation(format!("{key} not found")))
}

fn current_requester_name(view: &TicketView) -> String {
    view.requester_details
        .as_ref()
        .map(TicketingUser::display_name)
        .unwrap_or_default()
}

fn current_manager_name(view: &TicketView) -> String {
    view.support_manager_details
        .as_ref()
        .map(TicketingUser::display_name)
        .unwrap_or_default()
}

/// Validates a basic-field update against the stored ticket and its
/// contract, resolving referenced users through the directory.
///
/// Returns the patch to apply, the actor changeset entries, and the
/// matched demand entry. The demand inputs fall back to the stored
/// ticket's values wherever the payload leaves a field out, and the
/// software criticality falls back through the existing software to the
/// stored severity.
pub async fn validate_ticket_update(
    contract: &Contract,
    view: &TicketView,
    payload: &TicketUpdatePayload,
    directory: &dyn UserDirectory,
) -> Result<UpdateValidation> {
    let ticket = &view.ticket;
    let mut patch = TicketPatch::default();
    let mut actor_changes = Vec::new();

    // Structural phase.
    let title = provided(&payload.title, "title")?;
    let demand_type = provided(&payload.demand_type, "demandType")?;
    let description = provided(&payload.description, "description")?;
    let requester = provided(&payload.requester, "requester")?;
    let support_manager = provided(&payload.support_manager, "supportManager")?;

    if let Some(description) = description {
        check_description(description)?;
    }

    let environment = match &payload.environment {
        Some(Some(value)) => Some(check_environment(value)?),
        Some(None) => Some(None),
        None => None,
    };

    // Relational phase: resolve referenced users, recording who changed.
    if let Some(raw) = requester {
        let user = resolve_actor(directory, "requester", raw).await?;
        if user.id != ticket.requester {
            actor_changes.push(ChangesetEntry::change(
                "requester",
                "requester",
                current_requester_name(view),
                user.display_name(),
            ));
        }
        patch.requester = Some(user.id);
    }

    if let Some(raw) = support_manager {
        let user = resolve_actor(directory, "supportManager", raw).await?;
        if user.id != ticket.support_manager {
            actor_changes.push(ChangesetEntry::change(
                "supportManager",
                "support manager",
                current_manager_name(view),
                user.display_name(),
            ));
        }
        patch.support_manager = Some(user.id);
    }

    if let Some(technicians) = &payload.support_technicians {
        let raw_ids = technicians
            .as_deref()
            .filter(|ids| !ids.is_empty())
            .ok_or_else(|| invalid_actor("supportTechnicians"))?;
        let ids = raw_ids
            .iter()
            .map(|raw| raw.parse())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| invalid_actor("supportTechnicians"))?;

        let mut resolved = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();
        for (raw, id) in raw_ids.iter().zip(&ids) {
            match directory.user_by_id(*id).await? {
                Some(user) => resolved.push(user),
                None => missing.push(raw.as_str()),
            }
        }
        if !missing.is_empty() {
            return Err(TicketingError::validation(format!(
                "supportTechnicians {} are not found",
                missing.join(",")
            )));
        }

        // Only losing a current technician counts as a change; pure
        // additions do not produce an entry.
        let removed_any = ticket
            .support_technicians
            .iter()
            .any(|current| !ids.contains(current));
        if removed_any {
            actor_changes.push(ChangesetEntry::change(
                "supportTechnicians",
                "support technicians",
                display_names(&view.support_technician_details),
                display_names(&resolved),
            ));
        }
        patch.support_technicians = Some(ids);
    }

    // Cross-check phase: software against the catalog, then the demand
    // triple with stored-value fallbacks.
    let software = match &payload.software {
        Some(Some(software)) if !software.is_empty() => {
            Some(Some(check_software(contract, software)?))
        }
        Some(_) => Some(None),
        None => None,
    };

    let effective_demand_type = demand_type.unwrap_or(&ticket.demand_type);
    let severity = payload
        .severity
        .as_ref()
        .map(|value| value.as_deref().filter(|text| !text.is_empty()));
    let effective_severity = severity.flatten().or(ticket.severity.as_deref());
    let software_criticality = software
        .as_ref()
        .and_then(|proposed| proposed.as_ref())
        .map(|entry| entry.criticality.as_str())
        .or_else(|| {
            ticket
                .software
                .as_ref()
                .map(|entry| entry.criticality.as_str())
        })
        .or(ticket.severity.as_deref());
    let demand = check_demand(
        contract,
        effective_demand_type,
        effective_severity,
        software_criticality,
    )?;

    patch.title = title.map(str::to_string);
    patch.demand_type = demand_type.map(str::to_string);
    patch.description = description.map(str::to_string);
    patch.severity = severity.map(|value| value.map(str::to_string));
    patch.environment = environment;
    patch.software = software;

    Ok(UpdateValidation {
        patch,
        actor_changes,
        demand,
    })
}

/// Resolves the `action`/`field`/`state` parameters of an update
/// request into a concrete action.
pub fn validate_ticket_action(
    ticket: &Ticket,
    action: &str,
    field: Option<&str>,
    state: Option<&str>,
) -> Result<TicketAction> {
    let Some(parsed) = UpdateAction::parse(action) else {
        return Err(TicketingError::validation(format!(
            "Action {action} is not supported"
        )));
    };

    if parsed == UpdateAction::UpdateState {
        let state = state
            .filter(|value| !value.is_empty())
            .ok_or_else(|| TicketingError::validation("state is required"))?;
        let state = TicketState::parse(state)
            .ok_or_else(|| TicketingError::validation("state is invalid"))?;
        if state == TicketState::New && ticket.state != TicketState::New {
            return Err(TicketingError::validation(
                "change state of ticket to New is not supported",
            ));
        }
        return Ok(TicketAction::UpdateState(state));
    }

    let raw_field = field.unwrap_or_default();
    let Some(field) = TimeField::parse(raw_field) else {
        return Err(TicketingError::validation(format!(
            "{raw_field} time is not able to set"
        )));
    };

    if parsed == UpdateAction::Set {
        if field.is_set_in(&ticket.times) {
            return Err(TicketingError::validation(format!(
                "Field {raw_field} already set"
            )));
        }
        return Ok(TicketAction::SetTime(field));
    }

    Ok(TicketAction::UnsetTime(field))
}
