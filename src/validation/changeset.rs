//! Changeset construction for basic-field updates.
//!
//! The tracked scalar fields diff in a fixed order so the activity
//! entries read the same way for every update; the software composite
//! has its own rules since the entry must name the template, and the
//! old and new selection may reference different templates.

use crate::core::{Ticket, TicketSoftware};
use crate::events::ChangesetEntry;
use crate::storage::{TicketPatch, TicketView};

/// Renders a software selection for a changeset entry.
#[must_use]
pub fn format_software(name: &str, version: &str, criticality: &str) -> String {
    format!("{name} {version} - ({criticality})")
}

fn scalar_change(
    key: &str,
    display_name: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> Option<ChangesetEntry> {
    if from == to {
        return None;
    }
    Some(ChangesetEntry {
        key: key.to_string(),
        display_name: display_name.to_string(),
        from: from.map(str::to_string),
        to: to.map(str::to_string),
    })
}

/// Diffs the tracked scalar fields of a patch against the stored
/// ticket: title, description, environment, demand type, severity.
/// Fields the patch does not touch produce no entry.
#[must_use]
pub fn tracked_field_changes(ticket: &Ticket, patch: &TicketPatch) -> Vec<ChangesetEntry> {
    let mut changes = Vec::new();

    if let Some(title) = &patch.title {
        changes.extend(scalar_change(
            "title",
            "title",
            Some(&ticket.title),
            Some(title),
        ));
    }
    if let Some(description) = &patch.description {
        changes.extend(scalar_change(
            "description",
            "description",
            Some(&ticket.description),
            Some(description),
        ));
    }
    if let Some(environment) = &patch.environment {
        changes.extend(scalar_change(
            "environment",
            "environment",
            ticket.environment.as_deref(),
            environment.as_deref(),
        ));
    }
    if let Some(demand_type) = &patch.demand_type {
        changes.extend(scalar_change(
            "demandType",
            "demand type",
            Some(&ticket.demand_type),
            Some(demand_type),
        ));
    }
    if let Some(severity) = &patch.severity {
        changes.extend(scalar_change(
            "severity",
            "severity",
            ticket.severity.as_deref(),
            severity.as_deref(),
        ));
    }

    changes
}

fn current_template_name(view: &TicketView) -> &str {
    view.software_template_details
        .as_ref()
        .map(|software| software.name.as_str())
        .unwrap_or_default()
}

fn software_entry(from: Option<String>, to: Option<String>) -> ChangesetEntry {
    ChangesetEntry {
        key: "software".to_string(),
        display_name: "software".to_string(),
        from,
        to,
    }
}

/// Builds the changeset entry for a software update, if the change is
/// visible.
///
/// `proposed` is the validated new selection (`None` when the update
/// clears the field), and `proposed_template_name` the display name of
/// its template, resolved by the caller when the template differs from
/// the current one.
#[must_use]
pub fn software_change(
    view: &TicketView,
    proposed: Option<&TicketSoftware>,
    proposed_template_name: Option<&str>,
) -> Option<ChangesetEntry> {
    let current = view.ticket.software.as_ref();
    let current_formatted = current.map(|software| {
        format_software(
            current_template_name(view),
            &software.version,
            &software.criticality,
        )
    });

    let Some(proposed) = proposed else {
        // Cleared: only worth an entry if there was something to clear.
        return current_formatted.map(|from| software_entry(Some(from), None));
    };

    match current {
        Some(current_software) if current_software.template == proposed.template => {
            if proposed.version == current_software.version
                && proposed.criticality == current_software.criticality
            {
                return None;
            }
            let to = format_software(
                current_template_name(view),
                &proposed.version,
                &proposed.criticality,
            );
            Some(software_entry(current_formatted, Some(to)))
        }
        _ => {
            let to = format_software(
                proposed_template_name.unwrap_or_default(),
                &proposed.version,
                &proposed.criticality,
            );
            // A missing current selection still renders as an empty
            // "from" side, so the entry always carries both ends.
            Some(software_entry(
                Some(current_formatted.unwrap_or_default()),
                Some(to),
            ))
        }
    }
}
