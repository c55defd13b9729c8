//! Ticket entity and the state and time tracking rules.
//!
//! All SLA arithmetic is in integer minutes, rounded half away from
//! zero, derived from wall-clock timestamps. The transition and
//! time-flag methods mutate the ticket in place and leave persistence
//! to the caller.

use crate::core::{
    AttachmentId, ContractId, Demand, SoftwareId, TicketId, TicketState, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Software selection on a ticket, validated against the owning
/// contract's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSoftware {
    pub template: SoftwareId,
    pub version: String,
    pub criticality: String,
}

/// SLA bookkeeping.
///
/// `response`, `workaround` and `correction` are measured working
/// durations; `suspend` accumulates minutes spent suspended and never
/// decreases; `suspended_at` marks the most recent active-to-suspended
/// edge. The `*_sla` fields are the engagement targets promised by the
/// matched contract demand, not measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketTimes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workaround: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<i64>,
    #[serde(default, rename = "responseSLA", skip_serializing_if = "Option::is_none")]
    pub response_sla: Option<i64>,
    #[serde(default, rename = "workaroundSLA", skip_serializing_if = "Option::is_none")]
    pub workaround_sla: Option<i64>,
    #[serde(default, rename = "correctionSLA", skip_serializing_if = "Option::is_none")]
    pub correction_sla: Option<i64>,
}

impl TicketTimes {
    /// Copy the engagement targets of a matched demand, leaving the
    /// measured fields untouched.
    pub fn apply_engagements(&mut self, demand: Option<&Demand>) {
        self.response_sla = demand.and_then(|entry| entry.response_time);
        self.workaround_sla = demand.and_then(|entry| entry.workaround_time);
        self.correction_sla = demand.and_then(|entry| entry.correction_time);
    }
}

/// Time flags that can be set and unset on a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeField {
    Workaround,
    Correction,
}

impl TimeField {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "workaround" => Some(Self::Workaround),
            "correction" => Some(Self::Correction),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workaround => "workaround",
            Self::Correction => "correction",
        }
    }

    /// Label used for changeset entries.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Workaround => "workaround time",
            Self::Correction => "correction time",
        }
    }

    #[must_use]
    pub const fn value_in(self, times: &TicketTimes) -> Option<i64> {
        match self {
            Self::Workaround => times.workaround,
            Self::Correction => times.correction,
        }
    }

    /// A recorded zero counts as unset; only a non-zero value blocks
    /// re-setting the flag.
    #[must_use]
    pub fn is_set_in(self, times: &TicketTimes) -> bool {
        self.value_in(times).is_some_and(|minutes| minutes != 0)
    }
}

/// A support ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub contract: ContractId,
    pub title: String,
    pub demand_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software: Option<TicketSoftware>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentId>,
    pub requester: UserId,
    pub support_manager: UserId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub support_technicians: Vec<UserId>,
    #[serde(default)]
    pub state: TicketState,
    #[serde(default)]
    pub times: TicketTimes,
    pub creation: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

fn round_minutes(duration: chrono::Duration) -> i64 {
    (duration.num_milliseconds() as f64 / 60_000.0).round() as i64
}

impl Ticket {
    /// Working minutes since creation: wall-clock elapsed minus the
    /// accumulated suspend time.
    fn working_minutes(&self, now: DateTime<Utc>) -> i64 {
        ((now - self.creation).num_milliseconds() as f64 / 60_000.0
            - self.times.suspend.unwrap_or(0) as f64)
            .round() as i64
    }

    /// Apply a state transition, updating the SLA clocks.
    ///
    /// Returns `false` without touching anything when `new_state` equals
    /// the current state; the caller then skips the write and the event.
    pub fn apply_state(&mut self, new_state: TicketState, now: DateTime<Utc>) -> bool {
        if new_state == self.state {
            return false;
        }

        if new_state == TicketState::InProgress {
            if self.times.response.is_none() {
                self.times.response = Some(self.working_minutes(now));
            }
            // TODO: decide whether this guard should examine the previous
            // state instead of the target one. As written it can never
            // hold for `In progress`, so resuming never adds to `suspend`.
            if new_state.is_suspended() {
                if let Some(suspended_at) = self.times.suspended_at {
                    let paused = round_minutes(now - suspended_at);
                    self.times.suspend = Some(self.times.suspend.unwrap_or(0) + paused);
                }
            }
        } else if new_state.is_suspended() && !self.state.is_suspended() {
            self.times.suspended_at = Some(now);
        }

        self.state = new_state;
        true
    }

    /// Record or clear a time flag. Setting recomputes the working
    /// minutes from `now`, so re-setting is not idempotent in value.
    pub fn set_time(&mut self, field: TimeField, set: bool, now: DateTime<Utc>) {
        let value = set.then(|| self.working_minutes(now));
        match field {
            TimeField::Workaround => self.times.workaround = value,
            TimeField::Correction => self.times.correction = value,
        }
    }

    /// Copy the engagement targets of a matched demand into `times`,
    /// leaving the measured fields untouched.
    pub fn apply_engagements(&mut self, demand: Option<&Demand>) {
        self.times.apply_engagements(demand);
    }

    /// True when the user manages or works the ticket.
    #[must_use]
    pub fn involves_as_support(&self, user: UserId) -> bool {
        self.support_manager == user || self.support_technicians.contains(&user)
    }

    /// True when the user appears on the ticket in any role (the `mine`
    /// listing scope).
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        self.requester == user || self.involves_as_support(user)
    }
}
