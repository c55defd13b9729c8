//! Activity timeline collaborator contract.
//!
//! The timeline is a downstream service: the listener writes entries
//! into it and the read endpoints page through them. Entries mirror the
//! activity-stream shape: a verb, an actor, the ticket as object, and
//! the changeset that triggered the activity.

use crate::core::{TicketId, TicketingUser, UserId};
use crate::error::Result;
use crate::events::{ChangesetEntry, Verb};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actor recorded on a timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityActor {
    pub object_type: String,
    pub id: UserId,
    pub display_name: String,
}

impl From<&TicketingUser> for ActivityActor {
    fn from(user: &TicketingUser) -> Self {
        Self {
            object_type: "user".to_string(),
            id: user.id,
            display_name: user.display_name(),
        }
    }
}

/// Object a timeline entry points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityObject {
    pub object_type: String,
    pub id: TicketId,
}

impl ActivityObject {
    #[must_use]
    pub fn ticket(id: TicketId) -> Self {
        Self {
            object_type: "ticket".to_string(),
            id,
        }
    }
}

/// A recorded activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: Uuid,
    pub verb: Verb,
    pub actor: ActivityActor,
    pub object: ActivityObject,
    pub changeset: Vec<ChangesetEntry>,
    pub published: DateTime<Utc>,
}

/// Paging options for timeline reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

/// Timeline persistence consumed by the listener and the read endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityTimeline: Send + Sync {
    /// Persist one entry, returning the stored form.
    async fn add_entry(&self, entry: TimelineEntry) -> Result<TimelineEntry>;

    /// Entries for a ticket, newest first.
    async fn entries_for(
        &self,
        ticket: TicketId,
        query: &TimelineQuery,
    ) -> Result<Vec<TimelineEntry>>;
}
