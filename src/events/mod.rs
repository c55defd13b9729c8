//! Typed event bus connecting ticket mutations to downstream consumers.
//!
//! The service publishes one [`TicketUpdatedEvent`] per successful
//! mutation with a non-empty changeset. Publishing is fire-and-forget:
//! a failed send is logged and the mutation stays successful. The
//! timeline listener consumes the topic and re-publishes a notification
//! carrying the recorded entry.

pub mod listener;
pub mod timeline;

use crate::core::{TicketId, TicketingUser};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use listener::spawn_ticket_listener;
pub use timeline::{ActivityActor, ActivityObject, ActivityTimeline, TimelineEntry, TimelineQuery};

/// Topic announced in log lines for ticket update events.
pub const TICKET_UPDATED_TOPIC: &str = "ticketing:ticket:updated";

/// Topic announced in log lines for timeline notifications.
pub const TICKET_NOTIFICATION_TOPIC: &str = "ticketing:notification:ticket:updated";

/// Default buffer size for the broadcast channels.
pub const DEFAULT_BUS_CAPACITY: usize = 128;

/// Verb attached to an update event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Update,
    Set,
    Unset,
}

impl Verb {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Set => "set",
            Self::Unset => "unset",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field-level diff in a changeset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangesetEntry {
    pub key: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl ChangesetEntry {
    /// Entry without from/to, used by the time-flag actions.
    #[must_use]
    pub fn new(key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            from: None,
            to: None,
        }
    }

    /// Entry with both sides of the diff.
    #[must_use]
    pub fn change(
        key: impl Into<String>,
        display_name: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }
}

/// Payload published on the ticket update topic.
#[derive(Debug, Clone)]
pub struct TicketUpdatedEvent {
    pub actor: TicketingUser,
    pub ticket_id: TicketId,
    pub verb: Verb,
    pub changeset: Vec<ChangesetEntry>,
}

/// Cloneable handle to the typed topics.
#[derive(Debug, Clone)]
pub struct EventBus {
    ticket_updated: broadcast::Sender<TicketUpdatedEvent>,
    notifications: broadcast::Sender<TimelineEntry>,
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (ticket_updated, _) = broadcast::channel(capacity);
        let (notifications, _) = broadcast::channel(capacity);
        Self {
            ticket_updated,
            notifications,
        }
    }

    /// Publish a ticket update. Failures (no consumer attached) are
    /// logged and swallowed; the triggering mutation stays successful.
    pub fn publish_ticket_updated(&self, event: TicketUpdatedEvent) {
        match self.ticket_updated.send(event) {
            Ok(receivers) => tracing::debug!(
                topic = TICKET_UPDATED_TOPIC,
                receivers,
                "published ticket update"
            ),
            Err(err) => tracing::warn!(
                topic = TICKET_UPDATED_TOPIC,
                error = %err,
                "dropped ticket update, no consumer attached"
            ),
        }
    }

    /// Publish a recorded timeline entry as a notification, same
    /// fire-and-forget policy.
    pub fn publish_notification(&self, entry: TimelineEntry) {
        match self.notifications.send(entry) {
            Ok(receivers) => tracing::debug!(
                topic = TICKET_NOTIFICATION_TOPIC,
                receivers,
                "published notification"
            ),
            Err(err) => tracing::debug!(
                topic = TICKET_NOTIFICATION_TOPIC,
                error = %err,
                "dropped notification, no consumer attached"
            ),
        }
    }

    #[must_use]
    pub fn subscribe_ticket_updated(&self) -> broadcast::Receiver<TicketUpdatedEvent> {
        self.ticket_updated.subscribe()
    }

    #[must_use]
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<TimelineEntry> {
        self.notifications.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TicketingRole, UserId};

    fn actor() -> TicketingUser {
        TicketingUser {
            id: UserId::new(),
            firstname: "Amy".to_string(),
            lastname: "Wolsh".to_string(),
            email: "amy@open-paas.org".to_string(),
            role: TicketingRole::Administrator,
        }
    }

    #[test]
    fn publish_without_subscriber_does_not_panic() {
        let bus = EventBus::default();
        bus.publish_ticket_updated(TicketUpdatedEvent {
            actor: actor(),
            ticket_id: TicketId::new(),
            verb: Verb::Update,
            changeset: vec![ChangesetEntry::change("title", "title", "a", "b")],
        });
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::default();
        let mut events = bus.subscribe_ticket_updated();

        let ticket_id = TicketId::new();
        bus.publish_ticket_updated(TicketUpdatedEvent {
            actor: actor(),
            ticket_id,
            verb: Verb::Set,
            changeset: vec![ChangesetEntry::new("workaround", "workaround time")],
        });

        let event = events.recv().await.expect("Failed to receive event");
        assert_eq!(event.ticket_id, ticket_id);
        assert_eq!(event.verb, Verb::Set);
        assert_eq!(event.changeset.len(), 1);
        assert_eq!(event.changeset[0].from, None);
    }

    #[test]
    fn verbs_serialize_lowercase() {
        assert_eq!(Verb::Update.to_string(), "update");
        let yaml = serde_yaml::to_string(&Verb::Unset).expect("Failed to serialize");
        assert_eq!(yaml.trim(), "unset");
    }
}
