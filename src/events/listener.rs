//! Bridges ticket update events into the activity timeline.
//!
//! The listener is the only consumer the core knows nothing about: it
//! subscribes to the update topic, records one timeline entry per
//! event, and re-publishes the stored entry as a notification. Failures
//! are logged and never propagate back to the mutation that triggered
//! the event.

use crate::events::timeline::{ActivityActor, ActivityObject, ActivityTimeline, TimelineEntry};
use crate::events::{EventBus, TicketUpdatedEvent, TICKET_UPDATED_TOPIC};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Subscribe to the update topic and feed the timeline until the bus
/// closes. The subscription is taken before the task starts, so events
/// published right after this call are not lost.
pub fn spawn_ticket_listener(
    bus: EventBus,
    timeline: Arc<dyn ActivityTimeline>,
) -> JoinHandle<()> {
    let mut events = bus.subscribe_ticket_updated();
    tracing::info!(topic = TICKET_UPDATED_TOPIC, "ticket activity listener registered");

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => handle_event(&bus, timeline.as_ref(), event).await,
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "timeline listener lagged, events dropped");
                },
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn handle_event(bus: &EventBus, timeline: &dyn ActivityTimeline, event: TicketUpdatedEvent) {
    let ticket_id = event.ticket_id;
    let entry = TimelineEntry {
        id: Uuid::new_v4(),
        verb: event.verb,
        actor: ActivityActor::from(&event.actor),
        object: ActivityObject::ticket(ticket_id),
        changeset: event.changeset,
        published: Utc::now(),
    };

    match timeline.add_entry(entry).await {
        Ok(saved) => {
            tracing::debug!(ticket = %ticket_id, verb = %saved.verb, "timeline entry recorded");
            bus.publish_notification(saved);
        },
        Err(err) => {
            tracing::error!(ticket = %ticket_id, error = %err, "failed to record timeline entry");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TicketId, TicketingRole, TicketingUser, UserId};
    use crate::error::TicketingError;
    use crate::events::timeline::MockActivityTimeline;
    use crate::events::{ChangesetEntry, Verb};
    use std::time::Duration;
    use tokio::time::timeout;

    fn actor() -> TicketingUser {
        TicketingUser {
            id: UserId::new(),
            firstname: "Kathy".to_string(),
            lastname: "Ryan".to_string(),
            email: "kathy@open-paas.org".to_string(),
            role: TicketingRole::Supporter,
        }
    }

    fn update_event(ticket_id: TicketId) -> TicketUpdatedEvent {
        TicketUpdatedEvent {
            actor: actor(),
            ticket_id,
            verb: Verb::Update,
            changeset: vec![ChangesetEntry::change("state", "state", "New", "In progress")],
        }
    }

    #[tokio::test]
    async fn records_entry_and_republishes_notification() {
        let bus = EventBus::new(16);
        let mut timeline = MockActivityTimeline::new();
        timeline.expect_add_entry().returning(Ok);

        let handle = spawn_ticket_listener(bus.clone(), Arc::new(timeline));
        let mut notifications = bus.subscribe_notifications();

        let ticket_id = TicketId::new();
        bus.publish_ticket_updated(update_event(ticket_id));

        let entry = timeout(Duration::from_secs(1), notifications.recv())
            .await
            .expect("Timed out waiting for notification")
            .expect("Notification channel closed");
        assert_eq!(entry.object.id, ticket_id);
        assert_eq!(entry.object.object_type, "ticket");
        assert_eq!(entry.actor.display_name, "Kathy Ryan");
        assert_eq!(entry.verb, Verb::Update);
        assert_eq!(entry.changeset.len(), 1);

        handle.abort();
    }

    #[tokio::test]
    async fn timeline_failure_is_swallowed_without_notification() {
        let bus = EventBus::new(16);
        let mut timeline = MockActivityTimeline::new();
        timeline
            .expect_add_entry()
            .returning(|_| Err(TicketingError::Persistence("timeline down".to_string())));

        let handle = spawn_ticket_listener(bus.clone(), Arc::new(timeline));
        let mut notifications = bus.subscribe_notifications();

        bus.publish_ticket_updated(update_event(TicketId::new()));

        let outcome = timeout(Duration::from_millis(200), notifications.recv()).await;
        assert!(outcome.is_err(), "no notification should be published");

        handle.abort();
    }
}
