//! Ticket endpoints.

use super::{AppState, CurrentUser, ITEMS_COUNT_HEADER};
use crate::core::TicketId;
use crate::error::Result;
use crate::events::TimelineEntry;
use crate::service::{ActivityQuery, TicketListQuery, TicketUpdateRequest};
use crate::storage::TicketView;
use crate::validation::{NewTicketPayload, TicketUpdatePayload};
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tickets", post(create_ticket).get(list_tickets))
        .route("/api/tickets/:id", get(get_ticket).post(update_ticket))
        .route("/api/tickets/:id/activities", get(ticket_activities))
}

async fn create_ticket(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(payload): Json<NewTicketPayload>,
) -> Result<(StatusCode, Json<TicketView>)> {
    let view = state.service.create_ticket(&actor, &payload)?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_tickets(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<TicketListQuery>,
) -> Result<([(&'static str, String); 1], Json<Vec<TicketView>>)> {
    let tickets = state.service.list_tickets(&actor, &query)?;
    let count = tickets.len().to_string();
    Ok(([(ITEMS_COUNT_HEADER, count)], Json(tickets)))
}

async fn get_ticket(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<TicketId>,
) -> Result<Json<TicketView>> {
    Ok(Json(state.service.get_ticket(&actor, id)?))
}

/// Query selectors distinguishing the update flavors.
#[derive(Debug, Default, Deserialize)]
struct UpdateSelectors {
    action: Option<String>,
    field: Option<String>,
}

async fn update_ticket(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<TicketId>,
    Query(selectors): Query<UpdateSelectors>,
    Json(payload): Json<TicketUpdatePayload>,
) -> Result<Json<TicketView>> {
    let request = TicketUpdateRequest {
        action: selectors.action,
        field: selectors.field,
        payload,
    };
    let view = state.service.update_ticket(&actor, id, &request).await?;
    Ok(Json(view))
}

async fn ticket_activities(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<TicketId>,
    Query(query): Query<ActivityQuery>,
) -> Result<([(&'static str, String); 1], Json<Vec<TimelineEntry>>)> {
    let entries = state.service.ticket_activities(&actor, id, &query).await?;
    let count = entries.len().to_string();
    Ok(([(ITEMS_COUNT_HEADER, count)], Json(entries)))
}
