//! HTTP surface for the ticketing service.
//!
//! Identity comes from the `X-User-Id` header: an upstream gateway is
//! expected to authenticate the caller and forward the ticketing user
//! id. A missing or unknown id yields 401; everything after that is up
//! to the per-operation permission checks.

mod admin;
mod error;
mod tickets;

use crate::core::{TicketingUser, UserId};
use crate::error::TicketingError;
use crate::service::TicketingService;
use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_http::trace::TraceLayer;

/// Header carrying the authenticated ticketing user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the page length of list responses.
pub const ITEMS_COUNT_HEADER: &str = "x-ticketing-items-count";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: TicketingService,
}

/// The resolved caller.
pub struct CurrentUser(pub TicketingUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = TicketingError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(TicketingError::Unauthenticated)?;
        let id: UserId = raw.parse().map_err(|_| TicketingError::Unauthenticated)?;
        let user = state
            .service
            .storage()
            .load_user(id)?
            .ok_or(TicketingError::Unauthenticated)?;
        Ok(Self(user))
    }
}

/// Build the application router.
pub fn router(service: TicketingService) -> Router {
    Router::new()
        .merge(tickets::routes())
        .merge(admin::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}
