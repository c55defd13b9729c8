//! HTTP rendering of [`TicketingError`].

use crate::error::TicketingError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

fn status_for(error: &TicketingError) -> StatusCode {
    match error {
        TicketingError::Validation(_) => StatusCode::BAD_REQUEST,
        TicketingError::Unauthenticated => StatusCode::UNAUTHORIZED,
        TicketingError::NotAdministrator | TicketingError::TicketPermission { .. } => {
            StatusCode::FORBIDDEN
        }
        TicketingError::TicketNotFound { .. }
        | TicketingError::ContractNotFound { .. }
        | TicketingError::SoftwareNotFound { .. }
        | TicketingError::OrganizationNotFound { .. }
        | TicketingError::UserNotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for TicketingError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = json!({
            "error": {
                "code": status.as_u16(),
                "message": status.canonical_reason().unwrap_or("Error"),
                "details": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TicketId;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        serde_json::from_slice(&bytes).expect("Failed to parse body")
    }

    #[tokio::test]
    async fn validation_renders_bad_request_with_details() {
        let response = TicketingError::validation("title is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 400);
        assert_eq!(body["error"]["message"], "Bad Request");
        assert_eq!(body["error"]["details"], "title is required");
    }

    #[tokio::test]
    async fn permission_denials_are_forbidden() {
        let id = TicketId::new();
        let response = TicketingError::TicketPermission { action: "update", id }.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = body_json(response).await;
        assert_eq!(
            body["error"]["details"],
            format!("User does not have permission to update ticket: {id}")
        );
    }

    #[tokio::test]
    async fn missing_entities_are_not_found() {
        let response = TicketingError::TicketNotFound { id: TicketId::new() }.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Not Found");
        assert_eq!(body["error"]["details"], "Ticket not found");
    }
}
