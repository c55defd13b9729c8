//! Administration endpoints: contracts, software, organizations, users.

use super::{AppState, CurrentUser, ITEMS_COUNT_HEADER};
use crate::core::{Contract, ContractId, Organization, Software, TicketingUser, UserId};
use crate::error::Result;
use crate::service::{
    CatalogEntryPayload, NewContractPayload, NewOrganizationPayload, NewSoftwarePayload,
    NewUserPayload, PermissionsPayload,
};
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post, put};
use serde::Deserialize;
use serde_json::json;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/contracts", post(create_contract).get(list_contracts))
        .route("/api/contracts/:id", get(get_contract))
        .route("/api/contracts/:id/software", post(add_contract_software))
        .route("/api/contracts/:id/permissions", put(update_permissions))
        .route("/api/software", post(create_software).get(list_software))
        .route("/api/software/available", get(software_available))
        .route(
            "/api/organizations",
            post(create_organization).get(list_organizations),
        )
        .route("/api/users", post(create_user).get(list_users))
        .route("/api/users/:id", get(get_user))
}

async fn create_contract(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(payload): Json<NewContractPayload>,
) -> Result<(StatusCode, Json<Contract>)> {
    let contract = state.service.create_contract(&actor, &payload)?;
    Ok((StatusCode::CREATED, Json(contract)))
}

async fn list_contracts(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<([(&'static str, String); 1], Json<Vec<Contract>>)> {
    let contracts = state.service.list_contracts(&actor)?;
    let count = contracts.len().to_string();
    Ok(([(ITEMS_COUNT_HEADER, count)], Json(contracts)))
}

async fn get_contract(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<ContractId>,
) -> Result<Json<Contract>> {
    Ok(Json(state.service.get_contract(&actor, id)?))
}

async fn add_contract_software(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<ContractId>,
    Json(payload): Json<CatalogEntryPayload>,
) -> Result<Json<Contract>> {
    Ok(Json(state.service.add_contract_software(&actor, id, &payload)?))
}

async fn update_permissions(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<ContractId>,
    Json(payload): Json<PermissionsPayload>,
) -> Result<Json<Contract>> {
    Ok(Json(state.service.update_contract_permissions(&actor, id, &payload)?))
}

async fn create_software(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(payload): Json<NewSoftwarePayload>,
) -> Result<(StatusCode, Json<Software>)> {
    let software = state.service.create_software(&actor, &payload)?;
    Ok((StatusCode::CREATED, Json(software)))
}

async fn list_software(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<Software>>> {
    Ok(Json(state.service.list_software(&actor)?))
}

#[derive(Debug, Default, Deserialize)]
struct AvailabilityQuery {
    name: Option<String>,
}

async fn software_available(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<serde_json::Value>> {
    let available = match query.name.as_deref() {
        Some(name) if !name.is_empty() => state.service.software_available(&actor, name)?,
        _ => false,
    };
    Ok(Json(json!({ "available": available })))
}

async fn create_organization(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(payload): Json<NewOrganizationPayload>,
) -> Result<(StatusCode, Json<Organization>)> {
    let organization = state.service.create_organization(&actor, &payload)?;
    Ok((StatusCode::CREATED, Json(organization)))
}

async fn list_organizations(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<Organization>>> {
    Ok(Json(state.service.list_organizations(&actor)?))
}

async fn create_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(payload): Json<NewUserPayload>,
) -> Result<(StatusCode, Json<TicketingUser>)> {
    let user = state.service.create_user(&actor, &payload)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<TicketingUser>>> {
    Ok(Json(state.service.list_users(&actor)?))
}

async fn get_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<UserId>,
) -> Result<Json<TicketingUser>> {
    Ok(Json(state.service.get_user(&actor, id)?))
}
