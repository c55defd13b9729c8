//! Contract administration: creation, catalog entries, permissions.

use super::TicketingService;
use crate::core::{
    Contract, ContractBuilder, ContractId, ContractPermissions, ContractSoftware, Demand,
    OrganizationId, SoftwareId, TicketingUser, UserId,
};
use crate::error::{Result, TicketingError};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

/// Body for contract creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContractPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub default_support_manager: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub demands: Vec<Demand>,
}

/// Body for adding one software entry to a contract's catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogEntryPayload {
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub versions: Option<Vec<String>>,
    #[serde(default, rename = "type")]
    pub software_type: Option<String>,
}

/// Body for replacing a contract's permissions: the literal `1` grants
/// every entity of the organization, a list narrows to the named ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PermissionsPayload {
    Everyone(u64),
    Entities(Vec<String>),
}

fn invalid_permissions() -> TicketingError {
    TicketingError::validation("permissions is invalid")
}

impl TicketingService {
    /// Create a contract. Administrator only.
    pub fn create_contract(
        &self,
        actor: &TicketingUser,
        payload: &NewContractPayload,
    ) -> Result<Contract> {
        Self::require_administrator(actor)?;

        let title = match payload.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => return Err(TicketingError::validation("title is required")),
        };
        let organization = resolve_reference::<OrganizationId>(
            payload.organization.as_deref(),
            "organization",
        )?;
        if self.storage().organization_by_id(organization)?.is_none() {
            return Err(TicketingError::OrganizationNotFound { id: organization });
        }
        let manager = resolve_reference::<UserId>(
            payload.default_support_manager.as_deref(),
            "defaultSupportManager",
        )?;
        if self.storage().load_user(manager)?.is_none() {
            return Err(TicketingError::UserNotFound { id: manager });
        }

        let mut builder = ContractBuilder::new()
            .title(title)
            .organization(organization)
            .default_support_manager(manager)
            .demands(payload.demands.clone());
        if let Some(start_date) = payload.start_date {
            builder = builder.start_date(start_date);
        }
        if let Some(end_date) = payload.end_date {
            builder = builder.end_date(end_date);
        }

        let created = self.storage().create_contract(&builder.build())?;
        info!(contract = %created.id, title = %created.title, "created contract");
        Ok(created)
    }

    /// Read one contract. Administrator only.
    pub fn get_contract(&self, actor: &TicketingUser, id: ContractId) -> Result<Contract> {
        Self::require_administrator(actor)?;
        self.storage()
            .contract_by_id(id)?
            .ok_or(TicketingError::ContractNotFound { id })
    }

    /// List every contract. Administrator only.
    pub fn list_contracts(&self, actor: &TicketingUser) -> Result<Vec<Contract>> {
        Self::require_administrator(actor)?;
        self.storage().list_contracts()
    }

    /// Add one software entry to a contract's catalog.
    ///
    /// The entry is vetted in stages, each with its own rejection: the
    /// template reference, the versions list, the type against the
    /// demand catalog, duplication, template availability, and finally
    /// version availability.
    pub fn add_contract_software(
        &self,
        actor: &TicketingUser,
        id: ContractId,
        payload: &CatalogEntryPayload,
    ) -> Result<Contract> {
        Self::require_administrator(actor)?;
        let mut contract = self
            .storage()
            .contract_by_id(id)?
            .ok_or(TicketingError::ContractNotFound { id })?;

        let template: SoftwareId = match payload.template.as_deref() {
            Some(raw) => raw
                .parse()
                .map_err(|_| TicketingError::validation("Software not found"))?,
            None => return Err(TicketingError::validation("Software not found")),
        };
        let versions = payload
            .versions
            .as_ref()
            .ok_or_else(|| TicketingError::validation("Software versions is required"))?;
        if versions.is_empty() {
            return Err(TicketingError::validation(
                "Software versions must not be empty",
            ));
        }
        let software_type = match payload.software_type.as_deref() {
            Some(software_type) if !software_type.is_empty() => software_type,
            _ => return Err(TicketingError::validation("Software type is required")),
        };
        if !contract.demand_software_types().contains(&software_type) {
            return Err(TicketingError::validation("Software type is unsupported"));
        }
        if contract.software_entry(template).is_some() {
            return Err(TicketingError::validation("Software already exists"));
        }
        let available = self
            .storage()
            .software_by_id(template)?
            .filter(|software| software.is_available());
        let Some(software) = available else {
            return Err(TicketingError::validation("Software is not available"));
        };
        if !software.supports_versions(versions) {
            return Err(TicketingError::validation(
                "Software versions are unsupported",
            ));
        }

        contract.software.push(ContractSoftware {
            template,
            versions: versions.clone(),
            software_type: software_type.to_string(),
        });
        let saved = self.storage().save_contract(&contract)?;
        info!(contract = %saved.id, template = %template, "added software to contract");
        Ok(saved)
    }

    /// Replace a contract's permissions.
    ///
    /// Listed entity ids must resolve to sub-organizations of the
    /// contract's organization.
    pub fn update_contract_permissions(
        &self,
        actor: &TicketingUser,
        id: ContractId,
        payload: &PermissionsPayload,
    ) -> Result<Contract> {
        Self::require_administrator(actor)?;
        let mut contract = self
            .storage()
            .contract_by_id(id)?
            .ok_or(TicketingError::ContractNotFound { id })?;

        contract.permissions = match payload {
            PermissionsPayload::Everyone(1) => ContractPermissions::All,
            PermissionsPayload::Everyone(_) => return Err(invalid_permissions()),
            PermissionsPayload::Entities(raw_ids) => {
                let mut entities = Vec::with_capacity(raw_ids.len());
                for raw in raw_ids {
                    let entity: OrganizationId =
                        raw.parse().map_err(|_| invalid_permissions())?;
                    let member = self
                        .storage()
                        .organization_by_id(entity)?
                        .is_some_and(|organization| {
                            organization.is_entity_of(contract.organization)
                        });
                    if !member {
                        return Err(invalid_permissions());
                    }
                    entities.push(entity);
                }
                ContractPermissions::Entities(entities)
            }
        };

        let saved = self.storage().save_contract(&contract)?;
        info!(contract = %saved.id, "updated contract permissions");
        Ok(saved)
    }
}

fn resolve_reference<T: std::str::FromStr>(raw: Option<&str>, key: &str) -> Result<T> {
    match raw {
        Some(value) if !value.is_empty() => value
            .parse()
            .map_err(|_| TicketingError::validation(format!("{key} is invalid"))),
        _ => Err(TicketingError::validation(format!("{key} is required"))),
    }
}
