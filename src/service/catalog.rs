//! Registry administration: software templates, organizations, users.

use super::TicketingService;
use crate::core::{
    Organization, OrganizationId, Software, SoftwareId, TicketingUser, UserId,
};
use crate::error::{Result, TicketingError};
use serde::Deserialize;
use tracing::info;

/// Body for registering a software template.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSoftwarePayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Body for registering an organization or one of its entities.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganizationPayload {
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
}

/// Body for registering a ticketing user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUserPayload {
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

fn required_text(value: Option<&str>, key: &str) -> Result<String> {
    match value {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(TicketingError::validation(format!("{key} is required"))),
    }
}

impl TicketingService {
    /// Register a software template. Names are unique, compared
    /// case-insensitively.
    pub fn create_software(
        &self,
        actor: &TicketingUser,
        payload: &NewSoftwarePayload,
    ) -> Result<Software> {
        Self::require_administrator(actor)?;

        let name = required_text(payload.name.as_deref(), "name")?;
        if self.storage().software_by_name(&name)?.is_some() {
            return Err(TicketingError::validation("Software name is taken"));
        }
        let category = required_text(payload.category.as_deref(), "category")?;

        let software = Software {
            id: SoftwareId::new(),
            name,
            category,
            versions: payload.versions.clone(),
            active: payload.active,
        };
        let created = self.storage().create_software(&software)?;
        info!(software = %created.id, name = %created.name, "registered software");
        Ok(created)
    }

    /// Every registered template, deactivated ones included.
    pub fn list_software(&self, actor: &TicketingUser) -> Result<Vec<Software>> {
        Self::require_administrator(actor)?;
        self.storage().list_software()
    }

    /// Whether a template with this name exists and is active.
    pub fn software_available(&self, actor: &TicketingUser, name: &str) -> Result<bool> {
        Self::require_administrator(actor)?;
        Ok(self
            .storage()
            .software_by_name(name)?
            .is_some_and(|software| software.is_available()))
    }

    /// Register an organization; naming a parent makes it an entity of
    /// that organization.
    pub fn create_organization(
        &self,
        actor: &TicketingUser,
        payload: &NewOrganizationPayload,
    ) -> Result<Organization> {
        Self::require_administrator(actor)?;

        let short_name = required_text(payload.short_name.as_deref(), "shortName")?;
        let parent = match payload.parent.as_deref().filter(|raw| !raw.is_empty()) {
            Some(raw) => {
                let id: OrganizationId = raw
                    .parse()
                    .map_err(|_| TicketingError::validation("parent is invalid"))?;
                if self.storage().organization_by_id(id)?.is_none() {
                    return Err(TicketingError::OrganizationNotFound { id });
                }
                Some(id)
            }
            None => None,
        };

        let organization = Organization {
            id: OrganizationId::new(),
            short_name,
            parent,
        };
        let created = self.storage().create_organization(&organization)?;
        info!(organization = %created.id, name = %created.short_name, "registered organization");
        Ok(created)
    }

    pub fn list_organizations(&self, actor: &TicketingUser) -> Result<Vec<Organization>> {
        Self::require_administrator(actor)?;
        self.storage().list_organizations()
    }

    /// Register a ticketing user.
    pub fn create_user(
        &self,
        actor: &TicketingUser,
        payload: &NewUserPayload,
    ) -> Result<TicketingUser> {
        Self::require_administrator(actor)?;

        let firstname = required_text(payload.firstname.as_deref(), "firstname")?;
        let lastname = required_text(payload.lastname.as_deref(), "lastname")?;
        let email = required_text(payload.email.as_deref(), "email")?;
        let role = required_text(payload.role.as_deref(), "role")?.parse()?;

        let user = TicketingUser {
            id: UserId::new(),
            firstname,
            lastname,
            email,
            role,
        };
        let created = self.storage().create_user(&user)?;
        info!(user = %created.id, email = %created.email, "registered user");
        Ok(created)
    }

    pub fn list_users(&self, actor: &TicketingUser) -> Result<Vec<TicketingUser>> {
        Self::require_administrator(actor)?;
        self.storage().list_users()
    }

    pub fn get_user(&self, actor: &TicketingUser, id: UserId) -> Result<TicketingUser> {
        Self::require_administrator(actor)?;
        self.storage()
            .load_user(id)?
            .ok_or(TicketingError::UserNotFound { id })
    }
}
