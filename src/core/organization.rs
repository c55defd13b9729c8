//! Organizations and their sub-organizations ("entities").

use crate::core::OrganizationId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: OrganizationId,
    pub short_name: String,
    /// Set on entities, pointing at the owning organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<OrganizationId>,
}

impl Organization {
    /// True when this organization is an entity of `organization`.
    #[must_use]
    pub fn is_entity_of(&self, organization: OrganizationId) -> bool {
        self.parent == Some(organization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_membership_follows_parent() {
        let parent = OrganizationId::new();
        let entity = Organization {
            id: OrganizationId::new(),
            short_name: "linagora-vn".to_string(),
            parent: Some(parent),
        };
        assert!(entity.is_entity_of(parent));
        assert!(!entity.is_entity_of(OrganizationId::new()));
    }
}
