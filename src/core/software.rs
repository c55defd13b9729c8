//! Software template catalog.

use crate::core::SoftwareId;
use serde::{Deserialize, Serialize};

/// A software product that contracts can cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Software {
    pub id: SoftwareId,
    pub name: String,
    pub category: String,
    pub versions: Vec<String>,
    /// Deactivated templates stay stored but cannot be added to contracts.
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl Software {
    /// A template is available as long as it has not been deactivated.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.active
    }

    /// True when every requested version exists on the template.
    #[must_use]
    pub fn supports_versions(&self, versions: &[String]) -> bool {
        versions.iter().all(|version| self.versions.contains(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Software {
        Software {
            id: SoftwareId::new(),
            name: "OpenPaaS".to_string(),
            category: "groupware".to_string(),
            versions: vec!["1".to_string(), "2".to_string()],
            active: true,
        }
    }

    #[test]
    fn deactivated_template_is_unavailable() {
        let mut software = template();
        assert!(software.is_available());
        software.active = false;
        assert!(!software.is_available());
    }

    #[test]
    fn version_support_requires_every_requested_version() {
        let software = template();
        assert!(software.supports_versions(&["1".to_string()]));
        assert!(software.supports_versions(&["1".to_string(), "2".to_string()]));
        assert!(!software.supports_versions(&["1".to_string(), "9".to_string()]));
    }

    #[test]
    fn active_defaults_to_true_on_deserialize() {
        let software: Software = serde_yaml::from_str(
            "id: 4fd15f8e-9b2c-4bb8-9a2a-731e7fa92ba6\nname: Nextcloud\ncategory: storage\nversions: ['11']\n",
        )
        .expect("Failed to deserialize");
        assert!(software.active);
    }
}
