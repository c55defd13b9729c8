//! Contracts: the policy envelope tickets are validated against.
//!
//! A contract carries two catalogs. The *demand* catalog lists the
//! allowed (demandType, severity, software criticality) triples, each
//! optionally promising engagement times; the *software* catalog lists
//! the allowed (template, versions, criticality) entries. Both are pure
//! lookup structures; nothing here mutates state.

use crate::core::{ContractId, OrganizationId, SoftwareId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One allowed demand triple.
///
/// `issue_type` is matched against a ticket's severity, `software_type`
/// against its software criticality. Entries may leave either unset to
/// cover tickets without a severity. The optional `*_time` fields are
/// the engagement targets in minutes, copied onto matching tickets as
/// their SLA bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demand {
    pub demand_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workaround_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction_time: Option<i64>,
}

/// One software catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSoftware {
    pub template: SoftwareId,
    pub versions: Vec<String>,
    #[serde(rename = "type")]
    pub software_type: String,
}

/// Which entities of the contract's organization may use the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractPermissions {
    /// Every entity of the organization.
    All,
    /// Only the listed entities; empty means nobody.
    Entities(Vec<OrganizationId>),
}

impl Default for ContractPermissions {
    fn default() -> Self {
        Self::All
    }
}

// Stored as the literal `1` for All, otherwise as the id list.
impl Serialize for ContractPermissions {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_u64(1),
            Self::Entities(entities) => entities.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ContractPermissions {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Entities(Vec<OrganizationId>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(1) => Ok(Self::All),
            Repr::Number(other) => Err(serde::de::Error::custom(format!(
                "permissions must be 1 or a list of entity ids, got {other}"
            ))),
            Repr::Entities(entities) => Ok(Self::Entities(entities)),
        }
    }
}

/// A support contract between an organization and the platform operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: ContractId,
    pub title: String,
    pub organization: OrganizationId,
    pub default_support_manager: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub demands: Vec<Demand>,
    #[serde(default)]
    pub software: Vec<ContractSoftware>,
    #[serde(default)]
    pub permissions: ContractPermissions,
}

impl Contract {
    /// First demand entry matching the triple, if any.
    ///
    /// `demand_type` compares strictly. `severity` compares as options:
    /// a ticket without a severity only matches entries that define no
    /// issue type. An absent `software_criticality` matches any entry,
    /// so tickets without software are acceptable under entries that do
    /// name a software type.
    #[must_use]
    pub fn demand_for(
        &self,
        demand_type: &str,
        severity: Option<&str>,
        software_criticality: Option<&str>,
    ) -> Option<&Demand> {
        self.demands.iter().find(|demand| {
            demand.demand_type == demand_type
                && demand.issue_type.as_deref() == severity
                && software_criticality
                    .is_none_or(|criticality| demand.software_type.as_deref() == Some(criticality))
        })
    }

    /// True iff some demand entry matches the triple. See [`Self::demand_for`].
    #[must_use]
    pub fn matches_demand(
        &self,
        demand_type: &str,
        severity: Option<&str>,
        software_criticality: Option<&str>,
    ) -> bool {
        self.demand_for(demand_type, severity, software_criticality)
            .is_some()
    }

    /// True iff some software catalog entry has this template, contains
    /// the version in its list, and carries this criticality as its type.
    #[must_use]
    pub fn matches_software(
        &self,
        template: SoftwareId,
        version: &str,
        criticality: &str,
    ) -> bool {
        self.software.iter().any(|entry| {
            entry.template == template
                && entry.versions.iter().any(|allowed| allowed == version)
                && entry.software_type == criticality
        })
    }

    /// Catalog entry for a template, if present.
    #[must_use]
    pub fn software_entry(&self, template: SoftwareId) -> Option<&ContractSoftware> {
        self.software.iter().find(|entry| entry.template == template)
    }

    /// Software types named by the demand catalog, used to vet new
    /// software entries.
    #[must_use]
    pub fn demand_software_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self
            .demands
            .iter()
            .filter_map(|demand| demand.software_type.as_deref())
            .collect();
        types.sort_unstable();
        types.dedup();
        types
    }
}
