//! Inbound payload shapes for ticket creation and update.
//!
//! Identifier fields arrive as raw strings so the checks can report
//! `is invalid` instead of failing deserialization; update fields use a
//! double option so "key absent" and "key present but null" stay
//! distinguishable, mirroring how the falsy checks are keyed on
//! presence.

use serde::{Deserialize, Deserializer};

/// Software selection as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SoftwarePayload {
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub criticality: Option<String>,
}

impl SoftwarePayload {
    /// An all-empty software object is treated as if the field were
    /// absent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.template.is_none() && self.version.is_none() && self.criticality.is_none()
    }
}

/// Body of a ticket creation request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicketPayload {
    #[serde(default)]
    pub contract: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub demand_type: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub software: Option<SoftwarePayload>,
    #[serde(default)]
    pub description: Option<String>,
    /// Any JSON value; the checks reject non-strings with a named
    /// reason instead of a deserialization error.
    #[serde(default)]
    pub environment: Option<serde_json::Value>,
    #[serde(default)]
    pub attachments: Option<Vec<String>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of a ticket update request.
///
/// The outer option is key presence, the inner one the value; `state`
/// only matters for the `updateState` action and keeps a plain option
/// since null and absent are both "not provided" there.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdatePayload {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub demand_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub severity: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub software: Option<Option<SoftwarePayload>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub environment: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub requester: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub support_manager: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub support_technicians: Option<Option<Vec<String>>>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Recognized `action` query values on ticket update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    UpdateState,
    Set,
    Unset,
}

impl UpdateAction {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "updateState" => Some(Self::UpdateState),
            "set" => Some(Self::Set),
            "unset" => Some(Self::Unset),
            _ => None,
        }
    }
}
