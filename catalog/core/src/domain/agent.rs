// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::error::CatalogError;

/// Opaque catalog entry identifier. Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Review status of an agent link.
///
/// Older data files used the Korean display labels as the stored value; those
/// are accepted on read and rewritten in the enumerated form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentStatus {
    #[serde(rename = "APPLIED", alias = "적용완료")]
    Applied,
    #[default]
    #[serde(rename = "UNDER_REVIEW", alias = "검토&수정 중")]
    UnderReview,
    #[serde(rename = "REVIEW_COMPLETE")]
    ReviewComplete,
}

impl AgentStatus {
    pub const ALL: [AgentStatus; 3] = [
        AgentStatus::Applied,
        AgentStatus::UnderReview,
        AgentStatus::ReviewComplete,
    ];

    /// Stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Applied => "APPLIED",
            AgentStatus::UnderReview => "UNDER_REVIEW",
            AgentStatus::ReviewComplete => "REVIEW_COMPLETE",
        }
    }

    /// Value the legacy boolean flag maps to.
    pub fn from_legacy_flag(applied: bool) -> Self {
        if applied {
            AgentStatus::Applied
        } else {
            AgentStatus::UnderReview
        }
    }

    /// Parses the stored representation, including legacy labels.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "APPLIED" | "적용완료" => Some(AgentStatus::Applied),
            "UNDER_REVIEW" | "검토&수정 중" => Some(AgentStatus::UnderReview),
            "REVIEW_COMPLETE" => Some(AgentStatus::ReviewComplete),
            _ => None,
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentStatus {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        AgentStatus::parse(&normalized)
            .or_else(|| AgentStatus::parse(s))
            .ok_or_else(|| CatalogError::InvalidRecord(format!("unknown status '{}'", s)))
    }
}

/// One catalog entry as persisted in the remote data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub id: AgentId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub status: AgentStatus,
    pub user_page_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_page_url: Option<String>,
}

impl AgentRecord {
    /// Builds a record from submitted form data under a freshly issued id.
    pub fn from_form(id: AgentId, form: AgentForm) -> Self {
        Self {
            id,
            name: form.name,
            description: form.description,
            category: form.category,
            status: form.status,
            user_page_url: form.user_page_url,
            admin_page_url: normalize_optional_url(form.admin_page_url),
        }
    }

    /// Merges the set fields of `patch` into this record. The id never changes.
    pub fn apply(&mut self, patch: AgentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(url) = patch.user_page_url {
            self.user_page_url = url;
        }
        if let Some(url) = patch.admin_page_url {
            self.admin_page_url = normalize_optional_url(url);
        }
    }
}

/// Data submitted when creating a record; everything except the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: AgentStatus,
    pub user_page_url: String,
    #[serde(default)]
    pub admin_page_url: Option<String>,
}

impl AgentForm {
    pub fn validate(&self) -> Result<(), CatalogError> {
        require_absolute_url("userPageUrl", &self.user_page_url)?;
        if let Some(admin) = self.admin_page_url.as_deref().filter(|u| !u.trim().is_empty()) {
            require_absolute_url("adminPageUrl", admin)?;
        }
        Ok(())
    }
}

/// Partial update. `None` leaves a field untouched; for `admin_page_url`,
/// `Some(None)` clears the link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: Option<AgentStatus>,
    pub user_page_url: Option<String>,
    pub admin_page_url: Option<Option<String>>,
}

impl AgentPatch {
    pub fn status(status: AgentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if let Some(url) = &self.user_page_url {
            require_absolute_url("userPageUrl", url)?;
        }
        if let Some(Some(admin)) = &self.admin_page_url {
            if !admin.trim().is_empty() {
                require_absolute_url("adminPageUrl", admin)?;
            }
        }
        Ok(())
    }
}

fn normalize_optional_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

fn require_absolute_url(field: &str, value: &str) -> Result<(), CatalogError> {
    match Url::parse(value.trim()) {
        Ok(url) if url.has_host() => Ok(()),
        Ok(_) => Err(CatalogError::InvalidRecord(format!(
            "{} must include a host: '{}'",
            field, value
        ))),
        Err(e) => Err(CatalogError::InvalidRecord(format!(
            "{} is not an absolute URL ('{}'): {}",
            field, value, e
        ))),
    }
}
