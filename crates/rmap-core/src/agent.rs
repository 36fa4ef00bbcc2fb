//! # Agent
//!
//! An Agent is the identity record of a system user. Unlike a DiSCO it is
//! overwritten in place by REPLACE events and never accumulates versions.

use serde::{Deserialize, Serialize};

use crate::error::RmapError;
use crate::identity::Iri;
use crate::status::Status;

/// Client-supplied Agent fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentContent {
    /// Display name (`foaf:name`).
    pub name: String,
    /// The authenticating system.
    pub id_provider: Iri,
    /// The authenticated principal within `id_provider`.
    pub auth_id: Iri,
}

impl AgentContent {
    pub fn new(name: impl Into<String>, id_provider: Iri, auth_id: Iri) -> Self {
        Self {
            name: name.into(),
            id_provider,
            auth_id,
        }
    }

    /// Required-field validation. The IRIs are valid by construction, so
    /// only the name needs checking.
    pub fn validate(&self) -> Result<(), RmapError> {
        if self.name.trim().is_empty() {
            return Err(RmapError::InvalidArgument(
                "an Agent must have a non-empty name".to_string(),
            ));
        }
        Ok(())
    }

    /// Field-by-field differences from `self` to `new`, rendered as
    /// `field=old -> new`. Empty when the two are identical.
    pub fn changes_to(&self, new: &AgentContent) -> Vec<String> {
        let mut changes = Vec::new();
        if self.name != new.name {
            changes.push(format!("name={} -> {}", self.name, new.name));
        }
        if self.id_provider != new.id_provider {
            changes.push(format!(
                "id_provider={} -> {}",
                self.id_provider, new.id_provider
            ));
        }
        if self.auth_id != new.auth_id {
            changes.push(format!("auth_id={} -> {}", self.auth_id, new.auth_id));
        }
        changes
    }
}

/// A stored Agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: Iri,
    pub name: String,
    pub id_provider: Iri,
    pub auth_id: Iri,
    pub status: Status,
    /// The CREATION event that generated this Agent.
    pub prov_generated_by: Iri,
}

impl Agent {
    /// A new `ACTIVE` Agent.
    pub fn new(id: Iri, content: AgentContent, generated_by: Iri) -> Self {
        Self {
            id,
            name: content.name,
            id_provider: content.id_provider,
            auth_id: content.auth_id,
            status: Status::Active,
            prov_generated_by: generated_by,
        }
    }

    pub fn content(&self) -> AgentContent {
        AgentContent {
            name: self.name.clone(),
            id_provider: self.id_provider.clone(),
            auth_id: self.auth_id.clone(),
        }
    }

    /// Overwrite the mutable fields. Id, status and provenance are kept.
    pub fn replace_content(&mut self, content: AgentContent) {
        self.name = content.name;
        self.id_provider = content.id_provider;
        self.auth_id = content.auth_id;
    }
}
