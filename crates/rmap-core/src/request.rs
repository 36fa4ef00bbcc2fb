//! Request context: who is acting, with which credential, and why.
//!
//! The auth layer resolves an inbound credential to a [`RequestAgent`]
//! before any lifecycle operation runs. The core trusts it as given.

use serde::{Deserialize, Serialize};

use crate::identity::Iri;

/// The acting agent of a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestAgent {
    pub agent_id: Iri,
    /// API key the request was authenticated with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<Iri>,
    /// Free text copied onto the resulting event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_description: Option<String>,
}

impl RequestAgent {
    pub fn new(agent_id: Iri) -> Self {
        Self {
            agent_id,
            key_id: None,
            event_description: None,
        }
    }

    pub fn with_key(mut self, key_id: Iri) -> Self {
        self.key_id = Some(key_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.event_description = Some(description.into());
        self
    }
}
