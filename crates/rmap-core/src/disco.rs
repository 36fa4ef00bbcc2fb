//! # DiSCO: Distributed Scholarly Compound Object
//!
//! [`DiscoContent`] is what a client submits; [`Disco`] is what the store
//! holds once the lifecycle engine has assigned an id, a status, and the
//! generating event. A DiSCO's content is never edited in place: an update
//! produces a new DiSCO and inactivates the old one.

use serde::{Deserialize, Serialize};

use crate::error::RmapError;
use crate::identity::Iri;
use crate::status::Status;
use crate::triple::Triple;

/// Client-supplied DiSCO content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscoContent {
    /// Agent that authored the DiSCO, when stated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Iri>,
    /// Aggregated resources, in submission order.
    #[serde(default)]
    pub aggregated_resources: Vec<Iri>,
    /// Additional descriptive statements, not interpreted by the core.
    #[serde(default)]
    pub related_statements: Vec<Triple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DiscoContent {
    /// Content aggregating `resources`, with nothing else set.
    pub fn aggregating(resources: impl IntoIterator<Item = Iri>) -> Self {
        Self {
            aggregated_resources: resources.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_creator(mut self, creator: Iri) -> Self {
        self.creator = Some(creator);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_statement(mut self, statement: Triple) -> Self {
        self.related_statements.push(statement);
        self
    }

    /// Structural validation for Create, Update and Derive.
    ///
    /// A DiSCO must aggregate at least one resource, and every related
    /// statement must have a non-literal subject.
    pub fn validate(&self) -> Result<(), RmapError> {
        if self.aggregated_resources.is_empty() {
            return Err(RmapError::InvalidArgument(
                "a DiSCO must aggregate at least one resource".to_string(),
            ));
        }
        for statement in &self.related_statements {
            statement.validate()?;
        }
        Ok(())
    }
}

/// A stored DiSCO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disco {
    pub id: Iri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Iri>,
    #[serde(default)]
    pub aggregated_resources: Vec<Iri>,
    #[serde(default)]
    pub related_statements: Vec<Triple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: Status,
    /// The event that generated this DiSCO (CREATION, UPDATE or DERIVATION).
    pub prov_generated_by: Iri,
}

impl Disco {
    /// A new `ACTIVE` DiSCO holding `content`.
    pub fn new(id: Iri, content: DiscoContent, generated_by: Iri) -> Self {
        Self {
            id,
            creator: content.creator,
            aggregated_resources: content.aggregated_resources,
            related_statements: content.related_statements,
            description: content.description,
            status: Status::Active,
            prov_generated_by: generated_by,
        }
    }

    /// The client-visible content of this DiSCO.
    pub fn content(&self) -> DiscoContent {
        DiscoContent {
            creator: self.creator.clone(),
            aggregated_resources: self.aggregated_resources.clone(),
            related_statements: self.related_statements.clone(),
            description: self.description.clone(),
        }
    }

    /// Drop the content, keeping id, creator, status and provenance.
    pub fn purge(&mut self) {
        self.aggregated_resources.clear();
        self.related_statements.clear();
        self.description = None;
    }

    /// Whether [`Disco::purge`] has emptied this DiSCO.
    pub fn is_purged(&self) -> bool {
        self.aggregated_resources.is_empty()
            && self.related_statements.is_empty()
            && self.description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triple::Term;

    fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    fn sample() -> DiscoContent {
        DiscoContent::aggregating([iri("http://example.org/a"), iri("http://example.org/b")])
            .with_creator(iri("rmap:agent1"))
            .with_description("two articles")
    }

    #[test]
    fn empty_aggregation_is_invalid() {
        let err = DiscoContent::default().validate().unwrap_err();
        assert!(matches!(err, RmapError::InvalidArgument(_)));
    }

    #[test]
    fn deserialized_literal_subject_is_caught_by_validate() {
        let json = serde_json::json!({
            "aggregated_resources": ["http://example.org/a"],
            "related_statements": [{
                "subject": {"type": "literal", "value": "oops"},
                "predicate": "http://example.org/p",
                "object": {"type": "literal", "value": "x"}
            }]
        });
        let content: DiscoContent = serde_json::from_value(json).unwrap();
        assert!(content.validate().is_err());
    }

    #[test]
    fn new_disco_is_active_and_keeps_content() {
        let content = sample().with_statement(
            Triple::new(
                Term::iri(iri("http://example.org/a")),
                iri("http://purl.org/dc/terms/title"),
                Term::literal("A"),
            )
            .unwrap(),
        );
        let disco = Disco::new(iri("rmap:d1"), content.clone(), iri("rmap:e1"));
        assert_eq!(disco.status, Status::Active);
        assert_eq!(disco.content(), content);
        assert_eq!(disco.prov_generated_by, iri("rmap:e1"));
    }

    #[test]
    fn purge_keeps_identity_and_provenance() {
        let mut disco = Disco::new(iri("rmap:d1"), sample(), iri("rmap:e1"));
        disco.purge();
        assert!(disco.is_purged());
        assert_eq!(disco.id, iri("rmap:d1"));
        assert_eq!(disco.creator, Some(iri("rmap:agent1")));
        assert_eq!(disco.prov_generated_by, iri("rmap:e1"));
    }
}
