//! # Related Statements
//!
//! A DiSCO carries an arbitrary set of subject/predicate/object statements
//! that the core stores but does not interpret. The only structural rule is
//! the RDF one: a subject is an IRI or a blank node, never a literal.

use serde::{Deserialize, Serialize};

use crate::error::RmapError;
use crate::identity::Iri;

/// An RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Term {
    /// A named resource.
    Iri {
        /// The resource id.
        value: Iri,
    },
    /// A blank node, identified by a document-local label.
    BlankNode {
        /// The label, without the `_:` prefix.
        label: String,
    },
    /// A literal value.
    Literal {
        /// Lexical form.
        value: String,
        /// Datatype IRI, if typed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<Iri>,
        /// Language tag, if language-tagged.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

impl Term {
    /// An IRI term.
    pub fn iri(value: Iri) -> Self {
        Self::Iri { value }
    }

    /// A blank node term.
    pub fn blank(label: impl Into<String>) -> Self {
        Self::BlankNode {
            label: label.into(),
        }
    }

    /// A plain literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::BlankNode { .. })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    /// The IRI, if this term is one.
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Self::Iri { value } => Some(value),
            _ => None,
        }
    }

    /// The blank node label, if this term is one.
    pub fn blank_label(&self) -> Option<&str> {
        match self {
            Self::BlankNode { label } => Some(label),
            _ => None,
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iri { value } => write!(f, "<{value}>"),
            Self::BlankNode { label } => write!(f, "_:{label}"),
            Self::Literal {
                value,
                datatype,
                language,
            } => {
                write!(f, "{value:?}")?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")?;
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{dt}>")?;
                }
                Ok(())
            }
        }
    }
}

/// A subject/predicate/object statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Iri,
    pub object: Term,
}

impl Triple {
    /// Build a statement, rejecting literal subjects.
    pub fn new(subject: Term, predicate: Iri, object: Term) -> Result<Self, RmapError> {
        let triple = Self {
            subject,
            predicate,
            object,
        };
        triple.validate()?;
        Ok(triple)
    }

    /// Check the structural rule. Deserialized statements bypass
    /// [`Triple::new`], so content validation calls this again.
    pub fn validate(&self) -> Result<(), RmapError> {
        if self.subject.is_literal() {
            return Err(RmapError::InvalidArgument(format!(
                "statement subject must not be a literal: {self}"
            )));
        }
        Ok(())
    }

    /// Blank node labels appearing in subject or object position.
    pub fn blank_labels(&self) -> impl Iterator<Item = &str> {
        self.subject
            .blank_label()
            .into_iter()
            .chain(self.object.blank_label())
    }

    /// Replace blank nodes using `f`, which maps a label to the term to
    /// substitute (or `None` to leave the node in place).
    pub fn map_blank_nodes(self, mut f: impl FnMut(&str) -> Option<Term>) -> Self {
        let mut swap = |term: Term| {
            let replacement = term.blank_label().and_then(|label| f(label));
            replacement.unwrap_or(term)
        };
        let subject = swap(self.subject);
        let object = swap(self.object);
        Self {
            subject,
            predicate: self.predicate,
            object,
        }
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    #[test]
    fn literal_subject_is_rejected() {
        let err = Triple::new(
            Term::literal("x"),
            iri("http://purl.org/dc/terms/title"),
            Term::literal("y"),
        )
        .unwrap_err();
        assert!(matches!(err, RmapError::InvalidArgument(_)));
    }

    #[test]
    fn blank_subject_is_accepted() {
        let t = Triple::new(
            Term::blank("b0"),
            iri("http://purl.org/dc/terms/title"),
            Term::literal("A title"),
        )
        .unwrap();
        assert_eq!(t.blank_labels().collect::<Vec<_>>(), vec!["b0"]);
    }

    #[test]
    fn map_blank_nodes_replaces_both_positions() {
        let t = Triple::new(
            Term::blank("a"),
            iri("http://example.org/p"),
            Term::blank("b"),
        )
        .unwrap();
        let mapped = t.map_blank_nodes(|label| {
            (label == "a").then(|| Term::iri(iri("rmap:skolem_a")))
        });
        assert_eq!(mapped.subject, Term::iri(iri("rmap:skolem_a")));
        assert_eq!(mapped.object, Term::blank("b"));
    }

    #[test]
    fn display_is_ntriples_like() {
        let t = Triple::new(
            Term::iri(iri("http://example.org/s")),
            iri("http://example.org/p"),
            Term::Literal {
                value: "hello".into(),
                datatype: None,
                language: Some("en".into()),
            },
        )
        .unwrap();
        assert_eq!(
            t.to_string(),
            "<http://example.org/s> <http://example.org/p> \"hello\"@en ."
        );
    }

    #[test]
    fn serde_tags_terms() {
        let json = serde_json::to_value(Term::blank("x")).unwrap();
        assert_eq!(json["type"], "blank_node");
        assert_eq!(json["label"], "x");
    }
}
