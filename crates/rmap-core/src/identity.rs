//! # Identifiers
//!
//! Every DiSCO, Agent, Event, API key, aggregated resource, and identity
//! provider is named by an [`Iri`]. Ids are allocated by the identifier
//! service collaborator; the core only validates and compares them.
//!
//! ## Validation
//!
//! An IRI must start with an RFC 3986 scheme (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`),
//! have a non-empty remainder, and contain no whitespace, angle brackets,
//! or double quotes. That is enough to reject the malformed ids that break
//! RDF serialization, without implementing full IRI grammar.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A validated, opaque resource identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iri(String);

impl Iri {
    /// Validate and wrap an identifier string.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validate(&value)?;
        Ok(Self(value))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The scheme portion, without the trailing colon (e.g. `https`, `rmap`).
    pub fn scheme(&self) -> &str {
        self.0.split_once(':').map(|(scheme, _)| scheme).unwrap_or("")
    }

    /// Consume the wrapper, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

fn validate(value: &str) -> Result<(), ValidationError> {
    let reject = |reason: &'static str| ValidationError::InvalidIri {
        value: value.to_string(),
        reason,
    };

    if value.is_empty() {
        return Err(reject("empty"));
    }
    if value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"'))
    {
        return Err(reject("contains whitespace, angle brackets or quotes"));
    }
    let Some((scheme, rest)) = value.split_once(':') else {
        return Err(reject("missing scheme"));
    };
    let mut chars = scheme.chars();
    let first_is_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !first_is_alpha
        || !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return Err(reject("malformed scheme"));
    }
    if rest.is_empty() {
        return Err(reject("nothing after scheme"));
    }
    Ok(())
}

impl FromStr for Iri {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Iri {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Iri> for String {
    fn from(iri: Iri) -> Self {
        iri.0
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Iri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_forms() {
        for s in [
            "http://example.org/disco/1",
            "https://orcid.org/0000-0003-2069-1219",
            "rmap:abc123def0",
            "urn:uuid:6fa459ea-ee8a-3ca4-894e-db77e160355e",
            "ark:/99999/fk4abc",
        ] {
            assert!(Iri::new(s).is_ok(), "{s} should be accepted");
        }
    }

    #[test]
    fn rejects_malformed() {
        for s in [
            "",
            "no-scheme",
            "1http://x",
            "http:",
            "http://ex ample.org",
            "<http://example.org>",
            ":missing",
        ] {
            assert!(Iri::new(s).is_err(), "{s:?} should be rejected");
        }
    }

    #[test]
    fn scheme_is_extracted() {
        assert_eq!(Iri::new("rmap:xyz").unwrap().scheme(), "rmap");
        assert_eq!(Iri::new("https://a.b").unwrap().scheme(), "https");
    }

    #[test]
    fn serde_is_plain_string_and_validates() {
        let iri = Iri::new("http://example.org/a").unwrap();
        let json = serde_json::to_string(&iri).unwrap();
        assert_eq!(json, "\"http://example.org/a\"");
        let back: Iri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, iri);
        assert!(serde_json::from_str::<Iri>("\"not an iri\"").is_err());
    }
}
