//! # Serialization Collaborator Contract
//!
//! RDF grammar lives outside the core. [`RdfCodec`] is the narrow contract:
//! bytes plus a format in, object content out, and the reverse.
//! [`RdfFormat`] names the interchange formats and maps media types.

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentContent};
use crate::disco::{Disco, DiscoContent};
use crate::error::RmapError;
use crate::event::Event;

/// Supported interchange formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RdfFormat {
    JsonLd,
    RdfXml,
    Turtle,
    NQuads,
}

impl RdfFormat {
    pub const ALL: [RdfFormat; 4] = [Self::JsonLd, Self::RdfXml, Self::Turtle, Self::NQuads];

    /// The canonical media type.
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::JsonLd => "application/ld+json",
            Self::RdfXml => "application/rdf+xml",
            Self::Turtle => "text/turtle",
            Self::NQuads => "application/n-quads",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::JsonLd => "jsonld",
            Self::RdfXml => "rdf",
            Self::Turtle => "ttl",
            Self::NQuads => "nq",
        }
    }

    /// Look up a format by media type. Parameters (`; charset=utf-8`) and
    /// case are ignored. `application/x-turtle` is accepted as Turtle.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/ld+json" => Some(Self::JsonLd),
            "application/rdf+xml" => Some(Self::RdfXml),
            "text/turtle" | "application/x-turtle" => Some(Self::Turtle),
            "application/n-quads" => Some(Self::NQuads),
            _ => None,
        }
    }
}

impl std::fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.media_type())
    }
}

/// Converts between the object model and an interchange format.
///
/// Implementations return `InvalidArgument` for malformed input or for a
/// format they do not handle.
pub trait RdfCodec: Send + Sync {
    fn decode_disco(&self, bytes: &[u8], format: RdfFormat) -> Result<DiscoContent, RmapError>;

    fn encode_disco(&self, disco: &Disco, format: RdfFormat) -> Result<Vec<u8>, RmapError>;

    fn decode_agent(&self, bytes: &[u8], format: RdfFormat) -> Result<AgentContent, RmapError>;

    fn encode_agent(&self, agent: &Agent, format: RdfFormat) -> Result<Vec<u8>, RmapError>;

    fn encode_event(&self, event: &Event, format: RdfFormat) -> Result<Vec<u8>, RmapError>;
}
