//! # RMap Vocabulary
//!
//! IRIs of the RMap ontology terms used for statuses, event types, and
//! object types, plus the handful of external vocabulary terms the object
//! model refers to. Status and event enums map to and from these terms.

/// Namespace of the RMap ontology.
pub const RMAP_NS: &str = "http://purl.org/ontology/rmap#";

/// Conventional prefix for [`RMAP_NS`].
pub const RMAP_PREFIX: &str = "rmap";

// ─── Statuses ────────────────────────────────────────────────────────

pub const ACTIVE: &str = "http://purl.org/ontology/rmap#active";
pub const INACTIVE: &str = "http://purl.org/ontology/rmap#inactive";
pub const TOMBSTONED: &str = "http://purl.org/ontology/rmap#tombstoned";
pub const DELETED: &str = "http://purl.org/ontology/rmap#deleted";

// ─── Event types ─────────────────────────────────────────────────────

pub const CREATION: &str = "http://purl.org/ontology/rmap#creation";
pub const UPDATE: &str = "http://purl.org/ontology/rmap#update";
pub const DERIVATION: &str = "http://purl.org/ontology/rmap#derivation";
pub const INACTIVATION: &str = "http://purl.org/ontology/rmap#inactivation";
pub const TOMBSTONE: &str = "http://purl.org/ontology/rmap#tombstone";
pub const DELETION: &str = "http://purl.org/ontology/rmap#deletion";
pub const REPLACE: &str = "http://purl.org/ontology/rmap#replace";

// ─── Object types ────────────────────────────────────────────────────

pub const DISCO: &str = "http://purl.org/ontology/rmap#DiSCO";
pub const AGENT: &str = "http://purl.org/ontology/rmap#Agent";
pub const EVENT: &str = "http://purl.org/ontology/rmap#Event";

// ─── External terms ──────────────────────────────────────────────────

/// `foaf:name`, the Agent display-name predicate.
pub const FOAF_NAME: &str = "http://xmlns.com/foaf/0.1/name";
/// `ore:aggregates`, the DiSCO aggregated-resource predicate.
pub const ORE_AGGREGATES: &str = "http://www.openarchives.org/ore/terms/aggregates";
/// `dcterms:creator`.
pub const DCTERMS_CREATOR: &str = "http://purl.org/dc/terms/creator";
/// `dcterms:description`.
pub const DCTERMS_DESCRIPTION: &str = "http://purl.org/dc/terms/description";
/// `prov:wasGeneratedBy`.
pub const PROV_WAS_GENERATED_BY: &str = "http://www.w3.org/ns/prov#wasGeneratedBy";
/// `rdf:type`.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
