//! # Identifier Services
//!
//! The engine never invents ids; it asks an [`IdService`]. Two
//! implementations ship here:
//!
//! - [`RandomStringIdService`]: `prefix` followed by `length` random
//!   characters from `[a-z0-9]`, e.g. `rmap:k3v9q0x2ab`. Suitable for
//!   development and tests.
//! - [`UuidIdService`]: `urn:uuid:` followed by a random (v4) UUID.
//!
//! Allocation failures surface as [`RmapError::IdAllocationFailed`].

use rand::distributions::Uniform;
use rand::Rng;
use rmap_core::{Iri, RmapError};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Allocates and validates object identifiers.
pub trait IdService: Send + Sync + std::fmt::Debug {
    /// A new, globally unique id.
    fn create_id(&self) -> Result<Iri, RmapError>;

    /// Whether `id` has the shape this service produces.
    fn is_valid_id(&self, id: &Iri) -> bool;
}

/// Prefix plus a fixed-length random lowercase alphanumeric string.
#[derive(Debug, Clone)]
pub struct RandomStringIdService {
    prefix: String,
    length: usize,
}

impl RandomStringIdService {
    pub const DEFAULT_PREFIX: &'static str = "rmap:";
    pub const DEFAULT_LENGTH: usize = 10;

    /// Fails with `InvalidArgument` if `prefix` plus a random suffix would
    /// not be a valid IRI, or if `length` is zero.
    pub fn new(prefix: impl Into<String>, length: usize) -> Result<Self, RmapError> {
        let prefix = prefix.into();
        if length == 0 {
            return Err(RmapError::InvalidArgument(
                "random id length must be at least 1".to_string(),
            ));
        }
        Iri::new(format!("{prefix}{}", "a".repeat(length)))?;
        Ok(Self { prefix, length })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomStringIdService {
    fn default() -> Self {
        Self {
            prefix: Self::DEFAULT_PREFIX.to_string(),
            length: Self::DEFAULT_LENGTH,
        }
    }
}

impl IdService for RandomStringIdService {
    fn create_id(&self) -> Result<Iri, RmapError> {
        let dist = Uniform::from(0..ALPHABET.len());
        let suffix: String = rand::thread_rng()
            .sample_iter(dist)
            .take(self.length)
            .map(|i| char::from(ALPHABET[i]))
            .collect();
        Iri::new(format!("{}{suffix}", self.prefix))
            .map_err(|e| RmapError::IdAllocationFailed(e.to_string()))
    }

    fn is_valid_id(&self, id: &Iri) -> bool {
        id.as_str().strip_prefix(&self.prefix).is_some_and(|rest| {
            rest.len() == self.length && rest.bytes().all(|b| ALPHABET.contains(&b))
        })
    }
}

/// `urn:uuid:` ids from random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdService;

impl UuidIdService {
    pub const PREFIX: &'static str = "urn:uuid:";
}

impl IdService for UuidIdService {
    fn create_id(&self) -> Result<Iri, RmapError> {
        Iri::new(format!("{}{}", Self::PREFIX, uuid::Uuid::new_v4()))
            .map_err(|e| RmapError::IdAllocationFailed(e.to_string()))
    }

    fn is_valid_id(&self, id: &Iri) -> bool {
        id.as_str()
            .strip_prefix(Self::PREFIX)
            .is_some_and(|rest| uuid::Uuid::parse_str(rest).is_ok())
    }
}
