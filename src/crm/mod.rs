//! CRM client abstraction and record types
//!
//! This module defines the trait and types for talking to the remote CRM,
//! enabling an HTTP backend in production and a scripted mock in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub mod rest;

pub use rest::{RestClientConfig, RestCrmClient};

/// Parameter map sent with CRM calls. Ordered, so request bodies are stable.
pub type Params = Map<String, Value>;

/// The CRM entities this crate operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entity {
    Address,
    Website,
}

impl Entity {
    /// Entity name as it appears in API paths.
    pub fn api_name(&self) -> &'static str {
        match self {
            Entity::Address => "Address",
            Entity::Website => "Website",
        }
    }

    /// The type discriminator distinguishing multiple records of this kind
    /// attached to one contact.
    pub fn type_field(&self) -> &'static str {
        match self {
            Entity::Address => "location_type_id",
            Entity::Website => "website_type_id",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.api_name())
    }
}

/// A record fetched from the CRM: an id plus its open attribute set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmRecord {
    pub id: i64,
    #[serde(flatten)]
    pub attributes: Params,
}

impl CrmRecord {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            attributes: Params::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

/// Lookup key for a single record: the owning contact plus the record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordQuery {
    pub contact_id: i64,
    pub type_id: i64,
}

/// Tagged outcome of a single-record lookup.
///
/// Zero and multiple matches are ordinary outcomes here, not errors: the
/// handlers treat both as "no existing record".
#[derive(Debug, Clone, PartialEq)]
pub enum FindOutcome {
    Found(CrmRecord),
    NotFound,
    Ambiguous,
}

/// CRM client trait for dependency injection and testing.
#[async_trait]
pub trait CrmClient: Send + Sync {
    /// Look up the single record of `entity` matching `query`.
    async fn find_single(&self, entity: Entity, query: RecordQuery)
        -> Result<FindOutcome, CrmError>;

    /// Create or update a record: an `id` parameter makes this an update,
    /// otherwise the CRM creates a new record from `params`.
    async fn save(&self, entity: Entity, params: Params) -> Result<CrmRecord, CrmError>;
}

/// CRM client errors.
#[derive(Debug, Clone, Error)]
pub enum CrmError {
    #[error("CRM client not configured: {0}")]
    NotConfigured(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("CRM API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Invalid CRM response: {0}")]
    InvalidResponse(String),
}
