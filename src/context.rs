//! Per-request shared state
//!
//! Earlier processors in the submission pipeline (the contact processor in
//! particular) publish resolved identifiers here; later processors read them.
//! The context lives exactly as long as one host request and is passed by
//! reference into every handler invocation. It is never process-global.

use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Conventional key prefix under which resolved contact ids are stored,
/// completed by the instance's contact link name.
pub const CONTACT_ID_PREFIX: &str = "contact_id_";

/// Request-scoped key/value state, created by the host at the start of form
/// processing and dropped at request end.
#[derive(Debug)]
pub struct RequestContext {
    request_id: Uuid,
    values: HashMap<String, Value>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            values: HashMap::new(),
        }
    }

    /// Identifier correlating all log events of one request.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Contact id resolved by the upstream contact processor for `link`.
    ///
    /// Accepts numeric or numeric-string entries; zero and empty values count
    /// as unresolved, matching the upstream producer's "nothing created"
    /// convention.
    pub fn contact_id(&self, link: &str) -> Option<i64> {
        let value = self.values.get(&format!("{CONTACT_ID_PREFIX}{link}"))?;
        let id = match value {
            Value::Number(n) => n.as_i64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        (id > 0).then_some(id)
    }

    /// Producer-side setter, used by the upstream contact processor.
    pub fn set_contact_id(&mut self, link: &str, contact_id: i64) {
        self.values
            .insert(format!("{CONTACT_ID_PREFIX}{link}"), contact_id.into());
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
