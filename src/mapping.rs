//! Field-mapping helper
//!
//! Translates between a processor's declarative field-to-form-field
//! configuration and the form's runtime values, in both directions: submitted
//! values out to CRM parameters, and CRM record attributes back into field
//! defaults before render.

use crate::crm::{CrmRecord, Params};
use crate::form::{FormDefinition, ProcessorConfig};

/// Map submitted form values into CRM parameters.
///
/// Walks the config's field mappings (minus `ignore`d control keys and blank
/// mappings) and copies each mapped field's submitted value under its CRM
/// attribute name. Fields without a submitted value contribute nothing.
pub fn collect_submitted(
    config: &ProcessorConfig,
    form: &FormDefinition,
    ignore: &[&str],
) -> Params {
    let mut params = Params::new();
    for (attribute, field_id) in config.mappings(ignore) {
        if let Some(value) = form.submitted_value(field_id) {
            params.insert(attribute.to_string(), value.clone());
        }
    }
    params
}

/// Write a CRM record's attributes into the mapped fields' default values.
///
/// Attributes the record does not carry and mappings pointing at fields the
/// form does not have are skipped silently.
pub fn apply_defaults(
    config: &ProcessorConfig,
    form: &mut FormDefinition,
    ignore: &[&str],
    record: &CrmRecord,
) {
    for (attribute, field_id) in config.mappings(ignore) {
        let Some(value) = record.attr(attribute) else {
            continue;
        };
        if let Some(field) = form.field_mut(field_id) {
            field.config.default = Some(value.clone());
        }
    }
}
