//! Address processor
//!
//! Creates or updates a contact's address record on submit, and prefills the
//! mapped form fields from the existing record on render. The contact itself
//! is resolved upstream by the contact processor and read from the request
//! context.

use crate::context::RequestContext;
use crate::crm::{CrmClient, CrmRecord, Entity, FindOutcome, RecordQuery};
use crate::error::ErrorNote;
use crate::form::{FormDefinition, ProcessorConfig};
use crate::mapping;
use crate::processors::{FormProcessor, ProcessorDescriptor, SubmitOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Processor key as it appears in form definitions.
pub const ADDRESS_PROCESSOR_KEY: &str = "civicrm_address";

/// Config keys that are control data, never field mappings.
const CONTROL_KEYS: &[&str] = &["contact_link", "location_type_id"];

pub struct AddressProcessor {
    client: Arc<dyn CrmClient>,
}

impl AddressProcessor {
    pub fn new(client: Arc<dyn CrmClient>) -> Self {
        Self { client }
    }

    /// Look up the single existing address for the instance's (contact,
    /// location type) pair. Zero matches, multiple matches, and remote
    /// failures all come back as `None`.
    async fn find_existing(&self, query: RecordQuery, ctx: &RequestContext) -> Option<CrmRecord> {
        match self.client.find_single(Entity::Address, query).await {
            Ok(FindOutcome::Found(record)) => Some(record),
            Ok(FindOutcome::NotFound) => None,
            Ok(FindOutcome::Ambiguous) => {
                debug!(
                    request_id = %ctx.request_id(),
                    contact_id = query.contact_id,
                    location_type_id = query.type_id,
                    "multiple address records match, treating as absent"
                );
                None
            }
            Err(e) => {
                warn!(
                    request_id = %ctx.request_id(),
                    contact_id = query.contact_id,
                    error = %e,
                    "address lookup failed, treating as absent"
                );
                None
            }
        }
    }
}

#[async_trait]
impl FormProcessor for AddressProcessor {
    fn key(&self) -> &'static str {
        ADDRESS_PROCESSOR_KEY
    }

    fn describe(&self) -> ProcessorDescriptor {
        ProcessorDescriptor {
            key: ADDRESS_PROCESSOR_KEY.to_string(),
            name: "CRM Address".to_string(),
            description: "Create or update a contact's address record".to_string(),
            author: "Formbridge".to_string(),
            config_template: "templates/address_config.html".to_string(),
            handles_render: true,
            handles_submit: true,
        }
    }

    async fn pre_render(&self, form: &mut FormDefinition, ctx: &RequestContext) {
        if !form.has_processors() {
            return;
        }

        let configs: Vec<ProcessorConfig> = form
            .processors
            .iter()
            .filter(|p| p.kind == ADDRESS_PROCESSOR_KEY && p.active)
            .map(|p| p.config.clone())
            .collect();

        for config in configs {
            let Some(link) = config.contact_link() else {
                continue;
            };
            let Some(contact_id) = ctx.contact_id(link) else {
                debug!(
                    request_id = %ctx.request_id(),
                    contact_link = link,
                    "no resolved contact, skipping address prefill"
                );
                continue;
            };
            let Some(location_type_id) = config.get_i64("location_type_id") else {
                continue;
            };

            let query = RecordQuery {
                contact_id,
                type_id: location_type_id,
            };
            if let Some(record) = self.find_existing(query, ctx).await {
                mapping::apply_defaults(&config, form, CONTROL_KEYS, &record);
            }
        }
    }

    async fn process_submission(
        &self,
        config: &ProcessorConfig,
        form: &FormDefinition,
        ctx: &RequestContext,
    ) -> SubmitOutcome {
        let Some(link) = config.contact_link() else {
            debug!(request_id = %ctx.request_id(), "address instance has no contact link");
            return SubmitOutcome::Skipped;
        };
        let Some(contact_id) = ctx.contact_id(link) else {
            debug!(
                request_id = %ctx.request_id(),
                contact_link = link,
                "upstream contact not resolved, skipping address save"
            );
            return SubmitOutcome::Skipped;
        };
        let Some(location_type_id) = config.get_i64("location_type_id") else {
            warn!(
                request_id = %ctx.request_id(),
                "address instance has no location type configured"
            );
            return SubmitOutcome::Skipped;
        };

        let query = RecordQuery {
            contact_id,
            type_id: location_type_id,
        };
        let existing = self.find_existing(query, ctx).await;

        let mut params = mapping::collect_submitted(config, form, CONTROL_KEYS);
        if params.is_empty() {
            debug!(request_id = %ctx.request_id(), "no mapped address values submitted");
            return SubmitOutcome::Skipped;
        }

        params.insert("contact_id".to_string(), contact_id.into());
        match &existing {
            // updating the record found for this (contact, location type)
            Some(record) => {
                params.insert("id".to_string(), record.id.into());
            }
            // creating a new record, classified by location type
            None => {
                params.insert("location_type_id".to_string(), location_type_id.into());
            }
        }

        match self.client.save(Entity::Address, params).await {
            Ok(record) => {
                info!(
                    request_id = %ctx.request_id(),
                    contact_id,
                    record_id = record.id,
                    "address record saved"
                );
                SubmitOutcome::Completed
            }
            Err(e) => {
                warn!(
                    request_id = %ctx.request_id(),
                    contact_id,
                    error = %e,
                    "address save failed"
                );
                SubmitOutcome::Failed(
                    ErrorNote::error(format!("Saving the address record failed: {e}"))
                        .with_detail(format!("{e:?}")),
                )
            }
        }
    }
}
