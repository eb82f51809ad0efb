//! Website processor
//!
//! Same shape as the address processor, keyed by `website_type_id` and with
//! the simpler mapping path: every config entry other than the contact link
//! is treated as a field mapping, in configuration order. Write failures are
//! reported as structured error notes, matching the address processor.

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
pub const WEBSITE_PROCESSOR_KEY: &str = "civicrm_website";

/// Submit-side mapping excludes only the contact link; the type discriminator
/// is a numeric literal and falls out of the mapping walk on its own.
const SUBMIT_CONTROL_KEYS: &[&str] = &["contact_link"];

/// Render-side prefill skips both control keys.
const RENDER_CONTROL_KEYS: &[&str] = &["contact_link", "website_type_id"];

pub struct WebsiteProcessor {
    client: Arc<dyn CrmClient>,
}

impl WebsiteProcessor {
    pub fn new(client: Arc<dyn CrmClient>) -> Self {
        Self { client }
    }

    async fn find_existing(&self, query: RecordQuery, ctx: &RequestContext) -> Option<CrmRecord> {
        match self.client.find_single(Entity::Website, query).await {
            Ok(FindOutcome::Found(record)) => Some(record),
            Ok(FindOutcome::NotFound) => None,
            Ok(FindOutcome::Ambiguous) => {
                debug!(
                    request_id = %ctx.request_id(),
                    contact_id = query.contact_id,
                    website_type_id = query.type_id,
                    "multiple website records match, treating as absent"
                );
                None
            }
            Err(e) => {
                warn!(
                    request_id = %ctx.request_id(),
                    contact_id = query.contact_id,
                    error = %e,
                    "website lookup failed, treating as absent"
                );
                None
            }
        }
    }
}

#[async_trait]
impl FormProcessor for WebsiteProcessor {
    fn key(&self) -> &'static str {
        WEBSITE_PROCESSOR_KEY
    }

    fn describe(&self) -> ProcessorDescriptor {
        ProcessorDescriptor {
            key: WEBSITE_PROCESSOR_KEY.to_string(),
            name: "CRM Website".to_string(),
            description: "Create or update a contact's website record".to_string(),
            author: "Formbridge".to_string(),
            config_template: "templates/website_config.html".to_string(),
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
            .filter(|p| p.kind == WEBSITE_PROCESSOR_KEY && p.active)
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
                    "no resolved contact, skipping website prefill"
                );
                continue;
            };
            let Some(website_type_id) = config.get_i64("website_type_id") else {
                continue;
            };

            let query = RecordQuery {
                contact_id,
                type_id: website_type_id,
            };
            if let Some(record) = self.find_existing(query, ctx).await {
                mapping::apply_defaults(&config, form, RENDER_CONTROL_KEYS, &record);
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
            debug!(request_id = %ctx.request_id(), "website instance has no contact link");
            return SubmitOutcome::Skipped;
        };
        let Some(contact_id) = ctx.contact_id(link) else {
            debug!(
                request_id = %ctx.request_id(),
                contact_link = link,
                "upstream contact not resolved, skipping website save"
            );
            return SubmitOutcome::Skipped;
        };
        let Some(website_type_id) = config.get_i64("website_type_id") else {
            warn!(
                request_id = %ctx.request_id(),
                "website instance has no website type configured"
            );
            return SubmitOutcome::Skipped;
        };

        let query = RecordQuery {
            contact_id,
            type_id: website_type_id,
        };
        let existing = self.find_existing(query, ctx).await;

        let mut params = mapping::collect_submitted(config, form, SUBMIT_CONTROL_KEYS);
        if params.is_empty() {
            debug!(request_id = %ctx.request_id(), "no mapped website values submitted");
            return SubmitOutcome::Skipped;
        }

        params.insert("contact_id".to_string(), contact_id.into());
        match &existing {
            Some(record) => {
                params.insert("id".to_string(), record.id.into());
            }
            None => {
                params.insert("website_type_id".to_string(), website_type_id.into());
            }
        }

        match self.client.save(Entity::Website, params).await {
            Ok(record) => {
                info!(
                    request_id = %ctx.request_id(),
                    contact_id,
                    record_id = record.id,
                    "website record saved"
                );
                SubmitOutcome::Completed
            }
            Err(e) => {
                warn!(
                    request_id = %ctx.request_id(),
                    contact_id,
                    error = %e,
                    "website save failed"
                );
                SubmitOutcome::Failed(
                    ErrorNote::error(format!("Saving the website record failed: {e}"))
                        .with_detail(format!("{e:?}")),
                )
            }
        }
    }
}
