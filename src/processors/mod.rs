//! Form processors, their capability trait, and the registry
//!
//! Processors register explicitly and are driven by the registry's two
//! pipeline passes; there is no ambient hook dispatch. The host calls
//! [`ProcessorRegistry::render`] before displaying a form and
//! [`ProcessorRegistry::submit`] when one is submitted.

use crate::config::BridgeConfig;
use crate::context::RequestContext;
use crate::crm::{CrmClient, RestCrmClient};
use crate::error::{BridgeResult, ErrorNote};
use crate::form::{FormDefinition, ProcessorConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub mod address;
pub mod website;

pub use address::AddressProcessor;
pub use website::WebsiteProcessor;

/// Descriptor advertised to the host's form-editing UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorDescriptor {
    pub key: String,
    pub name: String,
    pub description: String,
    pub author: String,
    /// Host-side template that renders this processor's configuration UI.
    pub config_template: String,
    pub handles_render: bool,
    pub handles_submit: bool,
}

/// Outcome of one processor instance's submit pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A CRM write completed.
    Completed,
    /// Nothing to do: unresolved upstream contact or nothing mapped.
    Skipped,
    /// The CRM write failed; the note is for the host to surface.
    Failed(ErrorNote),
}

/// Capability interface implemented by every form processor.
#[async_trait]
pub trait FormProcessor: Send + Sync {
    /// Stable key identifying this processor type in form definitions.
    fn key(&self) -> &'static str;

    fn describe(&self) -> ProcessorDescriptor;

    /// Render pass: prefill field defaults for every active instance of this
    /// processor attached to `form`. Must not fail; remote problems are
    /// absorbed as "nothing to prefill".
    async fn pre_render(&self, form: &mut FormDefinition, ctx: &RequestContext);

    /// Submit pass for a single instance.
    async fn process_submission(
        &self,
        config: &ProcessorConfig,
        form: &FormDefinition,
        ctx: &RequestContext,
    ) -> SubmitOutcome;
}

/// Registry of processors, keyed by processor key, driving both passes.
pub struct ProcessorRegistry {
    processors: HashMap<String, Arc<dyn FormProcessor>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self {
            processors: HashMap::new(),
        }
    }

    /// Build a registry wired to a REST client assembled from `config`.
    /// Resolves the API key from the environment.
    pub fn from_config(config: &BridgeConfig) -> BridgeResult<Self> {
        let client = RestCrmClient::new(config.client_config()?)?;
        Ok(Self::with_default_processors(config, Arc::new(client)))
    }

    /// Build a registry with the stock processors enabled in `config`, all
    /// sharing one CRM client.
    pub fn with_default_processors(config: &BridgeConfig, client: Arc<dyn CrmClient>) -> Self {
        let mut registry = Self::new();
        if config.processors.address {
            registry.register(Arc::new(AddressProcessor::new(client.clone())));
        }
        if config.processors.website {
            registry.register(Arc::new(WebsiteProcessor::new(client)));
        }
        registry
    }

    /// Register a processor under its own key. Unrelated keys are untouched;
    /// re-registering a key replaces only that entry.
    pub fn register(&mut self, processor: Arc<dyn FormProcessor>) {
        self.processors
            .insert(processor.key().to_string(), processor);
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn FormProcessor>> {
        self.processors.get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.processors.keys().cloned().collect()
    }

    /// Descriptor map for the host's processor picker.
    pub fn descriptors(&self) -> HashMap<String, ProcessorDescriptor> {
        self.processors
            .iter()
            .map(|(key, processor)| (key.clone(), processor.describe()))
            .collect()
    }

    /// Render pass: give each registered processor with instances attached to
    /// `form` one chance to prefill its fields. A form without processors is
    /// left untouched.
    pub async fn render(&self, form: &mut FormDefinition, ctx: &RequestContext) {
        if !form.has_processors() {
            return;
        }

        // One pre_render call per distinct attached kind, in form order; the
        // processor itself walks its own instances.
        let mut seen: Vec<String> = Vec::new();
        let kinds: Vec<String> = form.processors.iter().map(|p| p.kind.clone()).collect();
        for kind in kinds {
            if seen.contains(&kind) {
                continue;
            }
            seen.push(kind.clone());

            if let Some(processor) = self.get(&kind) {
                processor.pre_render(form, ctx).await;
            }
        }
    }

    /// Submit pass: run every active attached instance through its
    /// processor, collecting `(instance_id, outcome)` pairs in form order.
    /// Instances of kinds not registered here are left to the host.
    pub async fn submit(
        &self,
        form: &FormDefinition,
        ctx: &RequestContext,
    ) -> Vec<(String, SubmitOutcome)> {
        let mut results = Vec::new();

        for instance in &form.processors {
            if !instance.active {
                debug!(
                    request_id = %ctx.request_id(),
                    instance_id = %instance.id,
                    "skipping inactive processor instance"
                );
                continue;
            }
            let Some(processor) = self.get(&instance.kind) else {
                continue;
            };

            let outcome = processor
                .process_submission(&instance.config, form, ctx)
                .await;
            results.push((instance.id.clone(), outcome));
        }

        results
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
