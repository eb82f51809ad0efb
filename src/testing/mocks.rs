//! Mock implementations for testing
//!
//! Provides a scripted CRM client so processor behavior can be tested
//! without a remote CRM: find outcomes are staged per query, save calls are
//! recorded, and failures can be injected on either operation.

use crate::crm::{CrmClient, CrmError, CrmRecord, Entity, FindOutcome, Params, RecordQuery};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mock CRM client for testing.
#[derive(Default)]
pub struct MockCrmClient {
    find_outcomes: Mutex<HashMap<(Entity, RecordQuery), FindOutcome>>,
    find_error: Mutex<Option<CrmError>>,
    save_error: Mutex<Option<CrmError>>,
    pub recorded_finds: Arc<Mutex<Vec<(Entity, RecordQuery)>>>,
    pub recorded_saves: Arc<Mutex<Vec<(Entity, Params)>>>,
}

impl MockCrmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage the outcome of `find_single` for one (entity, query) pair.
    /// Unstaged queries come back as `NotFound`.
    pub async fn expect_find(&self, entity: Entity, query: RecordQuery, outcome: FindOutcome) {
        self.find_outcomes.lock().await.insert((entity, query), outcome);
    }

    /// Make every `find_single` call fail with `error`.
    pub async fn fail_finds(&self, error: CrmError) {
        *self.find_error.lock().await = Some(error);
    }

    /// Make every `save` call fail with `error`.
    pub async fn fail_saves(&self, error: CrmError) {
        *self.save_error.lock().await = Some(error);
    }

    pub async fn find_calls(&self) -> Vec<(Entity, RecordQuery)> {
        self.recorded_finds.lock().await.clone()
    }

    pub async fn saved_calls(&self) -> Vec<(Entity, Params)> {
        self.recorded_saves.lock().await.clone()
    }
}

#[async_trait]
impl CrmClient for MockCrmClient {
    async fn find_single(
        &self,
        entity: Entity,
        query: RecordQuery,
    ) -> Result<FindOutcome, CrmError> {
        self.recorded_finds.lock().await.push((entity, query));

        if let Some(error) = self.find_error.lock().await.clone() {
            return Err(error);
        }

        Ok(self
            .find_outcomes
            .lock()
            .await
            .get(&(entity, query))
            .cloned()
            .unwrap_or(FindOutcome::NotFound))
    }

    async fn save(&self, entity: Entity, params: Params) -> Result<CrmRecord, CrmError> {
        if let Some(error) = self.save_error.lock().await.clone() {
            return Err(error);
        }

        let mut saved = self.recorded_saves.lock().await;
        let id = params
            .get("id")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(1000 + saved.len() as i64);
        saved.push((entity, params.clone()));

        let mut record = CrmRecord::new(id);
        record.attributes = params;
        record.attributes.remove("id");
        Ok(record)
    }
}
