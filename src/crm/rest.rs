//! HTTP implementation of the CRM client
//!
//! Talks to the CRM's REST endpoint: one POST per operation to
//! `{base_url}/{Entity}/{action}` with a JSON parameter body, authenticated
//! by an API-key header. Responses arrive in the CRM's envelope format
//! (`is_error` / `error_message` / `values`).

use crate::crm::{CrmClient, CrmError, CrmRecord, Entity, FindOutcome, Params, RecordQuery};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// REST client configuration.
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// CRM client backed by the remote REST API.
pub struct RestCrmClient {
    config: RestClientConfig,
    client: Client,
}

impl RestCrmClient {
    pub fn new(config: RestClientConfig) -> Result<Self, CrmError> {
        if config.base_url.is_empty() {
            return Err(CrmError::NotConfigured("CRM base URL is required".to_string()));
        }
        if config.api_key.is_empty() {
            return Err(CrmError::NotConfigured("CRM API key is required".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CrmError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    async fn call(
        &self,
        entity: Entity,
        action: &str,
        params: &Params,
    ) -> Result<ApiEnvelope, CrmError> {
        let url = format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            entity.api_name(),
            action
        );

        let response = self
            .client
            .post(url)
            .header("X-Api-Key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(params)
            .send()
            .await
            .map_err(|e| CrmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CrmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|e| CrmError::InvalidResponse(e.to_string()))?;

        if envelope.is_error != 0 {
            return Err(CrmError::Api {
                status: status.as_u16(),
                message: envelope
                    .error_message
                    .unwrap_or_else(|| "unspecified CRM error".to_string()),
            });
        }

        Ok(envelope)
    }
}

#[async_trait]
impl CrmClient for RestCrmClient {
    async fn find_single(
        &self,
        entity: Entity,
        query: RecordQuery,
    ) -> Result<FindOutcome, CrmError> {
        let mut params = Params::new();
        params.insert("contact_id".to_string(), query.contact_id.into());
        params.insert(entity.type_field().to_string(), query.type_id.into());
        // Two rows are enough to tell "exactly one" from "ambiguous".
        params.insert("limit".to_string(), 2.into());

        let mut envelope = self.call(entity, "get", &params).await?;

        Ok(match envelope.values.len() {
            0 => FindOutcome::NotFound,
            1 => FindOutcome::Found(envelope.values.remove(0)),
            _ => FindOutcome::Ambiguous,
        })
    }

    async fn save(&self, entity: Entity, params: Params) -> Result<CrmRecord, CrmError> {
        let envelope = self.call(entity, "create", &params).await?;

        envelope.values.into_iter().next().ok_or_else(|| {
            CrmError::InvalidResponse(format!("{entity} create returned no record"))
        })
    }
}

/// Response envelope shared by all CRM API operations.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    is_error: u8,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    values: Vec<CrmRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config() -> RestClientConfig {
        RestClientConfig {
            base_url: "https://crm.example.org/api".to_string(),
            api_key: "test-key".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_rest_client_config_default() {
        let config = RestClientConfig::default();
        assert!(config.base_url.is_empty());
        assert!(config.api_key.is_empty());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_client_creation_requires_base_url_and_api_key() {
        let result = RestCrmClient::new(RestClientConfig::default());
        assert!(matches!(result, Err(CrmError::NotConfigured(_))));

        let result = RestCrmClient::new(RestClientConfig {
            base_url: "https://crm.example.org".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(CrmError::NotConfigured(_))));

        assert!(RestCrmClient::new(test_config()).is_ok());
    }

    #[test]
    fn test_envelope_deserialization() {
        let envelope: ApiEnvelope = serde_json::from_value(json!({
            "is_error": 0,
            "values": [
                {"id": 7, "contact_id": 42, "street_address": "Old St"}
            ]
        }))
        .unwrap();

        assert_eq!(envelope.is_error, 0);
        assert_eq!(envelope.values.len(), 1);
        assert_eq!(envelope.values[0].id, 7);
        assert_eq!(envelope.values[0].attr("street_address"), Some(&json!("Old St")));
    }

    #[test]
    fn test_envelope_error_deserialization() {
        let envelope: ApiEnvelope = serde_json::from_value(json!({
            "is_error": 1,
            "error_message": "DB constraint violation"
        }))
        .unwrap();

        assert_eq!(envelope.is_error, 1);
        assert_eq!(
            envelope.error_message.as_deref(),
            Some("DB constraint violation")
        );
        assert!(envelope.values.is_empty());
    }
}
