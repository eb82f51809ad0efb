//! Behavioral tests for the website processor
//!
//! Mirrors the address scenarios where the shape is shared and pins down the
//! website-specific pieces: the simpler mapping path, the
//! `website_type_id` discriminator, and the unified error-note behavior on
//! write failure.

use formbridge::context::RequestContext;
use formbridge::crm::{CrmError, CrmRecord, Entity, FindOutcome, RecordQuery};
use formbridge::form::{FormField, ProcessorConfig, ProcessorInstance};
use formbridge::processors::{ProcessorRegistry, SubmitOutcome, WebsiteProcessor};
use formbridge::testing::MockCrmClient;
use serde_json::json;
use std::sync::Arc;


fn registry(client: Arc<MockCrmClient>) -> ProcessorRegistry {
    let mut registry = ProcessorRegistry::new();
    registry.register(Arc::new(WebsiteProcessor::new(client)));
    registry
}

fn resolved_context() -> RequestContext {
    let mut ctx = RequestContext::new();
    ctx.set_contact_id("primary", 42);
    ctx
}

const QUERY: RecordQuery = RecordQuery {
    contact_id: 42,
    type_id: 2,
};

#[tokio::test]
async fn test_submit_creates_website_with_discriminator() {
    let client = Arc::new(MockCrmClient::new());
    let registry = registry(client.clone());

    let mut form = test_helpers::website_form();
    form.field_mut("fld_url").unwrap().value = Some(json!("https://example.org"));

    let results = registry.submit(&form, &resolved_context()).await;
    assert_eq!(
        results,
        vec![("fp_web".to_string(), SubmitOutcome::Completed)]
    );

    let saved = client.saved_calls().await;
    assert_eq!(saved.len(), 1);
    let (entity, params) = &saved[0];
    assert_eq!(*entity, Entity::Website);
    assert_eq!(params.get("contact_id"), Some(&json!(42)));
    assert_eq!(params.get("website_type_id"), Some(&json!(2)));
    assert_eq!(params.get("url"), Some(&json!("https://example.org")));
    assert!(!params.contains_key("id"));
    assert!(!params.contains_key("contact_link"));
}

#[tokio::test]
async fn test_submit_updates_existing_website() {
    let client = Arc::new(MockCrmClient::new());
    client
        .expect_find(
            Entity::Website,
            QUERY,
            FindOutcome::Found(CrmRecord::new(31).with_attr("url", "https://old.example.org")),
        )
        .await;
    let registry = registry(client.clone());

    let mut form = test_helpers::website_form();
    form.field_mut("fld_url").unwrap().value = Some(json!("https://new.example.org"));

    registry.submit(&form, &resolved_context()).await;

    let saved = client.saved_calls().await;
    let (_, params) = &saved[0];
    assert_eq!(params.get("id"), Some(&json!(31)));
    assert_eq!(params.get("url"), Some(&json!("https://new.example.org")));
    assert!(!params.contains_key("website_type_id"));
}

#[tokio::test]
async fn test_submit_without_resolved_contact_is_a_noop() {
    let client = Arc::new(MockCrmClient::new());
    let registry = registry(client.clone());

    let mut form = test_helpers::website_form();
    form.field_mut("fld_url").unwrap().value = Some(json!("https://example.org"));

    let results = registry.submit(&form, &RequestContext::new()).await;

    assert_eq!(results, vec![("fp_web".to_string(), SubmitOutcome::Skipped)]);
    assert!(client.saved_calls().await.is_empty());
}

#[tokio::test]
async fn test_submit_skips_when_nothing_is_mapped() {
    let client = Arc::new(MockCrmClient::new());
    let registry = registry(client.clone());

    let form = test_helpers::website_form();

    let results = registry.submit(&form, &resolved_context()).await;

    assert_eq!(results, vec![("fp_web".to_string(), SubmitOutcome::Skipped)]);
    assert!(client.saved_calls().await.is_empty());
}

#[tokio::test]
async fn test_submit_write_failure_returns_error_note_not_a_fault() {
    let client = Arc::new(MockCrmClient::new());
    client
        .fail_saves(CrmError::Api {
            status: 500,
            message: "duplicate URL".to_string(),
        })
        .await;
    let registry = registry(client.clone());

    let mut form = test_helpers::website_form();
    form.field_mut("fld_url").unwrap().value = Some(json!("https://example.org"));

    let results = registry.submit(&form, &resolved_context()).await;

    match &results[0].1 {
        SubmitOutcome::Failed(note) => {
            assert!(note.note.contains("duplicate URL"));
            assert_eq!(serde_json::to_value(note).unwrap()["type"], "error");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_submit_accepts_string_typed_discriminator() {
    // Config UIs often store numeric values as strings; the discriminator
    // must still classify the create call as a number.
    let client = Arc::new(MockCrmClient::new());
    let registry = registry(client.clone());

    let mut form = test_helpers::website_form();
    form.processors[0].config = ProcessorConfig::new()
        .with("contact_link", "primary")
        .with("website_type_id", "2")
        .with("url", "fld_url");
    form.field_mut("fld_url").unwrap().value = Some(json!("https://example.org"));

    registry.submit(&form, &resolved_context()).await;

    let saved = client.saved_calls().await;
    let (_, params) = &saved[0];
    assert_eq!(params.get("website_type_id"), Some(&json!(2)));
}

#[tokio::test]
async fn test_render_prefills_url_and_excludes_control_keys() {
    let client = Arc::new(MockCrmClient::new());
    client
        .expect_find(
            Entity::Website,
            QUERY,
            FindOutcome::Found(
                CrmRecord::new(31)
                    .with_attr("contact_id", 42)
                    .with_attr("website_type_id", 2)
                    .with_attr("url", "https://example.org"),
            ),
        )
        .await;
    let registry = registry(client.clone());

    let mut form = test_helpers::website_form();
    registry.render(&mut form, &resolved_context()).await;

    assert_eq!(
        form.field("fld_url").unwrap().config.default,
        Some(json!("https://example.org"))
    );
}

#[tokio::test]
async fn test_render_without_contact_or_record_leaves_form_unchanged() {
    let client = Arc::new(MockCrmClient::new());
    let registry = registry(client.clone());

    // no contact resolved
    let mut form = test_helpers::website_form();
    let before = form.clone();
    registry.render(&mut form, &RequestContext::new()).await;
    assert_eq!(form, before);

    // contact resolved, no record
    registry.render(&mut form, &resolved_context()).await;
    assert_eq!(form, before);
}

#[tokio::test]
async fn test_both_processors_coexist_on_one_form() {
    let client = Arc::new(MockCrmClient::new());
    let mut registry = registry(client.clone());
    registry.register(Arc::new(formbridge::processors::AddressProcessor::new(
        client.clone(),
    )));

    let mut form = test_helpers::website_form();
    form.fields.push(FormField::new("fld_street", "Street"));
    form.processors.push(ProcessorInstance::new(
        "fp_addr",
        "civicrm_address",
        ProcessorConfig::new()
            .with("contact_link", "primary")
            .with("location_type_id", 1)
            .with("street_address", "fld_street"),
    ));
    form.field_mut("fld_url").unwrap().value = Some(json!("https://example.org"));
    form.field_mut("fld_street").unwrap().value = Some(json!("Main St"));

    let results = registry.submit(&form, &resolved_context()).await;

    assert_eq!(results.len(), 2);
    assert!(results
        .iter()
        .all(|(_, outcome)| *outcome == SubmitOutcome::Completed));

    let saved = client.saved_calls().await;
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].0, Entity::Website);
    assert_eq!(saved[1].0, Entity::Address);
}
