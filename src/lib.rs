//! Formbridge - CRM form processors
//!
//! Form-processor plugins for a host form-builder, synchronizing submitted
//! form data with contact records in a remote CRM.
//!
//! # Overview
//!
//! This crate provides:
//! - Address and website processors: render-time prefill from the existing
//!   CRM record, submit-time create-or-update
//! - An explicit processor registry and pipeline the host drives
//! - A CRM client trait with an HTTP implementation and a scripted test mock
//! - A per-request context carrying identifiers resolved upstream
//!
//! # Quick Start
//!
//! ```rust
//! use formbridge::context::RequestContext;
//! use formbridge::form::{FormDefinition, FormField, ProcessorConfig, ProcessorInstance};
//!
//! // A form with one street field, wired to the address processor
//! let mut form = FormDefinition::new("fm_1", "Contact form");
//! form.fields
//!     .push(FormField::new("fld_street", "Street").with_value("Main St"));
//! form.processors.push(ProcessorInstance::new(
//!     "fp_1",
//!     "civicrm_address",
//!     ProcessorConfig::new()
//!         .with("contact_link", "primary")
//!         .with("location_type_id", 1)
//!         .with("street_address", "fld_street"),
//! ));
//!
//! // The upstream contact processor resolved contact 42 for this request
//! let mut ctx = RequestContext::new();
//! ctx.set_contact_id("primary", 42);
//! assert_eq!(ctx.contact_id("primary"), Some(42));
//!
//! // Forms serialize to JSON for host interchange
//! let json = serde_json::to_string(&form).unwrap();
//! assert!(json.contains("civicrm_address"));
//! ```

pub mod config;
pub mod context;
pub mod crm;
pub mod error;
pub mod form;
pub mod mapping;
pub mod observability;
pub mod processors;
pub mod testing;

pub use config::{BridgeConfig, ConfigError};
pub use context::RequestContext;
pub use crm::{
    CrmClient, CrmError, CrmRecord, Entity, FindOutcome, Params, RecordQuery, RestClientConfig,
    RestCrmClient,
};
pub use error::{BridgeError, BridgeResult, ErrorNote, NoteKind};
pub use form::{FieldConfig, FormDefinition, FormField, ProcessorConfig, ProcessorInstance};
pub use processors::{
    AddressProcessor, FormProcessor, ProcessorDescriptor, ProcessorRegistry, SubmitOutcome,
    WebsiteProcessor,
};
