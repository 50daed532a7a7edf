//! SAML 2.0 Service Provider message processing.
//!
//! This crate is the message-processing core of a SAML Service Provider:
//!
//! - **Binding selection** - pick a transport profile by inbound transport or
//!   by profile identifier
//! - **Inbound processing** - populate the message context, build the
//!   signature trust engine and security policy, decode
//! - **Outbound processing** - populate local metadata, attach the signing
//!   credential on request, encode
//!
//! XML parsing, the XML-DSig algorithms and the wire encodings live behind
//! traits ([`signature::SignatureVerifier`], [`bindings::MessageDecoder`],
//! [`bindings::MessageEncoder`]) and are supplied by the embedding
//! application.
//!
//! # Architecture
//!
//! - [`processor`] - the [`MessageProcessor`] driving inbound and outbound
//!   exchanges
//! - [`context`] - the per-operation [`MessageContext`]
//! - [`bindings`] - HTTP-POST, HTTP-Redirect, HTTP-Artifact and SOAP bindings
//! - [`metadata`] - entity metadata access
//! - [`credential`] - credentials, resolvers and the SP key store
//! - [`signature`] - signature types and the explicit-key trust engine
//! - [`policy`] - the security policy pipeline
//! - [`config`] - Service Provider configuration
//! - [`error`] - error types for SAML operations
//!
//! # Example
//!
//! ```rust,ignore
//! use sp_protocol_saml::{MessageContext, MessageProcessor, ServiceProviderConfig};
//!
//! let config = ServiceProviderConfig::from_env()?;
//! let processor = MessageProcessor::from_config(&config, verifier, bindings)?;
//!
//! let mut ctx = MessageContext::inbound(transport);
//! processor.retrieve_message_from_transport(&mut ctx)?;
//! ```
//!
//! # SAML Specifications
//!
//! - [SAML 2.0 Core](https://docs.oasis-open.org/security/saml/v2.0/saml-core-2.0-os.pdf)
//! - [SAML 2.0 Bindings](https://docs.oasis-open.org/security/saml/v2.0/saml-bindings-2.0-os.pdf)
//! - [SAML 2.0 Metadata](https://docs.oasis-open.org/security/saml/v2.0/saml-metadata-2.0-os.pdf)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bindings;
pub mod config;
pub mod context;
pub mod credential;
pub mod error;
pub mod metadata;
pub mod policy;
pub mod processor;
pub mod signature;
pub mod types;

pub use config::ServiceProviderConfig;
pub use context::MessageContext;
pub use error::{SamlError, SamlResult};
pub use processor::{BindingSelector, MessageProcessor};
pub use types::*;
