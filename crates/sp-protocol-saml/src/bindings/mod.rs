//! SAML bindings.
//!
//! A [`Binding`] is a transport strategy: it recognises inbound transports it
//! can read, names its profile, and hands out the decoder and encoder that do
//! the wire-level work. The variants here cover the SAML 2.0 profiles:
//!
//! - **HTTP-POST** - [`HttpPostBinding`]
//! - **HTTP-Redirect** - [`HttpRedirectBinding`]
//! - **HTTP-Artifact** - [`HttpArtifactBinding`]
//! - **SOAP** - [`SoapBinding`]
//!
//! Each variant owns only its transport predicate and profile identifier; the
//! byte-level decoder and encoder are supplied by the caller.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sp_protocol_saml::bindings::{HttpPostBinding, HttpRedirectBinding};
//!
//! let bindings: Vec<Arc<dyn Binding>> = vec![
//!     Arc::new(HttpPostBinding::new(post_decoder, post_encoder)),
//!     Arc::new(HttpRedirectBinding::new(redirect_decoder, redirect_encoder)),
//! ];
//! ```

mod artifact;
mod post;
mod redirect;
mod soap;

pub use artifact::*;
pub use post::*;
pub use redirect::*;
pub use soap::*;

use std::collections::HashMap;
use std::fmt;

use crate::context::MessageContext;
use crate::error::SamlResult;

/// SAML message type for binding operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamlMessageType {
    /// Request message.
    Request,
    /// Response message.
    Response,
}

impl SamlMessageType {
    /// Returns the form parameter name for this message type.
    #[must_use]
    pub const fn form_param(&self) -> &'static str {
        match self {
            Self::Request => "SAMLRequest",
            Self::Response => "SAMLResponse",
        }
    }
}

/// Name of the artifact parameter.
pub const ARTIFACT_PARAM: &str = "SAMLart";

/// Read access to an inbound transport.
pub trait InTransport: Send + Sync + fmt::Debug {
    /// HTTP method, upper case.
    fn method(&self) -> &str;

    /// Request parameter (query or form).
    fn parameter(&self, name: &str) -> Option<&str>;

    /// Request header. Lookup is case-insensitive.
    fn header(&self, name: &str) -> Option<&str>;
}

/// Returns the SAML message type carried in the transport parameters.
#[must_use]
pub fn saml_message_type(transport: &dyn InTransport) -> Option<SamlMessageType> {
    [SamlMessageType::Request, SamlMessageType::Response]
        .into_iter()
        .find(|t| transport.parameter(t.form_param()).is_some())
}

/// Owned HTTP request view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpInTransport {
    method: String,
    parameters: HashMap<String, String>,
    headers: HashMap<String, String>,
}

impl HttpInTransport {
    /// Creates a transport for `method` with no parameters or headers.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            ..Self::default()
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }
}

impl InTransport for HttpInTransport {
    fn method(&self) -> &str {
        &self.method
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Reads the inbound message from the transport on the context, evaluates
/// the attached security policy, and attaches peer metadata.
pub trait MessageDecoder: Send + Sync {
    /// Decodes into `ctx`.
    ///
    /// Implementations fail with `SamlError::Decoding` for malformed payloads
    /// and propagate `SamlError::SecurityPolicyViolation` from the policy.
    fn decode(&self, ctx: &mut MessageContext) -> SamlResult<()>;
}

/// Serializes the outbound message on the context, signs it with the
/// attached signing credential when present, and writes it out.
pub trait MessageEncoder: Send + Sync {
    /// Encodes from `ctx`. Failures are `SamlError::Encoding`.
    fn encode(&self, ctx: &mut MessageContext) -> SamlResult<()>;
}

/// A transport profile.
pub trait Binding: Send + Sync {
    /// Profile identifier URI.
    fn profile_id(&self) -> &str;

    /// Returns true if this binding can read a message from `transport`.
    fn supports(&self, transport: &dyn InTransport) -> bool;

    /// The decoder for inbound messages.
    fn decoder(&self) -> &dyn MessageDecoder;

    /// The encoder for outbound messages.
    fn encoder(&self) -> &dyn MessageEncoder;
}
