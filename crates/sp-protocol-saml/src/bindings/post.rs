//! HTTP-POST Binding.
//!
//! Messages travel base64-encoded in an HTML form field posted by the user
//! agent.

use std::sync::Arc;

use crate::types::SamlBinding;

use super::{saml_message_type, Binding, InTransport, MessageDecoder, MessageEncoder};

/// HTTP-POST binding.
///
/// Supports `POST` requests carrying a `SAMLRequest` or `SAMLResponse`
/// parameter.
#[derive(Clone)]
pub struct HttpPostBinding {
    decoder: Arc<dyn MessageDecoder>,
    encoder: Arc<dyn MessageEncoder>,
}

impl HttpPostBinding {
    /// Creates the binding around a decoder and encoder.
    #[must_use]
    pub fn new(decoder: Arc<dyn MessageDecoder>, encoder: Arc<dyn MessageEncoder>) -> Self {
        Self { decoder, encoder }
    }
}

impl Binding for HttpPostBinding {
    fn profile_id(&self) -> &str {
        SamlBinding::HttpPost.uri()
    }

    fn supports(&self, transport: &dyn InTransport) -> bool {
        transport.method() == "POST" && saml_message_type(transport).is_some()
    }

    fn decoder(&self) -> &dyn MessageDecoder {
        self.decoder.as_ref()
    }

    fn encoder(&self) -> &dyn MessageEncoder {
        self.encoder.as_ref()
    }
}
