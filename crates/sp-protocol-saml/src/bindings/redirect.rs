//! HTTP-Redirect Binding.
//!
//! Messages travel deflated and base64-encoded in the query string of a
//! redirected `GET`.

use std::sync::Arc;

use crate::types::SamlBinding;

use super::{saml_message_type, Binding, InTransport, MessageDecoder, MessageEncoder};

/// HTTP-Redirect binding.
///
/// Supports `GET` requests carrying a `SAMLRequest` or `SAMLResponse`
/// parameter.
#[derive(Clone)]
pub struct HttpRedirectBinding {
    decoder: Arc<dyn MessageDecoder>,
    encoder: Arc<dyn MessageEncoder>,
}

impl HttpRedirectBinding {
    /// Creates the binding around a decoder and encoder.
    #[must_use]
    pub fn new(decoder: Arc<dyn MessageDecoder>, encoder: Arc<dyn MessageEncoder>) -> Self {
        Self { decoder, encoder }
    }
}

impl Binding for HttpRedirectBinding {
    fn profile_id(&self) -> &str {
        SamlBinding::HttpRedirect.uri()
    }

    fn supports(&self, transport: &dyn InTransport) -> bool {
        transport.method() == "GET" && saml_message_type(transport).is_some()
    }

    fn decoder(&self) -> &dyn MessageDecoder {
        self.decoder.as_ref()
    }

    fn encoder(&self) -> &dyn MessageEncoder {
        self.encoder.as_ref()
    }
}
