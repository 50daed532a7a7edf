//! SOAP 1.1 Binding.

use std::sync::Arc;

use crate::types::SamlBinding;

use super::{Binding, InTransport, MessageDecoder, MessageEncoder};

/// SOAP binding for back-channel exchanges.
///
/// Supports `POST` requests whose `Content-Type` is `text/xml`.
#[derive(Clone)]
pub struct SoapBinding {
    decoder: Arc<dyn MessageDecoder>,
    encoder: Arc<dyn MessageEncoder>,
}

impl SoapBinding {
    /// Creates the binding around a decoder and encoder.
    #[must_use]
    pub fn new(decoder: Arc<dyn MessageDecoder>, encoder: Arc<dyn MessageEncoder>) -> Self {
        Self { decoder, encoder }
    }
}

impl Binding for SoapBinding {
    fn profile_id(&self) -> &str {
        SamlBinding::Soap.uri()
    }

    fn supports(&self, transport: &dyn InTransport) -> bool {
        transport.method() == "POST"
            && transport
                .header("Content-Type")
                .is_some_and(|ct| ct.trim_start().starts_with("text/xml"))
    }

    fn decoder(&self) -> &dyn MessageDecoder {
        self.decoder.as_ref()
    }

    fn encoder(&self) -> &dyn MessageEncoder {
        self.encoder.as_ref()
    }
}
