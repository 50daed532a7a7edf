//! HTTP-Artifact Binding.

use std::sync::Arc;

use crate::types::SamlBinding;

use super::{Binding, InTransport, MessageDecoder, MessageEncoder, ARTIFACT_PARAM};

/// HTTP-Artifact binding.
///
/// Supports any request carrying a `SAMLart` parameter. The decoder resolves
/// the artifact against the issuer's artifact resolution service.
#[derive(Clone)]
pub struct HttpArtifactBinding {
    decoder: Arc<dyn MessageDecoder>,
    encoder: Arc<dyn MessageEncoder>,
}

impl HttpArtifactBinding {
    /// Creates the binding around a decoder and encoder.
    #[must_use]
    pub fn new(decoder: Arc<dyn MessageDecoder>, encoder: Arc<dyn MessageEncoder>) -> Self {
        Self { decoder, encoder }
    }
}

impl Binding for HttpArtifactBinding {
    fn profile_id(&self) -> &str {
        SamlBinding::HttpArtifact.uri()
    }

    fn supports(&self, transport: &dyn InTransport) -> bool {
        transport.parameter(ARTIFACT_PARAM).is_some()
    }

    fn decoder(&self) -> &dyn MessageDecoder {
        self.decoder.as_ref()
    }

    fn encoder(&self) -> &dyn MessageEncoder {
        self.encoder.as_ref()
    }
}
