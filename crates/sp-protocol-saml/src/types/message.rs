//! Protocol message carried by a message context.

use crate::signature::XmlSignature;

/// A SAML protocol message as produced by a binding decoder, or handed to an
/// encoder for sending.
///
/// Parsing the XML is the decoder's job. The processing core only looks at
/// the issuer and the parsed signature.
#[derive(Debug, Clone)]
pub struct SamlMessage {
    /// The message `ID` attribute.
    pub id: String,

    /// The `saml:Issuer` value, if present.
    pub issuer: Option<String>,

    /// The serialized message.
    pub xml: String,

    /// The enveloped signature, if the message was signed.
    pub signature: Option<XmlSignature>,
}

impl SamlMessage {
    /// Creates an unsigned message with no issuer.
    #[must_use]
    pub fn new(id: impl Into<String>, xml: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            issuer: None,
            xml: xml.into(),
            signature: None,
        }
    }

    /// Sets the issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Attaches a parsed signature.
    #[must_use]
    pub fn with_signature(mut self, signature: XmlSignature) -> Self {
        self.signature = Some(signature);
        self
    }
}
