//! SAML error types.
//!
//! Provides the error taxonomy for message processing: metadata resolution,
//! binding selection, security policy enforcement, and the failures raised by
//! binding decoders and encoders.

use thiserror::Error;

use crate::types::{status_codes, sub_status_codes};

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// SAML message processing errors.
#[derive(Debug, Error)]
pub enum SamlError {
    /// Hosted entity or role descriptor could not be resolved.
    #[error("metadata resolution failed: {0}")]
    MetadataResolution(String),

    /// No configured binding supports the inbound transport.
    #[error("unsupported binding: {0}")]
    UnsupportedBinding(String),

    /// No configured binding has the requested profile identifier.
    #[error("binding {0} is not available, please check your configuration")]
    UnknownBinding(String),

    /// Signature missing, invalid, or not issued by a trusted signer.
    #[error("security policy violation: {0}")]
    SecurityPolicyViolation(String),

    /// Malformed inbound payload.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// Outbound message could not be serialized or written.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Decode succeeded but left the context inconsistent.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Generic processing failure, optionally wrapping a lower-level cause.
    #[error("{message}")]
    Saml {
        /// Description of the failing step.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<SamlError>>,
    },

    /// Key or certificate material could not be used.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SamlError {
    /// Creates a generic SAML error without a cause.
    #[must_use]
    pub fn saml(message: impl Into<String>) -> Self {
        Self::Saml {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps `source` with a message naming the failing step.
    #[must_use]
    pub fn wrap(message: impl Into<String>, source: SamlError) -> Self {
        Self::Saml {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if this error means the message must not be trusted.
    #[must_use]
    pub const fn is_security_failure(&self) -> bool {
        matches!(self, Self::SecurityPolicyViolation(_))
    }

    /// Returns the top-level SAML status code for this error.
    #[must_use]
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::UnsupportedBinding(_)
            | Self::SecurityPolicyViolation(_)
            | Self::Decoding(_)
            | Self::Protocol(_) => status_codes::REQUESTER,
            Self::Saml {
                source: Some(source),
                ..
            } => source.status_code(),
            _ => status_codes::RESPONDER,
        }
    }

    /// Returns a second-level status code if applicable.
    #[must_use]
    pub fn sub_status_code(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedBinding(_) | Self::UnknownBinding(_) => {
                Some(sub_status_codes::UNSUPPORTED_BINDING)
            }
            Self::SecurityPolicyViolation(_) => Some(sub_status_codes::REQUEST_DENIED),
            _ => None,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UnsupportedBinding(_) | Self::Decoding(_) | Self::Protocol(_) => 400,
            Self::SecurityPolicyViolation(_) => 401,
            Self::Saml {
                source: Some(source),
                ..
            } => source.http_status(),
            _ => 500,
        }
    }
}

impl From<base64::DecodeError> for SamlError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Crypto(format!("base64 decode error: {err}"))
    }
}

impl From<serde_json::Error> for SamlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<std::io::Error> for SamlError {
    fn from(err: std::io::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn error_status_codes() {
        let err = SamlError::Decoding("bad base64".to_string());
        assert_eq!(err.status_code(), status_codes::REQUESTER);
        assert_eq!(err.http_status(), 400);

        let err = SamlError::SecurityPolicyViolation("untrusted".to_string());
        assert_eq!(err.http_status(), 401);
        assert_eq!(err.sub_status_code(), Some(sub_status_codes::REQUEST_DENIED));
        assert!(err.is_security_failure());

        let err = SamlError::MetadataResolution("no hosted SP".to_string());
        assert_eq!(err.status_code(), status_codes::RESPONDER);
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn wrapped_error_keeps_source() {
        let cause = SamlError::MetadataResolution("entity not found".to_string());
        let err = SamlError::wrap("could not set local entity metadata", cause);

        assert_eq!(err.to_string(), "could not set local entity metadata");
        let source = err.source().expect("wrapped error has a source");
        assert!(source.to_string().contains("entity not found"));
        assert_eq!(err.status_code(), status_codes::RESPONDER);
    }

    #[test]
    fn unknown_binding_names_identifier() {
        let err = SamlError::UnknownBinding("urn:example:binding".to_string());
        assert!(err.to_string().contains("urn:example:binding"));
        assert_eq!(err.sub_status_code(), Some(sub_status_codes::UNSUPPORTED_BINDING));
    }
}
