//! XML Signature trust evaluation.
//!
//! This module decides whether a signature on an inbound SAML message was
//! produced by a key the Service Provider trusts. Parsing `ds:Signature` and
//! the cryptographic check itself are delegated:
//!
//! - the binding decoder parses the signature into an [`XmlSignature`]
//! - a [`SignatureVerifier`] performs the cryptographic verification
//! - a [`KeyInfoCredentialResolver`] extracts the key the signer presented
//! - [`ExplicitKeySignatureTrustEngine`] combines these with a credential
//!   resolver chain

mod key_info;
mod trust;

pub use key_info::*;
pub use trust::*;

use crate::credential::Credential;
use crate::error::SamlResult;
use crate::types::signature_algorithms;

/// Signature algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    /// RSA with SHA-256 (recommended).
    #[default]
    RsaSha256,
    /// RSA with SHA-384.
    RsaSha384,
    /// RSA with SHA-512.
    RsaSha512,
    /// ECDSA with SHA-256.
    EcdsaSha256,
    /// ECDSA with SHA-384.
    EcdsaSha384,
    /// Legacy RSA with SHA-1 (not recommended).
    RsaSha1,
}

impl SignatureAlgorithm {
    /// Returns the URI for this signature algorithm.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::RsaSha256 => signature_algorithms::RSA_SHA256,
            Self::RsaSha384 => signature_algorithms::RSA_SHA384,
            Self::RsaSha512 => signature_algorithms::RSA_SHA512,
            Self::EcdsaSha256 => signature_algorithms::ECDSA_SHA256,
            Self::EcdsaSha384 => signature_algorithms::ECDSA_SHA384,
            Self::RsaSha1 => signature_algorithms::RSA_SHA1,
        }
    }

    /// Parses a signature algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            signature_algorithms::RSA_SHA256 => Some(Self::RsaSha256),
            signature_algorithms::RSA_SHA384 => Some(Self::RsaSha384),
            signature_algorithms::RSA_SHA512 => Some(Self::RsaSha512),
            signature_algorithms::ECDSA_SHA256 => Some(Self::EcdsaSha256),
            signature_algorithms::ECDSA_SHA384 => Some(Self::EcdsaSha384),
            signature_algorithms::RSA_SHA1 => Some(Self::RsaSha1),
            _ => None,
        }
    }

    /// Returns true if this algorithm uses a deprecated hash (SHA-1).
    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        matches!(self, Self::RsaSha1)
    }
}

/// A parsed `ds:Signature` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSignature {
    /// The signature algorithm used.
    pub algorithm: SignatureAlgorithm,
    /// The reference URI (typically `#` plus the ID of the signed element).
    pub reference_uri: String,
    /// The canonicalized `SignedInfo` the signature value covers.
    pub signed_info: String,
    /// The signature value (base64 encoded).
    pub signature_value: String,
    /// X.509 certificate from `KeyInfo` (base64 encoded, DER format).
    pub x509_certificate: Option<String>,
}

/// Cryptographic signature check, owned by the XML security library.
pub trait SignatureVerifier: Send + Sync {
    /// Verifies `signature` with the public key of `credential`.
    ///
    /// Returns `Ok(false)` when the signature does not verify; errors are
    /// reserved for unusable key material or unsupported algorithms.
    fn verify(&self, signature: &XmlSignature, credential: &Credential) -> SamlResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_algorithm_uri_roundtrip() {
        for alg in [
            SignatureAlgorithm::RsaSha256,
            SignatureAlgorithm::RsaSha512,
            SignatureAlgorithm::EcdsaSha384,
            SignatureAlgorithm::RsaSha1,
        ] {
            assert_eq!(SignatureAlgorithm::from_uri(alg.uri()), Some(alg));
        }
        assert_eq!(SignatureAlgorithm::from_uri("urn:unknown"), None);
    }

    #[test]
    fn only_sha1_is_deprecated() {
        assert!(SignatureAlgorithm::RsaSha1.is_deprecated());
        assert!(!SignatureAlgorithm::RsaSha256.is_deprecated());
    }
}
