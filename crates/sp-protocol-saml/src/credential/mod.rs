//! Credentials and credential resolution.
//!
//! A [`Credential`] is key material bound to an entity. Resolvers return the
//! credentials matching a [`CriteriaSet`]; the trust engine treats whatever a
//! resolver returns as trusted.
//!
//! - [`ChainingCredentialResolver`] - ordered resolver chain, first non-empty
//!   result wins
//! - [`StaticKeyManager`] - the Service Provider's own key store

mod chaining;
mod key_manager;

pub use chaining::*;
pub use key_manager::*;

use std::fmt;
use std::sync::Arc;

use base64::Engine;

use crate::error::SamlResult;
use crate::types::{EntityRole, KeyUse};

/// Intended usage of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UsageType {
    /// Signing and signature verification.
    Signing,
    /// Encryption and decryption.
    Encryption,
    /// No declared usage; matches any requested usage.
    #[default]
    Unspecified,
}

impl UsageType {
    /// Returns true if a credential of this usage may serve `requested`.
    #[must_use]
    pub fn satisfies(self, requested: UsageType) -> bool {
        self == UsageType::Unspecified || requested == UsageType::Unspecified || self == requested
    }
}

impl From<Option<KeyUse>> for UsageType {
    fn from(key_use: Option<KeyUse>) -> Self {
        match key_use {
            Some(KeyUse::Signing) => Self::Signing,
            Some(KeyUse::Encryption) => Self::Encryption,
            None => Self::Unspecified,
        }
    }
}

/// Key material bound to an entity.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Entity the credential belongs to.
    pub entity_id: Option<String>,
    /// Declared usage.
    pub usage: UsageType,
    /// X.509 certificate (DER).
    pub certificate_der: Option<Vec<u8>>,
    /// Subject public key info (DER), when no certificate is available.
    pub public_key_der: Option<Vec<u8>>,
    private_key_der: Option<Vec<u8>>,
}

impl Credential {
    /// Creates a credential from a DER certificate.
    #[must_use]
    pub fn from_certificate_der(entity_id: Option<String>, certificate_der: Vec<u8>) -> Self {
        Self {
            entity_id,
            usage: UsageType::Unspecified,
            certificate_der: Some(certificate_der),
            public_key_der: None,
            private_key_der: None,
        }
    }

    /// Creates a credential from a base64 DER certificate. Whitespace is
    /// ignored, so PEM bodies and metadata text nodes can be passed as-is.
    pub fn from_certificate_base64(entity_id: Option<String>, certificate: &str) -> SamlResult<Self> {
        let compact: String = certificate.chars().filter(|c| !c.is_whitespace()).collect();
        let der = base64::engine::general_purpose::STANDARD.decode(compact)?;
        Ok(Self::from_certificate_der(entity_id, der))
    }

    /// Creates a credential from a DER public key.
    #[must_use]
    pub fn from_public_key_der(entity_id: Option<String>, public_key_der: Vec<u8>) -> Self {
        Self {
            entity_id,
            usage: UsageType::Unspecified,
            certificate_der: None,
            public_key_der: Some(public_key_der),
            private_key_der: None,
        }
    }

    /// Sets the usage.
    #[must_use]
    pub fn with_usage(mut self, usage: UsageType) -> Self {
        self.usage = usage;
        self
    }

    /// Attaches a DER private key.
    #[must_use]
    pub fn with_private_key(mut self, private_key_der: Vec<u8>) -> Self {
        self.private_key_der = Some(private_key_der);
        self
    }

    /// Returns the private key, if this credential can sign.
    #[must_use]
    pub fn private_key_der(&self) -> Option<&[u8]> {
        self.private_key_der.as_deref()
    }

    /// Returns a copy without private key material.
    #[must_use]
    pub fn public_part(&self) -> Self {
        Self {
            private_key_der: None,
            ..self.clone()
        }
    }

    /// Returns true if both credentials carry the same certificate or the
    /// same public key.
    #[must_use]
    pub fn same_key_as(&self, other: &Credential) -> bool {
        if let (Some(a), Some(b)) = (&self.certificate_der, &other.certificate_der) {
            return a == b;
        }
        match (&self.public_key_der, &other.public_key_der) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("entity_id", &self.entity_id)
            .field("usage", &self.usage)
            .field("certificate_len", &self.certificate_der.as_ref().map(Vec::len))
            .field("public_key_len", &self.public_key_der.as_ref().map(Vec::len))
            .field("private_key", &self.private_key_der.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Key-identifying criteria for credential resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaSet {
    /// Entity whose credentials are requested.
    pub entity_id: Option<String>,
    /// Metadata role of that entity.
    pub role: Option<EntityRole>,
    /// Protocol the role must support.
    pub protocol: Option<String>,
    /// Requested usage.
    pub usage: UsageType,
}

impl CriteriaSet {
    /// Creates criteria for `entity_id`.
    #[must_use]
    pub fn for_entity(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: Some(entity_id.into()),
            ..Self::default()
        }
    }

    /// Sets the role and protocol.
    #[must_use]
    pub fn with_role(mut self, role: EntityRole, protocol: impl Into<String>) -> Self {
        self.role = Some(role);
        self.protocol = Some(protocol.into());
        self
    }

    /// Sets the usage.
    #[must_use]
    pub fn with_usage(mut self, usage: UsageType) -> Self {
        self.usage = usage;
        self
    }
}

/// Resolves credentials matching key-identifying criteria.
pub trait CredentialResolver: Send + Sync {
    /// Returns the matching credentials, most preferred first. An empty
    /// vector means this resolver knows no credential for the criteria.
    fn resolve(&self, criteria: &CriteriaSet) -> SamlResult<Vec<Credential>>;
}

impl<T: CredentialResolver + ?Sized> CredentialResolver for Arc<T> {
    fn resolve(&self, criteria: &CriteriaSet) -> SamlResult<Vec<Credential>> {
        (**self).resolve(criteria)
    }
}

/// The Service Provider's key store.
///
/// Supplies the signing credential for outbound messages and serves as the
/// fallback resolver when metadata publishes no usable key.
pub trait CredentialSource: CredentialResolver {
    /// Returns the Service Provider's signing credential.
    fn signing_credential(&self) -> Credential;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_matching() {
        assert!(UsageType::Signing.satisfies(UsageType::Signing));
        assert!(UsageType::Unspecified.satisfies(UsageType::Signing));
        assert!(UsageType::Encryption.satisfies(UsageType::Unspecified));
        assert!(!UsageType::Encryption.satisfies(UsageType::Signing));
    }

    #[test]
    fn certificate_base64_ignores_whitespace() {
        let cred = Credential::from_certificate_base64(None, "AQID\n BA==").unwrap();
        assert_eq!(cred.certificate_der.as_deref(), Some(&[1u8, 2, 3, 4][..]));
    }

    #[test]
    fn invalid_base64_is_crypto_error() {
        let err = Credential::from_certificate_base64(None, "@@@").unwrap_err();
        assert!(matches!(err, crate::SamlError::Crypto(_)));
    }

    #[test]
    fn debug_redacts_private_key() {
        let cred = Credential::from_certificate_der(None, vec![1, 2]).with_private_key(vec![9, 9, 9]);
        let debug = format!("{cred:?}");
        assert!(debug.contains("[redacted]"));
        assert!(!debug.contains("9, 9, 9"));
        assert!(cred.public_part().private_key_der().is_none());
    }

    #[test]
    fn same_key_compares_certificate_then_public_key() {
        let a = Credential::from_certificate_der(None, vec![1]);
        let b = Credential::from_certificate_der(Some("x".into()), vec![1]);
        let c = Credential::from_certificate_der(None, vec![2]);
        assert!(a.same_key_as(&b));
        assert!(!a.same_key_as(&c));

        let k1 = Credential::from_public_key_der(None, vec![7]);
        let k2 = Credential::from_public_key_der(None, vec![7]);
        assert!(k1.same_key_as(&k2));
        assert!(!a.same_key_as(&k1));
    }
}
