//! Credentials presented in `ds:KeyInfo`.

use crate::credential::{Credential, UsageType};
use crate::error::SamlResult;

use super::XmlSignature;

/// Extracts the credential a signer presented alongside its signature.
pub trait KeyInfoCredentialResolver: Send + Sync {
    /// Returns the presented credential, or `None` if the signature carries
    /// no usable key information.
    fn resolve(&self, signature: &XmlSignature) -> SamlResult<Option<Credential>>;
}

/// Reads the `ds:X509Certificate` of a signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct X509KeyInfoResolver;

impl KeyInfoCredentialResolver for X509KeyInfoResolver {
    fn resolve(&self, signature: &XmlSignature) -> SamlResult<Option<Credential>> {
        signature
            .x509_certificate
            .as_deref()
            .map(|cert| {
                Credential::from_certificate_base64(None, cert)
                    .map(|c| c.with_usage(UsageType::Signing))
            })
            .transpose()
    }
}
