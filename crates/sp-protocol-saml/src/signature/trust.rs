//! Signature trust engines.

use std::sync::Arc;

use crate::credential::{CredentialResolver, CriteriaSet};
use crate::error::{SamlError, SamlResult};

use super::{KeyInfoCredentialResolver, SignatureVerifier, XmlSignature};

/// Decides whether a signature was produced by a trusted key.
pub trait SignatureTrustEngine: Send + Sync {
    /// Returns `Ok(true)` if the signature verifies with a credential trusted
    /// for `criteria`.
    fn validate(&self, signature: &XmlSignature, criteria: &CriteriaSet) -> SamlResult<bool>;
}

/// Trust engine that only accepts keys explicitly resolved as trusted.
///
/// Trusted credentials come from the credential resolver. When the signer
/// presents key information, the presented key must equal one of the trusted
/// credentials and is verified against that credential alone. Without key
/// information every trusted credential is tried in resolver order.
#[derive(Clone)]
pub struct ExplicitKeySignatureTrustEngine {
    credential_resolver: Arc<dyn CredentialResolver>,
    key_info_resolver: Arc<dyn KeyInfoCredentialResolver>,
    verifier: Arc<dyn SignatureVerifier>,
    allow_sha1: bool,
}

impl ExplicitKeySignatureTrustEngine {
    /// Creates a trust engine.
    #[must_use]
    pub fn new(
        credential_resolver: Arc<dyn CredentialResolver>,
        key_info_resolver: Arc<dyn KeyInfoCredentialResolver>,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        Self {
            credential_resolver,
            key_info_resolver,
            verifier,
            allow_sha1: false,
        }
    }

    /// Allows SHA-1 based signatures (not recommended).
    #[must_use]
    pub const fn allow_sha1(mut self, allow: bool) -> Self {
        self.allow_sha1 = allow;
        self
    }
}

impl SignatureTrustEngine for ExplicitKeySignatureTrustEngine {
    fn validate(&self, signature: &XmlSignature, criteria: &CriteriaSet) -> SamlResult<bool> {
        if signature.algorithm.is_deprecated() && !self.allow_sha1 {
            return Err(SamlError::SecurityPolicyViolation(
                "SHA-1 signatures are not allowed".to_string(),
            ));
        }

        let trusted = self.credential_resolver.resolve(criteria)?;
        if trusted.is_empty() {
            tracing::debug!(
                entity_id = criteria.entity_id.as_deref().unwrap_or(""),
                "no trusted credentials for signer"
            );
            return Ok(false);
        }

        if let Some(presented) = self.key_info_resolver.resolve(signature)? {
            let Some(anchor) = trusted.iter().find(|t| t.same_key_as(&presented)) else {
                tracing::debug!("key presented in KeyInfo is not trusted");
                return Ok(false);
            };
            return self.verifier.verify(signature, anchor);
        }

        for credential in &trusted {
            if self.verifier.verify(signature, credential)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
