//! In-memory key manager.

use base64::Engine;

use crate::config::ServiceProviderConfig;
use crate::error::{SamlError, SamlResult};

use super::{Credential, CredentialResolver, CredentialSource, CriteriaSet, UsageType};

/// Key store holding the Service Provider's signing credential and a set of
/// locally trusted peer credentials.
///
/// As a resolver it returns the public part of every stored credential whose
/// entity and usage match the criteria. Credentials stored without an entity
/// id match any entity.
#[derive(Debug, Clone)]
pub struct StaticKeyManager {
    signing: Credential,
    trusted: Vec<Credential>,
}

impl StaticKeyManager {
    /// Creates a key manager around a signing credential.
    ///
    /// Fails if the credential has no private key.
    pub fn new(signing: Credential) -> SamlResult<Self> {
        if signing.private_key_der().is_none() {
            return Err(SamlError::Crypto(
                "signing credential has no private key".to_string(),
            ));
        }
        Ok(Self {
            signing,
            trusted: Vec::new(),
        })
    }

    /// Adds a locally trusted credential.
    #[must_use]
    pub fn with_trusted(mut self, credential: Credential) -> Self {
        self.trusted.push(credential.public_part());
        self
    }

    /// Builds the key manager from configuration.
    pub fn from_config(config: &ServiceProviderConfig) -> SamlResult<Self> {
        let engine = base64::engine::general_purpose::STANDARD;
        let private_key = engine.decode(strip_whitespace(&config.signing_key.private_key))?;
        let signing = Credential::from_certificate_base64(
            Some(config.entity_id.clone()),
            &config.signing_key.certificate,
        )?
        .with_usage(UsageType::Signing)
        .with_private_key(private_key);

        let mut manager = Self::new(signing)?;
        for trusted in &config.trusted_keys {
            let credential =
                Credential::from_certificate_base64(trusted.entity_id.clone(), &trusted.certificate)?
                    .with_usage(UsageType::Signing);
            manager = manager.with_trusted(credential);
        }

        tracing::debug!(
            entity_id = %config.entity_id,
            trusted = manager.trusted.len(),
            "key manager loaded"
        );
        Ok(manager)
    }

    fn candidates(&self) -> impl Iterator<Item = &Credential> {
        std::iter::once(&self.signing).chain(self.trusted.iter())
    }
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

impl CredentialResolver for StaticKeyManager {
    fn resolve(&self, criteria: &CriteriaSet) -> SamlResult<Vec<Credential>> {
        let matches = self
            .candidates()
            .filter(|c| match (&c.entity_id, &criteria.entity_id) {
                (Some(owner), Some(requested)) => owner == requested,
                _ => true,
            })
            .filter(|c| c.usage.satisfies(criteria.usage))
            .map(Credential::public_part)
            .collect();
        Ok(matches)
    }
}

impl CredentialSource for StaticKeyManager {
    fn signing_credential(&self) -> Credential {
        self.signing.clone()
    }
}
