//! Service Provider configuration.
//!
//! Configuration is a JSON document, loaded from a string, a file, or the
//! file named by the `SP_SAML_CONFIG` environment variable.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SamlError, SamlResult};
use crate::types::{EntityDescriptor, EntityRole, SAMLP_NS};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "SP_SAML_CONFIG";

/// Configuration for a hosted Service Provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceProviderConfig {
    /// Entity ID of the hosted Service Provider.
    pub entity_id: String,

    /// Metadata for the hosted SP and its Identity Provider peers.
    #[serde(default)]
    pub entities: Vec<EntityDescriptor>,

    /// The SP signing key.
    pub signing_key: SigningKeyConfig,

    /// Peer certificates trusted locally, in addition to metadata.
    #[serde(default)]
    pub trusted_keys: Vec<TrustedKeyConfig>,

    /// Accept inbound messages that carry no signature.
    #[serde(default)]
    pub allow_unsigned_messages: bool,

    /// Accept SHA-1 based signatures.
    #[serde(default)]
    pub allow_sha1_signatures: bool,
}

/// SP signing key material.
#[derive(Clone, Serialize, Deserialize)]
pub struct SigningKeyConfig {
    /// Base64 DER private key (PKCS#8).
    pub private_key: String,
    /// Base64 DER X.509 certificate.
    pub certificate: String,
}

impl fmt::Debug for SigningKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyConfig")
            .field("private_key", &"[redacted]")
            .field("certificate", &self.certificate)
            .finish()
    }
}

/// A locally trusted peer certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustedKeyConfig {
    /// Entity the certificate is bound to. Absent means any entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// Base64 DER X.509 certificate.
    pub certificate: String,
}

impl ServiceProviderConfig {
    /// Parses and validates configuration from a JSON string.
    pub fn from_json_str(json: &str) -> SamlResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> SamlResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SamlError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "loading service provider configuration");
        Self::from_json_str(&contents)
    }

    /// Loads configuration from the file named by `SP_SAML_CONFIG`.
    pub fn from_env() -> SamlResult<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).map_err(|_| {
            SamlError::Configuration(format!("{CONFIG_PATH_ENV} environment variable is required"))
        })?;
        Self::from_file(path)
    }

    /// Checks that the hosted SP is described in `entities`.
    pub fn validate(&self) -> SamlResult<()> {
        if self.entity_id.trim().is_empty() {
            return Err(SamlError::Configuration(
                "entity_id must not be empty".to_string(),
            ));
        }

        let hosted = self
            .entities
            .iter()
            .find(|e| e.entity_id == self.entity_id)
            .ok_or_else(|| {
                SamlError::Configuration(format!(
                    "no metadata for hosted entity {}",
                    self.entity_id
                ))
            })?;

        if hosted.role(EntityRole::ServiceProvider, SAMLP_NS).is_none() {
            return Err(SamlError::Configuration(format!(
                "hosted entity {} has no SAML 2.0 SP role",
                self.entity_id
            )));
        }
        Ok(())
    }
}
