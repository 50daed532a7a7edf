//! Credentials published in metadata.

use std::sync::Arc;

use crate::credential::{Credential, CredentialResolver, CriteriaSet, UsageType};
use crate::error::SamlResult;
use crate::types::{EntityRole, SAMLP_NS};

use super::EntityMetadataSource;

/// Resolves the keys an entity publishes in its role descriptor.
///
/// Criteria must name an entity; role defaults to Identity Provider and
/// protocol to SAML 2.0. Unknown entities and roles resolve to no credentials.
#[derive(Clone)]
pub struct MetadataCredentialResolver {
    metadata: Arc<dyn EntityMetadataSource>,
}

impl MetadataCredentialResolver {
    /// Creates a resolver over a metadata source.
    #[must_use]
    pub fn new(metadata: Arc<dyn EntityMetadataSource>) -> Self {
        Self { metadata }
    }
}

impl CredentialResolver for MetadataCredentialResolver {
    fn resolve(&self, criteria: &CriteriaSet) -> SamlResult<Vec<Credential>> {
        let Some(entity_id) = criteria.entity_id.as_deref() else {
            return Ok(Vec::new());
        };
        let role = criteria.role.unwrap_or(EntityRole::IdentityProvider);
        let protocol = criteria.protocol.as_deref().unwrap_or(SAMLP_NS);

        let Some(descriptor) = self.metadata.role_descriptor(entity_id, role, protocol)? else {
            tracing::debug!(entity_id, %role, "no role descriptor in metadata");
            return Ok(Vec::new());
        };

        descriptor
            .key_descriptors
            .iter()
            .filter(|key| UsageType::from(key.key_use).satisfies(criteria.usage))
            .map(|key| {
                Credential::from_certificate_base64(Some(entity_id.to_string()), &key.certificate)
                    .map(|c| c.with_usage(key.key_use.into()))
            })
            .collect()
    }
}
