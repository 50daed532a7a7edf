//! Metadata held in memory.

use std::collections::HashMap;

use crate::config::ServiceProviderConfig;
use crate::error::{SamlError, SamlResult};
use crate::types::EntityDescriptor;

use super::EntityMetadataSource;

/// Immutable metadata set keyed by entity ID.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetadataSource {
    hosted_sp: Option<String>,
    entities: HashMap<String, EntityDescriptor>,
}

impl InMemoryMetadataSource {
    /// Creates an empty source with no hosted SP.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hosted Service Provider entity ID.
    #[must_use]
    pub fn with_hosted_sp(mut self, entity_id: impl Into<String>) -> Self {
        self.hosted_sp = Some(entity_id.into());
        self
    }

    /// Adds an entity, replacing any previous entity with the same ID.
    #[must_use]
    pub fn with_entity(mut self, entity: EntityDescriptor) -> Self {
        self.entities.insert(entity.entity_id.clone(), entity);
        self
    }

    /// Builds the source from configuration.
    #[must_use]
    pub fn from_config(config: &ServiceProviderConfig) -> Self {
        config
            .entities
            .iter()
            .cloned()
            .fold(Self::new().with_hosted_sp(config.entity_id.clone()), Self::with_entity)
    }
}

impl EntityMetadataSource for InMemoryMetadataSource {
    fn hosted_sp_entity_id(&self) -> SamlResult<String> {
        self.hosted_sp.clone().ok_or_else(|| {
            SamlError::MetadataResolution("no hosted service provider configured".to_string())
        })
    }

    fn entity_descriptor(&self, entity_id: &str) -> SamlResult<Option<EntityDescriptor>> {
        Ok(self.entities.get(entity_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityRole, RoleDescriptor, SAMLP_NS};

    #[test]
    fn hosted_sp_must_be_configured() {
        let source = InMemoryMetadataSource::new();
        assert!(matches!(
            source.hosted_sp_entity_id(),
            Err(SamlError::MetadataResolution(_))
        ));
    }

    #[test]
    fn role_descriptor_through_default_method() {
        let source = InMemoryMetadataSource::new()
            .with_hosted_sp("https://sp.example.org")
            .with_entity(
                EntityDescriptor::new("https://sp.example.org")
                    .with_role(RoleDescriptor::new(EntityRole::ServiceProvider)),
            );

        assert_eq!(source.hosted_sp_entity_id().unwrap(), "https://sp.example.org");
        assert!(source
            .role_descriptor("https://sp.example.org", EntityRole::ServiceProvider, SAMLP_NS)
            .unwrap()
            .is_some());
        assert!(source
            .role_descriptor("https://sp.example.org", EntityRole::IdentityProvider, SAMLP_NS)
            .unwrap()
            .is_none());
        assert!(source.entity_descriptor("https://unknown.example.org").unwrap().is_none());
    }
}
