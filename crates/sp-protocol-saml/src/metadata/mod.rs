//! Entity metadata access.
//!
//! The processing core reads metadata through [`EntityMetadataSource`]; storage,
//! refresh and trust-anchor management belong to the implementation.
//! [`InMemoryMetadataSource`] serves configuration-loaded metadata, and
//! [`MetadataCredentialResolver`] turns published keys into trusted
//! credentials.

mod credential_resolver;
mod memory;

pub use credential_resolver::*;
pub use memory::*;

use crate::error::SamlResult;
use crate::types::{EntityDescriptor, EntityRole, RoleDescriptor};

/// Read access to SAML metadata.
pub trait EntityMetadataSource: Send + Sync {
    /// Entity ID of the hosted Service Provider.
    fn hosted_sp_entity_id(&self) -> SamlResult<String>;

    /// Looks up an entity by ID. `Ok(None)` means the entity is unknown.
    fn entity_descriptor(&self, entity_id: &str) -> SamlResult<Option<EntityDescriptor>>;

    /// Looks up the descriptor of `role` supporting `protocol` for an entity.
    fn role_descriptor(
        &self,
        entity_id: &str,
        role: EntityRole,
        protocol: &str,
    ) -> SamlResult<Option<RoleDescriptor>> {
        Ok(self
            .entity_descriptor(entity_id)?
            .and_then(|entity| entity.role(role, protocol).cloned()))
    }
}
