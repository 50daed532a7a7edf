//! Ordered credential resolver chain.

use std::sync::Arc;

use crate::error::SamlResult;

use super::{Credential, CredentialResolver, CriteriaSet};

/// Consults resolvers in insertion order and returns the first non-empty
/// result.
///
/// Resolver errors are propagated immediately; later resolvers are not
/// consulted after an error.
#[derive(Clone, Default)]
pub struct ChainingCredentialResolver {
    chain: Vec<Arc<dyn CredentialResolver>>,
}

impl ChainingCredentialResolver {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resolver to the end of the chain.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn CredentialResolver>) -> Self {
        self.chain.push(resolver);
        self
    }
}

impl CredentialResolver for ChainingCredentialResolver {
    fn resolve(&self, criteria: &CriteriaSet) -> SamlResult<Vec<Credential>> {
        for (position, resolver) in self.chain.iter().enumerate() {
            let credentials = resolver.resolve(criteria)?;
            if !credentials.is_empty() {
                tracing::debug!(
                    position,
                    count = credentials.len(),
                    entity_id = criteria.entity_id.as_deref().unwrap_or(""),
                    "credentials resolved from chain"
                );
                return Ok(credentials);
            }
        }
        Ok(Vec::new())
    }
}
