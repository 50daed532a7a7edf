//! SAML metadata types.
//!
//! A reduced model of `md:EntityDescriptor` carrying what message processing
//! needs: role descriptors with their supported protocols, signing and
//! encryption keys, and endpoints.

use serde::{Deserialize, Serialize};

use super::{EntityRole, SAMLP_NS};

/// An entity and the roles it plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// The entity identifier (usually a URL).
    pub entity_id: String,

    /// Role descriptors declared by the entity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<RoleDescriptor>,
}

impl EntityDescriptor {
    /// Creates a descriptor with no roles.
    #[must_use]
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            roles: Vec::new(),
        }
    }

    /// Adds a role descriptor.
    #[must_use]
    pub fn with_role(mut self, role: RoleDescriptor) -> Self {
        self.roles.push(role);
        self
    }

    /// Finds the first role descriptor of `role` that supports `protocol`.
    #[must_use]
    pub fn role(&self, role: EntityRole, protocol: &str) -> Option<&RoleDescriptor> {
        self.roles
            .iter()
            .find(|r| r.role == role && r.supports_protocol(protocol))
    }
}

/// A role (SP or IdP) played by an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDescriptor {
    /// Which role this descriptor describes.
    pub role: EntityRole,

    /// Supported protocol enumeration.
    #[serde(default = "default_protocols")]
    pub protocols: Vec<String>,

    /// Keys published for this role.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_descriptors: Vec<KeyDescriptor>,

    /// Service endpoints published for this role.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<Endpoint>,
}

fn default_protocols() -> Vec<String> {
    vec![SAMLP_NS.to_string()]
}

impl RoleDescriptor {
    /// Creates a SAML 2.0 role descriptor with no keys or endpoints.
    #[must_use]
    pub fn new(role: EntityRole) -> Self {
        Self {
            role,
            protocols: default_protocols(),
            key_descriptors: Vec::new(),
            endpoints: Vec::new(),
        }
    }

    /// Adds a key descriptor.
    #[must_use]
    pub fn with_key(mut self, key: KeyDescriptor) -> Self {
        self.key_descriptors.push(key);
        self
    }

    /// Adds an endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Returns true if `protocol` is in the supported protocol enumeration.
    #[must_use]
    pub fn supports_protocol(&self, protocol: &str) -> bool {
        self.protocols.iter().any(|p| p == protocol)
    }
}

/// Declared purpose of a published key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyUse {
    /// Signing key.
    Signing,
    /// Encryption key.
    Encryption,
}

/// A key published in metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDescriptor {
    /// The declared use. Absent means the key may be used for anything.
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<KeyUse>,

    /// Base64 DER X.509 certificate.
    pub certificate: String,
}

impl KeyDescriptor {
    /// Creates a signing key descriptor.
    #[must_use]
    pub fn signing(certificate: impl Into<String>) -> Self {
        Self {
            key_use: Some(KeyUse::Signing),
            certificate: certificate.into(),
        }
    }
}

/// A protocol endpoint published in metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Binding profile identifier the endpoint expects.
    pub binding: String,

    /// Endpoint URL.
    pub location: String,

    /// Optional separate URL for responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_location: Option<String>,
}

impl Endpoint {
    /// Creates an endpoint.
    #[must_use]
    pub fn new(binding: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            binding: binding.into(),
            location: location.into(),
            response_location: None,
        }
    }
}
