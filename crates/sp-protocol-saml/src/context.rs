//! Per-operation message context.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::bindings::InTransport;
use crate::credential::Credential;
use crate::error::{SamlError, SamlResult};
use crate::policy::SecurityPolicyResolver;
use crate::types::{Endpoint, EntityDescriptor, EntityRole, RoleDescriptor, SamlMessage};

/// Mutable record carrying identity, metadata, policy and message state
/// through one inbound or outbound operation.
///
/// A context is owned by a single request/response flow and handed by
/// `&mut` to the processor and the binding it delegates to. Contexts are
/// single-use: a failed inbound retrieval leaves the context partially
/// populated and it must not be used for authentication decisions.
pub struct MessageContext {
    id: Uuid,

    /// Entity ID of the hosted Service Provider.
    pub local_entity_id: Option<String>,
    /// Role of the local entity.
    pub local_entity_role: Option<EntityRole>,
    /// Metadata of the local entity.
    pub local_entity_metadata: Option<EntityDescriptor>,
    /// Role metadata of the local entity.
    pub local_entity_role_metadata: Option<RoleDescriptor>,

    /// Entity ID of the peer, set after a successful decode.
    pub peer_entity_id: Option<String>,
    /// Role expected of the peer.
    pub peer_entity_role: Option<EntityRole>,
    /// Peer metadata, attached by the decoder.
    pub peer_entity_metadata: Option<EntityDescriptor>,
    /// Peer role metadata, attached by the decoder.
    pub peer_entity_role_metadata: Option<RoleDescriptor>,
    /// Endpoint of the peer the outbound message is sent to.
    pub peer_entity_endpoint: Option<Endpoint>,

    /// Protocol namespace of inbound messages.
    pub inbound_protocol: Option<String>,
    /// Profile identifier of the binding in use.
    pub communication_profile_id: Option<String>,
    /// Policy applied by the decoder.
    pub security_policy_resolver: Option<Arc<dyn SecurityPolicyResolver>>,
    /// Credential the encoder signs with.
    pub outbound_signing_credential: Option<Credential>,

    /// Transport the inbound message arrived on.
    pub inbound_transport: Option<Box<dyn InTransport>>,
    /// Decoded inbound message.
    pub inbound_message: Option<SamlMessage>,
    /// Message to encode and send.
    pub outbound_message: Option<SamlMessage>,
    /// RelayState carried alongside the message.
    pub relay_state: Option<String>,
    /// Set once the inbound message signature is trusted.
    pub inbound_message_authenticated: bool,
}

impl MessageContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            local_entity_id: None,
            local_entity_role: None,
            local_entity_metadata: None,
            local_entity_role_metadata: None,
            peer_entity_id: None,
            peer_entity_role: None,
            peer_entity_metadata: None,
            peer_entity_role_metadata: None,
            peer_entity_endpoint: None,
            inbound_protocol: None,
            communication_profile_id: None,
            security_policy_resolver: None,
            outbound_signing_credential: None,
            inbound_transport: None,
            inbound_message: None,
            outbound_message: None,
            relay_state: None,
            inbound_message_authenticated: false,
        }
    }

    /// Creates a context for a message arriving on `transport`.
    #[must_use]
    pub fn inbound(transport: impl InTransport + 'static) -> Self {
        Self {
            inbound_transport: Some(Box::new(transport)),
            ..Self::new()
        }
    }

    /// Creates a context for sending `message` to `endpoint`.
    #[must_use]
    pub fn outbound(message: SamlMessage, endpoint: Endpoint) -> Self {
        Self {
            outbound_message: Some(message),
            peer_entity_endpoint: Some(endpoint),
            ..Self::new()
        }
    }

    /// Correlation ID used in log events for this context.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Inbound transport, if any.
    #[must_use]
    pub fn inbound_transport(&self) -> Option<&dyn InTransport> {
        self.inbound_transport.as_deref()
    }

    /// Evaluates the attached security policy against this context.
    ///
    /// Binding decoders call this after parsing the inbound message. A
    /// context without a policy resolver is rejected.
    pub fn evaluate_security_policy(&mut self) -> SamlResult<()> {
        let resolver = self.security_policy_resolver.clone().ok_or_else(|| {
            SamlError::SecurityPolicyViolation("no security policy attached".to_string())
        })?;
        let policy = resolver.resolve(self)?;
        policy.evaluate(self)
    }
}

impl Default for MessageContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MessageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageContext")
            .field("id", &self.id)
            .field("local_entity_id", &self.local_entity_id)
            .field("local_entity_role", &self.local_entity_role)
            .field("peer_entity_id", &self.peer_entity_id)
            .field("peer_entity_role", &self.peer_entity_role)
            .field("peer_entity_endpoint", &self.peer_entity_endpoint)
            .field("inbound_protocol", &self.inbound_protocol)
            .field("communication_profile_id", &self.communication_profile_id)
            .field("has_security_policy", &self.security_policy_resolver.is_some())
            .field("outbound_signing_credential", &self.outbound_signing_credential)
            .field("inbound_transport", &self.inbound_transport)
            .field("inbound_message_authenticated", &self.inbound_message_authenticated)
            .finish_non_exhaustive()
    }
}
