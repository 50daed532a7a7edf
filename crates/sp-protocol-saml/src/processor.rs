//! Message processor.
//!
//! [`MessageProcessor`] drives one inbound or outbound SAML exchange through a
//! [`MessageContext`]. Inbound, it fills in local identity and metadata,
//! attaches a signature-checking security policy and hands the context to the
//! selected binding's decoder. Outbound, it fills in local identity and
//! metadata, optionally attaches the signing credential and hands the context
//! to the binding's encoder.
//!
//! # Example
//!
//! ```rust,ignore
//! let processor = MessageProcessor::from_config(&config, verifier, bindings)?;
//!
//! let mut ctx = MessageContext::inbound(transport);
//! processor.retrieve_message_from_transport(&mut ctx)?;
//! assert!(ctx.inbound_message_authenticated);
//! ```

use std::sync::Arc;

use crate::bindings::{Binding, InTransport};
use crate::config::ServiceProviderConfig;
use crate::context::MessageContext;
use crate::credential::{ChainingCredentialResolver, CredentialSource, StaticKeyManager};
use crate::error::{SamlError, SamlResult};
use crate::metadata::{EntityMetadataSource, InMemoryMetadataSource, MetadataCredentialResolver};
use crate::policy::{ProtocolMessageSignatureRule, SecurityPolicy, StaticSecurityPolicyResolver};
use crate::signature::{
    ExplicitKeySignatureTrustEngine, KeyInfoCredentialResolver, SignatureVerifier,
    X509KeyInfoResolver,
};
use crate::types::{EntityRole, SAMLP_NS};

/// How the processor picks the binding for an operation.
#[derive(Clone, Copy)]
pub enum BindingSelector<'a> {
    /// Use this binding.
    Explicit(&'a dyn Binding),
    /// Use the configured binding whose profile id equals the name.
    Named(&'a str),
    /// Inbound: the first binding supporting the context's transport.
    /// Outbound: the binding named by the peer endpoint.
    Implicit,
}

/// Inbound and outbound SAML message processing for a hosted Service
/// Provider.
///
/// Holds only shared, immutable collaborators, so one processor can serve
/// any number of concurrent exchanges.
#[derive(Clone)]
pub struct MessageProcessor {
    metadata: Arc<dyn EntityMetadataSource>,
    credentials: Arc<dyn CredentialSource>,
    verifier: Arc<dyn SignatureVerifier>,
    key_info_resolver: Arc<dyn KeyInfoCredentialResolver>,
    bindings: Vec<Arc<dyn Binding>>,
    allow_unsigned: bool,
    allow_sha1: bool,
}

impl MessageProcessor {
    /// Creates a processor.
    ///
    /// `bindings` is searched in order; when several bindings accept a
    /// transport the first one wins.
    #[must_use]
    pub fn new(
        metadata: Arc<dyn EntityMetadataSource>,
        credentials: Arc<dyn CredentialSource>,
        verifier: Arc<dyn SignatureVerifier>,
        bindings: Vec<Arc<dyn Binding>>,
    ) -> Self {
        Self {
            metadata,
            credentials,
            verifier,
            key_info_resolver: Arc::new(X509KeyInfoResolver),
            bindings,
            allow_unsigned: false,
            allow_sha1: false,
        }
    }

    /// Builds a processor with in-memory metadata and keys from
    /// configuration.
    pub fn from_config(
        config: &ServiceProviderConfig,
        verifier: Arc<dyn SignatureVerifier>,
        bindings: Vec<Arc<dyn Binding>>,
    ) -> SamlResult<Self> {
        config.validate()?;
        let metadata = Arc::new(InMemoryMetadataSource::from_config(config));
        let credentials = Arc::new(StaticKeyManager::from_config(config)?);

        Ok(Self::new(metadata, credentials, verifier, bindings)
            .allow_unsigned_messages(config.allow_unsigned_messages)
            .allow_sha1_signatures(config.allow_sha1_signatures))
    }

    /// Replaces the resolver for keys presented inside signatures.
    #[must_use]
    pub fn with_key_info_resolver(mut self, resolver: Arc<dyn KeyInfoCredentialResolver>) -> Self {
        self.key_info_resolver = resolver;
        self
    }

    /// Accepts inbound messages without a signature.
    #[must_use]
    pub const fn allow_unsigned_messages(mut self, allow: bool) -> Self {
        self.allow_unsigned = allow;
        self
    }

    /// Accepts SHA-1 based signatures.
    #[must_use]
    pub const fn allow_sha1_signatures(mut self, allow: bool) -> Self {
        self.allow_sha1 = allow;
        self
    }

    /// Configured bindings, in selection order.
    #[must_use]
    pub fn bindings(&self) -> &[Arc<dyn Binding>] {
        &self.bindings
    }

    // ---------------------------------------------------------------------
    // Inbound
    // ---------------------------------------------------------------------

    /// Decodes an inbound message into `ctx`.
    ///
    /// On success the context carries local and peer identity, the decoded
    /// message and, if it was signed by a trusted key,
    /// `inbound_message_authenticated`. On failure the context may be
    /// partially populated and must be discarded.
    #[tracing::instrument(skip_all, fields(context_id = %ctx.id()))]
    pub fn retrieve_message(
        &self,
        ctx: &mut MessageContext,
        selector: BindingSelector<'_>,
    ) -> SamlResult<()> {
        let selected;
        let binding: &dyn Binding = match selector {
            BindingSelector::Explicit(binding) => binding,
            BindingSelector::Named(name) => {
                selected = self.select_binding_by_name(name)?;
                selected.as_ref()
            }
            BindingSelector::Implicit => {
                let transport = ctx.inbound_transport().ok_or_else(|| {
                    SamlError::UnsupportedBinding("no inbound transport on context".to_string())
                })?;
                selected = self.select_binding_for_transport(transport)?;
                selected.as_ref()
            }
        };
        ctx.communication_profile_id = Some(binding.profile_id().to_string());

        ctx.local_entity_role = Some(EntityRole::ServiceProvider);
        ctx.peer_entity_role = Some(EntityRole::IdentityProvider);
        ctx.inbound_protocol = Some(SAMLP_NS.to_string());
        // Peer identity and authentication come only from this decode.
        ctx.peer_entity_id = None;
        ctx.peer_entity_metadata = None;
        ctx.peer_entity_role_metadata = None;
        ctx.inbound_message_authenticated = false;

        self.populate_local_entity(ctx)?;

        let policy = SecurityPolicy::new().with_rule(Arc::new(
            ProtocolMessageSignatureRule::new(Arc::new(self.trust_engine()))
                .allow_unsigned(self.allow_unsigned),
        ));
        ctx.security_policy_resolver = Some(Arc::new(StaticSecurityPolicyResolver::new(policy)));

        tracing::debug!(
            binding = binding.profile_id(),
            local_entity_id = ctx.local_entity_id.as_deref().unwrap_or_default(),
            "decoding inbound message"
        );

        if let Err(e) = binding.decoder().decode(ctx) {
            tracing::warn!(binding = binding.profile_id(), "inbound message rejected: {}", e);
            return Err(e);
        }

        let peer_entity_id = ctx
            .peer_entity_metadata
            .as_ref()
            .map(|peer| peer.entity_id.clone())
            .ok_or_else(|| {
                SamlError::Protocol("decoder did not resolve peer entity metadata".to_string())
            })?;

        tracing::debug!(
            peer_entity_id = %peer_entity_id,
            authenticated = ctx.inbound_message_authenticated,
            "inbound message retrieved"
        );
        ctx.peer_entity_id = Some(peer_entity_id);
        Ok(())
    }

    /// Decodes an inbound message with the given binding.
    pub fn retrieve_message_with(
        &self,
        ctx: &mut MessageContext,
        binding: &dyn Binding,
    ) -> SamlResult<()> {
        self.retrieve_message(ctx, BindingSelector::Explicit(binding))
    }

    /// Decodes an inbound message with the configured binding named
    /// `profile_id`.
    pub fn retrieve_message_by_name(
        &self,
        ctx: &mut MessageContext,
        profile_id: &str,
    ) -> SamlResult<()> {
        self.retrieve_message(ctx, BindingSelector::Named(profile_id))
    }

    /// Decodes an inbound message with the first binding supporting the
    /// context's transport.
    pub fn retrieve_message_from_transport(&self, ctx: &mut MessageContext) -> SamlResult<()> {
        self.retrieve_message(ctx, BindingSelector::Implicit)
    }

    // ---------------------------------------------------------------------
    // Outbound
    // ---------------------------------------------------------------------

    /// Encodes the outbound message on `ctx`.
    ///
    /// With `sign` set the Service Provider's signing credential is attached
    /// for the encoder. Without it the signing credential is left as it was.
    #[tracing::instrument(skip_all, fields(context_id = %ctx.id(), sign = sign))]
    pub fn send_message(
        &self,
        ctx: &mut MessageContext,
        sign: bool,
        selector: BindingSelector<'_>,
    ) -> SamlResult<()> {
        let selected;
        let binding: &dyn Binding = match selector {
            BindingSelector::Explicit(binding) => binding,
            BindingSelector::Named(name) => {
                selected = self.select_binding_by_name(name)?;
                selected.as_ref()
            }
            BindingSelector::Implicit => {
                let endpoint = ctx
                    .peer_entity_endpoint
                    .as_ref()
                    .ok_or_else(|| SamlError::saml("no peer endpoint"))?;
                selected = self.select_binding_by_name(&endpoint.binding)?;
                selected.as_ref()
            }
        };

        let local_entity_id = self.metadata.hosted_sp_entity_id()?;
        ctx.local_entity_id = Some(local_entity_id);
        ctx.local_entity_role = Some(EntityRole::ServiceProvider);
        self.populate_local_entity(ctx)
            .map_err(|e| SamlError::wrap("could not set local entity metadata", e))?;

        if sign {
            ctx.outbound_signing_credential = Some(self.credentials.signing_credential());
        }
        ctx.communication_profile_id = Some(binding.profile_id().to_string());

        tracing::debug!(
            binding = binding.profile_id(),
            local_entity_id = ctx.local_entity_id.as_deref().unwrap_or_default(),
            signed = ctx.outbound_signing_credential.is_some(),
            "encoding outbound message"
        );

        binding.encoder().encode(ctx)
    }

    /// Encodes the outbound message with the given binding.
    pub fn send_message_with(
        &self,
        ctx: &mut MessageContext,
        sign: bool,
        binding: &dyn Binding,
    ) -> SamlResult<()> {
        self.send_message(ctx, sign, BindingSelector::Explicit(binding))
    }

    /// Encodes the outbound message with the configured binding named
    /// `profile_id`.
    pub fn send_message_by_name(
        &self,
        ctx: &mut MessageContext,
        sign: bool,
        profile_id: &str,
    ) -> SamlResult<()> {
        self.send_message(ctx, sign, BindingSelector::Named(profile_id))
    }

    /// Encodes the outbound message with the binding of the context's peer
    /// endpoint.
    pub fn send_message_to_peer_endpoint(
        &self,
        ctx: &mut MessageContext,
        sign: bool,
    ) -> SamlResult<()> {
        self.send_message(ctx, sign, BindingSelector::Implicit)
    }

    // ---------------------------------------------------------------------
    // Binding selection
    // ---------------------------------------------------------------------

    /// Returns the first configured binding that supports `transport`.
    pub fn select_binding_for_transport(
        &self,
        transport: &dyn InTransport,
    ) -> SamlResult<Arc<dyn Binding>> {
        self.bindings
            .iter()
            .find(|binding| binding.supports(transport))
            .cloned()
            .ok_or_else(|| {
                SamlError::UnsupportedBinding(format!(
                    "no configured binding supports {} request",
                    transport.method()
                ))
            })
    }

    /// Returns the first configured binding whose profile id equals `name`.
    ///
    /// The comparison is exact and case-sensitive.
    pub fn select_binding_by_name(&self, name: &str) -> SamlResult<Arc<dyn Binding>> {
        self.bindings
            .iter()
            .find(|binding| binding.profile_id() == name)
            .cloned()
            .ok_or_else(|| SamlError::UnknownBinding(name.to_string()))
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    fn populate_local_entity(&self, ctx: &mut MessageContext) -> SamlResult<()> {
        let entity_id = self.metadata.hosted_sp_entity_id()?;
        let entity = self.metadata.entity_descriptor(&entity_id)?.ok_or_else(|| {
            SamlError::MetadataResolution(format!("no metadata for hosted entity {entity_id}"))
        })?;
        let role = self
            .metadata
            .role_descriptor(&entity_id, EntityRole::ServiceProvider, SAMLP_NS)?
            .ok_or_else(|| {
                SamlError::MetadataResolution(format!(
                    "hosted entity {entity_id} has no {} for {SAMLP_NS}",
                    EntityRole::ServiceProvider.element_name()
                ))
            })?;

        ctx.local_entity_id = Some(entity_id);
        ctx.local_entity_metadata = Some(entity);
        ctx.local_entity_role_metadata = Some(role);
        Ok(())
    }

    fn trust_engine(&self) -> ExplicitKeySignatureTrustEngine {
        let chain = ChainingCredentialResolver::new()
            .with_resolver(Arc::new(MetadataCredentialResolver::new(self.metadata.clone())))
            .with_resolver(Arc::new(self.credentials.clone()));

        ExplicitKeySignatureTrustEngine::new(
            Arc::new(chain),
            self.key_info_resolver.clone(),
            self.verifier.clone(),
        )
        .allow_sha1(self.allow_sha1)
    }
}
