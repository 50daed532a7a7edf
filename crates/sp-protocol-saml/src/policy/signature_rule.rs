//! Protocol message XML signature rule.

use std::sync::Arc;

use crate::context::MessageContext;
use crate::credential::{CriteriaSet, UsageType};
use crate::error::{SamlError, SamlResult};
use crate::signature::SignatureTrustEngine;
use crate::types::{EntityRole, SAMLP_NS};

use super::SecurityPolicyRule;

/// Verifies the enveloped signature of the inbound protocol message against
/// a trust engine.
///
/// The signer is the message issuer, falling back to the peer entity ID
/// already on the context. Credentials are looked up for the peer role and
/// inbound protocol with signing usage. Unsigned messages are violations
/// unless the rule was built with [`allow_unsigned`](Self::allow_unsigned).
#[derive(Clone)]
pub struct ProtocolMessageSignatureRule {
    trust_engine: Arc<dyn SignatureTrustEngine>,
    allow_unsigned: bool,
}

impl ProtocolMessageSignatureRule {
    /// Creates the rule around a trust engine.
    #[must_use]
    pub fn new(trust_engine: Arc<dyn SignatureTrustEngine>) -> Self {
        Self {
            trust_engine,
            allow_unsigned: false,
        }
    }

    /// Lets unsigned messages pass this rule.
    #[must_use]
    pub const fn allow_unsigned(mut self, allow: bool) -> Self {
        self.allow_unsigned = allow;
        self
    }
}

fn violation(message: impl Into<String>) -> SamlError {
    SamlError::SecurityPolicyViolation(message.into())
}

impl SecurityPolicyRule for ProtocolMessageSignatureRule {
    fn name(&self) -> &'static str {
        "protocol-message-xml-signature"
    }

    fn evaluate(&self, ctx: &mut MessageContext) -> SamlResult<()> {
        let message = ctx
            .inbound_message
            .as_ref()
            .ok_or_else(|| violation("no inbound message to verify"))?;

        let Some(signature) = message.signature.as_ref() else {
            if self.allow_unsigned {
                tracing::debug!(message_id = %message.id, "unsigned message accepted by policy");
                return Ok(());
            }
            return Err(violation(format!("message {} is not signed", message.id)));
        };

        let issuer = message
            .issuer
            .clone()
            .or_else(|| ctx.peer_entity_id.clone())
            .ok_or_else(|| violation("cannot determine the message issuer"))?;

        let criteria = CriteriaSet::for_entity(issuer.clone())
            .with_role(
                ctx.peer_entity_role.unwrap_or(EntityRole::IdentityProvider),
                ctx.inbound_protocol.as_deref().unwrap_or(SAMLP_NS),
            )
            .with_usage(UsageType::Signing);

        let trusted = match self.trust_engine.validate(signature, &criteria) {
            Ok(trusted) => trusted,
            Err(e @ SamlError::SecurityPolicyViolation(_)) => return Err(e),
            Err(e) => return Err(violation(format!("signature validation failed: {e}"))),
        };

        if !trusted {
            return Err(violation(format!(
                "signature of message {} is not trusted for issuer {issuer}",
                message.id
            )));
        }

        tracing::debug!(message_id = %message.id, issuer = %issuer, "message signature trusted");
        ctx.inbound_message_authenticated = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::signature::{SignatureAlgorithm, XmlSignature};
    use crate::types::SamlMessage;

    /// Trust engine returning a fixed answer and recording the criteria.
    struct Answer {
        result: fn() -> SamlResult<bool>,
        criteria: Mutex<Option<CriteriaSet>>,
    }

    impl Answer {
        fn new(result: fn() -> SamlResult<bool>) -> Arc<Self> {
            Arc::new(Self {
                result,
                criteria: Mutex::new(None),
            })
        }
    }

    impl SignatureTrustEngine for Answer {
        fn validate(&self, _signature: &XmlSignature, criteria: &CriteriaSet) -> SamlResult<bool> {
            *self.criteria.lock().unwrap() = Some(criteria.clone());
            (self.result)()
        }
    }

    fn signed_message(issuer: Option<&str>) -> SamlMessage {
        let mut message = SamlMessage::new("_resp1", "<samlp:Response/>").with_signature(XmlSignature {
            algorithm: SignatureAlgorithm::RsaSha256,
            reference_uri: "#_resp1".to_string(),
            signed_info: String::new(),
            signature_value: "c2ln".to_string(),
            x509_certificate: None,
        });
        message.issuer = issuer.map(String::from);
        message
    }

    fn context(message: SamlMessage) -> MessageContext {
        let mut ctx = MessageContext::new();
        ctx.peer_entity_role = Some(EntityRole::IdentityProvider);
        ctx.inbound_protocol = Some(SAMLP_NS.to_string());
        ctx.inbound_message = Some(message);
        ctx
    }

    #[test]
    fn trusted_signature_authenticates_message() {
        let engine = Answer::new(|| Ok(true));
        let rule = ProtocolMessageSignatureRule::new(engine.clone());
        let mut ctx = context(signed_message(Some("https://idp.example.org")));

        rule.evaluate(&mut ctx).unwrap();
        assert!(ctx.inbound_message_authenticated);

        let criteria = engine.criteria.lock().unwrap().clone().unwrap();
        assert_eq!(criteria.entity_id.as_deref(), Some("https://idp.example.org"));
        assert_eq!(criteria.role, Some(EntityRole::IdentityProvider));
        assert_eq!(criteria.protocol.as_deref(), Some(SAMLP_NS));
        assert_eq!(criteria.usage, UsageType::Signing);
    }

    #[test]
    fn untrusted_signature_is_violation() {
        let rule = ProtocolMessageSignatureRule::new(Answer::new(|| Ok(false)));
        let mut ctx = context(signed_message(Some("https://idp.example.org")));

        let err = rule.evaluate(&mut ctx).unwrap_err();
        assert!(err.is_security_failure());
        assert!(!ctx.inbound_message_authenticated);
    }

    #[test]
    fn engine_errors_become_violations() {
        let rule = ProtocolMessageSignatureRule::new(Answer::new(|| {
            Err(SamlError::Crypto("bad key".to_string()))
        }));
        let mut ctx = context(signed_message(Some("https://idp.example.org")));

        let err = rule.evaluate(&mut ctx).unwrap_err();
        assert!(err.is_security_failure());
        assert!(err.to_string().contains("bad key"));
    }

    #[test]
    fn unsigned_message_rejected_by_default() {
        let engine = Answer::new(|| Ok(true));
        let mut ctx = context(SamlMessage::new("_u", "<x/>").with_issuer("https://idp.example.org"));

        let strict = ProtocolMessageSignatureRule::new(engine.clone());
        assert!(strict.evaluate(&mut ctx).unwrap_err().is_security_failure());

        let lenient = ProtocolMessageSignatureRule::new(engine.clone()).allow_unsigned(true);
        lenient.evaluate(&mut ctx).unwrap();
        assert!(!ctx.inbound_message_authenticated);
        assert!(engine.criteria.lock().unwrap().is_none());
    }

    #[test]
    fn issuer_falls_back_to_peer_entity_id() {
        let engine = Answer::new(|| Ok(true));
        let rule = ProtocolMessageSignatureRule::new(engine.clone());
        let mut ctx = context(signed_message(None));
        ctx.peer_entity_id = Some("https://fallback.example.org".to_string());

        rule.evaluate(&mut ctx).unwrap();
        let criteria = engine.criteria.lock().unwrap().clone().unwrap();
        assert_eq!(criteria.entity_id.as_deref(), Some("https://fallback.example.org"));
    }

    #[test]
    fn missing_issuer_or_message_is_violation() {
        let rule = ProtocolMessageSignatureRule::new(Answer::new(|| Ok(true)));

        let mut ctx = context(signed_message(None));
        assert!(rule.evaluate(&mut ctx).unwrap_err().is_security_failure());

        let mut empty = MessageContext::new();
        assert!(rule.evaluate(&mut empty).unwrap_err().is_security_failure());
    }
}
