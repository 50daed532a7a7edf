//! Security policy evaluation.
//!
//! A [`SecurityPolicy`] is an ordered pipeline of [`SecurityPolicyRule`]s run
//! by binding decoders against the message context. The first failing rule
//! aborts evaluation. Inbound processing attaches a policy holding a single
//! [`ProtocolMessageSignatureRule`].

mod signature_rule;

pub use signature_rule::*;

use std::sync::Arc;

use crate::context::MessageContext;
use crate::error::SamlResult;

/// A single validation step over an inbound message context.
pub trait SecurityPolicyRule: Send + Sync {
    /// Short name used in log events.
    fn name(&self) -> &'static str;

    /// Evaluates the rule. An error is a policy violation and must abort
    /// processing of the message.
    fn evaluate(&self, ctx: &mut MessageContext) -> SamlResult<()>;
}

/// Ordered list of policy rules.
#[derive(Clone, Default)]
pub struct SecurityPolicy {
    rules: Vec<Arc<dyn SecurityPolicyRule>>,
}

impl SecurityPolicy {
    /// Creates a policy with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: Arc<dyn SecurityPolicyRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rule names in evaluation order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Runs every rule in order, stopping at the first violation.
    pub fn evaluate(&self, ctx: &mut MessageContext) -> SamlResult<()> {
        for rule in &self.rules {
            if let Err(e) = rule.evaluate(ctx) {
                tracing::warn!(
                    context_id = %ctx.id(),
                    rule = rule.name(),
                    error = %e,
                    "security policy rule failed"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Chooses the policy to apply to a context.
pub trait SecurityPolicyResolver: Send + Sync {
    /// Returns the policy for `ctx`.
    fn resolve(&self, ctx: &MessageContext) -> SamlResult<Arc<SecurityPolicy>>;
}

/// Resolver that always returns the same policy.
#[derive(Clone)]
pub struct StaticSecurityPolicyResolver {
    policy: Arc<SecurityPolicy>,
}

impl StaticSecurityPolicyResolver {
    /// Creates a resolver for `policy`.
    #[must_use]
    pub fn new(policy: SecurityPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// The fixed policy.
    #[must_use]
    pub fn policy(&self) -> &SecurityPolicy {
        &self.policy
    }
}

impl SecurityPolicyResolver for StaticSecurityPolicyResolver {
    fn resolve(&self, _ctx: &MessageContext) -> SamlResult<Arc<SecurityPolicy>> {
        Ok(Arc::clone(&self.policy))
    }
}
