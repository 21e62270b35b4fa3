//! Integrity reporting seam.
//!
//! The scope resolver encounters data-integrity anomalies (roles
//! referencing organizations that no longer exist, roles with no target
//! and a non-master kind) while serving ordinary requests. Those are
//! repair candidates, not user errors: they are reported here and the
//! request proceeds deny-by-default.

use uuid::Uuid;

use crate::identity::PrincipalId;

/// Context attached to an integrity report.
#[derive(Debug, Clone, Default)]
pub struct IntegrityContext {
    pub principal: Option<PrincipalId>,
    pub party_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
}

/// Sink for integrity findings. Implementations must not fail the
/// calling request.
pub trait IntegrityReporter: Send + Sync {
    fn report(&self, detail: &str, context: &IntegrityContext);
}

/// Default reporter: emits a `tracing` warning.
#[derive(Debug, Clone, Default)]
pub struct TracingReporter;

impl IntegrityReporter for TracingReporter {
    fn report(&self, detail: &str, context: &IntegrityContext) {
        tracing::warn!(
            principal = context.principal.as_ref().map(|p| p.as_str()),
            party_id = context.party_id.map(|id| id.to_string()),
            organization_id = context.organization_id.map(|id| id.to_string()),
            "integrity violation: {detail}"
        );
    }
}
