//! Principal identity seam.
//!
//! Authentication itself happens in the external identity provider; all
//! this crate consumes is the provider's stable subject identifier for
//! the calling user.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of an authenticated caller, as issued by the
/// identity provider (e.g. `auth0|5f3c...`). Opaque to policy code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(String);

impl PrincipalId {
    pub fn new(subject: impl Into<String>) -> Self {
        Self(subject.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrincipalId {
    fn from(subject: &str) -> Self {
        Self(subject.to_string())
    }
}

/// Resolves the calling principal from request context. Absence means
/// the request is unauthenticated.
pub trait IdentityResolver: Send + Sync {
    fn current_principal(&self) -> Option<PrincipalId>;
}

/// Fixed-principal resolver for tests and command-line tooling.
#[derive(Debug, Clone)]
pub struct StaticIdentity(Option<PrincipalId>);

impl StaticIdentity {
    pub fn authenticated(principal: PrincipalId) -> Self {
        Self(Some(principal))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityResolver for StaticIdentity {
    fn current_principal(&self) -> Option<PrincipalId> {
        self.0.clone()
    }
}
