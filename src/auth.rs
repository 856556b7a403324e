//! Session privileges and the access-denied signaling path.

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use crate::error::DisksizeError;

/// Security context of the caller opening the table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    user: String,
    grants: BTreeSet<String>,
}

impl Session {
    pub fn new<I, S>(user: impl Into<String>, grants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user: user.into(),
            grants: grants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Global privilege names are case-insensitive.
    pub fn has_global_grant(&self, privilege: &str) -> bool {
        self.grants.iter().any(|grant| grant.eq_ignore_ascii_case(privilege))
    }
}

/// Decides whether a session may see the table's contents.
pub trait AuthorizationGate: Send + Sync {
    fn check(&self, session: &Session) -> bool;

    /// Privilege named in the access-denied error.
    fn required_privilege(&self) -> &str;
}

/// Grants access to sessions holding one global privilege.
#[derive(Clone, Debug)]
pub struct PrivilegeGate {
    privilege: String,
}

impl PrivilegeGate {
    pub fn new(privilege: impl Into<String>) -> Self {
        Self { privilege: privilege.into() }
    }
}

impl AuthorizationGate for PrivilegeGate {
    fn check(&self, session: &Session) -> bool {
        session.has_global_grant(&self.privilege)
    }

    fn required_privilege(&self) -> &str {
        &self.privilege
    }
}

/// Host-side sink for errors raised while opening the table.
pub trait ErrorReporter {
    fn report(&self, error: DisksizeError);
}

/// Keeps the first reported error for the caller to surface.
#[derive(Debug, Default)]
pub struct FirstErrorReporter {
    first: Mutex<Option<DisksizeError>>,
}

impl FirstErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Option<DisksizeError> {
        self.first.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl ErrorReporter for FirstErrorReporter {
    fn report(&self, error: DisksizeError) {
        let mut first = self.first.lock().unwrap_or_else(PoisonError::into_inner);
        if first.is_none() {
            *first = Some(error);
        }
    }
}
