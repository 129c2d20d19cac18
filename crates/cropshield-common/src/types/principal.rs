//! Principal - authenticated caller identity
//!
//! Signature checks happen in the hosting ledger. By the time a call reaches
//! a handler the caller is an opaque, already-verified account string
//! (e.g. `ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM`).

use serde::{Deserialize, Serialize};

/// Account identity of a caller, farmer or administrator
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(account: impl Into<String>) -> Self {
        Self(account.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Principal {
    fn from(account: &str) -> Self {
        Self::new(account)
    }
}

impl From<String> for Principal {
    fn from(account: String) -> Self {
        Self(account)
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
