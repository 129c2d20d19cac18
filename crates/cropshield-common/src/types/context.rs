//! CallContext - what the host hands every handler

use serde::{Deserialize, Serialize};

use super::principal::Principal;

/// Caller identity and logical time of the transaction being executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Authenticated caller
    pub caller: Principal,
    /// Logical timestamp (block height or host clock)
    pub now: u64,
}

impl CallContext {
    pub fn new(caller: impl Into<Principal>, now: u64) -> Self {
        Self {
            caller: caller.into(),
            now,
        }
    }

    /// Same caller at a later logical time
    pub fn at(&self, now: u64) -> Self {
        Self {
            caller: self.caller.clone(),
            now,
        }
    }
}
