//! Admin role gating
//!
//! Every state machine owns one [`AdminGate`]. It is seeded at genesis and can
//! only be handed over by the current admin.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ContractError, ContractResult};
use crate::types::{context::CallContext, principal::Principal};

/// Holder of the admin role for a single state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminGate {
    admin: Principal,
}

impl AdminGate {
    pub fn new(admin: impl Into<Principal>) -> Self {
        Self {
            admin: admin.into(),
        }
    }

    pub fn admin(&self) -> &Principal {
        &self.admin
    }

    pub fn is_admin(&self, who: &Principal) -> bool {
        &self.admin == who
    }

    /// Fail with `Unauthorized` unless the caller holds the admin role
    pub fn ensure(&self, ctx: &CallContext, operation: &str) -> ContractResult<()> {
        if self.is_admin(&ctx.caller) {
            return Ok(());
        }
        warn!(caller = %ctx.caller, operation, "admin check failed");
        Err(ContractError::Unauthorized)
    }

    /// Hand the role to a new principal
    pub fn transfer(&mut self, ctx: &CallContext, new_admin: Principal) -> ContractResult<()> {
        self.ensure(ctx, "set_admin")?;
        info!(from = %self.admin, to = %new_admin, "admin role transferred");
        self.admin = new_admin;
        Ok(())
    }
}
