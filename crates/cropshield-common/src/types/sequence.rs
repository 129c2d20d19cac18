//! IdSequence - sequential id allocation
//!
//! Each table keeps its own counter next to its rows. Allocation only
//! happens once a handler has passed every check, inside the same call that
//! inserts the row, so ids are never skipped or reused.

use serde::{Deserialize, Serialize};

use crate::error::{ContractError, ContractResult};

/// Monotonic counter; the first allocated id is 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdSequence(u64);

impl IdSequence {
    pub fn new() -> Self {
        Self(0)
    }

    /// Last allocated id (0 when nothing was allocated yet)
    #[inline]
    pub fn current(&self) -> u64 {
        self.0
    }

    /// The id the next allocation would return, without consuming it
    pub fn peek_next(&self) -> ContractResult<u64> {
        self.0
            .checked_add(1)
            .ok_or(ContractError::Overflow { what: "id sequence" })
    }

    /// Consume and return the next id
    pub fn allocate(&mut self) -> ContractResult<u64> {
        let next = self.peek_next()?;
        self.0 = next;
        Ok(next)
    }
}
