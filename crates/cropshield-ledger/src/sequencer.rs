//! Sequencer - a single tokio task that owns write access to the ledger
//!
//! Callers hand transactions to a [`LedgerHandle`]; the task applies them in
//! arrival order, one at a time, and answers each with its receipt. Queries
//! take the read lock and never wait behind the queue.

use std::sync::Arc;

use cropshield_common::{CropShieldError, Result};
use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::ledger::Ledger;
use crate::transaction::{Receipt, Transaction};

/// Ledger shared between the sequencer task and readers
pub type SharedLedger = Arc<RwLock<Ledger>>;

struct Submission {
    tx: Transaction,
    reply: oneshot::Sender<Receipt>,
}

/// Client side of the sequencer
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<Submission>,
    ledger: SharedLedger,
}

/// Start the sequencer task.
///
/// The task exits once every handle has been dropped and the queue drained.
pub fn spawn(ledger: Ledger, queue_depth: usize) -> (LedgerHandle, JoinHandle<()>) {
    let ledger: SharedLedger = Arc::new(RwLock::new(ledger));
    let (sender, mut receiver) = mpsc::channel::<Submission>(queue_depth.max(1));

    let shared = Arc::clone(&ledger);
    let task = tokio::spawn(async move {
        let mut applied: u64 = 0;
        while let Some(Submission { tx, reply }) = receiver.recv().await {
            let receipt = shared.write().apply(tx);
            applied += 1;
            if reply.send(receipt).is_err() {
                debug!("submitter went away before its receipt was ready");
            }
        }
        info!(applied, "sequencer stopped");
    });

    (LedgerHandle { sender, ledger }, task)
}

impl LedgerHandle {
    /// Queue a transaction and wait for its receipt
    pub async fn submit(&self, tx: Transaction) -> Result<Receipt> {
        let (reply, receipt) = oneshot::channel();
        self.sender
            .send(Submission { tx, reply })
            .await
            .map_err(|_| CropShieldError::Sequencer("sequencer is not running".to_string()))?;

        receipt
            .await
            .map_err(|_| CropShieldError::Sequencer("sequencer dropped the transaction".to_string()))
    }

    /// Run `f` against the current state
    pub fn query<T>(&self, f: impl FnOnce(&Ledger) -> T) -> T {
        f(&self.ledger.read())
    }

    pub fn state_root(&self) -> Result<String> {
        self.ledger.read().state_root()
    }

    pub fn ledger(&self) -> SharedLedger {
        Arc::clone(&self.ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Call;
    use cropshield_common::Principal;

    fn terms(crop: &str) -> Transaction {
        Transaction::new(
            "admin",
            Call::SetCropTerms {
                crop: crop.to_string(),
                base_premium: 500,
                coverage_limit: 10000,
                risk_factor: 120,
            },
        )
    }

    #[tokio::test]
    async fn test_submit_returns_receipts_in_order() {
        let (handle, task) = spawn(Ledger::new(&Principal::from("admin"), 0), 8);

        let first = handle.submit(terms("wheat")).await.unwrap();
        let second = handle.submit(terms("corn")).await.unwrap();
        assert_eq!(first.height, 1);
        assert_eq!(second.height, 2);
        assert!(second.outcome.is_ok());

        let crops = handle.query(|ledger| ledger.policies().get_crop_terms("corn").is_ok());
        assert!(crops);

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_submitters_are_serialized() {
        let (handle, task) = spawn(Ledger::new(&Principal::from("admin"), 0), 4);

        let mut joins = Vec::new();
        for i in 0..16 {
            let handle = handle.clone();
            joins.push(tokio::spawn(async move {
                handle.submit(terms(&format!("crop-{i}"))).await.unwrap()
            }));
        }

        let mut heights = Vec::new();
        for join in joins {
            heights.push(join.await.unwrap().height);
        }
        heights.sort_unstable();
        assert_eq!(heights, (1..=16).collect::<Vec<u64>>());
        assert_eq!(handle.query(|ledger| ledger.height()), 16);

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_submit_after_stop_fails() {
        let (handle, task) = spawn(Ledger::new(&Principal::from("admin"), 0), 1);
        task.abort();
        let _ = task.await;

        let result = handle.submit(terms("wheat")).await;
        assert!(matches!(result, Err(CropShieldError::Sequencer(_))));
    }
}
