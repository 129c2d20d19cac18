//! JSON-lines transaction feed
//!
//! Each input line is one [`Transaction`]; each output line is its
//! [`Receipt`], or a `{"status":"malformed",...}` record for lines that do not
//! decode. The feed stops at end of input, when `shutdown` resolves, or when
//! the sequencer or output goes away. It never fails, so the caller can
//! always save a snapshot afterwards.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

use crate::sequencer::LedgerHandle;
use crate::transaction::Transaction;

/// Drive `input` through the sequencer and return the number of
/// transactions applied. Consumes the handle so the sequencer can drain.
pub async fn feed<R, W, S>(input: R, output: &mut W, handle: LedgerHandle, shutdown: S) -> u64
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut lines = input.lines();
    let mut processed = 0u64;

    loop {
        let line = tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!(processed, "shutdown requested, closing feed");
                break;
            }
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "input read failed, closing feed");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Transaction>(line) {
            Ok(tx) => match handle.submit(tx).await {
                Ok(receipt) => {
                    processed += 1;
                    serde_json::to_string(&receipt)
                }
                Err(e) => {
                    error!(error = %e, "sequencer unavailable, closing feed");
                    break;
                }
            },
            Err(e) => {
                warn!(error = %e, "malformed transaction skipped");
                serde_json::to_string(
                    &serde_json::json!({"status": "malformed", "error": e.to_string()}),
                )
            }
        };

        let written = match response {
            Ok(response) => write_line(output, &response).await,
            Err(e) => {
                warn!(error = %e, "receipt encoding failed");
                continue;
            }
        };
        if let Err(e) = written {
            warn!(error = %e, "output closed, closing feed");
            break;
        }
    }

    processed
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> std::io::Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
