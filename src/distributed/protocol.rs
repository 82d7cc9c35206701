//! Line-delimited JSON control protocol between master and workers

use crate::{error::Result, models::Config, stats::StatsSnapshot};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, Lines};
use uuid::Uuid;

/// Control-plane messages exchanged over the master's TCP endpoint
///
/// Workers speak first with `Attach`; the master answers with `Start`
/// once the quorum is reached; workers then stream `Report` snapshots
/// and close with `Done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Worker announces itself to the master
    Attach { worker_id: Uuid },
    /// Master broadcasts the run configuration and start signal
    Start { config: Config },
    /// Worker's current aggregate snapshot (periodic and final)
    Report {
        worker_id: Uuid,
        snapshot: StatsSnapshot,
    },
    /// Worker finished its local run and drained
    Done { worker_id: Uuid },
}

/// Write one message as a single JSON line
pub async fn send_message<W>(writer: &mut W, message: &ControlMessage) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Read the next message, or `None` on a clean disconnect
pub async fn read_message<R>(lines: &mut Lines<R>) -> Result<Option<ControlMessage>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        match lines.next_line().await? {
            Some(line) if line.trim().is_empty() => continue,
            Some(line) => return Ok(Some(serde_json::from_str(&line)?)),
            None => return Ok(None),
        }
    }
}
