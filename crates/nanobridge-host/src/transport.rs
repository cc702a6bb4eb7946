// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON-lines transport between the host shell and the bridge.
//
// Input, one call per line:
//   {"id": "<string>"?, "method": "getRealPath", "options": {"uri": "..."}}
// Output, one outcome per line, echoing the caller's id:
//   {"id": "<string>", "method": "getRealPath", "status": "resolved", "data": {...}}
//   {"id": "<string>", "method": "generateText", "status": "rejected", "message": "..."}

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use nanobridge_core::error::Result;
use nanobridge_core::{CallId, CallOutcome};
use nanobridge_plugin::{Bridge, Completion, CompletionContext, CompletionQueue, PluginCall};

/// One call read from the input.
#[derive(Debug, Deserialize)]
pub struct HostRequest {
    /// Caller-chosen id, echoed on the outcome. A fresh UUID is assigned
    /// when absent or empty.
    #[serde(default)]
    pub id: Option<String>,
    pub method: String,
    #[serde(default)]
    pub options: serde_json::Value,
}

/// One outcome written to the output.
#[derive(Debug, Serialize)]
pub struct HostResponse {
    pub id: CallId,
    pub method: String,
    #[serde(flatten)]
    pub outcome: CallOutcome,
}

impl From<Completion> for HostResponse {
    fn from(done: Completion) -> Self {
        Self {
            id: done.id,
            method: done.method,
            outcome: done.outcome,
        }
    }
}

/// Read calls from `input` until it closes and dispatch each one.
///
/// Malformed lines are logged and skipped. Returns the number of calls
/// dispatched. `completion` is dropped on return, so the queue closes once
/// every dispatched call has completed.
pub async fn serve_calls<R>(bridge: &Bridge, completion: CompletionContext, input: R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut dispatched = 0;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<HostRequest>(&line) {
            Ok(request) => {
                let id = request
                    .id
                    .filter(|id| !id.is_empty())
                    .map(CallId::from)
                    .unwrap_or_default();
                bridge.dispatch(PluginCall::with_id(
                    id,
                    request.method,
                    request.options,
                    completion.clone(),
                ));
                dispatched += 1;
            }
            Err(e) => tracing::warn!(error = %e, "skipping malformed call line"),
        }
    }
    Ok(dispatched)
}

/// Write every completion to `out` as it arrives. Returns the number written
/// once the queue closes.
pub async fn write_completions<W>(mut queue: CompletionQueue, mut out: W) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(done) = queue.next().await {
        let mut line = serde_json::to_vec(&HostResponse::from(done))?;
        line.push(b'\n');
        out.write_all(&line).await?;
        out.flush().await?;
        written += 1;
    }
    Ok(written)
}
