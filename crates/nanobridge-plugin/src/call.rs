// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// A single call from the application shell and the context its outcome is
// delivered on.
//
// `PluginCall::resolve` and `PluginCall::reject` take the call by value, so a
// call cannot be completed twice. A call that is dropped without either
// (a task that panicked, a handler that forgot) rejects itself on drop, so
// the shell always hears back exactly once.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use nanobridge_core::error::{BridgeError, Result};
use nanobridge_core::{CallId, CallOutcome};

/// Message delivered for a call dropped without an outcome.
pub const DROPPED_CALL_MESSAGE: &str = "call ended without an outcome";

/// One delivered outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub id: CallId,
    pub method: String,
    pub outcome: CallOutcome,
}

/// Sending half of the completion context. Cheap to clone; every call
/// carries one.
#[derive(Debug, Clone)]
pub struct CompletionContext {
    tx: mpsc::UnboundedSender<Completion>,
}

/// Receiving half of the completion context. The host drains it from a
/// single task, which makes that task the one place outcomes surface.
#[derive(Debug)]
pub struct CompletionQueue {
    rx: mpsc::UnboundedReceiver<Completion>,
}

/// Create a completion context and the queue it feeds.
pub fn completion_channel() -> (CompletionContext, CompletionQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CompletionContext { tx }, CompletionQueue { rx })
}

impl CompletionQueue {
    /// Wait for the next outcome. `None` once every context and call is gone.
    pub async fn next(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }

    /// Take an outcome that is already waiting, without suspending.
    pub fn try_next(&mut self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }
}

/// A named operation with its JSON arguments, completed exactly once.
#[derive(Debug)]
pub struct PluginCall {
    id: CallId,
    method: String,
    data: serde_json::Value,
    completion: Option<CompletionContext>,
}

impl PluginCall {
    pub fn new(
        method: impl Into<String>,
        data: serde_json::Value,
        completion: CompletionContext,
    ) -> Self {
        Self::with_id(CallId::new(), method, data, completion)
    }

    pub fn with_id(
        id: CallId,
        method: impl Into<String>,
        data: serde_json::Value,
        completion: CompletionContext,
    ) -> Self {
        Self {
            id,
            method: method.into(),
            data,
            completion: Some(completion),
        }
    }

    pub fn id(&self) -> &CallId {
        &self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    /// A string argument, or `None` when absent or not a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(serde_json::Value::as_str)
    }

    /// Deserialize the arguments into `T`. A `null` argument object is read
    /// as an empty one.
    pub fn options<T: DeserializeOwned>(&self) -> Result<T> {
        let data = match &self.data {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other.clone(),
        };
        serde_json::from_value(data).map_err(|e| BridgeError::InvalidArgument {
            name: "options",
            reason: e.to_string(),
        })
    }

    /// Complete the call successfully with `payload`.
    pub fn resolve<T: Serialize>(mut self, payload: &T) {
        let outcome = match serde_json::to_value(payload) {
            Ok(data) => CallOutcome::Resolved { data },
            Err(e) => CallOutcome::Rejected {
                message: BridgeError::Serialization(e).to_string(),
            },
        };
        self.complete(outcome);
    }

    /// Complete the call with a failure message.
    pub fn reject(mut self, message: impl Into<String>) {
        self.complete(CallOutcome::Rejected {
            message: message.into(),
        });
    }

    fn complete(&mut self, outcome: CallOutcome) {
        let Some(completion) = self.completion.take() else {
            return;
        };
        match &outcome {
            CallOutcome::Resolved { .. } => {
                tracing::info!(call = %self.id, method = %self.method, "call resolved");
            }
            CallOutcome::Rejected { message } => {
                tracing::info!(call = %self.id, method = %self.method, %message, "call rejected");
            }
        }
        let delivered = completion.tx.send(Completion {
            id: self.id.clone(),
            method: std::mem::take(&mut self.method),
            outcome,
        });
        if delivered.is_err() {
            tracing::warn!(call = %self.id, "completion queue closed; outcome discarded");
        }
    }
}

impl Drop for PluginCall {
    fn drop(&mut self) {
        if self.completion.is_some() {
            tracing::warn!(call = %self.id, method = %self.method, "call dropped without an outcome");
            self.complete(CallOutcome::Rejected {
                message: DROPPED_CALL_MESSAGE.into(),
            });
        }
    }
}
