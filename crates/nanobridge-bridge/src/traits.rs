// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native capabilities.
//
// Each capability has one job. Platforms that cannot provide one return
// `BridgeError::PlatformUnavailable` from the stub implementation.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use nanobridge_core::error::Result;
use nanobridge_core::{DocumentUri, ModelSpec};

/// The on-device inference service (AICore on Android).
pub trait LocalModelService: Send + Sync {
    /// Bind to the named model.
    ///
    /// Fails with `CapabilityUnavailable` (or a platform error) when the
    /// service is missing or the model is not provisioned on this device.
    fn connect(&self, model: &ModelSpec) -> Result<Arc<dyn TextGenerator>>;
}

/// A bound model that turns one instruction into text.
///
/// Implementations must be safe to share between concurrent calls and must
/// not block the calling task while inference runs.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run one inference. There is no cancellation: the future completes
    /// only when the model succeeds or fails.
    async fn generate_content(&self, instruction: &str) -> Result<GeneratedContent>;
}

/// What a model returned for one instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedContent {
    /// Generated text. `None` when the model produced no text part.
    pub text: Option<String>,
}

impl GeneratedContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// The OS document-provider subsystem.
pub trait DocumentProvider: Send + Sync {
    /// The provider-issued document id, or `None` when `uri` is not a
    /// document reference.
    fn document_id(&self, uri: &DocumentUri) -> Result<Option<String>>;

    /// Root directory of the primary shared storage volume.
    fn external_storage_root(&self) -> Result<PathBuf>;
}
