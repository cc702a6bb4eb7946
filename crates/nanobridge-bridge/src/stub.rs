// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where the on-device services are absent.
//
// There is no model service: `connect` always returns `PlatformUnavailable`.
// Document references are recognised by their shape alone, and the primary
// volume root is whatever the stub was built with.

use std::path::PathBuf;
use std::sync::Arc;

use nanobridge_core::error::{BridgeError, Result};
use nanobridge_core::{DocumentUri, ModelSpec};

use crate::contract;
use crate::traits::*;

/// Primary shared-storage root on a stock Android device.
pub const DEFAULT_EXTERNAL_STORAGE: &str = "/storage/emulated/0";

/// No-model bridge returned on non-Android platforms.
#[derive(Debug, Clone)]
pub struct StubBridge {
    external_storage_root: PathBuf,
}

impl StubBridge {
    pub fn with_external_storage(root: impl Into<PathBuf>) -> Self {
        Self {
            external_storage_root: root.into(),
        }
    }
}

impl Default for StubBridge {
    fn default() -> Self {
        Self::with_external_storage(DEFAULT_EXTERNAL_STORAGE)
    }
}

impl LocalModelService for StubBridge {
    fn connect(&self, model: &ModelSpec) -> Result<Arc<dyn TextGenerator>> {
        tracing::warn!(model = %model.name, "LocalModelService::connect called on stub bridge");
        Err(BridgeError::PlatformUnavailable)
    }
}

impl DocumentProvider for StubBridge {
    fn document_id(&self, uri: &DocumentUri) -> Result<Option<String>> {
        Ok(contract::document_id(uri).map(str::to_string))
    }

    fn external_storage_root(&self) -> Result<PathBuf> {
        Ok(self.external_storage_root.clone())
    }
}
