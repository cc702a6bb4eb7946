// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! nanobridge — Native capability abstractions.
//!
//! Defines the narrow traits behind which the on-device model service and
//! the document provider live, plus the per-OS selection of their
//! implementations. Everything above this crate talks only to the traits,
//! so the operations can be exercised against test doubles.

pub mod contract;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

use std::sync::Arc;

use traits::{DocumentProvider, LocalModelService};

/// The capability handles for the running platform.
///
/// Both handles are stateless and shared by every call.
#[derive(Clone)]
pub struct PlatformCapabilities {
    /// Human-readable platform name (e.g. "Android", "Desktop (stub)").
    pub platform_name: &'static str,
    pub models: Arc<dyn LocalModelService>,
    pub documents: Arc<dyn DocumentProvider>,
}

impl std::fmt::Debug for PlatformCapabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformCapabilities")
            .field("platform_name", &self.platform_name)
            .finish_non_exhaustive()
    }
}

/// Select the capability implementations for the target operating system.
pub fn platform_capabilities() -> PlatformCapabilities {
    #[cfg(target_os = "android")]
    {
        // Android: AICore model service and DocumentsContract over JNI.
        PlatformCapabilities {
            platform_name: "Android",
            models: Arc::new(android::AndroidModelService::new()),
            documents: Arc::new(android::AndroidDocuments::new()),
        }
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: no model service; documents decoded by convention.
        let stub = Arc::new(stub::StubBridge::default());
        PlatformCapabilities {
            platform_name: "Desktop (stub)",
            models: stub.clone(),
            documents: stub,
        }
    }
}
