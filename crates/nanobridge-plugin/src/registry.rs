// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Explicit method registration and call dispatch.
//
// The bridge is built once at startup with the methods it exposes. There is
// no global registry: whoever owns the `Bridge` owns the dispatch table.

use std::collections::HashMap;
use std::sync::Arc;

use nanobridge_bridge::PlatformCapabilities;
use nanobridge_core::BridgeConfig;
use nanobridge_core::error::BridgeError;

use crate::call::PluginCall;
use crate::generation::TextGeneration;
use crate::path_resolution::PathResolution;

/// A named operation the shell can call.
pub trait PluginMethod: Send + Sync {
    /// Name the shell calls the method by.
    fn name(&self) -> &'static str;

    /// Handle `call`. Implementations either complete the call before
    /// returning or move it into a task that will.
    fn invoke(&self, call: PluginCall);
}

/// Collects methods before the bridge is built.
pub struct BridgeBuilder {
    name: String,
    methods: HashMap<&'static str, Arc<dyn PluginMethod>>,
}

impl BridgeBuilder {
    /// Register `method`. A later registration under the same name replaces
    /// the earlier one.
    pub fn method(mut self, method: impl PluginMethod + 'static) -> Self {
        let name = method.name();
        if self.methods.insert(name, Arc::new(method)).is_some() {
            tracing::warn!(plugin = %self.name, method = name, "method registered twice; keeping the last");
        }
        self
    }

    pub fn build(self) -> Bridge {
        let bridge = Bridge {
            name: self.name,
            methods: self.methods,
        };
        tracing::info!(plugin = %bridge.name, methods = ?bridge.methods(), "bridge registered");
        bridge
    }
}

/// The registration point the shell talks to.
pub struct Bridge {
    name: String,
    methods: HashMap<&'static str, Arc<dyn PluginMethod>>,
}

impl Bridge {
    pub fn builder(name: impl Into<String>) -> BridgeBuilder {
        BridgeBuilder {
            name: name.into(),
            methods: HashMap::new(),
        }
    }

    /// The standard bridge: `generateText` and `getRealPath` over the given
    /// platform capabilities.
    pub fn from_config(config: &BridgeConfig, capabilities: &PlatformCapabilities) -> Self {
        tracing::info!(platform = capabilities.platform_name, "building bridge");
        Self::builder(config.plugin_name.clone())
            .method(TextGeneration::new(capabilities.models.clone(), config))
            .method(PathResolution::new(capabilities.documents.clone(), config))
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.methods.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Route `call` to its method. Unknown methods are rejected.
    ///
    /// Asynchronous methods spawn their work onto the current tokio runtime
    /// and reject the call when there is none.
    pub fn dispatch(&self, call: PluginCall) {
        tracing::info!(plugin = %self.name, call = %call.id(), method = call.method(), "dispatching call");
        match self.methods.get(call.method()) {
            Some(method) => method.invoke(call),
            None => {
                let err = BridgeError::UnknownMethod(call.method().to_string());
                call.reject(err.to_string());
            }
        }
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("name", &self.name)
            .field("methods", &self.methods())
            .finish()
    }
}
