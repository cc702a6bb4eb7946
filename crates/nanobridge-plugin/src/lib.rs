// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// nanobridge — the `generateText` and `getRealPath` operations, the call
// object they complete, and the registry that dispatches calls to them.

pub mod call;
pub mod generation;
pub mod path_resolution;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use call::{Completion, CompletionContext, CompletionQueue, PluginCall, completion_channel};
pub use generation::TextGeneration;
pub use path_resolution::PathResolution;
pub use registry::{Bridge, BridgeBuilder, PluginMethod};
