// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `getRealPath`: turn a document reference into a filesystem path.
//
// Decoding runs synchronously:
//
//   parse reference ─► ask provider for a document id ─┬─ raw:<path>          ─► <path>
//                                                       ├─ primary:<relative>  ─► <root>/<relative>
//                                                       └─ anything else       ─┐
//   not a document reference ───────────────────────────────────────────────────┴► reference's own path
//
// Only a missing reference or a failing provider rejects the call. Everything
// else resolves, possibly with a null path.

use std::path::PathBuf;
use std::sync::Arc;

use nanobridge_bridge::traits::DocumentProvider;
use nanobridge_core::error::{BridgeError, Result};
use nanobridge_core::{BridgeConfig, DocumentUri, PathResolutionRequest, PathResolutionResult};

use crate::call::PluginCall;
use crate::registry::PluginMethod;

/// Method name the shell calls.
pub const GET_REAL_PATH: &str = "getRealPath";

/// Marker for document ids that carry a literal path.
const RAW_PREFIX: &str = "raw:";

/// Volume name of the primary shared storage.
const PRIMARY_VOLUME: &str = "primary";

/// How a provider-issued document id encodes its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentId<'a> {
    /// `raw:/absolute/path`
    Raw(&'a str),
    /// `<volume>:<relative path>`
    Volume { volume: &'a str, relative: &'a str },
    /// Numeric ids (`msf:42`, `1234`) and anything else without a path.
    Opaque,
}

impl<'a> DocumentId<'a> {
    fn classify(id: &'a str) -> Self {
        if let Some(path) = id.strip_prefix(RAW_PREFIX) {
            return DocumentId::Raw(path);
        }
        match id.split_once(':') {
            Some((volume, relative)) => DocumentId::Volume { volume, relative },
            None => DocumentId::Opaque,
        }
    }
}

/// The path resolution operation.
#[derive(Clone)]
pub struct PathResolution {
    documents: Arc<dyn DocumentProvider>,
    storage_root: Option<PathBuf>,
}

impl PathResolution {
    pub fn new(documents: Arc<dyn DocumentProvider>, config: &BridgeConfig) -> Self {
        Self {
            documents,
            storage_root: config.external_storage_root.clone(),
        }
    }

    /// Resolve `request` to a path.
    ///
    /// `Ok` with `path: None` means nothing usable could be derived. Errors
    /// are `MissingArgument` when no reference was given and `Decoding` when
    /// the provider failed.
    pub fn resolve(&self, request: &PathResolutionRequest) -> Result<PathResolutionResult> {
        let raw = match request.uri.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Err(BridgeError::MissingArgument("uri")),
        };

        let uri = DocumentUri::parse(raw)?;
        let decoded = match self.documents.document_id(&uri).map_err(decoding)? {
            Some(id) => self.decode_document_id(&id)?,
            None => {
                tracing::debug!(uri = %uri, "not a document reference");
                None
            }
        };

        let path = decoded.or_else(|| {
            tracing::debug!(uri = %uri, path = ?uri.path(), "falling back to reference path");
            uri.path().map(str::to_string)
        });
        Ok(PathResolutionResult { path })
    }

    fn decode_document_id(&self, id: &str) -> Result<Option<String>> {
        match DocumentId::classify(id) {
            DocumentId::Raw(path) => {
                tracing::debug!(id, "raw document id");
                Ok(Some(path.to_string()))
            }
            DocumentId::Volume { volume, relative } if volume.eq_ignore_ascii_case(PRIMARY_VOLUME) => {
                let root = self.storage_root()?;
                tracing::debug!(id, root = %root.display(), "primary volume document id");
                Ok(Some(join_root(&root, relative)))
            }
            DocumentId::Volume { volume, .. } => {
                tracing::debug!(id, volume, "secondary volume not resolved");
                Ok(None)
            }
            DocumentId::Opaque => {
                tracing::debug!(id, "opaque document id");
                Ok(None)
            }
        }
    }

    fn storage_root(&self) -> Result<PathBuf> {
        match &self.storage_root {
            Some(root) => Ok(root.clone()),
            None => self.documents.external_storage_root().map_err(decoding),
        }
    }
}

/// `<root>/<relative>`, without doubling a trailing slash on the root.
fn join_root(root: &std::path::Path, relative: &str) -> String {
    let root = root.to_string_lossy();
    format!("{}/{relative}", root.trim_end_matches('/'))
}

fn decoding(e: BridgeError) -> BridgeError {
    match e {
        BridgeError::Decoding(_) => e,
        other => BridgeError::Decoding(other.to_string()),
    }
}

impl PluginMethod for PathResolution {
    fn name(&self) -> &'static str {
        GET_REAL_PATH
    }

    /// Resolve synchronously and complete the call before returning.
    fn invoke(&self, call: PluginCall) {
        let outcome = call
            .options::<PathResolutionRequest>()
            .and_then(|request| self.resolve(&request));
        match outcome {
            Ok(result) => call.resolve(&result),
            Err(e) => {
                tracing::warn!(call = %call.id(), class = ?e.class(), error = %e, "path resolution failed");
                call.reject(e.to_string());
            }
        }
    }
}
