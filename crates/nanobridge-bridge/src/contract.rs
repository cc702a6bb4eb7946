// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document-reference shapes issued by document providers.
//
// A document reference is a `content://` URI whose path is either
// `/document/<id>` or `/tree/<treeId>/document/<id>`. The id is a single
// percent-encoded segment, so it may contain `/` and `:` once decoded.

use nanobridge_core::DocumentUri;

const PATH_DOCUMENT: &str = "document";
const PATH_TREE: &str = "tree";

/// Extract the document id if `uri` has the shape of a document reference.
///
/// This checks shape only. Whether the authority really belongs to an
/// installed provider is something only the host OS can answer.
pub fn document_id(uri: &DocumentUri) -> Option<&str> {
    if !uri.is_content() || uri.authority().is_none() {
        return None;
    }
    match uri.path_segments() {
        [doc, id] if doc == PATH_DOCUMENT => Some(id.as_str()),
        [tree, _tree_id, doc, id] if tree == PATH_TREE && doc == PATH_DOCUMENT => {
            Some(id.as_str())
        }
        _ => None,
    }
}
