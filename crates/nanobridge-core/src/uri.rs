// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lenient parsing of the URI-shaped document references handed over by the
// application shell.
//
// The split follows the host platform's URI parser: anything is accepted as a
// reference, the scheme and authority are optional, and only hierarchical
// references carry a path. Decoding never fails: a `%` that does not start a
// valid escape is kept as written, and bytes that are not UTF-8 are replaced.
// The only rejected input is an empty reference.

use crate::error::{BridgeError, Result};

/// A parsed document reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUri {
    raw: String,
    scheme: Option<String>,
    authority: Option<String>,
    path: Option<String>,
    segments: Vec<String>,
}

impl DocumentUri {
    /// Split `raw` into scheme, authority and percent-decoded path.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(BridgeError::InvalidArgument {
                name: "uri",
                reason: "reference is empty".into(),
            });
        }

        let (scheme, rest) = split_scheme(raw);
        let rest = strip_query_and_fragment(rest);

        let (authority, encoded_path) = match rest.strip_prefix("//") {
            Some(after) => {
                let end = after.find('/').unwrap_or(after.len());
                let authority = &after[..end];
                let path = &after[end..];
                (
                    (!authority.is_empty()).then(|| authority.to_string()),
                    (!path.is_empty()).then_some(path),
                )
            }
            // "scheme:opaque" has no path; schemeless input is a relative path.
            None if scheme.is_some() && !rest.starts_with('/') => (None, None),
            None => (None, (!rest.is_empty()).then_some(rest)),
        };

        let path = encoded_path.map(percent_decode);
        let segments = match encoded_path {
            Some(p) => p
                .split('/')
                .filter(|s| !s.is_empty())
                .map(percent_decode)
                .collect(),
            None => Vec::new(),
        };

        Ok(Self {
            raw: raw.to_string(),
            scheme: scheme.map(str::to_string),
            authority,
            path,
            segments,
        })
    }

    /// The reference exactly as the shell supplied it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// Percent-decoded path component, if the reference has one.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Non-empty path segments, each decoded separately so an encoded `/`
    /// stays inside its segment.
    pub fn path_segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_content(&self) -> bool {
        self.scheme
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("content"))
    }
}

impl std::fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A scheme is everything before the first `:`, provided no `/`, `?` or `#`
/// comes earlier.
fn split_scheme(raw: &str) -> (Option<&str>, &str) {
    match raw.find([':', '/', '?', '#']) {
        Some(idx) if idx > 0 && raw.as_bytes()[idx] == b':' => {
            (Some(&raw[..idx]), &raw[idx + 1..])
        }
        _ => (None, raw),
    }
}

fn strip_query_and_fragment(s: &str) -> &str {
    match s.find(['?', '#']) {
        Some(idx) => &s[..idx],
        None => s,
    }
}

/// Decode `%XX` escapes. `+` is left alone, a malformed escape is kept
/// literally and invalid UTF-8 is replaced with U+FFFD.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = (bytes[i] == b'%')
            .then(|| bytes.get(i + 1..i + 3))
            .flatten()
            .and_then(|h| std::str::from_utf8(h).ok())
            .and_then(|h| u8::from_str_radix(h, 16).ok());
        match escaped {
            Some(byte) => {
                out.push(byte);
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    match String::from_utf8(out) {
        Ok(decoded) => decoded,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_document_provider_reference() {
        let uri = DocumentUri::parse(
            "content://com.android.externalstorage.documents/document/primary%3ADownload%2Fmodel.gguf",
        )
        .unwrap();
        assert_eq!(uri.scheme(), Some("content"));
        assert_eq!(
            uri.authority(),
            Some("com.android.externalstorage.documents")
        );
        assert_eq!(uri.path(), Some("/document/primary:Download/model.gguf"));
        assert_eq!(
            uri.path_segments(),
            &["document".to_string(), "primary:Download/model.gguf".to_string()]
        );
        assert!(uri.is_content());
    }

    #[test]
    fn file_reference_keeps_absolute_path() {
        let uri = DocumentUri::parse("file:///storage/emulated/0/My%20Model.bin").unwrap();
        assert_eq!(uri.authority(), None);
        assert_eq!(uri.path(), Some("/storage/emulated/0/My Model.bin"));
    }

    #[test]
    fn bare_path_is_its_own_path() {
        let uri = DocumentUri::parse("/sdcard/model.bin").unwrap();
        assert_eq!(uri.scheme(), None);
        assert_eq!(uri.path(), Some("/sdcard/model.bin"));
    }

    #[test]
    fn opaque_reference_has_no_path() {
        let uri = DocumentUri::parse("mailto:someone@example.org").unwrap();
        assert_eq!(uri.scheme(), Some("mailto"));
        assert_eq!(uri.path(), None);
        assert!(uri.path_segments().is_empty());
    }

    #[test]
    fn query_and_fragment_are_not_part_of_the_path() {
        let uri = DocumentUri::parse("content://media/external/file/42?limit=1#top").unwrap();
        assert_eq!(uri.path(), Some("/external/file/42"));
    }

    #[test]
    fn authority_only_reference_has_no_path() {
        let uri = DocumentUri::parse("content://downloads").unwrap();
        assert_eq!(uri.authority(), Some("downloads"));
        assert_eq!(uri.path(), None);
    }

    #[test]
    fn malformed_escape_is_kept_literally() {
        let uri = DocumentUri::parse("file:///sdcard/100%.bin").unwrap();
        assert_eq!(uri.path(), Some("/sdcard/100%.bin"));

        let uri = DocumentUri::parse("content://a/document/raw%3").unwrap();
        assert_eq!(uri.path_segments(), &["document".to_string(), "raw%3".to_string()]);

        let uri = DocumentUri::parse("/sdcard/50%off.txt").unwrap();
        assert_eq!(uri.path(), Some("/sdcard/50%off.txt"));
    }

    #[test]
    fn invalid_utf8_escape_is_replaced() {
        let uri = DocumentUri::parse("content://media/external/%E9").unwrap();
        assert_eq!(uri.path(), Some("/external/\u{FFFD}"));

        let uri = DocumentUri::parse("content://a/document/caf%C3%A9%FF").unwrap();
        assert_eq!(uri.path(), Some("/document/caf\u{e9}\u{FFFD}"));
    }

    #[test]
    fn empty_reference_is_rejected() {
        let err = DocumentUri::parse("  ").unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument { name: "uri", .. }));
    }
}
