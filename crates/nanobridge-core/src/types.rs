// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Call payloads and outcomes exchanged with the application shell.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PromptComposition;

/// Identifier of a call. Either chosen by the shell (any string) or assigned
/// at entry as a fresh UUID. Used to correlate log records and the
/// completion; never outlives the call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(String);

impl CallId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for CallId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CallId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Arguments of `generateText`.
///
/// Both fields default to the empty string when the shell omits them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(system_prompt: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
        }
    }

    /// Build the single instruction payload submitted to the model.
    ///
    /// With [`PromptComposition::SystemThenPrompt`] a non-empty system prompt
    /// is joined to the prompt with `separator`; an empty one adds nothing.
    /// [`PromptComposition::PromptOnly`] ignores the system prompt entirely.
    pub fn instruction(&self, composition: PromptComposition, separator: &str) -> String {
        match composition {
            PromptComposition::SystemThenPrompt if !self.system_prompt.is_empty() => {
                format!("{}{separator}{}", self.system_prompt, self.prompt)
            }
            PromptComposition::SystemThenPrompt | PromptComposition::PromptOnly => {
                self.prompt.clone()
            }
        }
    }
}

/// Payload of a resolved `generateText` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
}

/// Arguments of `getRealPath`. The shell names the field `uri`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResolutionRequest {
    #[serde(default)]
    pub uri: Option<String>,
}

impl PathResolutionRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
        }
    }
}

/// Payload of a resolved `getRealPath` call. `path` is `None` when nothing
/// usable could be derived; that is still a successful outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResolutionResult {
    pub path: Option<String>,
}

/// The single outcome of a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CallOutcome {
    Resolved { data: serde_json::Value },
    Rejected { message: String },
}

impl CallOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, CallOutcome::Resolved { .. })
    }

    /// The resolved payload, if any.
    pub fn data(&self) -> Option<&serde_json::Value> {
        match self {
            CallOutcome::Resolved { data } => Some(data),
            CallOutcome::Rejected { .. } => None,
        }
    }

    /// The rejection message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            CallOutcome::Resolved { .. } => None,
            CallOutcome::Rejected { message } => Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_is_joined_with_separator() {
        let req = GenerationRequest::new("Be brief.", "Summarise my day.");
        assert_eq!(
            req.instruction(PromptComposition::SystemThenPrompt, "\n\n"),
            "Be brief.\n\nSummarise my day."
        );
    }

    #[test]
    fn empty_system_prompt_adds_no_prefix() {
        let req = GenerationRequest::new("", "Summarise my day.");
        assert_eq!(
            req.instruction(PromptComposition::SystemThenPrompt, "\n\n"),
            "Summarise my day."
        );
    }

    #[test]
    fn prompt_only_ignores_system_prompt() {
        let req = GenerationRequest::new("Be brief.", "Summarise my day.");
        assert_eq!(
            req.instruction(PromptComposition::PromptOnly, "\n\n"),
            "Summarise my day."
        );
    }

    #[test]
    fn generation_request_reads_shell_field_names() {
        let req: GenerationRequest =
            serde_json::from_str(r#"{"systemPrompt":"sys","prompt":"hi"}"#).unwrap();
        assert_eq!(req, GenerationRequest::new("sys", "hi"));

        let req: GenerationRequest = serde_json::from_str(r#"{"prompt":"hi"}"#).unwrap();
        assert!(req.system_prompt.is_empty());
    }

    #[test]
    fn outcome_serialises_with_status_tag() {
        let outcome = CallOutcome::Rejected {
            message: "missing required argument: uri".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["message"], "missing required argument: uri");

        let outcome = CallOutcome::Resolved {
            data: serde_json::json!({ "path": null }),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "resolved");
        assert!(json["data"]["path"].is_null());
    }

    #[test]
    fn call_id_keeps_shell_chosen_text() {
        let id = CallId::from("call-7");
        assert_eq!(id.as_str(), "call-7");
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("call-7"));
        assert_ne!(CallId::new(), CallId::new());
    }
}
