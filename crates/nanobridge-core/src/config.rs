// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How `generateText` turns its two arguments into one instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptComposition {
    /// `systemPrompt`, separator, `prompt`. An empty system prompt adds nothing.
    #[default]
    SystemThenPrompt,
    /// Send `prompt` alone and ignore `systemPrompt`.
    PromptOnly,
}

/// Identity of the on-device model to bind to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSpec {
    /// Model name understood by the local inference service.
    pub name: String,
    /// Placeholder key; local models do not check it but the SDK requires one.
    pub api_key: String,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            name: "gemini-nano".into(),
            api_key: "dummy-key".into(),
        }
    }
}

/// Settings for the bridge. Every field has a default, so a partial JSON
/// file is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name the bridge registers under with the application shell.
    pub plugin_name: String,
    pub model: ModelSpec,
    pub prompt_composition: PromptComposition,
    /// Inserted between a non-empty system prompt and the prompt.
    pub prompt_separator: String,
    /// Overrides the primary volume root reported by the document provider.
    pub external_storage_root: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            plugin_name: "GeminiNano".into(),
            model: ModelSpec::default(),
            prompt_composition: PromptComposition::default(),
            prompt_separator: "\n\n".into(),
            external_storage_root: None,
        }
    }
}

impl BridgeConfig {
    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::info!(path = %path.display(), plugin = %config.plugin_name, "loaded bridge config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
