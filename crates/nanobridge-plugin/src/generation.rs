// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `generateText`: run one prompt through the on-device model.
//
// Each call binds to the model, submits one instruction and completes with
// the produced text. There are no retries, and no cancellation or timeout:
// once submitted, an inference runs until the model answers or fails.

use std::sync::Arc;

use tracing::Instrument;

use nanobridge_bridge::traits::LocalModelService;
use nanobridge_core::error::{BridgeError, Result};
use nanobridge_core::{BridgeConfig, GenerationRequest, GenerationResult, ModelSpec, PromptComposition};

use crate::call::PluginCall;
use crate::registry::PluginMethod;

/// Method name the shell calls.
pub const GENERATE_TEXT: &str = "generateText";

/// The text generation operation. Clones share the model service handle.
#[derive(Clone)]
pub struct TextGeneration {
    service: Arc<dyn LocalModelService>,
    model: ModelSpec,
    composition: PromptComposition,
    separator: String,
}

impl TextGeneration {
    pub fn new(service: Arc<dyn LocalModelService>, config: &BridgeConfig) -> Self {
        Self {
            service,
            model: config.model.clone(),
            composition: config.prompt_composition,
            separator: config.prompt_separator.clone(),
        }
    }

    /// Generate text for `request`.
    ///
    /// Errors are `MissingArgument` for a blank instruction (nothing is
    /// invoked), `CapabilityUnavailable` when the model cannot be bound, and
    /// `Inference` when the model fails or answers without text.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let instruction = request.instruction(self.composition, &self.separator);
        if instruction.trim().is_empty() {
            return Err(BridgeError::MissingArgument("prompt"));
        }
        tracing::debug!(model = %self.model.name, chars = instruction.len(), "submitting instruction");

        let generator = self.service.connect(&self.model).map_err(|e| match e {
            BridgeError::CapabilityUnavailable(_) => e,
            other => BridgeError::CapabilityUnavailable(other.to_string()),
        })?;

        let content = generator
            .generate_content(&instruction)
            .await
            .map_err(|e| match e {
                BridgeError::Inference(_) => e,
                other => BridgeError::Inference(other.to_string()),
            })?;

        match content.text {
            Some(text) if !text.is_empty() => Ok(GenerationResult { text }),
            _ => Err(BridgeError::Inference("model returned no text".into())),
        }
    }
}

impl PluginMethod for TextGeneration {
    fn name(&self) -> &'static str {
        GENERATE_TEXT
    }

    /// Spawn the inference on the current tokio runtime and return at once.
    /// The outcome arrives on the call's completion context. Without a
    /// runtime the call is rejected as capability unavailable.
    fn invoke(&self, call: PluginCall) {
        let request: GenerationRequest = match call.options() {
            Ok(request) => request,
            Err(e) => return call.reject(e.to_string()),
        };
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                let err = BridgeError::CapabilityUnavailable(format!("no async runtime: {e}"));
                tracing::warn!(call = %call.id(), error = %err, "generation not started");
                return call.reject(err.to_string());
            }
        };
        let operation = self.clone();
        let span = tracing::info_span!("generate_text", call = %call.id());

        runtime.spawn(
            async move {
                match operation.generate(&request).await {
                    Ok(result) => call.resolve(&result),
                    Err(e) => {
                        tracing::warn!(class = ?e.class(), error = %e, "generation failed");
                        call.reject(e.to_string());
                    }
                }
            }
            .instrument(span),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::{DROPPED_CALL_MESSAGE, completion_channel};
    use crate::testing::{Behaviour, FakeModelService};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn operation(service: &Arc<FakeModelService>, config: &BridgeConfig) -> TextGeneration {
        TextGeneration::new(service.clone(), config)
    }

    #[tokio::test]
    async fn resolves_with_generated_text() {
        let service = Arc::new(FakeModelService::new(Behaviour::Echo));
        let op = operation(&service, &BridgeConfig::default());

        let result = op
            .generate(&GenerationRequest::new("Be kind.", "How was my day?"))
            .await
            .unwrap();

        assert_eq!(result.text, "echo: Be kind.\n\nHow was my day?");
        assert_eq!(service.seen(), vec!["Be kind.\n\nHow was my day?".to_string()]);
    }

    #[tokio::test]
    async fn prompt_only_composition_sends_prompt_alone() {
        let service = Arc::new(FakeModelService::new(Behaviour::Echo));
        let config = BridgeConfig {
            prompt_composition: PromptComposition::PromptOnly,
            ..BridgeConfig::default()
        };

        operation(&service, &config)
            .generate(&GenerationRequest::new("Be kind.", "How was my day?"))
            .await
            .unwrap();

        assert_eq!(service.seen(), vec!["How was my day?".to_string()]);
    }

    #[tokio::test]
    async fn unavailable_model_is_reported_with_cause() {
        let service = Arc::new(FakeModelService::unavailable());
        let err = operation(&service, &BridgeConfig::default())
            .generate(&GenerationRequest::new("", "hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::CapabilityUnavailable(_)));
        assert!(err.to_string().contains("gemini-nano is not provisioned"));
    }

    #[cfg(not(target_os = "android"))]
    #[tokio::test]
    async fn stub_platform_counts_as_unavailable() {
        let op = TextGeneration::new(
            Arc::new(nanobridge_bridge::stub::StubBridge::default()),
            &BridgeConfig::default(),
        );
        let err = op
            .generate(&GenerationRequest::new("", "hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::CapabilityUnavailable(_)));
        assert!(err.to_string().contains("not available on this platform"));
    }

    #[tokio::test]
    async fn inference_failure_is_reported_with_cause() {
        let service = Arc::new(FakeModelService::new(Behaviour::Fail));
        let err = operation(&service, &BridgeConfig::default())
            .generate(&GenerationRequest::new("", "hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::Inference(_)));
        assert!(err.to_string().contains("model overloaded"));
    }

    #[tokio::test]
    async fn empty_answer_is_an_inference_failure() {
        let service = Arc::new(FakeModelService::new(Behaviour::Silent));
        let err = operation(&service, &BridgeConfig::default())
            .generate(&GenerationRequest::new("", "hello"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "on-device inference failed: model returned no text");
    }

    #[tokio::test]
    async fn blank_instruction_never_reaches_the_model() {
        let service = Arc::new(FakeModelService::new(Behaviour::Echo));
        let err = operation(&service, &BridgeConfig::default())
            .generate(&GenerationRequest::new("", "   "))
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::MissingArgument("prompt")));
        assert_eq!(service.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invoke_rejects_unavailable_model_exactly_once() {
        let service = Arc::new(FakeModelService::unavailable());
        let op = operation(&service, &BridgeConfig::default());
        let (ctx, mut queue) = completion_channel();

        op.invoke(PluginCall::new(GENERATE_TEXT, json!({ "prompt": "hi" }), ctx));

        let done = queue.next().await.expect("one outcome");
        assert!(!done.outcome.is_resolved());
        assert!(
            done.outcome
                .message()
                .unwrap()
                .starts_with("could not start the on-device model")
        );
        // Every sender is gone once the task finishes, so the queue ends.
        assert!(queue.next().await.is_none());
    }

    #[tokio::test]
    async fn invoke_rejects_mistyped_arguments_without_spawning() {
        let service = Arc::new(FakeModelService::new(Behaviour::Echo));
        let op = operation(&service, &BridgeConfig::default());
        let (ctx, mut queue) = completion_channel();

        op.invoke(PluginCall::new(GENERATE_TEXT, json!({ "prompt": ["a", "b"] }), ctx));

        let done = queue.try_next().expect("rejected synchronously");
        assert!(done.outcome.message().unwrap().contains("invalid argument"));
        assert_eq!(service.connects.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invoke_outside_a_runtime_rejects() {
        let service = Arc::new(FakeModelService::new(Behaviour::Echo));
        let op = operation(&service, &BridgeConfig::default());
        let (ctx, mut queue) = completion_channel();

        op.invoke(PluginCall::new(GENERATE_TEXT, json!({ "prompt": "hi" }), ctx));

        let done = queue.try_next().expect("rejected synchronously");
        let message = done.outcome.message().unwrap();
        assert!(message.starts_with("could not start the on-device model: no async runtime"));
        assert_eq!(service.connects.load(Ordering::SeqCst), 0);
        assert!(queue.try_next().is_none());
    }

    #[tokio::test]
    async fn panicking_model_still_completes_the_call() {
        let service = Arc::new(FakeModelService::new(Behaviour::Panic));
        let op = operation(&service, &BridgeConfig::default());
        let (ctx, mut queue) = completion_channel();

        op.invoke(PluginCall::new(GENERATE_TEXT, json!({ "prompt": "hi" }), ctx));

        let done = queue.next().await.expect("one outcome");
        assert_eq!(done.outcome.message(), Some(DROPPED_CALL_MESSAGE));
        assert!(queue.next().await.is_none());
    }
}
