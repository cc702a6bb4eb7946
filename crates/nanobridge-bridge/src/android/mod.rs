// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android capability bridge via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. The model service talks to AICore through the
// Google AI client SDK (`GenerativeModelFutures`); the document provider goes
// through `android.provider.DocumentsContract`.
//
// ## Architecture notes
//
// `GenerativeModelFutures.generateContent` hands back a `ListenableFuture`.
// Rather than wiring a Java callback into Rust, the future is awaited with a
// blocking `get()` on a `spawn_blocking` thread, so the async caller is never
// blocked and each inference owns its own attached JNI thread.
//
// Document lookups are plain synchronous JNI calls.

#![cfg(target_os = "android")]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};

use nanobridge_core::error::{BridgeError, Result};
use nanobridge_core::{DocumentUri, ModelSpec};

use crate::traits::*;

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

const CLASS_GENERATIVE_MODEL: &str = "com/google/ai/client/generativeai/GenerativeModel";
const CLASS_MODEL_FUTURES: &str = "com/google/ai/client/generativeai/java/GenerativeModelFutures";
const CLASS_CONTENT: &str = "com/google/ai/client/generativeai/type/Content";
const CLASS_CONTENT_BUILDER: &str = "com/google/ai/client/generativeai/type/Content$Builder";

/// Obtain the process [`JavaVM`] from the global Android context.
///
/// `ndk_context::android_context()` carries the `JavaVM*` set by
/// `android_main` or `ANativeActivity_onCreate`.
fn java_vm() -> Result<JavaVM> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is guaranteed valid for the lifetime of the process.
    unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| BridgeError::Bridge(format!("failed to obtain JavaVM: {e}")))
}

/// Obtain the hosting Android `Context` as a [`JObject`].
fn context() -> Result<JObject<'static>> {
    let ctx = ndk_context::android_context();
    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(BridgeError::Bridge(
            "Android context is null — native activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Context.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

/// Map a `jni::errors::Error` into a message, pulling the pending Java
/// exception's `toString()` when there is one and clearing it.
fn describe(env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error) -> String {
    match pending_exception(env) {
        Some(java) => format!("{context}: {java}"),
        None => format!("{context}: {e}"),
    }
}

fn pending_exception(env: &mut JNIEnv<'_>) -> Option<String> {
    if !env.exception_check().unwrap_or(false) {
        return None;
    }
    let throwable = env.exception_occurred().ok()?;
    env.exception_clear().ok()?;
    let message = env
        .call_method(&throwable, "toString", "()Ljava/lang/String;", &[])
        .ok()?
        .l()
        .ok()?;
    java_string(env, message).ok().flatten()
}

/// Read a possibly-null `java.lang.String`.
fn java_string(env: &mut JNIEnv<'_>, obj: JObject<'_>) -> jni::errors::Result<Option<String>> {
    if obj.is_null() {
        return Ok(None);
    }
    let s: String = env.get_string(&JString::from(obj))?.into();
    Ok(Some(s))
}

// ---------------------------------------------------------------------------
// LocalModelService — AICore via GenerativeModelFutures
// ---------------------------------------------------------------------------

/// Android implementation of the on-device model service.
///
/// Zero-sized; the first JNI call happens in [`LocalModelService::connect`].
#[derive(Debug, Default)]
pub struct AndroidModelService;

impl AndroidModelService {
    pub fn new() -> Self {
        Self
    }
}

impl LocalModelService for AndroidModelService {
    /// Build `GenerativeModelFutures.from(new GenerativeModel(name, apiKey))`
    /// and pin it with a global reference.
    ///
    /// Runs on the caller's thread. Binding is two object constructions and
    /// a static call with no I/O; the model is only loaded by
    /// `generateContent`, which runs on the blocking pool.
    fn connect(&self, model: &ModelSpec) -> Result<Arc<dyn TextGenerator>> {
        let vm = java_vm()?;
        let futures = {
            let mut env = vm
                .attach_current_thread()
                .map_err(|e| BridgeError::Bridge(format!("failed to attach JNI thread: {e}")))?;
            build_model_futures(&mut env, model).map_err(BridgeError::CapabilityUnavailable)?
        };

        tracing::info!(model = %model.name, "Android: bound to on-device model");
        Ok(Arc::new(AndroidGenerator {
            vm: Arc::new(vm),
            model: futures,
        }))
    }
}

fn build_model_futures(
    env: &mut JNIEnv<'_>,
    model: &ModelSpec,
) -> std::result::Result<GlobalRef, String> {
    let j_name: JString = env
        .new_string(&model.name)
        .map_err(|e| describe(env, "new_string(model)", e))?;
    let j_key: JString = env
        .new_string(&model.api_key)
        .map_err(|e| describe(env, "new_string(api_key)", e))?;

    // new GenerativeModel(modelName, apiKey)
    let generative_model = env
        .new_object(
            CLASS_GENERATIVE_MODEL,
            "(Ljava/lang/String;Ljava/lang/String;)V",
            &[JValue::Object(&j_name), JValue::Object(&j_key)],
        )
        .map_err(|e| describe(env, "new GenerativeModel", e))?;

    // GenerativeModelFutures.from(model)
    let futures = env
        .call_static_method(
            CLASS_MODEL_FUTURES,
            "from",
            "(Lcom/google/ai/client/generativeai/GenerativeModel;)Lcom/google/ai/client/generativeai/java/GenerativeModelFutures;",
            &[JValue::Object(&generative_model)],
        )
        .map_err(|e| describe(env, "GenerativeModelFutures.from", e))?
        .l()
        .map_err(|e| describe(env, "GenerativeModelFutures.from->l", e))?;

    env.new_global_ref(futures)
        .map_err(|e| describe(env, "new_global_ref(model)", e))
}

/// A bound `GenerativeModelFutures` instance. Shareable across calls.
pub struct AndroidGenerator {
    vm: Arc<JavaVM>,
    model: GlobalRef,
}

#[async_trait]
impl TextGenerator for AndroidGenerator {
    async fn generate_content(&self, instruction: &str) -> Result<GeneratedContent> {
        let vm = Arc::clone(&self.vm);
        let model = self.model.clone();
        let instruction = instruction.to_owned();

        tokio::task::spawn_blocking(move || {
            let mut env = vm
                .attach_current_thread()
                .map_err(|e| BridgeError::Bridge(format!("failed to attach JNI thread: {e}")))?;
            blocking_generate(&mut env, model.as_obj(), &instruction)
                .map_err(BridgeError::Inference)
        })
        .await
        .unwrap_or_else(|e| Err(BridgeError::Inference(format!("inference thread failed: {e}"))))
    }
}

/// `model.generateContent(new Content.Builder().addText(text).build()).get().getText()`
fn blocking_generate(
    env: &mut JNIEnv<'_>,
    model: &JObject<'_>,
    instruction: &str,
) -> std::result::Result<GeneratedContent, String> {
    let builder = env
        .new_object(CLASS_CONTENT_BUILDER, "()V", &[])
        .map_err(|e| describe(env, "new Content.Builder", e))?;

    let j_text: JString = env
        .new_string(instruction)
        .map_err(|e| describe(env, "new_string(instruction)", e))?;

    env.call_method(
        &builder,
        "addText",
        "(Ljava/lang/String;)Lcom/google/ai/client/generativeai/type/Content$Builder;",
        &[JValue::Object(&j_text)],
    )
    .map_err(|e| describe(env, "Content.Builder.addText", e))?;

    let content = env
        .call_method(
            &builder,
            "build",
            "()Lcom/google/ai/client/generativeai/type/Content;",
            &[],
        )
        .map_err(|e| describe(env, "Content.Builder.build", e))?
        .l()
        .map_err(|e| describe(env, "build->l", e))?;

    // generateContent(Content... prompt)
    let prompt = env
        .new_object_array(1, CLASS_CONTENT, &content)
        .map_err(|e| describe(env, "new Content[]", e))?;

    let future = env
        .call_method(
            model,
            "generateContent",
            "([Lcom/google/ai/client/generativeai/type/Content;)Lcom/google/common/util/concurrent/ListenableFuture;",
            &[JValue::Object(&prompt)],
        )
        .map_err(|e| describe(env, "generateContent", e))?
        .l()
        .map_err(|e| describe(env, "generateContent->l", e))?;

    // Blocks this worker thread until AICore answers or fails.
    let response = env
        .call_method(&future, "get", "()Ljava/lang/Object;", &[])
        .map_err(|e| describe(env, "ListenableFuture.get", e))?
        .l()
        .map_err(|e| describe(env, "get->l", e))?;

    let text = env
        .call_method(&response, "getText", "()Ljava/lang/String;", &[])
        .map_err(|e| describe(env, "GenerateContentResponse.getText", e))?
        .l()
        .map_err(|e| describe(env, "getText->l", e))?;

    let text = java_string(env, text).map_err(|e| describe(env, "get_string(text)", e))?;
    Ok(GeneratedContent { text })
}

// ---------------------------------------------------------------------------
// DocumentProvider — android.provider.DocumentsContract
// ---------------------------------------------------------------------------

/// Android implementation of the document provider.
#[derive(Debug, Default)]
pub struct AndroidDocuments;

impl AndroidDocuments {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentProvider for AndroidDocuments {
    /// `DocumentsContract.isDocumentUri(ctx, uri) ? getDocumentId(uri) : null`
    fn document_id(&self, uri: &DocumentUri) -> Result<Option<String>> {
        let vm = java_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| BridgeError::Bridge(format!("failed to attach JNI thread: {e}")))?;
        let ctx = context()?;

        let j_uri_str: JString = env
            .new_string(uri.as_str())
            .map_err(|e| BridgeError::Bridge(describe(&mut env, "new_string(uri)", e)))?;

        let uri_obj = env
            .call_static_method(
                "android/net/Uri",
                "parse",
                "(Ljava/lang/String;)Landroid/net/Uri;",
                &[JValue::Object(&j_uri_str)],
            )
            .map_err(|e| BridgeError::Bridge(describe(&mut env, "Uri.parse", e)))?
            .l()
            .map_err(|e| BridgeError::Bridge(describe(&mut env, "Uri.parse->l", e)))?;

        let is_document = env
            .call_static_method(
                "android/provider/DocumentsContract",
                "isDocumentUri",
                "(Landroid/content/Context;Landroid/net/Uri;)Z",
                &[JValue::Object(&ctx), JValue::Object(&uri_obj)],
            )
            .map_err(|e| BridgeError::Bridge(describe(&mut env, "isDocumentUri", e)))?
            .z()
            .map_err(|e| BridgeError::Bridge(describe(&mut env, "isDocumentUri->z", e)))?;

        if !is_document {
            return Ok(None);
        }

        let doc_id = env
            .call_static_method(
                "android/provider/DocumentsContract",
                "getDocumentId",
                "(Landroid/net/Uri;)Ljava/lang/String;",
                &[JValue::Object(&uri_obj)],
            )
            .map_err(|e| BridgeError::Bridge(describe(&mut env, "getDocumentId", e)))?
            .l()
            .map_err(|e| BridgeError::Bridge(describe(&mut env, "getDocumentId->l", e)))?;

        java_string(&mut env, doc_id)
            .map_err(|e| BridgeError::Bridge(describe(&mut env, "get_string(documentId)", e)))
    }

    /// `Environment.getExternalStorageDirectory().getAbsolutePath()`
    fn external_storage_root(&self) -> Result<PathBuf> {
        let vm = java_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| BridgeError::Bridge(format!("failed to attach JNI thread: {e}")))?;

        let dir = env
            .call_static_method(
                "android/os/Environment",
                "getExternalStorageDirectory",
                "()Ljava/io/File;",
                &[],
            )
            .map_err(|e| BridgeError::Bridge(describe(&mut env, "getExternalStorageDirectory", e)))?
            .l()
            .map_err(|e| BridgeError::Bridge(describe(&mut env, "getExternalStorageDirectory->l", e)))?;

        let path = env
            .call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
            .map_err(|e| BridgeError::Bridge(describe(&mut env, "File.getAbsolutePath", e)))?
            .l()
            .map_err(|e| BridgeError::Bridge(describe(&mut env, "getAbsolutePath->l", e)))?;

        java_string(&mut env, path)
            .map_err(|e| BridgeError::Bridge(describe(&mut env, "get_string(storageRoot)", e)))?
            .map(PathBuf::from)
            .ok_or_else(|| BridgeError::Bridge("external storage directory is null".into()))
    }
}
