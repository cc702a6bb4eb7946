// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test doubles for the native capabilities.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use nanobridge_bridge::contract;
use nanobridge_bridge::traits::{
    DocumentProvider, GeneratedContent, LocalModelService, TextGenerator,
};
use nanobridge_core::error::{BridgeError, Result};
use nanobridge_core::{DocumentUri, ModelSpec};

/// What the fake model does with an instruction.
#[derive(Clone, Copy)]
pub enum Behaviour {
    /// Answer `echo: <instruction>`, after a delay in ms taken from a
    /// leading `<n>|` prefix on the instruction (if any).
    Echo,
    /// Return success with no text.
    Silent,
    /// Fail with an inference error.
    Fail,
    /// Panic inside the inference task.
    Panic,
}

/// A model service whose generator behaves as configured and remembers
/// every instruction it saw.
pub struct FakeModelService {
    behaviour: Behaviour,
    available: bool,
    pub connects: AtomicUsize,
    pub instructions: Arc<Mutex<Vec<String>>>,
}

impl FakeModelService {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            available: true,
            connects: AtomicUsize::new(0),
            instructions: Arc::default(),
        }
    }

    /// A service whose model is not provisioned.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Behaviour::Echo)
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.instructions.lock().unwrap().clone()
    }
}

impl LocalModelService for FakeModelService {
    fn connect(&self, model: &ModelSpec) -> Result<Arc<dyn TextGenerator>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if !self.available {
            return Err(BridgeError::CapabilityUnavailable(format!(
                "{} is not provisioned",
                model.name
            )));
        }
        Ok(Arc::new(FakeGenerator {
            behaviour: self.behaviour,
            instructions: Arc::clone(&self.instructions),
        }))
    }
}

struct FakeGenerator {
    behaviour: Behaviour,
    instructions: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate_content(&self, instruction: &str) -> Result<GeneratedContent> {
        self.instructions.lock().unwrap().push(instruction.to_string());
        match self.behaviour {
            Behaviour::Echo => {
                let delay = instruction
                    .split_once('|')
                    .and_then(|(ms, _)| ms.parse::<u64>().ok());
                if let Some(ms) = delay {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                }
                Ok(GeneratedContent::text(format!("echo: {instruction}")))
            }
            Behaviour::Silent => Ok(GeneratedContent::default()),
            Behaviour::Fail => Err(BridgeError::Inference("model overloaded".into())),
            Behaviour::Panic => panic!("inference crashed"),
        }
    }
}

/// A document provider that decodes references by shape and counts lookups.
pub struct FakeDocuments {
    root: PathBuf,
    broken: bool,
    pub lookups: AtomicUsize,
}

impl FakeDocuments {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            broken: false,
            lookups: AtomicUsize::new(0),
        }
    }

    /// A provider whose every lookup fails.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::new("/storage/emulated/0")
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl DocumentProvider for FakeDocuments {
    fn document_id(&self, uri: &DocumentUri) -> Result<Option<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(BridgeError::Bridge("DocumentsContract unavailable".into()));
        }
        Ok(contract::document_id(uri).map(str::to_string))
    }

    fn external_storage_root(&self) -> Result<PathBuf> {
        Ok(self.root.clone())
    }
}
