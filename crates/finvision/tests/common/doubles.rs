//! Test doubles for the extraction service and the record sink.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::sync::Semaphore;

use finvision::extraction::{ExtractionError, ExtractionRequest, ExtractionResult, Extractor};
use finvision::ledger::{DocumentRecord, Transaction};
use finvision::queue::{RecordSink, SinkError};

/// Builds a successful extraction with the given inferred type.
pub fn extraction(vendor: &str, inferred: Option<&str>) -> ExtractionResult {
    ExtractionResult {
        date: "2024-06-01".to_string(),
        vendor: vendor.to_string(),
        total_amount: 100.0,
        tax_amount: Some(8.0),
        category: "Services".to_string(),
        currency: "USD".to_string(),
        inferred_type: inferred.map(str::to_string),
        items: Vec::new(),
    }
}

/// Extractor that answers from a script keyed by file contents.
///
/// Harness files carry their own name as contents, so the key is the file
/// name. Unscripted files get a generic expense result.
#[derive(Default)]
pub struct ScriptedExtractor {
    script: Mutex<HashMap<String, Result<ExtractionResult, String>>>,
    calls: Mutex<Vec<String>>,
    /// When set, every call waits for a permit first.
    gate: Option<Semaphore>,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls block until `release` hands out permits.
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn respond(&self, key: &str, result: ExtractionResult) {
        self.script
            .lock()
            .unwrap()
            .insert(key.to_string(), Ok(result));
    }

    pub fn fail(&self, key: &str, message: &str) {
        self.script
            .lock()
            .unwrap()
            .insert(key.to_string(), Err(message.to_string()));
    }

    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    /// Keys in the order their extraction started.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    async fn extract(
        &self,
        request: ExtractionRequest<'_>,
    ) -> Result<ExtractionResult, ExtractionError> {
        let bytes = STANDARD
            .decode(request.payload)
            .map_err(|e| ExtractionError::Service(e.to_string()))?;
        let key = String::from_utf8_lossy(&bytes).into_owned();
        self.calls.lock().unwrap().push(key.clone());

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| ExtractionError::Service(e.to_string()))?
                .forget();
        }

        let scripted = self.script.lock().unwrap().get(&key).cloned();
        match scripted {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(ExtractionError::Service(message)),
            None => Ok(extraction(&key, Some("expense"))),
        }
    }
}

/// Sink that keeps every accepted pair and can be told to refuse vendors.
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<(DocumentRecord, Transaction)>>,
    refuse: Mutex<HashSet<String>>,
    drained: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse_vendor(&self, vendor: &str) {
        self.refuse.lock().unwrap().insert(vendor.to_string());
    }

    pub fn records(&self) -> Vec<(DocumentRecord, Transaction)> {
        self.records.lock().unwrap().clone()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.records().into_iter().map(|(_, t)| t).collect()
    }

    pub fn drained_count(&self) -> usize {
        self.drained.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSink for RecordingSink {
    async fn accept(
        &self,
        document: DocumentRecord,
        transaction: Transaction,
    ) -> Result<(), SinkError> {
        if self.refuse.lock().unwrap().contains(&transaction.vendor) {
            return Err(SinkError::Rejected(transaction.vendor));
        }
        self.records.lock().unwrap().push((document, transaction));
        Ok(())
    }

    async fn batch_drained(&self) {
        self.drained.fetch_add(1, Ordering::SeqCst);
    }
}
