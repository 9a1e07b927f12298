// In-memory doubles for the storage and provider ports, shared by unit tests.

use crate::core::{LookupOptions, SellerId, SellerLookup, Storage};
use crate::utils::error::{Result, ScanError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, path: &str, data: &[u8]) {
        self.files.lock().await.insert(path.to_string(), data.to_vec());
    }

    pub async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().await.get(path).cloned()
    }
}

impl Storage for MemoryStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let files = self.files.lock().await;
        files.get(path).cloned().ok_or_else(|| {
            ScanError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            ))
        })
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.files.lock().await.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn display_path(&self, path: &str) -> String {
        path.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct LookupCall {
    pub seller_ids: Vec<SellerId>,
    pub domain: String,
    pub options: LookupOptions,
}

/// Answers lookups from a fixed record table; selected 1-based calls fail.
#[derive(Clone, Default)]
pub struct MockLookup {
    records: HashMap<SellerId, Value>,
    failing_calls: Vec<usize>,
    calls: Arc<Mutex<Vec<LookupCall>>>,
}

impl MockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, seller_id: &str, record: Value) -> Self {
        self.records.insert(seller_id.to_string(), record);
        self
    }

    pub fn failing_on(mut self, call_no: usize) -> Self {
        self.failing_calls.push(call_no);
        self
    }

    pub async fn calls(&self) -> Vec<LookupCall> {
        self.calls.lock().await.clone()
    }

    pub async fn batch_sizes(&self) -> Vec<usize> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|c| c.seller_ids.len())
            .collect()
    }
}

#[async_trait]
impl SellerLookup for MockLookup {
    async fn lookup(
        &self,
        seller_ids: &[SellerId],
        domain: &str,
        options: LookupOptions,
    ) -> Result<HashMap<SellerId, Value>> {
        let call_no = {
            let mut calls = self.calls.lock().await;
            calls.push(LookupCall {
                seller_ids: seller_ids.to_vec(),
                domain: domain.to_string(),
                options,
            });
            calls.len()
        };

        if self.failing_calls.contains(&call_no) {
            return Err(ScanError::ProviderError {
                status: 500,
                message: "INTERNAL_SERVER_ERROR".to_string(),
            });
        }

        Ok(seller_ids
            .iter()
            .filter_map(|id| self.records.get(id).map(|r| (id.clone(), r.clone())))
            .collect())
    }
}
