use crate::domain::model::{FetchedSeller, LookupOptions, SellerId, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Human-readable location of `path`, used in log lines and the run summary.
    fn display_path(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn domain(&self) -> &str;
    fn batch_size(&self) -> usize;
    fn failure_delay(&self) -> Duration;
    fn lookup_options(&self) -> LookupOptions;
}

/// Batched seller lookup against the marketplace data provider.
///
/// The returned map is keyed by seller id; ids the provider knows nothing
/// about may be missing or map to `null`.
#[async_trait]
pub trait SellerLookup: Send + Sync {
    async fn lookup(
        &self,
        seller_ids: &[SellerId],
        domain: &str,
        options: LookupOptions,
    ) -> Result<HashMap<SellerId, Value>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<FetchedSeller>>;
    async fn transform(&self, data: Vec<FetchedSeller>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
