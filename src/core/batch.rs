use crate::core::{FetchedSeller, LookupOptions, SellerId, SellerLookup, SellerRecord};
use std::time::Duration;

/// Largest number of seller ids Keepa accepts in one seller request.
pub const MAX_BATCH_SIZE: usize = 100;

pub const DEFAULT_FAILURE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub fetched: Vec<FetchedSeller>,
    pub batches: usize,
    /// 1-based indices of batches whose lookup failed.
    pub failed_batches: Vec<usize>,
}

/// Runs one lookup per chunk of ids, strictly one after another.
///
/// A failed lookup is logged, followed by a fixed pause, and the run moves on
/// to the next chunk. The failed chunk is not attempted again.
pub struct BatchQuery<'a, L: SellerLookup> {
    lookup: &'a L,
    domain: &'a str,
    options: LookupOptions,
    batch_size: usize,
    failure_delay: Duration,
}

impl<'a, L: SellerLookup> BatchQuery<'a, L> {
    pub fn new(lookup: &'a L, domain: &'a str) -> Self {
        Self {
            lookup,
            domain,
            options: LookupOptions::default(),
            batch_size: MAX_BATCH_SIZE,
            failure_delay: DEFAULT_FAILURE_DELAY,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    pub fn with_failure_delay(mut self, failure_delay: Duration) -> Self {
        self.failure_delay = failure_delay;
        self
    }

    pub fn with_options(mut self, options: LookupOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn run(&self, seller_ids: &[SellerId]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for (index, chunk) in seller_ids.chunks(self.batch_size).enumerate() {
            let batch_no = index + 1;
            outcome.batches += 1;
            tracing::debug!("Querying batch {} ({} sellers)", batch_no, chunk.len());

            match self.lookup.lookup(chunk, self.domain, self.options).await {
                Ok(results) => {
                    let before = outcome.fetched.len();
                    for seller_id in chunk {
                        // duplicates in the input share one provider result
                        let record = results
                            .get(seller_id)
                            .cloned()
                            .and_then(SellerRecord::from_value);
                        if let Some(record) = record {
                            outcome.fetched.push(FetchedSeller {
                                seller_id: seller_id.clone(),
                                record,
                            });
                        }
                    }
                    tracing::debug!(
                        "Batch {} returned {} seller records",
                        batch_no,
                        outcome.fetched.len() - before
                    );
                }
                Err(e) => {
                    tracing::warn!("Batch {} failed: {}", batch_no, e);
                    outcome.failed_batches.push(batch_no);
                    tokio::time::sleep(self.failure_delay).await;
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLookup;
    use serde_json::json;

    fn ids(n: usize) -> Vec<SellerId> {
        (1..=n).map(|i| format!("S{}", i)).collect()
    }

    #[tokio::test]
    async fn test_chunks_at_most_batch_size() {
        let lookup = MockLookup::new();
        let query = BatchQuery::new(&lookup, "DE")
            .with_batch_size(100)
            .with_failure_delay(Duration::ZERO);

        let outcome = query.run(&ids(250)).await;

        assert_eq!(outcome.batches, 3);
        assert_eq!(lookup.batch_sizes().await, vec![100, 100, 50]);
        assert!(outcome.failed_batches.is_empty());
    }

    #[tokio::test]
    async fn test_batch_size_is_capped() {
        let lookup = MockLookup::new();
        let query = BatchQuery::new(&lookup, "DE")
            .with_batch_size(500)
            .with_failure_delay(Duration::ZERO);

        query.run(&ids(150)).await;

        assert_eq!(lookup.batch_sizes().await, vec![100, 50]);
    }

    #[tokio::test]
    async fn test_missing_and_non_record_results_are_skipped() {
        let lookup = MockLookup::new()
            .with_record("S1", json!({"sellerName": "One"}))
            .with_record("S2", json!(null))
            .with_record("S3", json!("not a record"));
        let query = BatchQuery::new(&lookup, "DE").with_failure_delay(Duration::ZERO);

        let outcome = query.run(&ids(4)).await;

        assert_eq!(outcome.fetched.len(), 1);
        assert_eq!(outcome.fetched[0].seller_id, "S1");
    }

    #[tokio::test]
    async fn test_failed_batch_is_skipped_and_run_continues() {
        let lookup = MockLookup::new()
            .with_record("S1", json!({"country": "GB"}))
            .with_record("S3", json!({"country": "GB"}))
            .failing_on(2);
        let query = BatchQuery::new(&lookup, "DE")
            .with_batch_size(2)
            .with_failure_delay(Duration::from_millis(5));

        let outcome = query.run(&ids(5)).await;

        assert_eq!(outcome.batches, 3);
        assert_eq!(outcome.failed_batches, vec![2]);
        let fetched: Vec<&str> = outcome.fetched.iter().map(|f| f.seller_id.as_str()).collect();
        assert_eq!(fetched, vec!["S1"]);
        // failed batch is not attempted again
        assert_eq!(lookup.batch_sizes().await, vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn test_duplicate_ids_each_produce_a_record() {
        let lookup = MockLookup::new().with_record("A", json!({"country": "GB"}));
        let query = BatchQuery::new(&lookup, "DE");

        let outcome = query.run(&["A".to_string(), "A".to_string()]).await;

        assert_eq!(outcome.fetched.len(), 2);
    }

    #[tokio::test]
    async fn test_domain_and_options_are_forwarded() {
        let lookup = MockLookup::new();
        let query = BatchQuery::new(&lookup, "GB").with_options(LookupOptions { storefront: true });

        query.run(&ids(1)).await;

        let calls = lookup.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].domain, "GB");
        assert!(calls[0].options.storefront);
    }
}
