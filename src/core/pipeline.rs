use crate::core::batch::BatchQuery;
use crate::core::country::infer_country;
use crate::core::filter::output_row;
use crate::core::loader::load_seller_ids;
use crate::core::{
    ConfigProvider, FetchedSeller, OutputRow, Pipeline, SellerLookup, Storage, TransformResult,
};
use crate::utils::error::Result;

/// Reads seller ids, looks them up in batches and writes the UK sellers to CSV.
pub struct SellerScanPipeline<S: Storage, C: ConfigProvider, L: SellerLookup> {
    storage: S,
    config: C,
    lookup: L,
}

impl<S: Storage, C: ConfigProvider, L: SellerLookup> SellerScanPipeline<S, C, L> {
    pub fn new(storage: S, config: C, lookup: L) -> Self {
        Self {
            storage,
            config,
            lookup,
        }
    }
}

/// CSV with the fixed header, written even when there are no rows.
pub fn render_csv(rows: &[OutputRow]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(OutputRow::HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, L: SellerLookup> Pipeline for SellerScanPipeline<S, C, L> {
    async fn extract(&self) -> Result<Vec<FetchedSeller>> {
        // 讀取賣家 ID，檔案不存在或為空時直接中止
        let seller_ids = load_seller_ids(&self.storage, self.config.input_path()).await?;

        let outcome = BatchQuery::new(&self.lookup, self.config.domain())
            .with_batch_size(self.config.batch_size())
            .with_failure_delay(self.config.failure_delay())
            .with_options(self.config.lookup_options())
            .run(&seller_ids)
            .await;

        if !outcome.failed_batches.is_empty() {
            tracing::warn!(
                "{} of {} batches failed: {:?}",
                outcome.failed_batches.len(),
                outcome.batches,
                outcome.failed_batches
            );
        }
        tracing::info!(
            "Fetched {} seller records for {} IDs",
            outcome.fetched.len(),
            seller_ids.len()
        );

        Ok(outcome.fetched)
    }

    async fn transform(&self, data: Vec<FetchedSeller>) -> Result<TransformResult> {
        let domain = self.config.domain();
        let mut rows = Vec::new();
        let mut undetermined = 0;

        for seller in &data {
            match infer_country(&seller.record) {
                Some(country) if country.is_target() => {
                    rows.push(output_row(seller, &country, domain));
                }
                Some(country) => {
                    tracing::debug!("Seller {} is established in {}", seller.seller_id, country);
                }
                None => {
                    undetermined += 1;
                    tracing::debug!("No country found for seller {}", seller.seller_id);
                }
            }
        }

        let csv_output = render_csv(&rows)?;

        Ok(TransformResult {
            rows,
            csv_output,
            inspected: data.len(),
            undetermined,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = self.config.output_path();

        tracing::debug!(
            "Writing {} rows ({} bytes) to {}",
            result.rows.len(),
            result.csv_output.len(),
            output_path
        );
        self.storage
            .write_file(output_path, result.csv_output.as_bytes())
            .await?;

        Ok(self.storage.display_path(output_path))
    }
}
