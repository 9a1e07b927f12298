use crate::core::{Pipeline, RunSummary};
use crate::utils::error::Result;
use crate::utils::monitor::ResourceMonitor;
use tokio::sync::Mutex;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: Mutex<ResourceMonitor>,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: Mutex::new(ResourceMonitor::new(monitor_enabled)),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting seller scan");
        let mut monitor = self.monitor.lock().await;

        // Extract
        let fetched = self.pipeline.extract().await?;
        monitor.log_phase("Extract");

        // Transform
        let result = self.pipeline.transform(fetched).await?;
        tracing::info!(
            "Inspected {} sellers: {} matched, {} without a country",
            result.inspected,
            result.rows.len(),
            result.undetermined
        );
        monitor.log_phase("Transform");

        // Load
        let matched = result.rows.len();
        let output_path = self.pipeline.load(result).await?;
        monitor.log_phase("Load");
        monitor.log_summary();

        Ok(RunSummary {
            matched,
            output_path,
        })
    }
}
