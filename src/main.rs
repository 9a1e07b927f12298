use clap::Parser;
use keepa_gb_sellers::utils::error::{ErrorSeverity, ScanError};
use keepa_gb_sellers::utils::{logger, validation::Validate};
use keepa_gb_sellers::{CliConfig, EtlEngine, KeepaClient, LocalStorage, SellerScanPipeline};

fn exit_with(e: &ScanError) -> ! {
    tracing::error!(
        "❌ Seller scan failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 依錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let work_dir = cli.work_dir.clone();
    let monitor_enabled = cli.monitor;

    let config = match cli.into_scan_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    tracing::debug!("Scan config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    let client = KeepaClient::new(config.api_key.clone())
        .with_base_url(config.api_base_url.clone())
        .with_max_token_waits(config.max_token_waits);
    let storage = LocalStorage::new(work_dir);
    let pipeline = SellerScanPipeline::new(storage, config, client);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("📁 Output saved to: {}", summary.output_path);
            println!(
                "Done. Wrote {} GB/UK sellers to {}",
                summary.matched, summary.output_path
            );
            Ok(())
        }
        Err(e) => exit_with(&e),
    }
}
