pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(test)]
mod testing;

pub use adapters::KeepaClient;
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, ScanConfig};
pub use core::{etl::EtlEngine, pipeline::SellerScanPipeline};
pub use utils::error::{Result, ScanError};
