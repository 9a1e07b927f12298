pub mod cli;
pub mod toml_config;

use crate::adapters::keepa::{domain_id, DEFAULT_BASE_URL, DEFAULT_MAX_TOKEN_WAITS};
use crate::core::batch::MAX_BATCH_SIZE;
use crate::core::{ConfigProvider, LookupOptions};
use crate::utils::error::{Result, ScanError};
use crate::utils::validation::{validate_path, validate_range, validate_secret, validate_url, Validate};
use std::path::{Path, PathBuf};
use std::time::Duration;
use self::toml_config::TomlConfig;

pub const API_KEY_VAR: &str = "KEEPA_API_KEY";
pub const DEFAULT_INPUT_PATH: &str = "seller_ids.txt";
pub const DEFAULT_OUTPUT_PATH: &str = "gb_sellers_in_de.csv";
pub const DEFAULT_DOMAIN: &str = "DE";
pub const DEFAULT_FAILURE_DELAY_SECS: u64 = 2;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "keepa-gb-sellers")]
#[command(about = "Find UK-established sellers in a list of Amazon seller IDs via Keepa")]
pub struct CliConfig {
    /// Seller ID list, one ID per line
    #[arg(long)]
    pub input: Option<String>,

    /// CSV file to write the matching sellers to
    #[arg(long)]
    pub output: Option<String>,

    /// Marketplace to query (DE, GB, US, ...)
    #[arg(long)]
    pub domain: Option<String>,

    /// Seller IDs per Keepa request (1-100)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Pause after a failed batch, in seconds
    #[arg(long)]
    pub failure_delay_secs: Option<u64>,

    /// Request storefront data as well
    #[arg(long)]
    pub storefront: bool,

    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Directory that relative input/output paths are resolved against
    #[arg(long, default_value = ".")]
    pub work_dir: String,

    /// Optional TOML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage after each phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Merges flags, the optional TOML file and the environment into the
    /// settings for one run. Loads `.env` first so the API key can live there.
    pub fn into_scan_config(self) -> Result<ScanConfig> {
        if let Some(path) = load_dotenv(&self.work_dir) {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        let file = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        let env_api_key = std::env::var(API_KEY_VAR).ok();

        Ok(ScanConfig::resolve(self.overrides(), file, env_api_key))
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_path: self.input.clone(),
            output_path: self.output.clone(),
            domain: self.domain.clone(),
            batch_size: self.batch_size,
            failure_delay_secs: self.failure_delay_secs,
            storefront: self.storefront.then_some(true),
            api_base_url: self.api_base_url.clone(),
        }
    }
}

/// Loads `<work_dir>/.env` if present, otherwise searches upwards from the
/// current directory. Variables already set in the process are kept.
pub fn load_dotenv(work_dir: &str) -> Option<PathBuf> {
    let local = Path::new(work_dir).join(".env");
    if dotenvy::from_path(&local).is_ok() {
        return Some(local);
    }
    dotenvy::dotenv().ok()
}

/// Values given explicitly for this run; `None` means "not set".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub domain: Option<String>,
    pub batch_size: Option<usize>,
    pub failure_delay_secs: Option<u64>,
    pub storefront: Option<bool>,
    pub api_base_url: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Clone)]
pub struct ScanConfig {
    pub input_path: String,
    pub output_path: String,
    pub domain: String,
    pub batch_size: usize,
    pub failure_delay: Duration,
    pub storefront: bool,
    pub api_key: String,
    pub api_base_url: String,
    pub max_token_waits: u32,
}

impl std::fmt::Debug for ScanConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanConfig")
            .field("input_path", &self.input_path)
            .field("output_path", &self.output_path)
            .field("domain", &self.domain)
            .field("batch_size", &self.batch_size)
            .field("failure_delay", &self.failure_delay)
            .field("storefront", &self.storefront)
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("max_token_waits", &self.max_token_waits)
            .finish()
    }
}

impl ScanConfig {
    /// Flag > TOML > default. The API key comes from the environment first,
    /// then from the TOML file.
    pub fn resolve(
        overrides: ConfigOverrides,
        file: TomlConfig,
        env_api_key: Option<String>,
    ) -> Self {
        let api_key = env_api_key
            .filter(|k| !k.trim().is_empty())
            .or(file.keepa.api_key)
            .map(|k| k.trim().to_string())
            .unwrap_or_default();

        Self {
            input_path: overrides
                .input_path
                .or(file.input.path)
                .unwrap_or_else(|| DEFAULT_INPUT_PATH.to_string()),
            output_path: overrides
                .output_path
                .or(file.output.path)
                .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
            domain: overrides
                .domain
                .or(file.keepa.domain)
                .map(|d| d.trim().to_uppercase())
                .unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            batch_size: overrides
                .batch_size
                .or(file.batch.size)
                .unwrap_or(MAX_BATCH_SIZE),
            failure_delay: Duration::from_secs(
                overrides
                    .failure_delay_secs
                    .or(file.batch.failure_delay_secs)
                    .unwrap_or(DEFAULT_FAILURE_DELAY_SECS),
            ),
            storefront: overrides
                .storefront
                .or(file.keepa.storefront)
                .unwrap_or(false),
            api_key,
            api_base_url: overrides
                .api_base_url
                .or(file.keepa.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_token_waits: file
                .keepa
                .max_token_waits
                .unwrap_or(DEFAULT_MAX_TOKEN_WAITS),
        }
    }
}

impl Validate for ScanConfig {
    fn validate(&self) -> Result<()> {
        validate_secret(API_KEY_VAR, Some(self.api_key.as_str()))?;
        validate_url("keepa.base_url", &self.api_base_url)?;
        validate_path("input.path", &self.input_path)?;
        validate_path("output.path", &self.output_path)?;
        validate_range("batch.size", self.batch_size, 1, MAX_BATCH_SIZE)?;

        if domain_id(&self.domain).is_none() {
            return Err(ScanError::InvalidConfigValueError {
                field: "keepa.domain".to_string(),
                value: self.domain.clone(),
                reason: "Unknown Keepa domain code. Use US, GB, DE, FR, JP, CA, IT, ES, IN or MX"
                    .to_string(),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for ScanConfig {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn domain(&self) -> &str {
        &self.domain
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn failure_delay(&self) -> Duration {
        self.failure_delay
    }

    fn lookup_options(&self) -> LookupOptions {
        LookupOptions {
            storefront: self.storefront,
        }
    }
}
