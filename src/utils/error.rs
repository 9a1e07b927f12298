use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Provider returned {status}: {message}")]
    ProviderError { status: u16, message: String },

    #[error("Malformed provider response: {message}")]
    MalformedResponse { message: String },

    #[error("Provider tokens still exhausted after {attempts} waits")]
    RateLimitExhausted { attempts: u32 },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Provider,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ScanError {
    pub fn config(message: impl Into<String>) -> Self {
        ScanError::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ScanError::ConfigError { .. }
            | ScanError::MissingConfigError { .. }
            | ScanError::InvalidConfigValueError { .. }
            | ScanError::TomlError(_) => ErrorCategory::Configuration,
            ScanError::ApiError(_)
            | ScanError::ProviderError { .. }
            | ScanError::MalformedResponse { .. }
            | ScanError::RateLimitExhausted { .. } => ErrorCategory::Provider,
            ScanError::CsvError(_) | ScanError::ValidationError { .. } => ErrorCategory::Data,
            ScanError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Provider => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// True for errors that must stop the run before any provider call.
    pub fn is_fatal_config(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScanError::ConfigError { message } => message.clone(),
            ScanError::MissingConfigError { field } => {
                format!("Set {} in your .env file or environment", field)
            }
            ScanError::InvalidConfigValueError { field, value, reason } => {
                format!("Setting {} has an invalid value '{}': {}", field, value, reason)
            }
            ScanError::ProviderError { status, message } => {
                format!("Keepa rejected the request ({}): {}", status, message)
            }
            ScanError::RateLimitExhausted { .. } => {
                "Keepa token balance did not recover in time".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScanError::ConfigError { .. } => {
                "Check the input file path and that it lists one seller ID per line"
            }
            ScanError::MissingConfigError { .. } => {
                "Add KEEPA_API_KEY=<your key> to .env or export it before running"
            }
            ScanError::InvalidConfigValueError { .. } | ScanError::TomlError(_) => {
                "Fix the value in the command line flags or the TOML config file"
            }
            ScanError::ApiError(_) => "Check network connectivity and the API base URL",
            ScanError::ProviderError { status: 402, .. } => {
                "The Keepa subscription has no access; check the account plan"
            }
            ScanError::ProviderError { .. } | ScanError::MalformedResponse { .. } => {
                "Verify the API key and domain, then try again later"
            }
            ScanError::RateLimitExhausted { .. } => {
                "Wait for tokens to refill or use a smaller batch size"
            }
            ScanError::CsvError(_) | ScanError::IoError(_) => {
                "Check that the output location is writable"
            }
            ScanError::ValidationError { .. } => {
                "Check that the input data is valid UTF-8 text"
            }
        }
    }
}
