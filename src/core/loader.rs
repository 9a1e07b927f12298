use crate::core::{SellerId, Storage};
use crate::utils::error::{Result, ScanError};

/// Trimmed, non-blank lines in file order. Duplicates are kept.
pub fn parse_seller_ids(content: &str) -> Vec<SellerId> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads the seller id list. A missing file or a file without any ids is a
/// configuration error, not something to recover from.
pub async fn load_seller_ids<S: Storage>(storage: &S, path: &str) -> Result<Vec<SellerId>> {
    let bytes = match storage.read_file(path).await {
        Ok(bytes) => bytes,
        Err(ScanError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScanError::config(format!(
                "Missing {}. Create it with one seller ID per line.",
                path
            )));
        }
        Err(e) => return Err(e),
    };

    let content = String::from_utf8(bytes).map_err(|e| ScanError::ValidationError {
        message: format!("{} is not valid UTF-8: {}", path, e),
    })?;

    let ids = parse_seller_ids(&content);
    if ids.is_empty() {
        return Err(ScanError::config(format!(
            "{} has no seller IDs. Add at least one.",
            path
        )));
    }

    tracing::info!("Loaded {} seller IDs from {}", ids.len(), path);
    Ok(ids)
}
