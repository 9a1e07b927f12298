use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Files relative to a working directory; absolute paths are used as given.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.resolve(path))?)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    fn display_path(&self, path: &str) -> String {
        if self.base_path == Path::new(".") {
            path.to_string()
        } else {
            self.resolve(path).display().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ScanError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_dirs_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_file("out/gb.csv", b"sellerId\n").await.unwrap();

        assert_eq!(storage.read_file("out/gb.csv").await.unwrap(), b"sellerId\n");
        assert!(dir.path().join("out/gb.csv").exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        match storage.read_file("seller_ids.txt").await {
            Err(ScanError::IoError(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_display_path() {
        assert_eq!(LocalStorage::new(".").display_path("gb.csv"), "gb.csv");
        assert_eq!(
            LocalStorage::new("/data").display_path("gb.csv"),
            Path::new("/data").join("gb.csv").display().to_string()
        );
    }
}
