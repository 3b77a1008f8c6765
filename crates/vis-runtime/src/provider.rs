//! Sources of raw export text.

use std::future::Future;
use std::path::PathBuf;

use vis_core::error::{Result, VisError};

/// One user file choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub path: PathBuf,
}

impl FileSelection {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Supplies the full text of a selected file.
pub trait FileProvider: Send + Sync + 'static {
    fn read_text(&self, selection: &FileSelection) -> impl Future<Output = Result<String>> + Send;
}

/// Reads selections from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileProvider;

impl FileProvider for FsFileProvider {
    async fn read_text(&self, selection: &FileSelection) -> Result<String> {
        tokio::fs::read_to_string(&selection.path)
            .await
            .map_err(|source| VisError::FileRead {
                path: selection.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_fs_provider_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a~b\n1~2").unwrap();

        let text = FsFileProvider
            .read_text(&FileSelection::new(file.path()))
            .await
            .unwrap();
        assert_eq!(text, "a~b\n1~2");
    }

    #[tokio::test]
    async fn test_fs_provider_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.csv");

        let err = FsFileProvider
            .read_text(&FileSelection::new(&missing))
            .await
            .unwrap_err();
        match err {
            VisError::FileRead { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }
}
