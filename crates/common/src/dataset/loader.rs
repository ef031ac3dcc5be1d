//! Memoized dataset loading

use super::Dataset;
use crate::config::{ColumnMap, DatasetConfig};
use crate::errors::{AppError, Result};
use crate::metrics;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// Process-wide, lazily initialised dataset handle
///
/// The first successful load is kept for the lifetime of the process;
/// a failed load is not cached, so the next caller tries again.
pub struct DatasetLoader {
    path: PathBuf,
    columns: ColumnMap,
    cell: OnceCell<Arc<Dataset>>,
}

impl DatasetLoader {
    /// Create a loader for the configured file
    pub fn new(config: &DatasetConfig) -> Self {
        Self {
            path: config.path.clone(),
            columns: config.columns.clone(),
            cell: OnceCell::new(),
        }
    }

    /// Wrap an already loaded dataset
    pub fn preloaded(dataset: Dataset) -> Self {
        let path = PathBuf::from(dataset.source());
        let columns = dataset.columns().clone();
        Self {
            path,
            columns,
            cell: OnceCell::new_with(Some(Arc::new(dataset))),
        }
    }

    /// Get the dataset, reading the file on first use
    pub async fn get(&self) -> Result<Arc<Dataset>> {
        self.cell
            .get_or_try_init(|| self.load())
            .await
            .map(Arc::clone)
    }

    /// The dataset if it has already been loaded
    pub fn loaded(&self) -> Option<Arc<Dataset>> {
        self.cell.get().cloned()
    }

    async fn load(&self) -> Result<Arc<Dataset>> {
        let path = self.path.clone();
        let columns = self.columns.clone();
        let start = Instant::now();

        info!(path = %path.display(), "Loading dataset");

        let result = tokio::task::spawn_blocking(move || Dataset::from_path(&path, columns))
            .await
            .map_err(|e| AppError::Internal {
                message: format!("Dataset load task failed: {}", e),
            })?;

        match result {
            Ok(dataset) => {
                let elapsed = start.elapsed().as_secs_f64();
                metrics::record_dataset_load(elapsed, dataset.len());
                info!(
                    rows = dataset.len(),
                    duration_ms = (elapsed * 1000.0) as u64,
                    "Dataset loaded"
                );
                Ok(Arc::new(dataset))
            }
            Err(e) => {
                error!(error = %e, path = %self.path.display(), "Dataset load failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_for(path: PathBuf) -> DatasetConfig {
        DatasetConfig {
            path,
            ..DatasetConfig::default()
        }
    }

    #[tokio::test]
    async fn test_repeated_get_returns_identical_dataset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id_original,title_original\nx1,hello").unwrap();

        let loader = DatasetLoader::new(&config_for(file.path().to_path_buf()));
        assert!(loader.loaded().is_none());

        let first = loader.get().await.unwrap();
        // Storage is not read again once memoized
        std::fs::remove_file(file.path()).unwrap();
        let second = loader.get().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
        assert!(loader.loaded().is_some());
    }

    #[tokio::test]
    async fn test_failed_load_is_not_memoized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.csv");
        let loader = DatasetLoader::new(&config_for(path.clone()));

        let err = loader.get().await.unwrap_err();
        assert!(matches!(err, AppError::DatasetLoad { .. }));

        std::fs::write(&path, "id_original,title_original\nz9,arrived\n").unwrap();
        let dataset = loader.get().await.unwrap();
        assert_eq!(dataset.post_by_id("z9").unwrap().title.as_deref(), Some("arrived"));
    }

    #[tokio::test]
    async fn test_preloaded_skips_storage() {
        let loader = DatasetLoader::preloaded(super::super::fixtures::numbered(4));
        assert_eq!(loader.get().await.unwrap().len(), 4);
    }
}
