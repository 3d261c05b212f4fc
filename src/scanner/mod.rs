//! Run-file discovery.
//!
//! Simulation batches leave their output in directories named
//! `<prefix>_<model>` (e.g. `data_3`), one CSV per job. The scanner
//! walks the data root, collects run descriptors, and hands the caller
//! an explicit sorted list. Discovery is deliberately separate from
//! processing: the batch loop consumes descriptors and never touches
//! the directory tree itself.

use crate::models::RunFile;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Configuration for run discovery.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Data directory name prefix; `data` matches `data_0`, `data_flu`...
    pub data_dir_prefix: String,
    /// Maximum number of run files to return.
    pub max_files: Option<usize>,
    /// Restrict discovery to a single model id.
    pub model_filter: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            data_dir_prefix: "data".to_string(),
            max_files: None,
            model_filter: None,
        }
    }
}

/// Scanner for simulation output directories.
pub struct RunScanner {
    config: ScanConfig,
    data_root: PathBuf,
}

impl RunScanner {
    pub fn new(data_root: PathBuf, config: ScanConfig) -> Self {
        Self { config, data_root }
    }

    /// Discover all run files under the data root.
    ///
    /// Results are sorted by model id, then job name, so batches are
    /// deterministic regardless of directory iteration order.
    pub fn scan(&self) -> Result<Vec<RunFile>> {
        let mut runs = Vec::new();

        for entry in WalkDir::new(&self.data_root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.with_context(|| {
                format!("failed to walk data root {}", self.data_root.display())
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }

            let dir_name = entry.file_name().to_string_lossy().to_string();
            let Some(model_id) = self.model_id_of(&dir_name) else {
                debug!("skipping non-data directory {}", dir_name);
                continue;
            };

            if let Some(ref filter) = self.config.model_filter {
                if &model_id != filter {
                    continue;
                }
            }

            self.collect_jobs(entry.path(), &model_id, &mut runs)?;
        }

        runs.sort_by(|a, b| (&a.model_id, &a.job).cmp(&(&b.model_id, &b.job)));
        if let Some(max) = self.config.max_files {
            runs.truncate(max);
        }

        Ok(runs)
    }

    /// Extract the model id from a data directory name.
    ///
    /// The id is the part after the prefix and underscore: `data_3`
    /// yields `3`. Directories without the prefix are ignored.
    fn model_id_of(&self, dir_name: &str) -> Option<String> {
        let rest = dir_name.strip_prefix(&self.config.data_dir_prefix)?;
        let id = rest.strip_prefix('_')?;
        if id.is_empty() {
            return None;
        }
        Some(id.to_string())
    }

    /// Collect the CSV jobs inside one data directory.
    fn collect_jobs(&self, dir: &Path, model_id: &str, runs: &mut Vec<RunFile>) -> Result<()> {
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry =
                entry.with_context(|| format!("failed to read data directory {}", dir.display()))?;
            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }
            let is_csv = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if !is_csv {
                continue;
            }
            let Some(job) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            runs.push(RunFile {
                model_id: model_id.to_string(),
                job: job.to_string(),
                path: path.to_path_buf(),
            });
        }

        Ok(())
    }
}
