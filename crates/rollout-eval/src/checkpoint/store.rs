//! Append-only JSONL checkpoint store

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use rollout_core::{RolloutError, RolloutResult};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::sample::{EvalSample, SampleFailure};

/// Durable record of completed samples
///
/// ```text
/// results.jsonl            one EvalSample per line, in completion order
/// results.failures.jsonl   one SampleFailure per line (informational)
/// ```
///
/// The store is the only writer of both files. Completed samples are buffered
/// and written `save_interval` at a time; [`CheckpointStore::flush`] writes
/// whatever is left.
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    failures_path: PathBuf,
    save_interval: usize,
    /// Records found in the log at open, in file order
    recovered: Vec<EvalSample>,
    /// sample_id -> index into `recovered`
    recovered_index: HashMap<String, usize>,
    /// Every sample id in the log or waiting to be written
    completed: HashSet<String>,
    pending: Vec<EvalSample>,
    written: usize,
}

impl CheckpointStore {
    /// Open the store, reading any existing log.
    ///
    /// A log that exists but cannot be read or parsed fails the open. A
    /// record cut short at the end of the log is dropped and the file
    /// truncated, so the next append starts on a clean line.
    pub async fn open(path: impl Into<PathBuf>, save_interval: usize) -> RolloutResult<Self> {
        if save_interval < 1 {
            return Err(RolloutError::config("save_interval must be >= 1"));
        }

        let path = path.into();
        let failures_path = failures_path_for(&path);
        let LogContents {
            records,
            torn_tail,
            missing_newline,
        } = read_log(&path).await?;
        if let Some(len) = torn_tail {
            truncate_to(&path, len).await?;
        } else if missing_newline {
            append_to(&path, b"\n").await?;
        }

        let mut recovered = Vec::with_capacity(records.len());
        let mut recovered_index = HashMap::with_capacity(records.len());
        for record in records {
            if recovered_index.contains_key(&record.sample_id) {
                warn!(
                    sample_id = %record.sample_id,
                    path = %path.display(),
                    "Duplicate record in checkpoint log, keeping the first"
                );
                continue;
            }
            recovered_index.insert(record.sample_id.clone(), recovered.len());
            recovered.push(record);
        }

        let completed: HashSet<String> = recovered_index.keys().cloned().collect();
        if !recovered.is_empty() {
            info!(
                path = %path.display(),
                recovered = recovered.len(),
                "Resuming from checkpoint"
            );
        }

        Ok(Self {
            path,
            failures_path,
            save_interval,
            recovered,
            recovered_index,
            completed,
            pending: Vec::new(),
            written: 0,
        })
    }

    /// Path of the checkpoint log
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the failure sidecar log
    pub fn failures_path(&self) -> &Path {
        &self.failures_path
    }

    /// Records recovered from a previous run, in log order
    pub fn recovered(&self) -> &[EvalSample] {
        &self.recovered
    }

    /// Look up a recovered record
    pub fn get_recovered(&self, sample_id: &str) -> Option<&EvalSample> {
        self.recovered_index
            .get(sample_id)
            .map(|&idx| &self.recovered[idx])
    }

    /// Whether the sample is already in the log or waiting to be written
    pub fn is_completed(&self, sample_id: &str) -> bool {
        self.completed.contains(sample_id)
    }

    /// Records buffered but not yet written
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Records written by this store instance
    pub fn written(&self) -> usize {
        self.written
    }

    /// Buffer a completed sample, flushing once `save_interval` are waiting.
    ///
    /// Returns `false` without buffering when the sample id is already known.
    pub async fn append(&mut self, sample: EvalSample) -> RolloutResult<bool> {
        if !self.completed.insert(sample.sample_id.clone()) {
            warn!(sample_id = %sample.sample_id, "Sample already checkpointed, not appending");
            return Ok(false);
        }

        self.pending.push(sample);
        if self.pending.len() >= self.save_interval {
            self.flush().await?;
        }
        Ok(true)
    }

    /// Write every buffered record to the log and sync it
    pub async fn flush(&mut self) -> RolloutResult<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let mut batch = String::new();
        for record in &self.pending {
            let json = serde_json::to_string(record).map_err(|e| {
                RolloutError::json(format!(
                    "Failed to serialize sample {}: {}",
                    record.sample_id, e
                ))
            })?;
            batch.push_str(&json);
            batch.push('\n');
        }

        append_to(&self.path, batch.as_bytes()).await?;

        let count = self.pending.len();
        self.pending.clear();
        self.written += count;
        debug!(path = %self.path.display(), count, total = self.written, "Flushed checkpoint");
        Ok(count)
    }

    /// Append a failure to the sidecar log immediately
    pub async fn record_failure(&self, failure: &SampleFailure) -> RolloutResult<()> {
        let mut line = serde_json::to_string(failure)
            .map_err(|e| RolloutError::json(format!("Failed to serialize failure: {}", e)))?;
        line.push('\n');
        append_to(&self.failures_path, line.as_bytes()).await
    }
}

/// Sidecar path: `dir/stem.failures.jsonl`
pub fn failures_path_for(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    path.with_file_name(format!("{}.failures.jsonl", stem))
}

/// Read every record of a checkpoint log.
///
/// A missing file yields no records; blank lines are skipped; any other line
/// that does not parse is an error naming the line number. A final line with
/// no trailing newline that does not parse is a write cut short and is
/// skipped with a warning.
pub async fn load_records(path: &Path) -> RolloutResult<Vec<EvalSample>> {
    Ok(read_log(path).await?.records)
}

/// Parsed log plus what a reopen has to repair before appending
struct LogContents {
    records: Vec<EvalSample>,
    /// Byte offset of a torn final record
    torn_tail: Option<u64>,
    /// The last record parsed but its newline never made it to disk
    missing_newline: bool,
}

async fn read_log(path: &Path) -> RolloutResult<LogContents> {
    let io_err = |action: &str, e: std::io::Error| {
        RolloutError::io_with_path(format!("{}: {}", action, e), path.display().to_string())
    };

    let mut contents = LogContents {
        records: Vec::new(),
        torn_tail: None,
        missing_newline: false,
    };

    let exists = fs::try_exists(path)
        .await
        .map_err(|e| io_err("Failed to check checkpoint log", e))?;
    if !exists {
        return Ok(contents);
    }

    let bytes = fs::read(path)
        .await
        .map_err(|e| io_err("Failed to read checkpoint log", e))?;

    let mut offset = 0usize;
    for (idx, line) in bytes.split_inclusive(|b| *b == b'\n').enumerate() {
        let line_start = offset;
        offset += line.len();
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<EvalSample>(line) {
            Ok(record) => {
                contents.missing_newline = !line.ends_with(b"\n");
                contents.records.push(record);
            }
            Err(e) if !line.ends_with(b"\n") => {
                warn!(
                    path = %path.display(),
                    line = idx + 1,
                    error = %e,
                    "Discarding partially written record at end of checkpoint log"
                );
                contents.torn_tail = Some(line_start as u64);
            }
            Err(e) => {
                return Err(RolloutError::Json {
                    message: format!("Corrupt checkpoint record at line {}: {}", idx + 1, e),
                    context: Some(path.display().to_string()),
                });
            }
        }
    }

    debug!(path = %path.display(), count = contents.records.len(), "Loaded checkpoint records");
    Ok(contents)
}

/// Cut the log back to `len` bytes so the next append starts on a fresh line
async fn truncate_to(path: &Path, len: u64) -> RolloutResult<()> {
    let io_err = |action: &str, e: std::io::Error| {
        RolloutError::io_with_path(format!("{}: {}", action, e), path.display().to_string())
    };

    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .await
        .map_err(|e| io_err("Failed to open checkpoint log", e))?;
    file.set_len(len)
        .await
        .map_err(|e| io_err("Failed to truncate checkpoint log", e))?;
    file.sync_data()
        .await
        .map_err(|e| io_err("Failed to sync checkpoint log", e))?;
    Ok(())
}

async fn append_to(path: &Path, bytes: &[u8]) -> RolloutResult<()> {
    let io_err = |action: &str, e: std::io::Error| {
        RolloutError::io_with_path(format!("{}: {}", action, e), path.display().to_string())
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| io_err("Failed to create checkpoint directory", e))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| io_err("Failed to open checkpoint log", e))?;

    file.write_all(bytes)
        .await
        .map_err(|e| io_err("Failed to write checkpoint log", e))?;
    file.flush()
        .await
        .map_err(|e| io_err("Failed to flush checkpoint log", e))?;
    file.sync_data()
        .await
        .map_err(|e| io_err("Failed to sync checkpoint log", e))?;

    Ok(())
}
