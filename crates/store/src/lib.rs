//! Durable survey persistence.
//!
//! [`SurveyStore`] maps survey ids to [`Survey`] records. Reads are served
//! from an in-memory mirror; every mutation synchronously rewrites the full
//! JSON snapshot on disk before returning, so a crash immediately after a
//! successful `put` never loses that write. The mirror lives behind a single
//! coarse mutex: the snapshot is recomputed whole on each write, and two
//! uncoordinated writers would otherwise lose updates last-write-wins.
//!
//! Snapshot format: one JSON object keyed by survey id. Timestamps are
//! RFC 3339 with their explicit offset and status is the lowercase tag, so
//! every field round-trips losslessly across a restart.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use formrelay_core::types::SurveyId;
use formrelay_core::{Survey, SurveyStatus};

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure while flushing or loading the snapshot.
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The record set could not be serialized.
    #[error("Store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed key-value store of survey records.
pub struct SurveyStore {
    path: PathBuf,
    inner: Mutex<BTreeMap<SurveyId, Survey>>,
}

impl SurveyStore {
    /// Open the store at `path`, loading any existing snapshot.
    ///
    /// A missing or corrupt snapshot initializes the store to empty rather
    /// than failing startup; corruption is logged at warn level.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let records = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<SurveyId, Survey>>(&raw) {
                Ok(records) => records,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "Survey snapshot is corrupt; starting with an empty store"
                    );
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        tracing::info!(
            path = %path.display(),
            surveys = records.len(),
            "Survey store opened"
        );

        Ok(Self {
            path,
            inner: Mutex::new(records),
        })
    }

    /// Path of the durable snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fetch a survey by id.
    pub fn get(&self, id: &str) -> Option<Survey> {
        self.lock().get(id).cloned()
    }

    /// Insert or replace a survey and flush the full snapshot to disk.
    pub fn put(&self, survey: Survey) -> Result<(), StoreError> {
        let mut records = self.lock();
        records.insert(survey.id.clone(), survey);
        Self::flush(&self.path, &records)
    }

    /// List all records, filtering out deleted surveys unless asked.
    pub fn list(&self, include_deleted: bool) -> Vec<Survey> {
        self.lock()
            .values()
            .filter(|s| include_deleted || s.status != SurveyStatus::Deleted)
            .cloned()
            .collect()
    }

    /// Number of records, deleted included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<SurveyId, Survey>> {
        // A poisoned lock only means a panic mid-read; the map itself is
        // still coherent because every write flushes before unlocking.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Write the full record set to a sibling temp file, then rename it over
    /// the snapshot so readers never observe a torn write.
    fn flush(path: &Path, records: &BTreeMap<SurveyId, Survey>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(records)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}
