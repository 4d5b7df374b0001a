// src/case.rs - Persistent case numbering
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{ReportError, ReportResult};

/// Backing storage for the case counter.
///
/// Implementations only move text in and out; parsing and recovery from
/// corrupt contents happen in [`CaseAllocator`]. There is no locking, so a
/// store must have a single writer at a time.
pub trait CounterStore: Send + Sync {
    /// Raw persisted value, `None` if nothing has been stored yet
    fn load(&self) -> ReportResult<Option<String>>;

    /// Persist a new counter value
    fn store(&self, value: u64) -> ReportResult<()>;
}

/// Counter kept as a text-encoded integer in a file
pub struct FileCounterStore {
    path: PathBuf,
}

impl FileCounterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CounterStore for FileCounterStore {
    fn load(&self) -> ReportResult<Option<String>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ReportError::file(&self.path, e)),
        }
    }

    fn store(&self, value: u64) -> ReportResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ReportError::file(parent, e))?;
            }
        }

        std::fs::write(&self.path, value.to_string())
            .map_err(|e| ReportError::file(&self.path, e))
    }
}

/// In-memory counter, mostly for tests
#[derive(Default)]
pub struct MemoryCounterStore {
    value: Mutex<Option<String>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from arbitrary stored text, including garbage
    pub fn with_raw(raw: &str) -> Self {
        Self {
            value: Mutex::new(Some(raw.to_string())),
        }
    }
}

impl CounterStore for MemoryCounterStore {
    fn load(&self) -> ReportResult<Option<String>> {
        Ok(self.value.lock().clone())
    }

    fn store(&self, value: u64) -> ReportResult<()> {
        *self.value.lock() = Some(value.to_string());
        Ok(())
    }
}

/// Unique, human-readable identifier of one batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseId {
    value: String,
    sequence: u64,
}

impl CaseId {
    /// `{prefix}_{YYYYMMDD}_{seq:03}`
    pub fn new(prefix: &str, date: NaiveDate, sequence: u64) -> Self {
        Self {
            value: format!("{}_{}_{:03}", prefix, date.format("%Y%m%d"), sequence),
            sequence,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Allocates case ids from a monotonic counter
pub struct CaseAllocator<S: CounterStore> {
    store: S,
}

impl<S: CounterStore> CaseAllocator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Allocate the next case id stamped with the current UTC date
    pub fn allocate(&self, prefix: &str) -> ReportResult<CaseId> {
        self.allocate_on(prefix, Utc::now().date_naive())
    }

    /// Allocate the next case id stamped with `date`
    pub fn allocate_on(&self, prefix: &str, date: NaiveDate) -> ReportResult<CaseId> {
        let current = self.current()?;
        let next = current.saturating_add(1);
        self.store.store(next)?;

        let case_id = CaseId::new(prefix, date, next);
        debug!("Allocated case id {}", case_id);
        Ok(case_id)
    }

    /// Last allocated sequence number. Unparseable contents count as zero.
    fn current(&self) -> ReportResult<u64> {
        let Some(raw) = self.store.load()? else {
            return Ok(0);
        };

        match raw.trim().parse::<u64>() {
            Ok(n) => Ok(n),
            Err(_) => {
                warn!("Case counter holds {:?}, restarting from zero", raw.trim());
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_case_id_format() {
        let allocator = CaseAllocator::new(MemoryCounterStore::new());
        let id = allocator.allocate_on("openice_case", date()).unwrap();
        assert_eq!(id.as_str(), "openice_case_20240309_001");
        assert_eq!(id.sequence(), 1);
        assert_eq!(CaseId::new("x", date(), 1234).as_str(), "x_20240309_1234");
    }

    #[test]
    fn test_sequence_strictly_increasing() {
        let allocator = CaseAllocator::new(MemoryCounterStore::new());
        let ids: Vec<CaseId> = (0..25)
            .map(|_| allocator.allocate_on("case", date()).unwrap())
            .collect();

        for pair in ids.windows(2) {
            assert!(pair[1].sequence() > pair[0].sequence());
            assert_ne!(pair[0], pair[1]);
        }
        assert_eq!(ids.last().unwrap().as_str(), "case_20240309_025");
    }

    #[test]
    fn test_corrupt_counter_restarts_from_zero() {
        let allocator = CaseAllocator::new(MemoryCounterStore::with_raw("not-a-number"));
        let id = allocator.allocate_on("case", date()).unwrap();
        assert_eq!(id.sequence(), 1);
        assert_eq!(allocator.store().load().unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_counter_tolerates_whitespace() {
        let allocator = CaseAllocator::new(MemoryCounterStore::with_raw(" 41\n"));
        assert_eq!(allocator.allocate_on("case", date()).unwrap().sequence(), 42);
    }

    #[test]
    fn test_file_store_persists_across_allocators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(".case_counter");

        let first = CaseAllocator::new(FileCounterStore::new(&path))
            .allocate_on("case", date())
            .unwrap();
        let second = CaseAllocator::new(FileCounterStore::new(&path))
            .allocate_on("case", date())
            .unwrap();

        assert_eq!(first.sequence(), 1);
        assert_eq!(second.sequence(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2");
    }

    #[test]
    fn test_file_store_corrupt_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".case_counter");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let allocator = CaseAllocator::new(FileCounterStore::new(&path));
        assert_eq!(allocator.allocate_on("case", date()).unwrap().sequence(), 1);
    }
}
