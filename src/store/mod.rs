pub mod text;
pub mod xlsx;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::record::BirthdayRecord;

pub use text::TextStore;
pub use xlsx::XlsxStore;

/// One persistent, append-only record collection. The two physical formats
/// differ; the dedup contract is shared via `merge`.
pub trait RecordStore {
    fn name(&self) -> &'static str;
    fn path(&self) -> &Path;

    /// All persisted rows as comparable records. A missing file is not an
    /// error: it reads as the empty set and the header gets written on the
    /// first append.
    fn load_existing(&mut self) -> Result<HashSet<BirthdayRecord>>;

    /// Append rows in the given order without touching existing rows.
    /// Must bootstrap the header even when `rows` is empty.
    fn append(&mut self, rows: &[BirthdayRecord]) -> Result<()>;
}

/// Append exactly the candidates absent from the store, in candidate order.
/// Each appended record counts as existing for the rest of the pass, so a
/// duplicate inside the batch is only ever written once. Returns the number
/// of genuinely new rows.
pub fn merge(store: &mut dyn RecordStore, candidates: &[BirthdayRecord]) -> Result<usize> {
    let mut existing = store.load_existing()?;
    let fresh: Vec<BirthdayRecord> = candidates
        .iter()
        .filter(|r| existing.insert((*r).clone()))
        .cloned()
        .collect();
    store.append(&fresh)?;
    Ok(fresh.len())
}

/// Per-store outcome of one merge pass. Stores are independent; one failing
/// never aborts the sibling, so each carries its own error.
pub struct StoreReport {
    pub name: &'static str,
    pub path: PathBuf,
    pub added: Option<usize>,
    pub error: Option<String>,
}

impl StoreReport {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

// ── Tests ──
