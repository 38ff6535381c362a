use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::record::{BirthdayRecord, HEADER};
use crate::store::RecordStore;

/// Markdown-table store. Genuinely append-only: prior lines are never
/// rewritten, new rows go through `OpenOptions::append`.
pub struct TextStore {
    path: PathBuf,
}

impl TextStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TextStore { path: path.into() }
    }

    /// Body lines parsed back into six-part tuples. Lines that do not split
    /// into exactly six non-empty cells (blank lines, stray text, rows with
    /// empty fields) are ignored; tolerating them beats refusing the file.
    fn parse_rows(content: &str) -> Vec<BirthdayRecord> {
        content
            .lines()
            .skip(2) // header + separator
            .filter(|line| line.trim().starts_with('|'))
            .filter_map(|line| {
                let parts: Vec<&str> = line
                    .trim()
                    .split('|')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .collect();
                let parts: [&str; 6] = parts.try_into().ok()?;
                Some(BirthdayRecord::from_fields(parts.map(str::to_string)))
            })
            .collect()
    }

    fn format_row(record: &BirthdayRecord) -> String {
        format!("| {} |\n", record.fields().join(" | "))
    }
}

impl RecordStore for TextStore {
    fn name(&self) -> &'static str {
        "text"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load_existing(&mut self) -> Result<HashSet<BirthdayRecord>> {
        if !self.path.exists() {
            return Ok(HashSet::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .context(format!("Failed to read table {}", self.path.display()))?;
        Ok(Self::parse_rows(&content).into_iter().collect())
    }

    fn append(&mut self, rows: &[BirthdayRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create dir {}", parent.display()))?;
        }

        let is_new = !self.path.exists();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context(format!("Failed to open table {}", self.path.display()))?;

        if is_new {
            writeln!(file, "| {} |", HEADER.join(" | "))?;
            writeln!(file, "|{}", "---|".repeat(HEADER.len()))?;
        }
        for record in rows {
            file.write_all(Self::format_row(record).as_bytes())?;
        }
        Ok(())
    }
}

// ── Tests ──
