use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use calamine::{open_workbook, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use crate::record::{BirthdayRecord, HEADER};
use crate::store::RecordStore;

const SHEET_NAME: &str = "Birthday Data";

/// Spreadsheet-backed store. The xlsx format has no true append, so the
/// sheet is rewritten whole on each save: header, prior rows in their
/// original order, then the new rows.
pub struct XlsxStore {
    path: PathBuf,
    rows: Vec<BirthdayRecord>,
}

impl XlsxStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        XlsxStore {
            path: path.into(),
            rows: Vec::new(),
        }
    }

    fn read_rows(&self) -> Result<Vec<BirthdayRecord>> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path)
            .context(format!("Failed to open workbook {}", self.path.display()))?;
        let Some(range) = workbook.worksheet_range_at(0) else {
            bail!("Workbook {} has no worksheet", self.path.display());
        };
        let range = range.context("Failed to read worksheet")?;

        // Every cell is coerced to text so a persisted empty cell and an
        // extracted empty string compare equal.
        let rows = range
            .rows()
            .skip(1)
            .map(|row| {
                BirthdayRecord::from_fields(std::array::from_fn(|i| {
                    row.get(i).map(|c| c.to_string()).unwrap_or_default()
                }))
            })
            .collect();
        Ok(rows)
    }

    fn write_all(&self) -> Result<()> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, header) in HEADER.iter().enumerate() {
            sheet.write_string(0, col as u16, *header)?;
        }
        for (r, record) in self.rows.iter().enumerate() {
            for (col, value) in record.fields().iter().enumerate() {
                sheet.write_string(r as u32 + 1, col as u16, *value)?;
            }
        }

        // Width hint per column: longest stringified cell, header included.
        for col in 0..HEADER.len() {
            let mut max_len = HEADER[col].chars().count();
            for record in &self.rows {
                max_len = max_len.max(record.fields()[col].chars().count());
            }
            sheet.set_column_width(col as u16, (max_len as f64 + 2.0) * 1.2)?;
        }

        workbook
            .save(&self.path)
            .context(format!("Failed to save workbook {}", self.path.display()))?;
        Ok(())
    }
}

impl RecordStore for XlsxStore {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load_existing(&mut self) -> Result<HashSet<BirthdayRecord>> {
        self.rows = if self.path.exists() {
            self.read_rows()?
        } else {
            Vec::new()
        };
        Ok(self.rows.iter().cloned().collect())
    }

    fn append(&mut self, rows: &[BirthdayRecord]) -> Result<()> {
        self.rows.extend_from_slice(rows);
        self.write_all()
    }
}

// ── Tests ──
