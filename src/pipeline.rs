use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::Config;
use crate::record::{day_month_key, BirthdayRecord};
use crate::store::{merge, RecordStore, StoreReport, TextStore, XlsxStore};
use crate::{extract, fetch, fingerprint, snapshot};

/// Outcome of the single-document path.
pub enum ScrapeOutcome {
    Saved(PathBuf),
    Unchanged,
    NoPanel,
    FetchFailed,
}

/// Fetch the listing page once, isolate the birthday panel, and persist a
/// dated snapshot only when its fingerprint differs from the last run's.
/// The token is saved after the snapshot write, so a failed save never
/// marks the content as seen.
pub async fn scrape_once(cfg: &Config) -> Result<ScrapeOutcome> {
    let html = match fetch::fetch_page(&cfg.url).await {
        Ok(html) => html,
        Err(e) => {
            warn!("Fetch failed: {:#}", e);
            return Ok(ScrapeOutcome::FetchFailed);
        }
    };

    let Some(fragment) = extract::panel_fragment(&html) else {
        warn!("Birthday panel not found on page");
        return Ok(ScrapeOutcome::NoPanel);
    };

    let token = fingerprint::fingerprint(&fragment);
    let last = fingerprint::load_last(&cfg.fingerprint_file)?;
    if !fingerprint::has_changed(&token, last.as_deref()) {
        info!("No changes since last run");
        return Ok(ScrapeOutcome::Unchanged);
    }

    let path = snapshot::save_snapshot(&cfg.source_dir, &fragment)?;
    fingerprint::save(&cfg.fingerprint_file, &token)?;
    info!("New content saved to {}", path.display());
    Ok(ScrapeOutcome::Saved(path))
}

pub struct ProcessOutcome {
    pub files: usize,
    pub extracted: usize,
    pub unique: usize,
    pub stores: Vec<StoreReport>,
}

impl ProcessOutcome {
    pub fn all_ok(&self) -> bool {
        self.stores.iter().all(|s| s.ok())
    }

    pub fn print(&self) {
        println!(
            "Extracted {} records from {} files ({} unique).",
            self.extracted, self.files, self.unique
        );
        for report in &self.stores {
            match (&report.added, &report.error) {
                (Some(added), _) => println!(
                    "  {}: {} new rows -> {}",
                    report.name,
                    added,
                    report.path.display()
                ),
                (None, Some(e)) => println!("  {}: FAILED ({})", report.name, e),
                _ => {}
            }
        }
    }
}

/// Batch path: extract every card from every saved snapshot, dedupe the
/// aggregate, sort by calendar day, and merge into both stores. Stores are
/// independent; a failure in one is reported and the other still runs.
pub fn process(cfg: &Config) -> Result<ProcessOutcome> {
    let files = snapshot::collect_documents(&cfg.source_dir)
        .context(format!("Snapshot directory {} not readable", cfg.source_dir.display()))?;
    info!("Processing {} snapshot files", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len}")?
            .progress_chars("=> "),
    );

    let mut all = Vec::new();
    for path in &files {
        match std::fs::read_to_string(path) {
            Ok(html) => all.extend(extract::extract_records(&html)),
            Err(e) => warn!("Could not read {}: {}", path.display(), e),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let extracted = all.len();
    let unique: HashSet<BirthdayRecord> = all.into_iter().collect();
    let mut candidates: Vec<BirthdayRecord> = unique.into_iter().collect();
    // Secondary key keeps the output deterministic when calendar days tie.
    candidates.sort_by(|a, b| {
        day_month_key(&a.date_text)
            .cmp(&day_month_key(&b.date_text))
            .then_with(|| a.student_name.cmp(&b.student_name))
    });

    let mut xlsx = XlsxStore::new(&cfg.xlsx_store);
    let mut text = TextStore::new(&cfg.text_store);
    let stores: Vec<StoreReport> = [
        &mut xlsx as &mut dyn RecordStore,
        &mut text as &mut dyn RecordStore,
    ]
    .into_iter()
    .map(|store| merge_into(store, &candidates))
    .collect();

    Ok(ProcessOutcome {
        files: files.len(),
        extracted,
        unique: candidates.len(),
        stores,
    })
}

fn merge_into(store: &mut dyn RecordStore, candidates: &[BirthdayRecord]) -> StoreReport {
    let name = store.name();
    let path = store.path().to_path_buf();
    match merge(store, candidates) {
        Ok(added) => {
            info!("Saved {} new rows to {} store {}", added, name, path.display());
            StoreReport {
                name,
                path,
                added: Some(added),
                error: None,
            }
        }
        Err(e) => {
            warn!("{} store failed: {:#}", name, e);
            StoreReport {
                name,
                path,
                added: None,
                error: Some(format!("{:#}", e)),
            }
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn card(date: &str, title: &str, lines: &[&str]) -> String {
        let body: String = lines.iter().map(|l| format!("<p>{}</p>", l)).collect();
        format!(
            r#"<div class="card">
                 <span class="date">{}</span>
                 <h5 class="card-title">{}</h5>
                 <div class="card-text">{}</div>
               </div>"#,
            date, title, body
        )
    }

    fn page(cards: &str) -> String {
        format!(
            r#"<html><body><div id="pnlBirthdayDescipBox2">{}</div></body></html>"#,
            cards
        )
    }

    fn card_page(date: &str, title: &str, lines: &[&str]) -> String {
        page(&card(date, title, lines))
    }

    fn test_config(dir: &std::path::Path) -> Config {
        Config {
            url: "http://unused.invalid".into(),
            source_dir: dir.join("BD"),
            xlsx_store: dir.join("master.xlsx"),
            text_store: dir.join("html").join("master.md"),
            fingerprint_file: dir.join("last_hash.txt"),
        }
    }

    #[test]
    fn duplicate_documents_produce_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        std::fs::create_dir_all(&cfg.source_dir).unwrap();

        let page = card_page(
            "05,Jan",
            "Asha",
            &["Ram / 9876543210", "Sita", "Class: 3 / A", "Section: B"],
        );
        std::fs::write(cfg.source_dir.join("2026-01-01.html"), &page).unwrap();
        std::fs::write(cfg.source_dir.join("2026-01-02.html"), &page).unwrap();

        let outcome = process(&cfg).unwrap();
        assert_eq!(outcome.files, 2);
        assert_eq!(outcome.extracted, 2);
        assert_eq!(outcome.unique, 1);
        assert!(outcome.all_ok());

        let content = std::fs::read_to_string(&cfg.text_store).unwrap();
        let rows: Vec<&str> = content.lines().skip(2).collect();
        assert_eq!(rows, ["| 05,Jan | Asha | Ram | Sita | 3 | B |"]);

        let mut xlsx = XlsxStore::new(&cfg.xlsx_store);
        assert_eq!(xlsx.load_existing().unwrap().len(), 1);
    }

    #[test]
    fn rows_sorted_by_calendar_day_not_text() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        std::fs::create_dir_all(&cfg.source_dir).unwrap();

        let mut cards = String::new();
        for (date, name) in [("14,Mar", "Ravi"), ("05,Jan", "Asha"), ("bogus", "Zara")] {
            cards.push_str(&card(date, name, &["F / 1", "M", "Class: 1", "Section: A"]));
        }
        std::fs::write(cfg.source_dir.join("all.html"), page(&cards)).unwrap();

        process(&cfg).unwrap();
        let content = std::fs::read_to_string(&cfg.text_store).unwrap();
        let names: Vec<&str> = content
            .lines()
            .skip(2)
            .map(|l| l.split('|').nth(2).unwrap().trim())
            .collect();
        // Unparseable date floats to the front via the (0, 0) sentinel.
        assert_eq!(names, ["Zara", "Asha", "Ravi"]);
    }

    #[test]
    fn second_run_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        std::fs::create_dir_all(&cfg.source_dir).unwrap();
        let page = card_page("05,Jan", "Asha", &["Ram / 1", "Sita", "Class: 3", "Section: B"]);
        std::fs::write(cfg.source_dir.join("a.html"), &page).unwrap();

        let first = process(&cfg).unwrap();
        let second = process(&cfg).unwrap();
        assert_eq!(first.stores[0].added, Some(1));
        assert_eq!(first.stores[1].added, Some(1));
        assert_eq!(second.stores[0].added, Some(0));
        assert_eq!(second.stores[1].added, Some(0));
    }

    #[test]
    fn store_failures_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        // A directory where the workbook should be makes the xlsx open fail.
        std::fs::create_dir_all(&cfg.xlsx_store).unwrap();
        std::fs::create_dir_all(&cfg.source_dir).unwrap();
        let page = card_page("05,Jan", "Asha", &["Ram / 1", "Sita", "Class: 3", "Section: B"]);
        std::fs::write(cfg.source_dir.join("a.html"), &page).unwrap();

        let outcome = process(&cfg).unwrap();
        assert!(!outcome.all_ok());
        let xlsx = outcome.stores.iter().find(|s| s.name == "xlsx").unwrap();
        let text = outcome.stores.iter().find(|s| s.name == "text").unwrap();
        assert!(!xlsx.ok());
        assert!(text.ok());
        assert_eq!(text.added, Some(1));
    }

    #[test]
    fn unreadable_file_skipped_batch_continues() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        std::fs::create_dir_all(&cfg.source_dir).unwrap();
        // Invalid UTF-8 makes read_to_string fail for this file only.
        std::fs::write(cfg.source_dir.join("bad.html"), [0xff, 0xfe, 0xfd]).unwrap();
        let page = card_page("05,Jan", "Asha", &["Ram / 1", "Sita", "Class: 3", "Section: B"]);
        std::fs::write(cfg.source_dir.join("good.html"), &page).unwrap();

        let outcome = process(&cfg).unwrap();
        assert_eq!(outcome.unique, 1);
        assert!(outcome.all_ok());
    }
}
