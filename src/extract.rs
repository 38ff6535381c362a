use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::record::{normalize_ws, BirthdayRecord};

static PANEL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#pnlBirthdayDescipBox2").unwrap());
static CARD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".card").unwrap());
static DATE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".date").unwrap());
static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".card-title").unwrap());
static TEXT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".card-text").unwrap());

/// Outer HTML of the birthday panel container, if the page has one.
/// This fragment is what gets fingerprinted and snapshotted.
pub fn panel_fragment(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    doc.select(&PANEL_SEL).next().map(|el| el.html())
}

/// Parse every `.card` fragment in the document into a record. Cards are
/// processed independently; one that yields nothing is logged and skipped
/// without aborting the rest.
pub fn extract_records(html: &str) -> Vec<BirthdayRecord> {
    let doc = Html::parse_document(html);
    doc.select(&CARD_SEL)
        .enumerate()
        .filter_map(|(i, card)| {
            let record = extract_card(card);
            if record.is_empty() {
                warn!("Skipping card #{}: no extractable fields", i + 1);
                None
            } else {
                Some(record)
            }
        })
        .collect()
}

/// Fields are positional: `.date` and `.card-title` sub-elements, then the
/// non-empty text lines of `.card-text` in document order. Missing pieces
/// degrade to empty strings rather than failing the card.
fn extract_card(card: ElementRef) -> BirthdayRecord {
    let date_text = sub_text(card, &DATE_SEL);
    let student_name = sub_text(card, &TITLE_SEL);

    let lines: Vec<String> = card
        .select(&TEXT_SEL)
        .next()
        .map(|el| {
            el.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    // line 0: "Father Name / phone", line 1: mother name,
    // line 2: "Class: 3 / A", line 3: "Section: B"
    let father_name = lines
        .first()
        .map(|l| normalize_ws(l.split('/').next().unwrap_or("")))
        .unwrap_or_default();
    let mother_name = lines.get(1).map(|l| normalize_ws(l)).unwrap_or_default();
    let class_info = lines
        .get(2)
        .map(|l| after_last_colon(l).split('/').next().unwrap_or("").trim().to_string())
        .unwrap_or_default();
    let section = lines
        .get(3)
        .map(|l| after_last_colon(l).trim().to_string())
        .unwrap_or_default();

    BirthdayRecord {
        date_text,
        student_name,
        father_name,
        mother_name,
        class_info,
        section,
    }
}

fn sub_text(card: ElementRef, sel: &Selector) -> String {
    card.select(sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn after_last_colon(s: &str) -> &str {
    s.rsplit(':').next().unwrap_or("")
}

// ── Tests ──
