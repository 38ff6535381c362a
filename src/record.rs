/// Column headers shared by both stores, in persisted order.
pub const HEADER: [&str; 6] = [
    "Date",
    "Student Name",
    "Father's Name",
    "Mother's Name",
    "Class",
    "Section",
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One birthday card, flattened to six text fields. Equality over all six
/// fields is the deduplication identity; there is no surrogate id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BirthdayRecord {
    pub date_text: String,
    pub student_name: String,
    pub father_name: String,
    pub mother_name: String,
    pub class_info: String,
    pub section: String,
}

impl BirthdayRecord {
    pub fn from_fields(fields: [String; 6]) -> Self {
        let [date_text, student_name, father_name, mother_name, class_info, section] = fields;
        BirthdayRecord {
            date_text,
            student_name,
            father_name,
            mother_name,
            class_info,
            section,
        }
    }

    /// Fields in persisted column order.
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.date_text,
            &self.student_name,
            &self.father_name,
            &self.mother_name,
            &self.class_info,
            &self.section,
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|f| f.is_empty())
    }
}

/// Collapse internal whitespace runs and trim the ends.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sort key for a `"<day>,<month-abbrev>"` date string: `(month, day)` with
/// Jan..Dec mapped to 1..12. Anything unparseable maps to the `(0, 0)`
/// sentinel so malformed entries sort first instead of aborting the run.
pub fn day_month_key(date_text: &str) -> (u32, u32) {
    let Some((day, month_abbr)) = date_text.split_once(',') else {
        return (0, 0);
    };
    let Ok(day) = day.trim().parse::<u32>() else {
        return (0, 0);
    };
    match MONTHS.iter().position(|m| *m == month_abbr.trim()) {
        Some(i) => (i as u32 + 1, day),
        None => (0, 0),
    }
}

// ── Tests ──
