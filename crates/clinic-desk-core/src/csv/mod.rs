//! CSV exchange format for services and patient records.
//!
//! Rows are `\n`-separated with a header line. Fields containing `,`, `"` or
//! a newline are quoted with inner quotes doubled. Decoding splits on `\n`
//! before scanning fields, so quoted fields spanning lines are not supported.
//!
//! Decoding never fails: rows with too few columns are skipped and reported
//! in [`Decoded::skipped`], rows kept with a substituted value are listed in
//! [`Decoded::degraded`].

mod row;
mod schema;

pub use row::*;
pub use schema::*;

use tracing::{debug, warn};

/// A single encoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// String value, quoted when needed
    Text(String),
    /// Signed integer, written as bare digits
    Integer(i64),
    /// Unsigned integer, written as bare digits
    Unsigned(u64),
}

impl Field {
    fn render(&self) -> String {
        match self {
            Field::Text(s) => escape_field(s).into_owned(),
            Field::Integer(n) => n.to_string(),
            Field::Unsigned(n) => n.to_string(),
        }
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::Text(s.to_string())
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        Field::Text(s)
    }
}

/// Result of mapping one row's fields onto a record.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome<R> {
    /// Every field parsed
    Parsed(R),
    /// Kept, but one or more fields were replaced by a default
    Degraded(R, String),
    /// Not usable
    Skipped(String),
}

/// Column layout of one entity type.
pub trait CsvSchema {
    type Record;

    /// Column labels, written as the header line.
    const HEADER: &'static [&'static str];

    /// Rows with fewer fields than this are skipped.
    fn min_columns(&self) -> usize {
        Self::HEADER.len()
    }

    /// Fields for one record, in header order.
    fn to_fields(&self, record: &Self::Record) -> Vec<Field>;

    /// Map a scanned row onto a record. `fields.len() >= min_columns()` holds.
    fn from_fields(&self, fields: &[String]) -> RowOutcome<Self::Record>;
}

/// A row that was dropped during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the input text
    pub line: usize,
    pub reason: String,
}

/// A row that was kept with substituted values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedRow {
    /// 1-based line number in the input text
    pub line: usize,
    pub reason: String,
}

/// Output of [`decode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<R> {
    pub records: Vec<R>,
    pub skipped: Vec<SkippedRow>,
    pub degraded: Vec<DegradedRow>,
}

impl<R> Decoded<R> {
    /// True when every data row produced a record without substitutions.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.degraded.is_empty()
    }
}

/// Encode records as CSV text: a header line, then one line per record.
pub fn encode<S: CsvSchema>(records: &[S::Record], schema: &S) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(S::HEADER.join(","));

    for record in records {
        let line = schema
            .to_fields(record)
            .iter()
            .map(Field::render)
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    lines.join("\n")
}

/// Decode CSV text. The first line is treated as the header and ignored.
pub fn decode<S: CsvSchema>(text: &str, schema: &S) -> Decoded<S::Record> {
    let mut decoded = Decoded {
        records: Vec::new(),
        skipped: Vec::new(),
        degraded: Vec::new(),
    };

    for (idx, raw) in text.split('\n').enumerate().skip(1) {
        let line_no = idx + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() {
            continue;
        }

        let fields = parse_row(line);
        if fields.len() < schema.min_columns() {
            let reason = format!(
                "expected at least {} columns, found {}",
                schema.min_columns(),
                fields.len()
            );
            warn!(line = line_no, %reason, "Skipping CSV row");
            decoded.skipped.push(SkippedRow {
                line: line_no,
                reason,
            });
            continue;
        }

        match schema.from_fields(&fields) {
            RowOutcome::Parsed(record) => decoded.records.push(record),
            RowOutcome::Degraded(record, reason) => {
                warn!(line = line_no, %reason, "CSV row kept with default values");
                decoded.records.push(record);
                decoded.degraded.push(DegradedRow {
                    line: line_no,
                    reason,
                });
            }
            RowOutcome::Skipped(reason) => {
                warn!(line = line_no, %reason, "Skipping CSV row");
                decoded.skipped.push(SkippedRow {
                    line: line_no,
                    reason,
                });
            }
        }
    }

    debug!(
        records = decoded.records.len(),
        skipped = decoded.skipped.len(),
        degraded = decoded.degraded.len(),
        "Decoded CSV"
    );
    decoded
}
