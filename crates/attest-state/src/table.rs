//! Table completeness scoring
//!
//! Completeness is the share of non-blank data cells in a comma
//! delimited table, in parts per million. The first row is a header and
//! never counted. A cell is blank when it is empty or equals one of the
//! sentinel values, compared case-insensitively.

use std::collections::HashSet;

use attest_core::{AttestError, AttestResult, PER_MILLION};

/// Sentinels treated as blank unless configured otherwise
pub const DEFAULT_BLANK_SENTINELS: &[&str] = &["na"];

/// Cell counts of a table body
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellTally {
    pub total: u64,
    pub blank: u64,
}

impl CellTally {
    /// Non-blank share in parts per million, rounded down.
    ///
    /// Undefined for a table without data cells.
    pub fn completeness(&self) -> AttestResult<u64> {
        if self.total == 0 {
            return Err(AttestError::EmptyTable);
        }
        let filled = (self.total - self.blank) as u128;
        Ok((PER_MILLION as u128 * filled / self.total as u128) as u64)
    }
}

/// Scores tables against a fixed set of blank sentinels
#[derive(Clone, Debug)]
pub struct TableScorer {
    sentinels: HashSet<String>,
}

impl TableScorer {
    pub fn new<I, S>(sentinels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TableScorer {
            sentinels: sentinels
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    fn is_blank(&self, cell: &str) -> bool {
        cell.is_empty() || self.sentinels.contains(&cell.to_lowercase())
    }

    /// Count total and blank cells, skipping the header row
    pub fn tally(&self, table: &[u8]) -> AttestResult<CellTally> {
        check_quotes(table)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(table);

        let mut tally = CellTally::default();
        for record in reader.records() {
            let record = record.map_err(|e| AttestError::TableParse(e.to_string()))?;
            for cell in record.iter() {
                tally.total += 1;
                if self.is_blank(cell) {
                    tally.blank += 1;
                }
            }
        }
        Ok(tally)
    }

    pub fn completeness(&self, table: &[u8]) -> AttestResult<u64> {
        self.tally(table)?.completeness()
    }
}

/// Reject quoting the csv reader would otherwise tolerate.
///
/// A quote may only open a field, close it right before a delimiter or
/// line end, or appear doubled inside a quoted field.
fn check_quotes(table: &[u8]) -> AttestResult<()> {
    let mut line = 1;
    let mut field_start = true;
    let mut in_quotes = false;
    let mut bytes = table.iter().copied().peekable();

    while let Some(byte) = bytes.next() {
        if byte == b'\n' {
            line += 1;
        }
        if in_quotes {
            if byte == b'"' {
                if bytes.peek() == Some(&b'"') {
                    bytes.next();
                    continue;
                }
                in_quotes = false;
                match bytes.peek() {
                    None | Some(b',') | Some(b'\n') | Some(b'\r') => {}
                    Some(_) => {
                        return Err(AttestError::TableParse(format!(
                            "extraneous \" in quoted field, line {}",
                            line
                        )))
                    }
                }
            }
            continue;
        }
        match byte {
            b'"' if field_start => {
                in_quotes = true;
                field_start = false;
            }
            b'"' => {
                return Err(AttestError::TableParse(format!(
                    "bare \" in non-quoted field, line {}",
                    line
                )))
            }
            b',' | b'\n' | b'\r' => field_start = true,
            _ => field_start = false,
        }
    }

    if in_quotes {
        return Err(AttestError::TableParse(format!(
            "unterminated quoted field, line {}",
            line
        )));
    }
    Ok(())
}

impl Default for TableScorer {
    fn default() -> Self {
        TableScorer::new(DEFAULT_BLANK_SENTINELS)
    }
}

/// Completeness of `table` with the default sentinels
pub fn completeness(table: &str) -> AttestResult<u64> {
    TableScorer::default().completeness(table.as_bytes())
}
