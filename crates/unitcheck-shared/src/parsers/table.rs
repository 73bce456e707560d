//! Parser for whitespace-aligned tables (`systemctl list-units`,
//! `systemctl list-timers`).
//!
//! There is no fixed schema: column widths are detected from the header line
//! and every body line is sliced at the same character offsets. Cells may
//! contain single spaces (`Mon 2020-01-13 00:00:00 CET`), the last column
//! absorbs the rest of the line, and an unlabeled leading column carries the
//! `●` marker for failed units.
//!
//! ```text
//!   UNIT                LOAD   ACTIVE   SUB     DESCRIPTION
//! ● smartd.service      loaded failed   failed  Self Monitoring and Reporting Technology
//!   ssh.service         loaded active   running OpenBSD Secure Shell server
//! ```

use super::atoms::{ParseError, ParseErrorReason};
use serde::{Deserialize, Serialize};

const DEFAULT_SOURCE: &str = "table";

/// How column boundaries are detected in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Single spaces between word characters join a multi-word title
    /// (`UNIT ONE` becomes `unit_one`); a gap of two or more spaces separates
    /// columns.
    Standard,
    /// Every gap separates columns. systemd emits this when all values are
    /// shorter than their titles (`NEXT LEFT LAST PASSED UNIT ...`).
    Narrow,
}

impl Layout {
    fn min_gap(self) -> usize {
        match self {
            Layout::Standard => 2,
            Layout::Narrow => 1,
        }
    }
}

/// One body row as an ordered mapping from column key to trimmed cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    /// Cell value for a column key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Cell value, treating an empty cell as absent.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A parsed table: header, detected column geometry and raw body lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    source_id: String,
    layout: Layout,
    /// Normalized (lower-cased) header line
    header_row: String,
    /// Column titles as sliced from the header, possibly empty
    columns: Vec<String>,
    /// Keys used in rows: titles, or `column_<index>` for empty/duplicate titles
    keys: Vec<String>,
    /// Widths of every column except the last, which is open-ended
    column_lengths: Vec<usize>,
    body_rows: Vec<String>,
    /// 1-based line number of the first body row in the input
    first_body_line: usize,
}

impl Table {
    /// Parse a table with the standard layout.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::parse_layout(DEFAULT_SOURCE, text, Layout::Standard)
    }

    /// Parse a table whose columns may be separated by a single space.
    pub fn parse_narrow(text: &str) -> Result<Self, ParseError> {
        Self::parse_layout(DEFAULT_SOURCE, text, Layout::Narrow)
    }

    /// Parse a table that must contain the `expected` column keys.
    ///
    /// The standard layout is tried first; if a column is missing, the narrow
    /// layout is tried. Fails with `MissingColumn` when neither layout yields
    /// every expected column.
    pub fn parse_expecting(
        source_id: &str,
        text: &str,
        expected: &[&str],
    ) -> Result<Self, ParseError> {
        let standard = Self::parse_layout(source_id, text, Layout::Standard)?;
        let Some(missing) = standard.first_missing(expected) else {
            return Ok(standard);
        };

        let narrow = Self::parse_layout(source_id, text, Layout::Narrow)?;
        if narrow.first_missing(expected).is_none() {
            return Ok(narrow);
        }

        Err(ParseError::new(
            source_id,
            ParseErrorReason::MissingColumn(missing.to_string()),
            &standard.header_row,
        ))
    }

    fn parse_layout(source_id: &str, text: &str, layout: Layout) -> Result<Self, ParseError> {
        let mut lines = text
            .lines()
            .enumerate()
            .skip_while(|(_, line)| line.trim().is_empty());

        let Some((header_idx, raw_header)) = lines.next() else {
            return Err(ParseError::new(
                source_id,
                ParseErrorReason::MissingHeader,
                text,
            ));
        };

        let header_row = match layout {
            Layout::Standard => normalize_header(raw_header),
            Layout::Narrow => raw_header.to_ascii_lowercase(),
        };
        let column_lengths = detect_lengths(&header_row, layout.min_gap());
        let columns = split_row(&header_row, &column_lengths);
        let keys = column_keys(&columns);

        // The footer is separated from the body by a blank line
        let body_rows = lines
            .map(|(_, line)| line)
            .take_while(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            source_id: source_id.to_string(),
            layout,
            header_row,
            columns,
            keys,
            column_lengths,
            body_rows,
            first_body_line: header_idx + 2,
        })
    }

    fn first_missing<'a>(&self, expected: &[&'a str]) -> Option<&'a str> {
        expected
            .iter()
            .find(|name| !self.keys.iter().any(|k| k == *name))
            .copied()
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn header_row(&self) -> &str {
        &self.header_row
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Keys under which row cells are stored, in column order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn column_lengths(&self) -> &[usize] {
        &self.column_lengths
    }

    /// Character span of every column; the last span is open-ended.
    pub fn column_spans(&self) -> Vec<(usize, Option<usize>)> {
        let mut spans = Vec::with_capacity(self.column_lengths.len() + 1);
        let mut start = 0;
        for len in &self.column_lengths {
            spans.push((start, Some(start + len)));
            start += len;
        }
        spans.push((start, None));
        spans
    }

    pub fn body_rows(&self) -> &[String] {
        &self.body_rows
    }

    pub fn row_count(&self) -> usize {
        self.body_rows.len()
    }

    /// Slice body row `index` into a `Row`.
    ///
    /// Fails for an out-of-range index, or when a column boundary would cut
    /// through a word (the row does not follow the header geometry).
    pub fn get_row(&self, index: usize) -> Result<Row, ParseError> {
        let Some(line) = self.body_rows.get(index) else {
            return Err(ParseError::new(
                &self.source_id,
                ParseErrorReason::RowOutOfRange(index),
                "",
            ));
        };

        if cuts_through_word(line, &self.column_lengths) {
            return Err(
                ParseError::new(&self.source_id, ParseErrorReason::MalformedRow, line)
                    .with_line(self.first_body_line + index),
            );
        }

        let cells = self
            .keys
            .iter()
            .cloned()
            .zip(split_row(line, &self.column_lengths))
            .collect();
        Ok(Row { cells })
    }

    /// Well-formed rows in order. Malformed rows are skipped; see `issues`.
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        (0..self.row_count()).filter_map(move |i| self.get_row(i).ok())
    }

    /// Rows skipped by `rows`, as soft parse errors.
    pub fn issues(&self) -> Vec<ParseError> {
        (0..self.row_count())
            .filter_map(|i| self.get_row(i).err())
            .collect()
    }
}

/// Lower-case the header and join single-space separated words with `_`.
///
/// ASCII lower-casing keeps the character count unchanged, so offsets in the
/// normalized header are valid for the body rows.
pub fn normalize_header(header: &str) -> String {
    let chars: Vec<char> = header.chars().map(|c| c.to_ascii_lowercase()).collect();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let joins_words = c == ' '
                && i > 0
                && i + 1 < chars.len()
                && is_word(chars[i - 1])
                && is_word(chars[i + 1]);
            if joins_words {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Detect column widths from a header line.
///
/// A leading run of spaces is its own (unnamed) column. After that, a new
/// column starts at a non-space character preceded by at least `min_gap`
/// spaces. Returns the widths of all columns but the last.
pub fn detect_lengths(header: &str, min_gap: usize) -> Vec<usize> {
    let mut lengths = Vec::new();

    let prefix = header.chars().take_while(|c| *c == ' ').count();
    if prefix > 0 {
        lengths.push(prefix);
    }

    let mut word = 0;
    let mut gap = 0;
    for c in header.chars().skip(prefix) {
        if word > 0 && gap >= min_gap && c != ' ' {
            lengths.push(word + gap);
            word = 0;
            gap = 0;
        }

        if c == ' ' {
            gap += 1;
        } else {
            // A gap too narrow to separate columns belongs to the title
            word += gap + 1;
            gap = 0;
        }
    }

    lengths
}

/// Slice a line at consecutive character widths. The final cell takes the
/// remainder. Every cell is trimmed; a short line yields empty cells.
pub fn split_row(line: &str, lengths: &[usize]) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let cell = |from: usize, to: usize| -> String {
        let from = from.min(chars.len());
        let to = to.min(chars.len());
        chars[from..to].iter().collect::<String>().trim().to_string()
    };

    let mut cells = Vec::with_capacity(lengths.len() + 1);
    let mut right = 0;
    for len in lengths {
        let left = right;
        right += len;
        cells.push(cell(left, right));
    }
    cells.push(cell(right, chars.len()));
    cells
}

/// True if any column boundary falls between two non-space characters.
fn cuts_through_word(line: &str, lengths: &[usize]) -> bool {
    let chars: Vec<char> = line.chars().collect();
    let mut boundary = 0;
    for len in lengths {
        boundary += len;
        if boundary == 0 || boundary >= chars.len() {
            continue;
        }
        if !chars[boundary - 1].is_whitespace() && !chars[boundary].is_whitespace() {
            return true;
        }
    }
    false
}

fn column_keys(columns: &[String]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(columns.len());
    for (index, column) in columns.iter().enumerate() {
        if column.is_empty() || keys.contains(column) {
            keys.push(format!("column_{}", index));
        } else {
            keys.push(column.clone());
        }
    }
    keys
}
