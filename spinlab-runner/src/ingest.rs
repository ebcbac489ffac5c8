//! Outcome ingestion: free text and CSV into an `OutcomeSequence`.
//!
//! Text input accepts numbers separated by commas, whitespace or newlines;
//! anything after `#` on a line is a comment. CSV input reads the `number`
//! column when a header names one, otherwise the first column (a non-numeric
//! first row is taken as a header).
//!
//! Input is never coerced: a token that is not an integer in 0–36 fails with
//! its line number.

use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use spinlab_core::{Outcome, OutcomeError, OutcomeSequence};

/// Errors from reading spin input.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: '{token}' is not an integer")]
    NotANumber { line: u64, token: String },

    #[error("line {line}: {source}")]
    OutOfRange {
        line: u64,
        #[source]
        source: OutcomeError,
    },

    #[error("line {line}: row has no column {column}")]
    MissingColumn { line: u64, column: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn parse_token(token: &str, line: u64) -> Result<Outcome, IngestError> {
    let value: i64 = token.parse().map_err(|_| IngestError::NotANumber {
        line,
        token: token.to_string(),
    })?;
    Outcome::new(value).map_err(|source| IngestError::OutOfRange { line, source })
}

/// Parse free text into outcomes, in reading order.
pub fn parse_text(input: &str) -> Result<OutcomeSequence, IngestError> {
    let mut sequence = OutcomeSequence::new();
    for (idx, line) in input.lines().enumerate() {
        let line_no = idx as u64 + 1;
        let content = line.split('#').next().unwrap_or("");
        for token in content
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            sequence.push(parse_token(token, line_no)?);
        }
    }
    Ok(sequence)
}

/// Parse CSV rows into outcomes.
pub fn parse_csv<R: Read>(reader: R) -> Result<OutcomeSequence, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut sequence = OutcomeSequence::new();
    let mut column = 0;
    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        let line = record.position().map_or(idx as u64 + 1, |p| p.line());

        if idx == 0 {
            if let Some(pos) = record
                .iter()
                .position(|field| field.eq_ignore_ascii_case("number"))
            {
                column = pos;
                continue;
            }
            if record.get(0).is_some_and(|f| f.parse::<i64>().is_err()) {
                debug!(header = ?record, "treating first CSV row as header");
                continue;
            }
        }

        let field = record
            .get(column)
            .ok_or(IngestError::MissingColumn { line, column })?;
        if field.is_empty() {
            continue;
        }
        sequence.push(parse_token(field, line)?);
    }
    Ok(sequence)
}

/// Load a history file; `.csv` files go through the CSV reader, anything else
/// is treated as free text.
pub fn load_file(path: &Path) -> Result<OutcomeSequence, IngestError> {
    let io_err = |source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    };
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let sequence = if is_csv {
        let file = std::fs::File::open(path).map_err(io_err)?;
        parse_csv(file)?
    } else {
        let content = std::fs::read_to_string(path).map_err(io_err)?;
        parse_text(&content)?
    };
    debug!(path = %path.display(), spins = sequence.len(), "loaded history file");
    Ok(sequence)
}
