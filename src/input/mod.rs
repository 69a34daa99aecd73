use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};

pub mod columns;
pub mod reader;

use crate::model::cohort::{Cohort, Participant, RiskTertile};
use columns::{ColumnMap, ResolvedColumns, resolve_columns};
use reader::{default_delimiter, open_maybe_gz};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing column: {0}")]
    MissingColumn(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parse error: {0}")]
    Parse(String),
}

const MISSING_TOKENS: [&str; 6] = ["", "na", "n/a", "nan", ".", "null"];

pub fn is_missing(raw: &str) -> bool {
    let t = raw.trim();
    MISSING_TOKENS.iter().any(|m| t.eq_ignore_ascii_case(m))
}

/// Missing tokens map to `None`; any other non-numeric text is an error.
pub fn parse_value(raw: &str, line: u64, column: &str) -> Result<Option<f64>, InputError> {
    if is_missing(raw) {
        return Ok(None);
    }
    let v: f64 = raw.trim().parse().map_err(|_| {
        InputError::Parse(format!(
            "line {line}, column {column}: '{}' is not a number",
            raw.trim()
        ))
    })?;
    if !v.is_finite() {
        return Err(InputError::Parse(format!(
            "line {line}, column {column}: non-finite value '{}'",
            raw.trim()
        )));
    }
    Ok(Some(v))
}

#[derive(Debug, Clone)]
pub struct LoadOptions<'a> {
    pub columns: &'a ColumnMap,
    pub covariates: &'a [String],
    pub delimiter: Option<u8>,
}

pub fn load_cohort(path: &Path, opts: &LoadOptions<'_>) -> Result<Cohort, InputError> {
    let delimiter = opts.delimiter.unwrap_or_else(|| default_delimiter(path));
    info!(
        path = %path.display(),
        delimiter = %(delimiter as char).escape_default(),
        "loading participant table"
    );

    let source = open_maybe_gz(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(source);

    let header: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let resolved = resolve_columns(&header, opts.columns, opts.covariates)?;
    debug!(?resolved, "resolved columns");

    let mut participants = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        let participant = parse_row(&record, line, &header, &resolved)?;
        if !seen_ids.insert(participant.id.clone()) {
            warn!(line, id = %participant.id, "duplicate participant id; keeping both rows");
        }
        participants.push(participant);
    }

    if participants.is_empty() {
        return Err(InputError::InvalidInput(format!(
            "{} contains no participant rows",
            path.display()
        )));
    }
    info!(n = participants.len(), "participant table loaded");

    Ok(Cohort {
        source: path.to_path_buf(),
        participants,
        covariate_names: opts.covariates.to_vec(),
    })
}

fn parse_row(
    record: &csv::StringRecord,
    line: u64,
    header: &[String],
    cols: &ResolvedColumns,
) -> Result<Participant, InputError> {
    let field = |idx: usize| record.get(idx).unwrap_or("");
    let numeric = |idx: usize| parse_value(field(idx), line, &header[idx]);

    let id = field(cols.id).to_string();
    if is_missing(&id) {
        return Err(InputError::InvalidInput(format!(
            "line {line}: empty participant id"
        )));
    }

    let mut domains = [None; 3];
    for (slot, &idx) in domains.iter_mut().zip(cols.domains.iter()) {
        *slot = numeric(idx)?;
    }
    let mut scores = [None; 2];
    for (slot, &idx) in scores.iter_mut().zip(cols.scores.iter()) {
        *slot = numeric(idx)?;
    }
    let mut tertiles = [None; 2];
    for (slot, &idx) in tertiles.iter_mut().zip(cols.tertiles.iter()) {
        let raw = field(idx);
        if is_missing(raw) {
            continue;
        }
        *slot = RiskTertile::parse(raw);
        if slot.is_none() {
            warn!(
                line,
                column = %header[idx],
                label = raw,
                "unrecognised tertile label; treating as missing"
            );
        }
    }
    let covariates = cols
        .covariates
        .iter()
        .map(|&idx| numeric(idx))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Participant {
        id,
        domains,
        scores,
        tertiles,
        covariates,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
