use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use super::model::{Measurement, ResultSet, RunResult, Variant};

/// Prefix of the regression line (line index 3) in every result file.
pub const SLOPE_PREFIX: &str = "Linear regression slope is ";

/// Line index of the regression slope.
const SLOPE_LINE: usize = 3;

/// Errors raised while collecting result files.
#[derive(Error, Debug)]
pub enum ResultFileError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: expected at least {expected} lines, found {found}", .path.display())]
    TooShort {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("{}, line {line}: {reason}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

type Result<T> = core::result::Result<T, ResultFileError>;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Collect every result file for `fields` (both variants) below `dir`.
///
/// A malformed file aborts the whole collection.
pub fn load_results(dir: &Path, fields: &[String]) -> Result<ResultSet> {
    let mut runs = Vec::new();

    for field in fields {
        for variant in Variant::ALL {
            let paths = discover(dir, field, variant)?;
            info!("{field} ({variant}): {} result files", paths.len());
            for path in paths {
                let measurement = load_measurement(&path)?;
                runs.push(RunResult {
                    field: field.clone(),
                    variant,
                    path,
                    measurement,
                });
            }
        }
    }

    Ok(ResultSet {
        runs,
        fields: fields.to_vec(),
    })
}

/// List files in `dir` named `<field>results_<variant>_*.txt`, sorted.
pub fn discover(dir: &Path, field: &str, variant: Variant) -> Result<Vec<PathBuf>> {
    let prefix = format!("{field}results_{}_", variant.tag());
    let read_err = |source| ResultFileError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with(&prefix) && name.ends_with(".txt") && entry.path().is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Read and parse one result file.
pub fn load_measurement(path: &Path) -> Result<Measurement> {
    let text = fs::read_to_string(path).map_err(|source| ResultFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("parsing {}", path.display());
    parse_measurement(path, &text)
}

// ---------------------------------------------------------------------------
// Fixed-offset parser
// ---------------------------------------------------------------------------

/// Extract the six statistics from the text of a result file.
///
/// Layout (0-based line indices, `n` lines in total):
/// * `3`     – `Linear regression slope is X +- Y`
/// * `n - 4` – Pearson R as the first token, e.g. `(0.85, 1.2e-9)`
/// * `n - 3` – Pearson R error as the last token
/// * `n - 2` – Spearman R as the first token
/// * `n - 1` – Spearman R error as the last token
///
/// `path` is only used for error messages.
pub fn parse_measurement(path: &Path, text: &str) -> Result<Measurement> {
    let lines: Vec<&str> = text.lines().collect();
    let n = lines.len();
    if n <= SLOPE_LINE {
        return Err(ResultFileError::TooShort {
            path: path.to_path_buf(),
            expected: SLOPE_LINE + 1,
            found: n,
        });
    }

    let field = |idx: usize, token: Option<&str>, what: &str| -> Result<f64> {
        let malformed = |reason: String| ResultFileError::Malformed {
            path: path.to_path_buf(),
            line: idx + 1,
            reason,
        };
        let token = token.ok_or_else(|| malformed(format!("missing {what}")))?;
        token
            .parse::<f64>()
            .map_err(|_| malformed(format!("{what} '{token}' is not a number")))
    };

    let slope_line = lines[SLOPE_LINE].trim_start();
    let Some(slope_tail) = slope_line.strip_prefix(SLOPE_PREFIX) else {
        return Err(ResultFileError::Malformed {
            path: path.to_path_buf(),
            line: SLOPE_LINE + 1,
            reason: format!("expected '{SLOPE_PREFIX}X +- Y', got '{slope_line}'"),
        });
    };
    let slope = field(SLOPE_LINE, slope_tail.split_whitespace().next(), "slope")?;
    let slope_err = field(SLOPE_LINE, slope_tail.split_whitespace().last(), "slope error")?;

    let pearson_cell = first_token(lines[n - 4]);
    let spearman_cell = first_token(lines[n - 2]);

    Ok(Measurement {
        slope,
        slope_err,
        pearson: field(n - 4, pearson_cell.as_deref(), "Pearson R")?,
        pearson_err: field(n - 3, lines[n - 3].split_whitespace().last(), "Pearson R error")?,
        spearman: field(n - 2, spearman_cell.as_deref(), "Spearman R")?,
        spearman_err: field(n - 1, lines[n - 1].split_whitespace().last(), "Spearman R error")?,
    })
}

/// First whitespace token with tuple punctuation removed: `(0.85,` → `0.85`.
fn first_token(line: &str) -> Option<String> {
    line.split_whitespace()
        .next()
        .map(|tok| tok.replace(['(', ','], ""))
}
