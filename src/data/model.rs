use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Variant – which reduction method produced a result file
// ---------------------------------------------------------------------------

/// Processing variant encoded in the result file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// uv-plane subtraction of compact sources.
    Cb,
    /// Rudnick filtering in the image plane.
    Rudnick,
}

impl Variant {
    /// Report order: uv-subtracted results first.
    pub const ALL: [Variant; 2] = [Variant::Cb, Variant::Rudnick];

    /// Tag used in file names (`a399results_<tag>_3.txt`).
    pub fn tag(self) -> &'static str {
        match self {
            Variant::Cb => "cb",
            Variant::Rudnick => "rudnick",
        }
    }

    /// Section heading used in the printed report.
    pub fn heading(self) -> &'static str {
        match self {
            Variant::Cb => "UV-Subtract",
            Variant::Rudnick => "Rudnick",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// Measurement – the six numbers extracted from one result file
// ---------------------------------------------------------------------------

/// Statistics of a single Monte-Carlo run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub slope: f64,
    pub slope_err: f64,
    pub pearson: f64,
    pub pearson_err: f64,
    pub spearman: f64,
    pub spearman_err: f64,
}

// ---------------------------------------------------------------------------
// RunResult / ResultSet
// ---------------------------------------------------------------------------

/// One parsed result file together with where it came from.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub field: String,
    pub variant: Variant,
    pub path: PathBuf,
    pub measurement: Measurement,
}

/// Every result file collected for a set of fields.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// Parsed runs, grouped by field then variant, paths sorted within a group.
    pub runs: Vec<RunResult>,
    /// Fields in the order they were requested.
    pub fields: Vec<String>,
}

impl ResultSet {
    /// Number of parsed result files.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether no result file was found at all.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Label printed for a field: `a399` → `A399`, `bridge` → `Bridge`.
pub fn field_label(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
