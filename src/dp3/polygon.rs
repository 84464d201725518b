use std::io::Read;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

use super::averaging::largest_divider;
use super::phasecenter::PhaseCenter;
use super::Dp3Error;

/// File name of the polygon lookup table written by the facet splitter.
pub const POLYGON_INFO: &str = "polygon_info.csv";

/// Directories searched for [`POLYGON_INFO`], relative to the start directory.
const SEARCH_DEPTH: usize = 3;

// ---------------------------------------------------------------------------
// polygon_info.csv
// ---------------------------------------------------------------------------

/// One row of `polygon_info.csv`. Extra columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PolygonRow {
    pub polygon_file: String,
    #[serde(default)]
    pub poly_center: Option<String>,
    #[serde(default)]
    pub dir: Option<String>,
    pub avg: f64,
    #[serde(default)]
    pub dir_name: Option<String>,
}

impl PolygonRow {
    /// `poly_center` when present, otherwise the facet direction `dir`.
    pub fn phase_center(&self) -> Result<PhaseCenter, Dp3Error> {
        let text = match non_empty(&self.poly_center) {
            Some(center) => center,
            None => {
                warn!("no poly_center in {POLYGON_INFO}, use dir instead.");
                non_empty(&self.dir)
                    .ok_or_else(|| Dp3Error::MissingPhaseCenter(self.polygon_file.clone()))?
            }
        };
        text.parse()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parsed polygon lookup table.
#[derive(Debug, Clone)]
pub struct PolygonTable {
    pub path: PathBuf,
    pub rows: Vec<PolygonRow>,
}

impl PolygonTable {
    /// Find [`POLYGON_INFO`] in `start` or up to three parent directories.
    pub fn locate(start: &Path) -> Result<PathBuf, Dp3Error> {
        let mut dir = start.to_path_buf();
        let mut searched = Vec::with_capacity(SEARCH_DEPTH + 1);
        for _ in 0..=SEARCH_DEPTH {
            let candidate = dir.join(POLYGON_INFO);
            if candidate.is_file() {
                return Ok(candidate);
            }
            searched.push(candidate.display().to_string());
            dir.push("..");
        }
        Err(Dp3Error::MissingPolygonInfo {
            searched: searched.join(", "),
        })
    }

    pub fn load(path: &Path) -> Result<Self, Dp3Error> {
        let reader = csv::Reader::from_path(path).map_err(|source| Dp3Error::PolygonTable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv(path, reader)
    }

    /// Parse a table from any reader; `path` is only used in messages.
    pub fn from_reader<R: Read>(path: &Path, reader: R) -> Result<Self, Dp3Error> {
        Self::from_csv(path, csv::Reader::from_reader(reader))
    }

    fn from_csv<R: Read>(path: &Path, mut reader: csv::Reader<R>) -> Result<Self, Dp3Error> {
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<PolygonRow>, csv::Error>>()
            .map_err(|source| Dp3Error::PolygonTable {
                path: path.to_path_buf(),
                source,
            })?;
        info!("read {} polygons from {}", rows.len(), path.display());
        Ok(PolygonTable {
            path: path.to_path_buf(),
            rows,
        })
    }

    /// Row whose `polygon_file` matches the base name of `region`.
    pub fn row_for_region(&self, region: &Path) -> Result<&PolygonRow, Dp3Error> {
        let name = region
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| region.display().to_string());
        self.rows
            .iter()
            .find(|row| row.polygon_file == name)
            .ok_or_else(|| Dp3Error::UnknownPolygon {
                polygon: name,
                table: self.path.clone(),
            })
    }
}

// ---------------------------------------------------------------------------
// Wide-field settings
// ---------------------------------------------------------------------------

/// Phase centre, averaging and naming for one facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideFieldSettings {
    pub phasecenter: PhaseCenter,
    pub freqavg: u32,
    pub timeavg: u32,
    pub dir_name: Option<String>,
}

impl WideFieldSettings {
    /// Derive the facet settings from its table row.
    ///
    /// The requested `avg` is reduced to the largest divider of
    /// `channels`. Time averaging is the same factor divided by the time
    /// pre-averaging already applied to the data, when known.
    pub fn resolve(row: &PolygonRow, channels: usize, preavg: Option<u32>) -> Result<Self, Dp3Error> {
        let requested = row.avg.max(0.0) as usize;
        let freqavg = largest_divider(channels, requested)? as u32;
        let timeavg = match preavg {
            Some(factor) if factor > 0 => (freqavg / factor).max(1),
            _ => freqavg,
        };
        Ok(WideFieldSettings {
            phasecenter: row.phase_center()?,
            freqavg,
            timeavg,
            dir_name: non_empty(&row.dir_name).map(str::to_string),
        })
    }
}
