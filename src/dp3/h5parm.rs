use std::path::Path;
use std::process::Command;

use log::debug;

use super::Dp3Error;

/// Number of polarization products in a fulljones solution table.
const FULLJONES_POLS: usize = 4;

// ---------------------------------------------------------------------------
// Layout of an h5parm solution file
// ---------------------------------------------------------------------------

/// One solution table (`sol000/<name>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Soltab {
    pub name: String,
    /// Length of the `pol` axis, `None` when the table has no such axis.
    pub pol_entries: Option<usize>,
}

/// The solution tables of a solset, in the order they were encountered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct H5parmLayout {
    pub soltabs: Vec<Soltab>,
}

impl H5parmLayout {
    /// Fulljones when the first solution table carries all four
    /// polarization products.
    pub fn is_fulljones(&self) -> bool {
        self.soltabs
            .first()
            .and_then(|s| s.pol_entries)
            .is_some_and(|n| n == FULLJONES_POLS)
    }

    /// Build the layout from a recursive `h5ls -r` listing of the file.
    ///
    /// Relevant lines look like:
    /// ```text
    /// /sol000/amplitude000     Group
    /// /sol000/amplitude000/pol Dataset {4}
    /// ```
    pub fn from_h5ls(listing: &str, solset: &str) -> Self {
        let mut layout = H5parmLayout::default();

        for line in listing.lines() {
            let mut cols = line.split_whitespace();
            let (Some(path), Some(kind)) = (cols.next(), cols.next()) else {
                continue;
            };
            let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();

            match (parts.as_slice(), kind) {
                ([set, soltab], "Group") if *set == solset => {
                    layout.soltab_mut(soltab);
                }
                ([set, soltab, "pol"], "Dataset") if *set == solset => {
                    layout.soltab_mut(soltab).pol_entries = first_dimension(line);
                }
                _ => {}
            }
        }

        layout
    }

    fn soltab_mut(&mut self, name: &str) -> &mut Soltab {
        let idx = match self.soltabs.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.soltabs.push(Soltab {
                    name: name.to_string(),
                    pol_entries: None,
                });
                self.soltabs.len() - 1
            }
        };
        &mut self.soltabs[idx]
    }
}

/// First extent of an `h5ls` shape such as `{4}`, `{4/4}` or `{4, 2}`.
fn first_dimension(line: &str) -> Option<usize> {
    let start = line.find('{')? + 1;
    let end = start + line[start..].find('}')?;
    line[start..end]
        .split([',', '/'])
        .next()?
        .trim()
        .parse()
        .ok()
}

// ---------------------------------------------------------------------------
// Inspection seam
// ---------------------------------------------------------------------------

/// Reads the solution-table layout of an h5parm file.
pub trait SolutionInspector {
    fn inspect(&self, h5parm: &Path) -> Result<H5parmLayout, Dp3Error>;
}

/// Inspects h5parm files with the HDF5 `h5ls` tool.
#[derive(Debug, Clone)]
pub struct H5ls {
    pub program: String,
    pub solset: String,
}

impl Default for H5ls {
    fn default() -> Self {
        Self {
            program: "h5ls".to_string(),
            solset: "sol000".to_string(),
        }
    }
}

impl SolutionInspector for H5ls {
    fn inspect(&self, h5parm: &Path) -> Result<H5parmLayout, Dp3Error> {
        let output = Command::new(&self.program)
            .arg("-r")
            .arg(h5parm)
            .output()
            .map_err(|source| Dp3Error::Spawn {
                tool: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(Dp3Error::ToolFailed {
                tool: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        debug!("{} -r {}:\n{listing}", self.program, h5parm.display());
        let layout = H5parmLayout::from_h5ls(&listing, &self.solset);
        if layout.soltabs.is_empty() {
            return Err(Dp3Error::EmptySolutions(h5parm.to_path_buf()));
        }
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULLJONES: &str = "\
/                        Group
/sol000                  Group
/sol000/amplitude000     Group
/sol000/amplitude000/ant Dataset {62}
/sol000/amplitude000/pol Dataset {4}
/sol000/amplitude000/val Dataset {1439, 62, 24, 4}
/sol000/phase000         Group
/sol000/phase000/pol     Dataset {4}
";

    const SCALAR: &str = "\
/                          Group
/sol000                    Group
/sol000/phase000           Group
/sol000/phase000/ant       Dataset {62}
/sol000/phase000/val       Dataset {1439, 62, 24}
/sol000/amplitude000       Group
/sol000/amplitude000/pol   Dataset {2/Inf}
/sol001                    Group
/sol001/tec000             Group
";

    #[test]
    fn four_pol_entries_is_fulljones() {
        let layout = H5parmLayout::from_h5ls(FULLJONES, "sol000");
        assert!(layout.is_fulljones());
        assert_eq!(layout.soltabs[0].pol_entries, Some(4));
    }

    #[test]
    fn soltabs_keep_listing_order() {
        let layout = H5parmLayout::from_h5ls(SCALAR, "sol000");
        assert!(!layout.is_fulljones());
        let names: Vec<&str> = layout.soltabs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["phase000", "amplitude000"]);
        assert_eq!(layout.soltabs[0].pol_entries, None);
        assert_eq!(layout.soltabs[1].pol_entries, Some(2));
    }

    #[test]
    fn shape_parsing() {
        assert_eq!(first_dimension("/a/pol Dataset {4}"), Some(4));
        assert_eq!(first_dimension("/a/pol Dataset {4/Inf}"), Some(4));
        assert_eq!(first_dimension("/a/val Dataset {10, 2}"), Some(10));
        assert_eq!(first_dimension("/a Group"), None);
    }
}
