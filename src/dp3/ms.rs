use std::process::Command;

use log::{debug, warn};

use super::Dp3Error;

/// History key holding the time pre-averaging applied by the demixer.
pub const PREAVG_KEY: &str = "demixer.timestep=";

/// Reads metadata of a measurement set.
pub trait MsInspector {
    /// Number of frequency channels in the first spectral window.
    fn channel_count(&self, ms: &str) -> Result<usize, Dp3Error>;

    /// Text dump of the HISTORY subtable.
    fn history(&self, ms: &str) -> Result<String, Dp3Error>;
}

/// Queries measurement sets with casacore's `taql` tool.
#[derive(Debug, Clone)]
pub struct Taql {
    pub program: String,
}

impl Default for Taql {
    fn default() -> Self {
        Self {
            program: "taql".to_string(),
        }
    }
}

impl Taql {
    fn query(&self, query: &str) -> Result<String, Dp3Error> {
        debug!("{} \"{query}\"", self.program);
        let output = Command::new(&self.program)
            .arg(query)
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
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl MsInspector for Taql {
    fn channel_count(&self, ms: &str) -> Result<usize, Dp3Error> {
        let out = self.query(&format!("SELECT NUM_CHAN FROM {ms}::SPECTRAL_WINDOW"))?;
        parse_channel_count(&out).ok_or_else(|| Dp3Error::UnexpectedOutput {
            tool: self.program.clone(),
            reason: format!("no channel count for {ms}"),
        })
    }

    fn history(&self, ms: &str) -> Result<String, Dp3Error> {
        self.query(&format!("SELECT * FROM {ms}::HISTORY"))
    }
}

/// First line of `taql` output that is a plain integer.
pub fn parse_channel_count(output: &str) -> Option<usize> {
    output.lines().find_map(|line| line.trim().parse().ok())
}

/// The whitespace-separated history token containing `key`.
pub fn find_history_item<'a>(history: &'a str, key: &str) -> Option<&'a str> {
    history.split_whitespace().find(|item| item.contains(key))
}

/// First run of digits after `key` in a history token, e.g.
/// `demixer.timestep=4` → 4.
pub fn parse_preavg_factor(item: &str, key: &str) -> Option<u32> {
    let rest = item.replace(key, "");
    let digits: String = rest
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Time pre-averaging factor recorded in the MS history.
///
/// Any failure (tool error, missing key, unparsable value) is logged and
/// reported as `None` so the caller can keep its requested factor.
pub fn time_preavg_factor(inspector: &dyn MsInspector, ms: &str) -> Option<u32> {
    let history = match inspector.history(ms) {
        Ok(history) => history,
        Err(err) => {
            warn!("could not read history of {ms}: {err}");
            return None;
        }
    };
    let Some(item) = find_history_item(&history, PREAVG_KEY) else {
        warn!("{PREAVG_KEY} not found in history of {ms}");
        return None;
    };
    let Some(factor) = parse_preavg_factor(item, PREAVG_KEY) else {
        warn!("parsed factor in {ms} is not a digit: {item}");
        return None;
    };
    if factor != 1 {
        warn!("{ms} time has been pre-averaged with factor {factor}. This might cause time smearing effects.");
    }
    Some(factor)
}
