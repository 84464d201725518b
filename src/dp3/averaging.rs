use std::str::FromStr;

use super::Dp3Error;

/// Averaging request for the DP3 averager step.
///
/// Decided once when the value is parsed: a string of digits is a
/// positive number of channels/timeslots to combine, anything else (`2MHz`,
/// `8s`, `48.8kHz`) is handed to DP3 as a resolution. A bare decimal such
/// as `4.5` is a resolution too, which DP3 reads in Hz or seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Averaging {
    Steps(u32),
    Resolution(String),
}

impl Averaging {
    /// `avg.freqstep=<n>` or `avg.freqresolution=<s>`.
    pub fn freq_token(&self) -> String {
        match self {
            Averaging::Steps(n) => format!("avg.freqstep={n}"),
            Averaging::Resolution(r) => format!("avg.freqresolution={r}"),
        }
    }

    /// `avg.timestep=<n>` or `avg.timeresolution=<s>`.
    pub fn time_token(&self) -> String {
        match self {
            Averaging::Steps(n) => format!("avg.timestep={n}"),
            Averaging::Resolution(r) => format!("avg.timeresolution={r}"),
        }
    }
}

impl FromStr for Averaging {
    type Err = Dp3Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Dp3Error::InvalidAveraging(s.to_string()));
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            return match s.parse::<u32>() {
                Ok(0) | Err(_) => Err(Dp3Error::InvalidAveraging(s.to_string())),
                Ok(n) => Ok(Averaging::Steps(n)),
            };
        }
        Ok(Averaging::Resolution(s.to_string()))
    }
}

/// Largest divisor of `channels` that does not exceed `max`.
///
/// Averaging factors must divide the channel count, so a requested factor
/// is rounded down to the nearest one that does.
pub fn largest_divider(channels: usize, max: usize) -> Result<usize, Dp3Error> {
    if channels == 0 {
        return Err(Dp3Error::NoDivider { channels, max });
    }
    (1..=max.min(channels))
        .rev()
        .find(|d| channels % d == 0)
        .ok_or(Dp3Error::NoDivider { channels, max })
}
