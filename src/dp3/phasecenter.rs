use std::fmt;
use std::str::FromStr;

use super::Dp3Error;

/// Target direction for the phase shifter, kept as the user wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseCenter {
    pub ra: String,
    pub dec: String,
}

impl FromStr for PhaseCenter {
    type Err = Dp3Error;

    /// Accepts `ra,dec` with or without surrounding brackets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s.replace(['[', ']'], "");
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [ra, dec] if !ra.is_empty() && !dec.is_empty() => Ok(PhaseCenter {
                ra: ra.to_string(),
                dec: dec.to_string(),
            }),
            _ => Err(Dp3Error::InvalidPhaseCenter(s.to_string())),
        }
    }
}

impl fmt::Display for PhaseCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.ra, self.dec)
    }
}
