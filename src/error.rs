//! Errors reported back to the input layer for hardware events that had nothing to complete

use core::fmt;

/// A hardware interrupt arrived while the core was not waiting for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The floats reported a level but no sensor read was outstanding
    NoReadInFlight,
    /// The printer acknowledged a line but no report was being printed
    NoPrintJob,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoReadInFlight => write!(f, "float reading without an outstanding request"),
            Self::NoPrintJob => write!(f, "printer acknowledgment without a report in progress"),
        }
    }
}

impl core::error::Error for Error {}
