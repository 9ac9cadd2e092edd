//! Tank identifiers and level units

use core::fmt;

/// Number of monitored tanks
pub const TANK_COUNT: usize = 3;

/// Tank level in gallons, as reported by the floats
pub type Level = u16;

/// Index of a monitored tank, always in `0..TANK_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TankId(u8);

impl TankId {
    /// All tanks in scan order
    pub const ALL: [Self; TANK_COUNT] = [Self(0), Self(1), Self(2)];

    /// Creates a tank id from a zero-based index.
    ///
    /// # Panics
    /// Panics if `index` is not below [`TANK_COUNT`]; tank indices are fixed at build time, so an
    /// out-of-range index is a programming error.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(index: usize) -> Self {
        assert!(index < TANK_COUNT, "tank index out of range");
        Self(index as u8)
    }

    /// Maps an operator tank key (`'1'..='3'`) to its tank
    #[must_use]
    pub const fn from_key(code: u8) -> Option<Self> {
        match code {
            b'1'..=b'3' => Some(Self(code - b'1')),
            _ => None,
        }
    }

    /// Zero-based index into per-tank tables
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// One-based number shown to the operator
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0 + 1
    }

    /// The next tank in round-robin order
    #[must_use]
    pub const fn next(self) -> Self {
        Self((self.0 + 1) % TANK_COUNT as u8)
    }
}

impl fmt::Display for TankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tank {}", self.number())
    }
}
