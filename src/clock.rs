//! Time service: the time since the monitor started, advanced by one-third-second ticks

use core::{cell::Cell, fmt};

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use embassy_time::Duration;

/// How often the timer hardware is expected to call [`Clock::tick`]
pub const TICK_INTERVAL: Duration = Duration::from_millis(333);

/// A time of day with third-of-a-second resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Time {
    /// Hours, `0..24`
    pub hours: u8,
    /// Minutes, `0..60`
    pub minutes: u8,
    /// Seconds, `0..60`
    pub seconds: u8,
    /// Tenths of a second, one of `0`, `3` or `7`
    pub tenths: u8,
}

impl Time {
    /// Midnight, when the monitor starts counting
    pub const MIDNIGHT: Self = Self {
        hours: 0,
        minutes: 0,
        seconds: 0,
        tenths: 0,
    };

    /// Advances by one third of a second, returning whether a new second started
    pub const fn advance(&mut self) -> bool {
        self.tenths = match self.tenths {
            0 => 3,
            3 => 7,
            _ => 0,
        };
        if self.tenths != 0 {
            return false;
        }

        self.seconds += 1;
        if self.seconds == 60 {
            self.seconds = 0;
            self.minutes += 1;
            if self.minutes == 60 {
                self.minutes = 0;
                self.hours = (self.hours + 1) % 24;
            }
        }
        true
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// The monitor clock, safe to read and tick from any task or interrupt
pub struct Clock {
    /// Current time, only touched inside the lock
    time: Mutex<CriticalSectionRawMutex, Cell<Time>>,
}

impl Clock {
    /// Creates a clock starting at midnight
    pub const fn new() -> Self {
        Self {
            time: Mutex::new(Cell::new(Time::MIDNIGHT)),
        }
    }

    /// Consistent snapshot of the current time
    pub fn now(&self) -> Time {
        self.time.lock(Cell::get)
    }

    /// Advances the clock by one tick, returning whether a new second started
    pub fn tick(&self) -> bool {
        self.time.lock(|time| {
            let mut now = time.get();
            let rolled = now.advance();
            time.set(now);
            rolled
        })
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
