//! Sensor arbiter: serializes all access to the single set of tank floats

use core::cell::Cell;

use embassy_sync::{
    blocking_mutex::{self, raw::CriticalSectionRawMutex},
    mutex::{Mutex, MutexGuard},
    signal::Signal,
};

use crate::{
    error::Error,
    hardware::Hardware,
    tank::{Level, TankId},
};

/// Gate and result hand-off for the floats.
///
/// The gate is held from the moment a read is requested until its result has been taken, so at
/// most one read is ever in flight.
pub struct Floats {
    /// Held for the whole request-to-result span of one read
    gate: Mutex<CriticalSectionRawMutex, ()>,
    /// The tank currently being read, if any
    reading: blocking_mutex::Mutex<CriticalSectionRawMutex, Cell<Option<TankId>>>,
    /// The level of the read in flight, set by the floats interrupt
    result: Signal<CriticalSectionRawMutex, Level>,
}

/// A float read in flight; the floats stay reserved until this is dropped
pub struct PendingRead<'a> {
    /// The arbiter the read belongs to
    floats: &'a Floats,
    /// The tank being read
    tank: TankId,
    /// Exclusive use of the floats
    _permit: MutexGuard<'a, CriticalSectionRawMutex, ()>,
}

impl Floats {
    /// Creates an idle arbiter
    pub const fn new() -> Self {
        Self {
            gate: Mutex::new(()),
            reading: blocking_mutex::Mutex::new(Cell::new(None)),
            result: Signal::new(),
        }
    }

    /// Waits until the floats are free, then starts reading `tank`
    pub async fn request_read<'a, H: Hardware>(&'a self, hardware: &H, tank: TankId) -> PendingRead<'a> {
        let permit = self.gate.lock().await;
        self.result.reset();
        self.reading.lock(|reading| reading.set(Some(tank)));
        trace!("floats: reading tank {}", tank.number());
        hardware.begin_sensor_read(tank);
        PendingRead {
            floats: self,
            tank,
            _permit: permit,
        }
    }

    /// Completes the read in flight with the level the floats measured
    ///
    /// # Errors
    /// Returns [`Error::NoReadInFlight`] if no read was requested; the floats are left untouched.
    pub fn complete<H: Hardware>(&self, hardware: &H) -> Result<TankId, Error> {
        let tank = self
            .reading
            .lock(Cell::take)
            .ok_or(Error::NoReadInFlight)?;
        let level = hardware.fetch_sensor_level();
        trace!("floats: tank {} reads {} gls.", tank.number(), level);
        self.result.signal(level);
        Ok(tank)
    }

    /// Whether a read is currently in flight
    pub fn is_busy(&self) -> bool {
        self.gate.try_lock().is_err()
    }
}

impl Default for Floats {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingRead<'_> {
    /// The tank being read
    pub const fn tank(&self) -> TankId {
        self.tank
    }

    /// Waits for the measured level.
    ///
    /// Cancel-safe: if the wait is dropped before the level arrives, the level is kept for the next
    /// call.
    pub async fn wait(&mut self) -> Level {
        self.floats.result.wait().await
    }

    /// Waits for the measured level and releases the floats
    pub async fn finish(mut self) -> Level {
        self.wait().await
    }
}
