//! Overflow task: keeps re-reading rising tanks and raises the alarm before they overflow

use embassy_futures::select::{Either, select};

use crate::{
    TankMonitor,
    display::DisplayCommand,
    floats::PendingRead,
    hardware::Hardware,
    mailbox::Mailbox,
    tank::{Level, TANK_COUNT, TankId},
};

/// How many scans a rising tank stays on the watch list (about ten seconds of ticks)
pub const WATCH_WINDOW: u8 = 3 * 10;

/// Level at which a rising tank is considered to overflow
pub const OVERFLOW_THRESHOLD: Level = 7500;

/// Messages accepted by the overflow task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverflowMessage {
    /// One third of a second has passed
    Tick,
    /// The level task saw this tank rise
    Watch(TankId),
}

/// Outcome of a new reading of a watched tank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    /// Still rising and at or above [`OVERFLOW_THRESHOLD`]; the tank has left the watch list
    Overflow,
    /// Still rising below the threshold; the watch window starts over
    Rising,
    /// Not rising; the watch window keeps counting down
    Steady,
}

/// Watch state of one tank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct TankWatch {
    /// Scans left before the tank is dropped; zero means not watched
    remaining_ticks: u8,
    /// Level at the previous reading
    last_level: Level,
}

/// The tanks under observation and the round-robin scan position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchList {
    /// Watch state per tank
    tanks: [TankWatch; TANK_COUNT],
    /// The tank scanned last
    cursor: TankId,
}

impl WatchList {
    /// Creates a list with no tank watched
    pub const fn new() -> Self {
        Self {
            tanks: [TankWatch {
                remaining_ticks: 0,
                last_level: 0,
            }; TANK_COUNT],
            cursor: TankId::new(TANK_COUNT - 1),
        }
    }

    /// Starts (or restarts) watching `tank`, comparing future readings against `level`
    pub const fn watch(&mut self, tank: TankId, level: Level) {
        self.tanks[tank.index()] = TankWatch {
            remaining_ticks: WATCH_WINDOW,
            last_level: level,
        };
    }

    /// Whether `tank` is being watched
    pub const fn is_watching(&self, tank: TankId) -> bool {
        self.tanks[tank.index()].remaining_ticks > 0
    }

    /// Scans left for `tank`
    pub const fn remaining_ticks(&self, tank: TankId) -> u8 {
        self.tanks[tank.index()].remaining_ticks
    }

    /// Picks the next watched tank after the last one scanned and counts one scan against it
    pub fn next_to_read(&mut self) -> Option<TankId> {
        let mut tank = self.cursor;
        for _ in 0..TANK_COUNT {
            tank = tank.next();
            let watch = &mut self.tanks[tank.index()];
            if watch.remaining_ticks > 0 {
                watch.remaining_ticks -= 1;
                self.cursor = tank;
                return Some(tank);
            }
        }
        None
    }

    /// Compares a new reading of `tank` with the previous one
    pub const fn record(&mut self, tank: TankId, level: Level) -> Verdict {
        let watch = &mut self.tanks[tank.index()];
        let verdict = if level <= watch.last_level {
            Verdict::Steady
        } else if level >= OVERFLOW_THRESHOLD {
            watch.remaining_ticks = 0;
            Verdict::Overflow
        } else {
            watch.remaining_ticks = WATCH_WINDOW;
            Verdict::Rising
        };
        watch.last_level = level;
        verdict
    }
}

impl Default for WatchList {
    fn default() -> Self {
        Self::new()
    }
}

/// Mailbox of the overflow task
pub struct Overflow {
    /// Ticks and watch requests in send order
    mailbox: Mailbox<OverflowMessage>,
}

impl Overflow {
    /// Creates the overflow task's mailbox
    pub const fn new() -> Self {
        Self { mailbox: Mailbox::new() }
    }

    /// Queues a message for the overflow task
    pub async fn send(&self, message: OverflowMessage) {
        self.mailbox.send(message).await;
    }
}

impl Default for Overflow {
    fn default() -> Self {
        Self::new()
    }
}

/// Overflow task: one float read at a time, started on a tick, for the next watched tank
pub async fn overflow_task<H: Hardware>(monitor: &TankMonitor<H>) {
    info!("Overflow task initialized successfully");

    let mut watches = WatchList::new();
    let mut pending: Option<PendingRead<'_>> = None;

    loop {
        let next = match pending.as_mut() {
            Some(read) => select(monitor.overflow.mailbox.receive(), read.wait()).await,
            None => Either::First(monitor.overflow.mailbox.receive().await),
        };

        match next {
            Either::First(OverflowMessage::Tick) => {
                if pending.is_some() {
                    continue;
                }
                if let Some(tank) = watches.next_to_read() {
                    trace!(
                        "Re-reading tank {}, {} scans left",
                        tank.number(),
                        watches.remaining_ticks(tank)
                    );
                    pending = Some(monitor.floats.request_read(&monitor.hardware, tank).await);
                }
            }
            Either::First(OverflowMessage::Watch(tank)) => {
                let level = monitor.history.latest(tank).await.map_or(0, |sample| sample.level);
                watches.watch(tank, level);
            }
            Either::Second(level) => {
                let Some(read) = pending.take() else {
                    continue;
                };
                let tank = read.tank();
                drop(read);

                if watches.record(tank, level) == Verdict::Overflow {
                    warn!("Tank {} is about to overflow at {} gls.", tank.number(), level);
                    monitor.hardware.bell_on();
                    monitor.display.send(DisplayCommand::Overflow(tank)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_list_has_nothing_to_read() {
        let mut watches = WatchList::new();
        assert_eq!(watches.next_to_read(), None);
        assert!(TankId::ALL.iter().all(|&tank| !watches.is_watching(tank)));
    }

    #[test]
    fn rising_past_the_threshold_overflows() {
        let mut watches = WatchList::new();
        let tank = TankId::new(1);
        watches.watch(tank, 7000);

        assert_eq!(watches.next_to_read(), Some(tank));
        assert_eq!(watches.record(tank, 7400), Verdict::Rising);
        assert_eq!(watches.remaining_ticks(tank), WATCH_WINDOW);

        assert_eq!(watches.next_to_read(), Some(tank));
        assert_eq!(watches.record(tank, 7600), Verdict::Overflow);
        assert!(!watches.is_watching(tank));
        assert_eq!(watches.next_to_read(), None);
    }

    #[test]
    fn first_rising_read_over_the_threshold_raises_the_alarm() {
        let mut watches = WatchList::new();
        let tank = TankId::new(0);
        watches.watch(tank, 7000);
        assert_eq!(watches.next_to_read(), Some(tank));
        assert_eq!(watches.record(tank, 7600), Verdict::Overflow);
        // A later rise is not reported again unless the tank is watched anew
        assert_eq!(watches.next_to_read(), None);
    }

    #[test]
    fn high_but_falling_is_not_an_overflow() {
        let mut watches = WatchList::new();
        let tank = TankId::new(2);
        watches.watch(tank, 8000);
        assert_eq!(watches.next_to_read(), Some(tank));
        assert_eq!(watches.record(tank, 7900), Verdict::Steady);
        assert!(watches.is_watching(tank));
        assert_eq!(watches.remaining_ticks(tank), WATCH_WINDOW - 1);
    }

    #[test]
    fn steady_tank_drops_off_after_the_window() {
        let mut watches = WatchList::new();
        let tank = TankId::new(0);
        watches.watch(tank, 5000);
        for _ in 0..WATCH_WINDOW {
            assert_eq!(watches.next_to_read(), Some(tank));
            assert_eq!(watches.record(tank, 5000), Verdict::Steady);
        }
        assert!(!watches.is_watching(tank));
        assert_eq!(watches.next_to_read(), None);
    }

    #[test]
    fn scans_watched_tanks_round_robin() {
        let mut watches = WatchList::new();
        watches.watch(TankId::new(0), 100);
        watches.watch(TankId::new(2), 100);
        let order: std::vec::Vec<_> = (0..4).filter_map(|_| watches.next_to_read()).collect();
        assert_eq!(
            order,
            [TankId::new(0), TankId::new(2), TankId::new(0), TankId::new(2)]
        );
        assert_eq!(watches.remaining_ticks(TankId::new(0)), WATCH_WINDOW - 2);
    }
}
