//! Tank history store: the most recent level samples of every tank

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use heapless::{HistoryBuffer, Vec};

use crate::{
    clock::Time,
    tank::{Level, TANK_COUNT, TankId},
};

/// Number of samples kept per tank
pub const HISTORY_DEPTH: usize = 8;

/// One level reading together with the time it was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Level in gallons
    pub level: Level,
    /// When the level was recorded
    pub time: Time,
}

/// Samples of one tank, newest first
pub type Samples = Vec<Sample, HISTORY_DEPTH>;

/// Per-tank rings of level samples behind a single lock.
///
/// Once a ring is full the next sample overwrites the oldest one.
pub struct TankHistory {
    /// One ring per tank
    tanks: Mutex<CriticalSectionRawMutex, [HistoryBuffer<Sample, HISTORY_DEPTH>; TANK_COUNT]>,
}

impl TankHistory {
    /// Creates an empty store
    pub const fn new() -> Self {
        Self {
            tanks: Mutex::new([const { HistoryBuffer::new() }; TANK_COUNT]),
        }
    }

    /// Records a new level for `tank`, evicting the oldest sample if the ring is full
    pub async fn add(&self, tank: TankId, level: Level, time: Time) {
        let mut tanks = self.tanks.lock().await;
        tanks[tank.index()].write(Sample { level, time });
    }

    /// Returns up to `limit` samples of `tank`, newest first
    pub async fn get(&self, tank: TankId, limit: usize) -> Samples {
        let tanks = self.tanks.lock().await;
        let oldest_first: Samples = tanks[tank.index()].oldest_ordered().copied().collect();
        oldest_first.iter().rev().take(limit).copied().collect()
    }

    /// The most recent sample of `tank`, if it has been read at all
    pub async fn latest(&self, tank: TankId) -> Option<Sample> {
        let tanks = self.tanks.lock().await;
        tanks[tank.index()].recent().copied()
    }

    /// Whether the ring of `tank` has wrapped, so every slot holds a sample
    pub async fn is_full(&self, tank: TankId) -> bool {
        let tanks = self.tanks.lock().await;
        let ring = &tanks[tank.index()];
        ring.len() == ring.capacity()
    }
}

impl Default for TankHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;

    /// Levels of `samples`, in the order returned
    fn levels(samples: &Samples) -> std::vec::Vec<Level> {
        samples.iter().map(|sample| sample.level).collect()
    }

    #[test]
    fn returns_newest_first() {
        let history = TankHistory::new();
        let tank = TankId::new(1);
        block_on(async {
            for level in [100, 200, 300] {
                history.add(tank, level, Time::MIDNIGHT).await;
            }
            assert_eq!(levels(&history.get(tank, 3).await), [300, 200, 100]);
            assert_eq!(levels(&history.get(tank, 2).await), [300, 200]);
        });
    }

    #[test]
    fn short_history_returns_fewer_than_asked() {
        let history = TankHistory::new();
        let tank = TankId::new(0);
        block_on(async {
            assert!(history.get(tank, 3).await.is_empty());
            assert_eq!(history.latest(tank).await, None);
            history.add(tank, 4000, Time::MIDNIGHT).await;
            assert_eq!(levels(&history.get(tank, 8).await), [4000]);
        });
    }

    #[test]
    fn wraps_after_depth_samples() {
        let history = TankHistory::new();
        let tank = TankId::new(2);
        block_on(async {
            for level in 1..=10 {
                history.add(tank, level, Time::MIDNIGHT).await;
            }
            assert!(history.is_full(tank).await);
            assert_eq!(levels(&history.get(tank, 8).await), [10, 9, 8, 7, 6, 5, 4, 3]);
            assert_eq!(levels(&history.get(tank, 20).await).len(), HISTORY_DEPTH);
        });
    }

    #[test]
    fn tanks_are_independent() {
        let history = TankHistory::new();
        block_on(async {
            history.add(TankId::new(0), 10, Time::MIDNIGHT).await;
            history.add(TankId::new(1), 20, Time::MIDNIGHT).await;
            assert_eq!(history.latest(TankId::new(0)).await.map(|s| s.level), Some(10));
            assert_eq!(history.latest(TankId::new(1)).await.map(|s| s.level), Some(20));
            assert!(!history.is_full(TankId::new(0)).await);
            assert_eq!(history.latest(TankId::new(2)).await, None);
        });
    }

    #[test]
    fn keeps_sample_time() {
        let history = TankHistory::new();
        let tank = TankId::new(0);
        let time = Time {
            hours: 1,
            minutes: 2,
            seconds: 3,
            tenths: 7,
        };
        block_on(async {
            history.add(tank, 55, time).await;
            assert_eq!(history.latest(tank).await, Some(Sample { level: 55, time }));
        });
    }
}
