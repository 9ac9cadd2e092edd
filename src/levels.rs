//! Level task: reads every tank in turn, records the levels and looks for leaks and rising tanks

use embassy_time::Duration;

use crate::{
    TankMonitor,
    display::DisplayCommand,
    hardware::{Hardware, ProcessingDelay},
    overflow::OverflowMessage,
    tank::{Level, TankId},
};

/// How long turning a float reading into a level takes
pub const PROCESSING_TIME: Duration = Duration::from_secs(2);

/// What the three most recent levels of a tank say about it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Trend {
    /// The level fell twice in a row
    pub leaking: bool,
    /// The level went up since the previous reading
    pub rising: bool,
}

impl Trend {
    /// Judges the trend from levels ordered newest first.
    ///
    /// Fewer than three levels say nothing yet.
    #[must_use]
    pub fn from_newest_first(levels: &[Level]) -> Self {
        match levels {
            [newest, previous, oldest, ..] => Self {
                leaking: newest < previous && previous < oldest,
                rising: newest > previous,
            },
            _ => Self::default(),
        }
    }
}

/// Level task: never returns
pub async fn levels_task<H: Hardware, D: ProcessingDelay>(monitor: &TankMonitor<H>, mut delay: D) {
    info!("Level task initialized successfully");

    let mut tank = TankId::new(0);
    loop {
        let level = monitor.floats.request_read(&monitor.hardware, tank).await.finish().await;

        delay.wait().await;
        record(monitor, tank, level).await;

        tank = tank.next();
    }
}

/// Stores a new level of `tank` and reacts to its trend
async fn record<H: Hardware>(monitor: &TankMonitor<H>, tank: TankId, level: Level) {
    debug!("Tank {} at {} gls.", tank.number(), level);
    monitor.history.add(tank, level, monitor.clock.now()).await;
    monitor.display.send(DisplayCommand::Update).await;

    let levels: heapless::Vec<Level, 3> = monitor
        .history
        .get(tank, 3)
        .await
        .iter()
        .map(|sample| sample.level)
        .collect();
    let trend = Trend::from_newest_first(&levels);

    if trend.leaking {
        warn!("Tank {} is leaking", tank.number());
        monitor.hardware.bell_on();
        monitor.display.send(DisplayCommand::Leak(tank)).await;
    }
    if trend.rising {
        debug!("Tank {} is rising, watching for overflow", tank.number());
        monitor.overflow.send(OverflowMessage::Watch(tank)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falling_twice_is_a_leak() {
        let trend = Trend::from_newest_first(&[100, 200, 300]);
        assert!(trend.leaking);
        assert!(!trend.rising);
    }

    #[test]
    fn falling_once_is_not_a_leak() {
        assert!(!Trend::from_newest_first(&[100, 200, 200]).leaking);
        assert!(!Trend::from_newest_first(&[100, 300, 200]).leaking);
    }

    #[test]
    fn any_rise_is_rising() {
        assert_eq!(
            Trend::from_newest_first(&[300, 200, 300]),
            Trend {
                leaking: false,
                rising: true
            }
        );
        assert!(!Trend::from_newest_first(&[300, 300, 100]).rising);
    }

    #[test]
    fn needs_three_levels() {
        assert_eq!(Trend::from_newest_first(&[]), Trend::default());
        assert_eq!(Trend::from_newest_first(&[100, 200]), Trend::default());
        assert_eq!(Trend::from_newest_first(&[500, 100]), Trend::default());
    }
}
