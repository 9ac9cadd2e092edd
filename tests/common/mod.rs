//! Mock panel hardware and helpers for driving a whole monitor on the host.
//!
//! The mock records every display line, printed line and bell change, answers float reads from a
//! per-tank level table and counts overlapping float reads.

#![allow(dead_code, clippy::expect_used)]

use std::{future::Future, sync::Mutex};

use embassy_futures::{
    block_on,
    select::{Either, select},
    yield_now,
};
use tank_monitor::{Hardware, Level, ProcessingDelay, TANK_COUNT, TankId, TankMonitor};

// ── Recorded panel state ──────────────────────────────────────

#[derive(Debug, Default)]
pub struct PanelState {
    /// Every line shown on the display, oldest first
    pub display: Vec<String>,
    /// Every line sent to the printer, oldest first
    pub printed: Vec<String>,
    /// Whether the bell is ringing
    pub bell: bool,
    /// How often the bell was switched on
    pub bell_rings: usize,
    /// How often the bell was switched off
    pub bell_silenced: usize,
    /// Key code returned by the next button fetch
    pub key: u8,
    /// Tank the floats are reading right now
    pub reading: Option<TankId>,
    /// Every tank the floats were asked to read
    pub reads: Vec<TankId>,
    /// Float reads started while another one was outstanding
    pub overlapping_reads: usize,
    /// Level each tank reads at
    pub levels: [Level; TANK_COUNT],
    /// Added to a tank's level after each of its reads
    pub drift: [i32; TANK_COUNT],
}

// ── MockPanel ─────────────────────────────────────────────────

pub struct MockPanel {
    state: Mutex<PanelState>,
}

impl MockPanel {
    pub fn new(levels: [Level; TANK_COUNT]) -> Self {
        Self {
            state: Mutex::new(PanelState {
                levels,
                ..PanelState::default()
            }),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut PanelState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut state)
    }

    pub fn last_line(&self) -> Option<String> {
        self.with(|state| state.display.last().cloned())
    }

    pub fn printed(&self) -> Vec<String> {
        self.with(|state| state.printed.clone())
    }

    pub fn set_level(&self, tank: TankId, level: Level) {
        self.with(|state| state.levels[tank.index()] = level);
    }

    pub fn set_drift(&self, tank: TankId, drift: i32) {
        self.with(|state| state.drift[tank.index()] = drift);
    }

    pub fn reading(&self) -> Option<TankId> {
        self.with(|state| state.reading)
    }
}

impl Default for MockPanel {
    fn default() -> Self {
        Self::new([4000, 7200, 6400])
    }
}

impl Hardware for MockPanel {
    fn display_line(&self, text: &str) {
        assert!(text.len() <= tank_monitor::LINE_WIDTH, "display line too long: {text:?}");
        self.with(|state| state.display.push(text.to_owned()));
    }

    fn fetch_pressed_key(&self) -> u8 {
        self.with(|state| state.key)
    }

    fn begin_sensor_read(&self, tank: TankId) {
        self.with(|state| {
            if state.reading.is_some() {
                state.overlapping_reads += 1;
            }
            state.reading = Some(tank);
            state.reads.push(tank);
        });
    }

    fn fetch_sensor_level(&self) -> Level {
        self.with(|state| {
            let tank = state.reading.take().expect("level fetched without a read");
            let level = state.levels[tank.index()];
            let drifted = i32::from(level) + state.drift[tank.index()];
            state.levels[tank.index()] = Level::try_from(drifted.max(0)).unwrap_or(Level::MAX);
            level
        })
    }

    fn bell_on(&self) {
        self.with(|state| {
            state.bell = true;
            state.bell_rings += 1;
        });
    }

    fn bell_off(&self) {
        self.with(|state| {
            state.bell = false;
            state.bell_silenced += 1;
        });
    }

    fn printer_output_line(&self, text: &str) {
        assert!(text.len() <= tank_monitor::LINE_WIDTH, "printer line too long: {text:?}");
        self.with(|state| state.printed.push(text.to_owned()));
    }
}

// ── Driving the monitor ───────────────────────────────────────

/// Processing delay that only yields to the other tasks
pub struct Immediate;

impl ProcessingDelay for Immediate {
    async fn wait(&mut self) {
        yield_now().await;
    }
}

/// Runs `script` while all monitor tasks run next to it
pub fn run_with<F: Future>(monitor: &TankMonitor<MockPanel>, script: F) -> F::Output {
    match block_on(select(monitor.run(Immediate), script)) {
        Either::First(()) => unreachable!("monitor tasks never return"),
        Either::Second(output) => output,
    }
}

/// Gives every task plenty of polls to process what is queued
pub async fn settle() {
    for _ in 0..64 {
        yield_now().await;
    }
}

/// Presses a key on the panel
pub async fn press(monitor: &TankMonitor<MockPanel>, key: u8) {
    monitor.hardware().with(|state| state.key = key);
    monitor.button_interrupt().await;
    settle().await;
}

/// Completes the float read in flight, if any
pub async fn try_serve(monitor: &TankMonitor<MockPanel>) -> Option<TankId> {
    settle().await;
    monitor.hardware().reading()?;
    let tank = monitor.floats_interrupt().ok();
    settle().await;
    tank
}

/// Waits for a float read and completes it
pub async fn serve(monitor: &TankMonitor<MockPanel>) -> TankId {
    for _ in 0..100 {
        if let Some(tank) = try_serve(monitor).await {
            return tank;
        }
    }
    panic!("no float read was requested");
}

/// Lets the level task read every tank once
pub async fn serve_round(monitor: &TankMonitor<MockPanel>) {
    for _ in 0..TANK_COUNT {
        serve(monitor).await;
    }
}

/// Acknowledges printed lines until the report in progress is done
pub async fn finish_printing(monitor: &TankMonitor<MockPanel>) {
    settle().await;
    while monitor.printer().is_printing() {
        monitor.printer_interrupt().expect("a report is printing");
        settle().await;
    }
}
