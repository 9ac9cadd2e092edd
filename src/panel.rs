//! The operator panel of the RP2350 board: OLED screen, alarm bell, and simulated floats and printer

use core::{
    cell::RefCell,
    sync::atomic::{AtomicU8, AtomicU16, Ordering},
};

use defmt::trace;
use embassy_rp::gpio::Output;
use embassy_sync::{
    blocking_mutex::{Mutex, raw::CriticalSectionRawMutex},
    signal::Signal,
};
use embassy_time::Duration;
use embedded_graphics::{
    mono_font::{
        MonoTextStyleBuilder,
        ascii::{FONT_5X8, FONT_6X13_BOLD},
    },
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line as Rule, PrimitiveStyle},
    text::{Baseline, Text},
};
use heapless::HistoryBuffer;
use tank_monitor::{Hardware, Level, TANK_COUNT, TankId, line::Line};

/// How long the simulated floats take to measure a tank
pub const FLOAT_READ_TIME: Duration = Duration::from_millis(120);

/// How long the simulated printer takes for one line
pub const PRINT_LINE_TIME: Duration = Duration::from_millis(250);

/// Levels the simulated floats report at power-up
const INITIAL_LEVELS: [Level; TANK_COUNT] = [4000, 7200, 6400];

/// Change of each simulated tank per reading: tank 1 drains, tank 2 fills, tank 3 holds
const DRIFT: [i16; TANK_COUNT] = [-25, 40, 0];

/// Printed lines kept on screen below the display line
const PAPER_LINES: usize = 4;

/// Top of the first printed line, below the rule
const PAPER_TOP: i32 = 20;

/// Height of one printed line on screen
const PAPER_ROW_HEIGHT: i32 = 11;

/// Tank levels for the simulated floats
pub struct SimulatedFloats {
    /// Level each tank reads at next
    levels: [Level; TANK_COUNT],
}

impl SimulatedFloats {
    /// Starts from the power-up levels
    pub const fn new() -> Self {
        Self { levels: INITIAL_LEVELS }
    }

    /// Measures `tank`; the tank drifts on afterwards
    pub const fn measure(&mut self, tank: TankId) -> Level {
        let level = self.levels[tank.index()];
        self.levels[tank.index()] = level.saturating_add_signed(DRIFT[tank.index()]);
        level
    }
}

/// What the OLED shows
struct Screen {
    /// The display line of the monitor
    display: Line,
    /// The most recent printer output
    paper: HistoryBuffer<Line, PAPER_LINES>,
}

/// Panel hardware shared by the monitor tasks and the board tasks
pub struct Panel {
    /// Alarm bell output
    bell: Mutex<CriticalSectionRawMutex, RefCell<Output<'static>>>,
    /// Code of the button pressed last
    key: AtomicU8,
    /// Level of the float read that completed last
    level: AtomicU16,
    /// Tank the floats were asked to measure
    read_request: Signal<CriticalSectionRawMutex, TankId>,
    /// Raised for every line sent to the printer
    paper_fed: Signal<CriticalSectionRawMutex, ()>,
    /// Screen contents
    screen: Mutex<CriticalSectionRawMutex, RefCell<Screen>>,
    /// Raised when the screen contents changed
    redraw: Signal<CriticalSectionRawMutex, ()>,
}

impl Panel {
    /// Creates the panel around the bell output
    pub const fn new(bell: Output<'static>) -> Self {
        Self {
            bell: Mutex::new(RefCell::new(bell)),
            key: AtomicU8::new(0),
            level: AtomicU16::new(0),
            read_request: Signal::new(),
            paper_fed: Signal::new(),
            screen: Mutex::new(RefCell::new(Screen {
                display: Line::new(),
                paper: HistoryBuffer::new(),
            })),
            redraw: Signal::new(),
        }
    }

    /// Latches the code of a pressed button
    pub fn set_key(&self, code: u8) {
        self.key.store(code, Ordering::Relaxed);
    }

    /// Waits until the floats are asked to measure a tank
    pub async fn read_requested(&self) -> TankId {
        self.read_request.wait().await
    }

    /// Latches the level the floats measured
    pub fn set_level(&self, level: Level) {
        self.level.store(level, Ordering::Relaxed);
    }

    /// Waits until a line is sent to the printer
    pub async fn paper_fed(&self) {
        self.paper_fed.wait().await;
    }

    /// Waits until the screen contents changed
    pub async fn redraw_requested(&self) {
        self.redraw.wait().await;
    }

    /// Draws the display line, a rule and the most recent printer output
    pub fn draw<D: DrawTarget<Color = BinaryColor>>(&self, target: &mut D) -> Result<(), D::Error> {
        let display_style = MonoTextStyleBuilder::new()
            .font(&FONT_6X13_BOLD)
            .text_color(BinaryColor::On)
            .build();
        let paper_style = MonoTextStyleBuilder::new()
            .font(&FONT_5X8)
            .text_color(BinaryColor::On)
            .build();

        self.screen.lock(|screen| {
            let screen = screen.borrow();
            target.clear(BinaryColor::Off)?;
            Text::with_baseline(&screen.display, Point::zero(), display_style, Baseline::Top).draw(target)?;
            Rule::new(Point::new(0, 15), Point::new(127, 15))
                .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
                .draw(target)?;

            let mut y = PAPER_TOP;
            for line in screen.paper.oldest_ordered() {
                Text::with_baseline(line, Point::new(0, y), paper_style, Baseline::Top).draw(target)?;
                y += PAPER_ROW_HEIGHT;
            }
            Ok(())
        })
    }

    /// Copies `text` into a screen line
    fn to_line(text: &str) -> Line {
        let mut line = Line::new();
        // Lines from the monitor always fit
        let _ = line.push_str(text);
        line
    }
}

impl Hardware for Panel {
    fn display_line(&self, text: &str) {
        self.screen.lock(|screen| screen.borrow_mut().display = Self::to_line(text));
        self.redraw.signal(());
    }

    fn fetch_pressed_key(&self) -> u8 {
        self.key.load(Ordering::Relaxed)
    }

    fn begin_sensor_read(&self, tank: TankId) {
        self.read_request.signal(tank);
    }

    fn fetch_sensor_level(&self) -> Level {
        self.level.load(Ordering::Relaxed)
    }

    fn bell_on(&self) {
        trace!("Bell on");
        self.bell.lock(|bell| bell.borrow_mut().set_high());
    }

    fn bell_off(&self) {
        trace!("Bell off");
        self.bell.lock(|bell| bell.borrow_mut().set_low());
    }

    fn printer_output_line(&self, text: &str) {
        self.screen
            .lock(|screen| screen.borrow_mut().paper.write(Self::to_line(text)));
        self.redraw.signal(());
        self.paper_fed.signal(());
    }
}
