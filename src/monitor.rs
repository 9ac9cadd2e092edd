//! The monitor: every task's mailbox and the shared stores, wired together

use embassy_futures::join::{join, join3};

use crate::{
    button::{Buttons, button_task},
    clock::Clock,
    display::{Display, DisplayCommand, display_task},
    error::Error,
    floats::Floats,
    hardware::{Hardware, ProcessingDelay},
    history::TankHistory,
    levels::levels_task,
    overflow::{Overflow, OverflowMessage, overflow_task},
    print::{Printer, printer_task},
    tank::TankId,
};

/// The tank monitor: owns the panel hardware, the shared stores and every task's mailbox.
///
/// The tasks borrow the monitor; on the target it lives in a `static`, in tests on the stack.
pub struct TankMonitor<H> {
    /// Panel, floats, bell and printer
    pub(crate) hardware: H,
    /// Time since start-up
    pub(crate) clock: Clock,
    /// Recent levels of every tank
    pub(crate) history: TankHistory,
    /// Arbiter for the floats
    pub(crate) floats: Floats,
    /// Display task mailbox
    pub(crate) display: Display,
    /// Overflow task mailbox
    pub(crate) overflow: Overflow,
    /// Printer task mailbox and print job
    pub(crate) printer: Printer,
    /// Button task mailbox
    pub(crate) buttons: Buttons,
}

impl<H: Hardware> TankMonitor<H> {
    /// Creates a monitor with empty history, reading the time as midnight
    pub const fn new(hardware: H) -> Self {
        Self {
            hardware,
            clock: Clock::new(),
            history: TankHistory::new(),
            floats: Floats::new(),
            display: Display::new(),
            overflow: Overflow::new(),
            printer: Printer::new(),
            buttons: Buttons::new(),
        }
    }

    /// The panel hardware
    pub const fn hardware(&self) -> &H {
        &self.hardware
    }

    /// The monitor clock
    pub const fn clock(&self) -> &Clock {
        &self.clock
    }

    /// The tank history store
    pub const fn history(&self) -> &TankHistory {
        &self.history
    }

    /// The floats arbiter
    pub const fn floats(&self) -> &Floats {
        &self.floats
    }

    /// The report printer
    pub const fn printer(&self) -> &Printer {
        &self.printer
    }

    /// Runs all tasks of the monitor concurrently; never returns.
    ///
    /// On the target each task is usually spawned on its own instead, see the `*_task` functions.
    pub async fn run<D: ProcessingDelay>(&self, delay: D) {
        join(
            join3(levels_task(self, delay), overflow_task(self), button_task(self)),
            join(display_task(self), printer_task(self)),
        )
        .await;
    }

    /// A button was pressed: queues its key code for the button task
    pub async fn button_interrupt(&self) {
        let code = self.hardware.fetch_pressed_key();
        self.buttons.press(code).await;
    }

    /// The floats finished a reading: hands the level to whoever requested it
    ///
    /// # Errors
    /// Returns [`Error::NoReadInFlight`] if no read was outstanding.
    pub fn floats_interrupt(&self) -> Result<TankId, Error> {
        self.floats.complete(&self.hardware).inspect_err(|_| {
            warn!("Float reading arrived without a request");
        })
    }

    /// The printer finished a line: sends the next one or completes the report
    ///
    /// # Errors
    /// Returns [`Error::NoPrintJob`] if no report was being printed.
    pub fn printer_interrupt(&self) -> Result<(), Error> {
        self.printer.line_printed(&self.hardware).inspect_err(|_| {
            warn!("Printer acknowledgment arrived without a report");
        })
    }

    /// One third of a second passed: advances the clock, refreshes the time on the display at
    /// every new second and lets the overflow task re-read watched tanks
    pub async fn tick(&self) {
        if self.clock.tick() {
            self.display.send(DisplayCommand::Update).await;
        }
        self.overflow.send(OverflowMessage::Tick).await;
    }
}
