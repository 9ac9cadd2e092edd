//! The narrow contract between the monitor core and the panel hardware

use crate::tank::{Level, TankId};

/// Operator panel, floats, bell and printer as seen by the monitor tasks.
///
/// All methods are synchronous and take `&self`: they are called from several tasks and from the
/// interrupt entry points of [`TankMonitor`](crate::TankMonitor), so implementations keep their own
/// interior mutability. None of them may block.
pub trait Hardware {
    /// Shows one line (at most [`LINE_WIDTH`](crate::LINE_WIDTH) characters) on the operator display
    fn display_line(&self, text: &str);

    /// Returns the key code of the most recent button press
    fn fetch_pressed_key(&self) -> u8;

    /// Starts the floats reading the level of `tank`; completion is reported through
    /// [`TankMonitor::floats_interrupt`](crate::TankMonitor::floats_interrupt)
    fn begin_sensor_read(&self, tank: TankId);

    /// Returns the level measured by the floats for the read that just completed
    fn fetch_sensor_level(&self) -> Level;

    /// Turns the alarm bell on
    fn bell_on(&self);

    /// Turns the alarm bell off
    fn bell_off(&self);

    /// Sends one line (at most [`LINE_WIDTH`](crate::LINE_WIDTH) characters) to the printer;
    /// completion is reported through
    /// [`TankMonitor::printer_interrupt`](crate::TankMonitor::printer_interrupt)
    fn printer_output_line(&self, text: &str);
}

/// Models the time the level task spends "calculating" a level from a float reading
#[allow(async_fn_in_trait)]
pub trait ProcessingDelay {
    /// Waits for one processing period
    async fn wait(&mut self);
}
