//! Display task for the Tank Monitor

pub use crate::display_state::DisplayCommand;
use crate::{
    TankMonitor,
    display_state::{DisplayState, Screen, View, render},
    hardware::Hardware,
    mailbox::Mailbox,
};

/// Mailbox of the display task
pub struct Display {
    /// Display commands in send order
    mailbox: Mailbox<DisplayCommand>,
}

impl Display {
    /// Creates the display task's mailbox
    pub const fn new() -> Self {
        Self { mailbox: Mailbox::new() }
    }

    /// Queues a command for the display task
    pub async fn send(&self, command: DisplayCommand) {
        self.mailbox.send(command).await;
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

/// Display task: the only writer of the display line
pub async fn display_task<H: Hardware>(monitor: &TankMonitor<H>) {
    let mut state = DisplayState::new();

    info!("Display task initialized successfully");
    draw(monitor, state.screen()).await;

    loop {
        let command = monitor.display.mailbox.receive().await;
        state.apply(command);
        draw(monitor, state.screen()).await;
    }
}

/// Fills in the data for `screen` and shows it
async fn draw<H: Hardware>(monitor: &TankMonitor<H>, screen: Screen) {
    let latest = match screen {
        Screen::View(View::TankLevel(tank)) => monitor.history.latest(tank).await.map(|sample| sample.level),
        _ => None,
    };
    let line = render(screen, monitor.clock.now(), latest);
    monitor.hardware.display_line(&line);
}
