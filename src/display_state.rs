//! Display state management for the Tank Monitor

use crate::{
    button::Prompt,
    clock::Time,
    line::{Line, format_line},
    tank::{Level, TankId},
};

/// What the operator asked to see when nothing more urgent is shown
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum View {
    /// Show the time
    #[default]
    Time,
    /// Show the level of one tank
    TankLevel(TankId),
}

/// Messages accepted by the display task
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayCommand {
    /// Redraw from the current state, e.g. after a new sample or a new second
    Update,
    /// The operator wants to see the time
    ShowTime,
    /// The operator wants to see the level of a tank
    ShowTank(TankId),
    /// The command state machine wants to show a prompt
    Prompt(Prompt),
    /// The command state machine no longer needs its prompt
    NoPrompt,
    /// A leak was detected in a tank
    Leak(TankId),
    /// A tank is about to overflow
    Overflow(TankId),
    /// The operator reset the alarms
    ResetAlarms,
}

/// The content chosen for the display, before any data is filled in
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    /// Overflow alarm
    Overflow(TankId),
    /// Leak alarm
    Leak(TankId),
    /// Menu prompt
    Prompt(Prompt),
    /// The operator's choice
    View(View),
}

/// Everything the display task knows about what should be on the display
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub struct DisplayState {
    /// Tank with an active overflow alarm
    overflow: Option<TankId>,
    /// Tank with an active leak alarm
    leak: Option<TankId>,
    /// Prompt requested by the command state machine
    prompt: Option<Prompt>,
    /// The operator's choice of view
    view: View,
}

impl DisplayState {
    /// Creates a `DisplayState` showing the time
    pub const fn new() -> Self {
        Self {
            overflow: None,
            leak: None,
            prompt: None,
            view: View::Time,
        }
    }

    /// Applies one display command
    pub const fn apply(&mut self, command: DisplayCommand) {
        match command {
            DisplayCommand::Update => {}
            DisplayCommand::ShowTime => self.view = View::Time,
            DisplayCommand::ShowTank(tank) => self.view = View::TankLevel(tank),
            DisplayCommand::Prompt(prompt) => self.prompt = Some(prompt),
            DisplayCommand::NoPrompt => self.prompt = None,
            DisplayCommand::Leak(tank) => self.leak = Some(tank),
            DisplayCommand::Overflow(tank) => self.overflow = Some(tank),
            DisplayCommand::ResetAlarms => {
                self.overflow = None;
                self.leak = None;
                self.prompt = None;
            }
        }
    }

    /// Picks what to show: overflow beats leak, leak beats a prompt, a prompt beats the view
    pub const fn screen(&self) -> Screen {
        if let Some(tank) = self.overflow {
            Screen::Overflow(tank)
        } else if let Some(tank) = self.leak {
            Screen::Leak(tank)
        } else if let Some(prompt) = self.prompt {
            Screen::Prompt(prompt)
        } else {
            Screen::View(self.view)
        }
    }
}

/// Renders a screen into the display line.
///
/// `latest` is the most recent level of the viewed tank and is only used for
/// [`View::TankLevel`].
pub fn render(screen: Screen, now: Time, latest: Option<Level>) -> Line {
    match screen {
        Screen::Overflow(tank) => format_line(format_args!("{tank}: OVERFLOW!!")),
        Screen::Leak(tank) => format_line(format_args!("{tank}: LEAKING!!")),
        Screen::Prompt(prompt) => format_line(format_args!("{}", prompt.text())),
        Screen::View(View::Time) => format_line(format_args!("{now}")),
        Screen::View(View::TankLevel(tank)) => match latest {
            Some(level) => format_line(format_args!("{tank}: {level} gls.")),
            None => format_line(format_args!("{tank}: N/A")),
        },
    }
}
