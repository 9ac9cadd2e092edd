//! Command state machine: turns operator key presses into display, print and alarm requests
//!
//! The panel has eight buttons:
//!
//! ```text
//!  PRT  1  TIME
//!  HST  2
//!  ALL  3  RST
//! ```
//!
//! A single key shows a tank level (`1`..`3`), the time (`T`) or silences the alarms (`R`).
//! `P` opens the print menu, where `A` prints the levels of all tanks and `H` asks for the tank
//! whose history should be printed. `R` leaves either menu.

use crate::{
    TankMonitor,
    display::DisplayCommand,
    hardware::Hardware,
    mailbox::Mailbox,
    print::PrintRequest,
    tank::TankId,
};

/// Operator keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// One of the tank keys `1`..`3`
    Tank(TankId),
    /// `T`: show the time
    Time,
    /// `R`: silence the bell and reset the alarms
    Reset,
    /// `P`: open the print menu
    Print,
    /// `A`: print all tank levels
    All,
    /// `H`: print the history of one tank
    History,
}

impl Key {
    /// Decodes a raw key code from the panel
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            b'T' => Some(Self::Time),
            b'R' => Some(Self::Reset),
            b'P' => Some(Self::Print),
            b'A' => Some(Self::All),
            b'H' => Some(Self::History),
            _ => match TankId::from_key(code) {
                Some(tank) => Some(Self::Tank(tank)),
                None => None,
            },
        }
    }
}

/// Prompts shown while a multi-key command is being entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prompt {
    /// Waiting for `A` or `H` after `P`
    PrintMenu,
    /// Waiting for a tank key after `H`
    HistoryMenu,
}

impl Prompt {
    /// The prompt text
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::PrintMenu => "Press: HST or ALL",
            Self::HistoryMenu => "Press Tank Number",
        }
    }
}

/// State of the command state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandState {
    /// No command in progress
    #[default]
    Idle,
    /// `P` was pressed, waiting for `A` or `H`
    AwaitPrintChoice,
    /// `P` `H` was pressed, waiting for a tank key
    AwaitHistoryTank,
}

/// What a key press asks the rest of the system to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Show the level of a tank
    ShowTank(TankId),
    /// Show the time
    ShowTime,
    /// Silence the bell and clear alarms and prompt
    ResetAlarms,
    /// Show a menu prompt
    ShowPrompt(Prompt),
    /// Print the levels of all tanks and clear the prompt
    PrintAll,
    /// Print the history of one tank and clear the prompt
    PrintHistory(TankId),
}

impl CommandState {
    /// Applies one key, returning the next state and the action to carry out.
    ///
    /// Keys that mean nothing in the current state leave it unchanged and produce no action.
    #[must_use]
    pub const fn on_key(self, key: Key) -> (Self, Option<Action>) {
        match (self, key) {
            (Self::Idle, Key::Tank(tank)) => (Self::Idle, Some(Action::ShowTank(tank))),
            (Self::Idle, Key::Time) => (Self::Idle, Some(Action::ShowTime)),
            (Self::Idle, Key::Print) => (Self::AwaitPrintChoice, Some(Action::ShowPrompt(Prompt::PrintMenu))),
            (Self::AwaitPrintChoice, Key::All) => (Self::Idle, Some(Action::PrintAll)),
            (Self::AwaitPrintChoice, Key::History) => {
                (Self::AwaitHistoryTank, Some(Action::ShowPrompt(Prompt::HistoryMenu)))
            }
            (Self::AwaitHistoryTank, Key::Tank(tank)) => (Self::Idle, Some(Action::PrintHistory(tank))),
            (_, Key::Reset) => (Self::Idle, Some(Action::ResetAlarms)),
            (state, _) => (state, None),
        }
    }
}

/// Mailbox of the button task, fed with raw key codes by the button interrupt
pub struct Buttons {
    /// Raw key codes in press order
    mailbox: Mailbox<u8>,
}

impl Buttons {
    /// Creates the button task's mailbox
    pub const fn new() -> Self {
        Self { mailbox: Mailbox::new() }
    }

    /// Queues a raw key code for the button task
    pub async fn press(&self, code: u8) {
        self.mailbox.send(code).await;
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Self::new()
    }
}

/// Button task: runs the command state machine over the queued key codes
pub async fn button_task<H: Hardware>(monitor: &TankMonitor<H>) {
    info!("Button task initialized successfully");

    let mut state = CommandState::Idle;
    loop {
        let code = monitor.buttons.mailbox.receive().await;
        let Some(key) = Key::from_code(code) else {
            debug!("Ignoring unknown key code {}", code);
            continue;
        };

        let (next, action) = state.on_key(key);
        state = next;
        match action {
            Some(action) => perform(monitor, action).await,
            None => debug!("Key ignored in the current menu"),
        }
    }
}

/// Carries out one action of the state machine
async fn perform<H: Hardware>(monitor: &TankMonitor<H>, action: Action) {
    match action {
        Action::ShowTank(tank) => monitor.display.send(DisplayCommand::ShowTank(tank)).await,
        Action::ShowTime => monitor.display.send(DisplayCommand::ShowTime).await,
        Action::ResetAlarms => {
            info!("Operator reset the alarms");
            monitor.hardware.bell_off();
            monitor.display.send(DisplayCommand::ResetAlarms).await;
        }
        Action::ShowPrompt(prompt) => monitor.display.send(DisplayCommand::Prompt(prompt)).await,
        Action::PrintAll => {
            monitor.printer.request(PrintRequest::All).await;
            monitor.display.send(DisplayCommand::NoPrompt).await;
        }
        Action::PrintHistory(tank) => {
            monitor.printer.request(PrintRequest::History(tank)).await;
            monitor.display.send(DisplayCommand::NoPrompt).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs `keys` from `Idle`, collecting the final state and every action
    fn run(keys: &[u8]) -> (CommandState, std::vec::Vec<Action>) {
        let mut state = CommandState::Idle;
        let mut actions = std::vec::Vec::new();
        for &code in keys {
            if let Some(key) = Key::from_code(code) {
                let (next, action) = state.on_key(key);
                state = next;
                actions.extend(action);
            }
        }
        (state, actions)
    }

    #[test]
    fn single_keys_in_idle() {
        assert_eq!(run(b"2"), (CommandState::Idle, vec![Action::ShowTank(TankId::new(1))]));
        assert_eq!(run(b"T"), (CommandState::Idle, vec![Action::ShowTime]));
        assert_eq!(run(b"R"), (CommandState::Idle, vec![Action::ResetAlarms]));
    }

    #[test]
    fn print_history_of_tank_two() {
        let (state, actions) = run(b"PH2");
        assert_eq!(state, CommandState::Idle);
        assert_eq!(
            actions,
            [
                Action::ShowPrompt(Prompt::PrintMenu),
                Action::ShowPrompt(Prompt::HistoryMenu),
                Action::PrintHistory(TankId::new(1)),
            ]
        );
    }

    #[test]
    fn print_all() {
        assert_eq!(
            run(b"PA"),
            (
                CommandState::Idle,
                vec![Action::ShowPrompt(Prompt::PrintMenu), Action::PrintAll]
            )
        );
    }

    #[test]
    fn reset_leaves_menus() {
        assert_eq!(
            run(b"PR"),
            (
                CommandState::Idle,
                vec![Action::ShowPrompt(Prompt::PrintMenu), Action::ResetAlarms]
            )
        );
        let (state, actions) = run(b"PHR");
        assert_eq!(state, CommandState::Idle);
        assert_eq!(actions.last(), Some(&Action::ResetAlarms));
    }

    #[test]
    fn idle_keys_do_not_leak_into_the_print_menu() {
        // `A` and `H` mean nothing until `P` opens the menu
        assert_eq!(run(b"AH"), (CommandState::Idle, vec![]));
    }

    #[test]
    fn unrelated_keys_are_ignored_in_menus() {
        let (state, actions) = run(b"PT1");
        assert_eq!(state, CommandState::AwaitPrintChoice);
        assert_eq!(actions, [Action::ShowPrompt(Prompt::PrintMenu)]);

        let (state, actions) = run(b"PHTAP");
        assert_eq!(state, CommandState::AwaitHistoryTank);
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn unknown_codes_do_not_decode() {
        assert_eq!(Key::from_code(b'x'), None);
        assert_eq!(Key::from_code(b'4'), None);
        assert_eq!(Key::from_code(0), None);
    }

    #[test]
    fn prompts_fit_the_display() {
        for prompt in [Prompt::PrintMenu, Prompt::HistoryMenu] {
            assert!(prompt.text().len() <= crate::LINE_WIDTH);
        }
    }
}
