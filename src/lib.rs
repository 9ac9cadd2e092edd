//! Tank Monitor core
//!
//! A set of cooperating tasks that watch the levels of three tanks:
//!
//! - the level task reads every tank in turn through the [floats arbiter](floats), records the
//!   levels in the [history store](history) and looks for leaks and rising tanks,
//! - the [overflow task](overflow) keeps re-reading rising tanks on every tick,
//! - the [button task](button) runs the operator's command state machine,
//! - the [display task](display) composes the single display line by priority,
//! - the [printer task](print) streams reports one line at a time.
//!
//! The tasks talk through bounded [mailboxes](mailbox) and reach the panel only through the
//! [`Hardware`] trait. [`TankMonitor`] owns all of it.
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod button;
pub mod clock;
pub mod display;
pub mod display_state;
pub mod error;
pub mod floats;
pub mod hardware;
pub mod history;
pub mod levels;
pub mod line;
pub mod mailbox;
pub mod monitor;
pub mod overflow;
pub mod print;
pub mod tank;

pub use button::button_task;
pub use display::display_task;
pub use error::Error;
pub use hardware::{Hardware, ProcessingDelay};
pub use levels::levels_task;
pub use line::LINE_WIDTH;
pub use monitor::TankMonitor;
pub use overflow::overflow_task;
pub use print::printer_task;
pub use tank::{Level, TANK_COUNT, TankId};
