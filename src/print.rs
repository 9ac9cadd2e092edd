//! Report printer: formats reports and streams them to the printer one line at a time

use core::cell::RefCell;

use embassy_sync::{
    blocking_mutex::{Mutex, raw::CriticalSectionRawMutex},
    signal::Signal,
};
use heapless::Vec;

use crate::{
    TankMonitor,
    clock::Time,
    error::Error,
    hardware::Hardware,
    history::Sample,
    line::{Line, format_line},
    mailbox::Mailbox,
    tank::{Level, TANK_COUNT, TankId},
};

/// Most lines a report can have
pub const REPORT_LINES: usize = 10;

/// Number of samples printed in a tank history report
pub const REPORT_HISTORY: usize = 5;

/// Line closing every report
const SEPARATOR: &str = "----------------";

/// A formatted report, in print order
pub type Report = Vec<Line, REPORT_LINES>;

/// Reports the operator can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PrintRequest {
    /// The current level of every tank
    All,
    /// The recent history of one tank
    History(TankId),
}

/// Appends a line to a report
fn push(report: &mut Report, line: Line) {
    let fits = report.push(line).is_ok();
    assert!(fits, "report longer than {REPORT_LINES} lines");
}

/// Closes a report with the separator and an empty line
fn finish(mut report: Report) -> Report {
    push(&mut report, format_line(format_args!("{SEPARATOR}")));
    push(&mut report, format_line(format_args!(" ")));
    report
}

/// Formats the report of all tank levels; tanks without a reading are left out
pub fn all_tanks_report(now: Time, levels: [Option<Level>; TANK_COUNT]) -> Report {
    let mut report = Report::new();
    push(&mut report, format_line(format_args!("Time: {now}")));
    for (tank, level) in TankId::ALL.into_iter().zip(levels) {
        if let Some(level) = level {
            push(&mut report, format_line(format_args!("{tank}: {level} gls.")));
        }
    }
    finish(report)
}

/// Formats the history report of `tank` from its samples, newest first
pub fn history_report(tank: TankId, samples: &[Sample]) -> Report {
    let mut report = Report::new();
    push(&mut report, format_line(format_args!("{tank}")));
    for sample in samples.iter().take(REPORT_HISTORY) {
        push(
            &mut report,
            format_line(format_args!("{} {:4} gls.", sample.time, sample.level)),
        );
    }
    finish(report)
}

/// A report being printed
struct PrintJob {
    /// All lines of the report
    lines: Report,
    /// How many lines have been sent to the printer
    printed: usize,
}

/// Mailbox and streaming state of the printer task
pub struct Printer {
    /// Print requests waiting for the printer
    mailbox: Mailbox<PrintRequest>,
    /// The report being printed, if any
    job: Mutex<CriticalSectionRawMutex, RefCell<Option<PrintJob>>>,
    /// Raised when the last line of the job has been acknowledged
    done: Signal<CriticalSectionRawMutex, ()>,
}

impl Printer {
    /// Creates an idle printer
    pub const fn new() -> Self {
        Self {
            mailbox: Mailbox::new(),
            job: Mutex::new(RefCell::new(None)),
            done: Signal::new(),
        }
    }

    /// Queues a report; it is printed once every earlier report has finished
    pub async fn request(&self, request: PrintRequest) {
        self.mailbox.send(request).await;
    }

    /// Whether a report is being printed
    pub fn is_printing(&self) -> bool {
        self.job.lock(|job| job.borrow().is_some())
    }

    /// Replaces the current job with `lines` and sends the first line
    fn start<H: Hardware>(&self, hardware: &H, lines: Report) {
        self.done.reset();
        self.job.lock(|job| {
            let mut job = job.borrow_mut();
            match lines.first() {
                Some(first) => {
                    hardware.printer_output_line(first);
                    *job = Some(PrintJob { lines, printed: 1 });
                }
                None => {
                    *job = None;
                    self.done.signal(());
                }
            }
        });
    }

    /// Handles the printer's acknowledgment of the line it just printed: sends the next line, or
    /// finishes the job after the last one
    ///
    /// # Errors
    /// Returns [`Error::NoPrintJob`] if no report is being printed.
    pub fn line_printed<H: Hardware>(&self, hardware: &H) -> Result<(), Error> {
        self.job.lock(|job| {
            let mut job = job.borrow_mut();
            let current = job.as_mut().ok_or(Error::NoPrintJob)?;
            if current.printed < current.lines.len() {
                hardware.printer_output_line(&current.lines[current.printed]);
                current.printed += 1;
            } else {
                *job = None;
                self.done.signal(());
            }
            Ok(())
        })
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

/// Printer task: formats each requested report and waits for it to be printed
pub async fn printer_task<H: Hardware>(monitor: &TankMonitor<H>) {
    info!("Printer task initialized successfully");

    loop {
        let request = monitor.printer.mailbox.receive().await;
        let report = match request {
            PrintRequest::All => {
                let mut levels = [None; TANK_COUNT];
                for tank in TankId::ALL {
                    levels[tank.index()] = monitor.history.latest(tank).await.map(|sample| sample.level);
                }
                all_tanks_report(monitor.clock.now(), levels)
            }
            PrintRequest::History(tank) => {
                let samples = monitor.history.get(tank, REPORT_HISTORY).await;
                history_report(tank, &samples)
            }
        };

        info!("Printing a report of {} lines", report.len());
        monitor.printer.start(&monitor.hardware, report);
        monitor.printer.done.wait().await;
        info!("Report printed");
    }
}
