#![no_std]
#![no_main]

use defmt::{Debug2Format, error, info, trace};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::{
    bind_interrupts,
    block::ImageDef,
    config::Config,
    gpio::{Input, Level as PinLevel, Output, Pull},
    i2c::{Async, Config as I2cConfig, I2c, InterruptHandler},
    peripherals::I2C0,
};
use embassy_time::{Duration, Ticker, Timer};
use panic_probe as _;
use ssd1306::{I2CDisplayInterface, Ssd1306Async, prelude::*};
use static_cell::StaticCell;
use tank_monitor::{
    ProcessingDelay, TankMonitor, button_task, clock::TICK_INTERVAL, display_task, levels::PROCESSING_TIME,
    levels_task, overflow_task, printer_task,
};

use crate::panel::{FLOAT_READ_TIME, PRINT_LINE_TIME, Panel, SimulatedFloats};

mod panel;

// Firmware image type for bootloader
#[unsafe(link_section = ".start_block")]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

bind_interrupts!(struct Irqs {
        I2C0_IRQ => InterruptHandler<I2C0>;
    }
);

/// Key codes of the panel buttons, in the order of their pins (GPIO 2 to 9)
const KEY_CODES: [u8; 8] = *b"P1TH2A3R";

/// Settling time of a button contact
const DEBOUNCE: Duration = Duration::from_millis(20);

/// The monitor, shared by all tasks
static MONITOR: StaticCell<TankMonitor<Panel>> = StaticCell::new();

/// Level processing time spent on a timer
struct TimerDelay;

impl ProcessingDelay for TimerDelay {
    async fn wait(&mut self) {
        Timer::after(PROCESSING_TIME).await;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // I2C setup
    let sda = p.PIN_16;
    let scl = p.PIN_17;
    let i2c = I2c::new_async(p.I2C0, scl, sda, Irqs, I2cConfig::default());

    let bell = Output::new(p.PIN_15, PinLevel::Low);
    let monitor: &'static TankMonitor<Panel> = MONITOR.init(TankMonitor::new(Panel::new(bell)));

    let buttons = [
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_3, Pull::Up),
        Input::new(p.PIN_4, Pull::Up),
        Input::new(p.PIN_5, Pull::Up),
        Input::new(p.PIN_6, Pull::Up),
        Input::new(p.PIN_7, Pull::Up),
        Input::new(p.PIN_8, Pull::Up),
        Input::new(p.PIN_9, Pull::Up),
    ];

    spawner.must_spawn(oled_task(i2c, monitor.hardware()));
    spawner.must_spawn(level_sampler(monitor));
    spawner.must_spawn(overflow_watchdog(monitor));
    spawner.must_spawn(command_buttons(monitor));
    spawner.must_spawn(display_arbiter(monitor));
    spawner.must_spawn(report_printer(monitor));
    spawner.must_spawn(floats_sim_task(monitor));
    spawner.must_spawn(printer_sim_task(monitor));
    spawner.must_spawn(ticker_task(monitor));
    for (button, code) in buttons.into_iter().zip(KEY_CODES) {
        spawner.must_spawn(button_pin_task(button, code, monitor));
    }

    info!("Tank monitor started");
}

/// Level task on a timer-backed processing delay
#[embassy_executor::task]
async fn level_sampler(monitor: &'static TankMonitor<Panel>) {
    levels_task(monitor, TimerDelay).await;
}

/// Overflow task
#[embassy_executor::task]
async fn overflow_watchdog(monitor: &'static TankMonitor<Panel>) {
    overflow_task(monitor).await;
}

/// Button task
#[embassy_executor::task]
async fn command_buttons(monitor: &'static TankMonitor<Panel>) {
    button_task(monitor).await;
}

/// Display task
#[embassy_executor::task]
async fn display_arbiter(monitor: &'static TankMonitor<Panel>) {
    display_task(monitor).await;
}

/// Printer task
#[embassy_executor::task]
async fn report_printer(monitor: &'static TankMonitor<Panel>) {
    printer_task(monitor).await;
}

/// Feeds the monitor clock every third of a second
#[embassy_executor::task]
async fn ticker_task(monitor: &'static TankMonitor<Panel>) {
    info!("Ticker task initialized successfully");

    let mut ticker = Ticker::every(TICK_INTERVAL);
    loop {
        ticker.next().await;
        monitor.tick().await;
    }
}

/// One push button: every debounced press is reported as a button interrupt
#[embassy_executor::task(pool_size = 8)]
async fn button_pin_task(mut button: Input<'static>, code: u8, monitor: &'static TankMonitor<Panel>) {
    loop {
        button.wait_for_falling_edge().await;
        Timer::after(DEBOUNCE).await;
        if button.is_low() {
            trace!("Button {} pressed", code);
            monitor.hardware().set_key(code);
            monitor.button_interrupt().await;
        }
        button.wait_for_high().await;
        Timer::after(DEBOUNCE).await;
    }
}

/// Stands in for the float hardware: answers every read after a short measuring time
#[embassy_executor::task]
async fn floats_sim_task(monitor: &'static TankMonitor<Panel>) {
    info!("Float simulation initialized successfully");

    let mut floats = SimulatedFloats::new();
    loop {
        let tank = monitor.hardware().read_requested().await;
        Timer::after(FLOAT_READ_TIME).await;
        monitor.hardware().set_level(floats.measure(tank));
        if let Err(e) = monitor.floats_interrupt() {
            error!("Float simulation out of step: {}", e);
        }
    }
}

/// Stands in for the printer: acknowledges every line after a short printing time
#[embassy_executor::task]
async fn printer_sim_task(monitor: &'static TankMonitor<Panel>) {
    info!("Printer simulation initialized successfully");

    loop {
        monitor.hardware().paper_fed().await;
        Timer::after(PRINT_LINE_TIME).await;
        if let Err(e) = monitor.printer_interrupt() {
            error!("Printer simulation out of step: {}", e);
        }
    }
}

/// Shows the panel on the SSD1306 whenever it changes
#[embassy_executor::task]
async fn oled_task(i2c: I2c<'static, I2C0, Async>, panel: &'static Panel) {
    let interface = I2CDisplayInterface::new(i2c);
    let mut display =
        Ssd1306Async::new(interface, DisplaySize128x64, DisplayRotation::Rotate0).into_buffered_graphics_mode();

    if let Err(e) = display.init().await {
        error!("Failed to initialize display: {}", Debug2Format(&e));
        return;
    }

    info!("OLED task initialized successfully");

    loop {
        if let Err(e) = panel.draw(&mut display) {
            error!("Failed to draw panel (continuing): {}", Debug2Format(&e));
        }
        if let Err(e) = display.flush().await {
            error!("Failed to flush display (continuing): {}", Debug2Format(&e));
        }
        panel.redraw_requested().await;
    }
}
