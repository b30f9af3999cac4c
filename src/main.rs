//! # Pico haptic alarm firmware
//! Raspberry Pi Pico W: vibration motor on an H-bridge (GPIO 13/12), on-board LED as
//! indicator, RP2040 RTC as clock and a BLE GATT remote on the CYW43 radio.
//!
//! The CYW43 firmware blobs are not part of the image, flash them once with
//! ```text
//! probe-rs download 43439A0.bin --binary-format bin --chip RP2040 --base-address 0x10100000
//! probe-rs download 43439A0_clm.bin --binary-format bin --chip RP2040 --base-address 0x10140000
//! probe-rs download 43439A0_btfw.bin --binary-format bin --chip RP2040 --base-address 0x10141400
//! ```

// we are in an environment with constrained resources, so we do not use the standard library and we define a different entry point.
#![no_std]
#![no_main]

use crate::task::ble::{BleController, ble_task};
use crate::task::indicator::indicator_handler;
use crate::task::poll_loop::{BoardActuator, poll_loop};
use crate::task::rtc_clock::RtcClock;
use crate::task::watchdog::watchdog_task;
use cyw43_pio::{DEFAULT_CLOCK_DIVIDER, PioSpi};
use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_rp::pio::{self, Pio};
use embassy_rp::rtc::{self, Rtc};
use embassy_time::Duration;
use pico_haptic_alarm::drivers::hbridge::HBridgeMotor;
use pico_haptic_alarm::{AlarmController, AlarmService, Settings};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _}; // global logger and panic handler

mod task;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => pio::InterruptHandler<PIO0>;
    RTC_IRQ => rtc::InterruptHandler;
});

/// Flash address of the CYW43 firmware
const CYW43_FW_ADDR: usize = 0x1010_0000;
/// Size of `43439A0.bin`
const CYW43_FW_LEN: usize = 230_321;
/// Flash address of the CYW43 country locale matrix
const CYW43_CLM_ADDR: usize = 0x1014_0000;
/// Size of `43439A0_clm.bin`
const CYW43_CLM_LEN: usize = 4752;
/// Flash address of the CYW43 bluetooth firmware
const CYW43_BTFW_ADDR: usize = 0x1014_1400;
/// Size of `43439A0_btfw.bin`
const CYW43_BTFW_LEN: usize = 6164;

/// Runs the CYW43 driver, must never stop
#[embassy_executor::task]
async fn cyw43_task(runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>) -> ! {
    runner.run().await
}

// Entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Program start");

    let settings = unwrap!(Settings::from_build_config());
    info!("Settings: {:?}", settings);

    // Initialize the peripherals for the RP2040
    let p = embassy_rp::init(Default::default());

    // Motor first, so the bridge is stopped as early as possible
    let motor = HBridgeMotor::new(
        Output::new(p.PIN_13, Level::Low),
        Output::new(p.PIN_12, Level::Low),
        settings.motor_stop_mode,
    );

    // Watchdog
    unwrap!(spawner.spawn(watchdog_task(p.WATCHDOG)));

    // CYW43 with bluetooth
    info!("init cyw43");
    // SAFETY: the blobs are flashed to these addresses (see above) and flash is memory mapped
    let fw = unsafe { core::slice::from_raw_parts(CYW43_FW_ADDR as *const u8, CYW43_FW_LEN) };
    let clm = unsafe { core::slice::from_raw_parts(CYW43_CLM_ADDR as *const u8, CYW43_CLM_LEN) };
    let btfw = unsafe { core::slice::from_raw_parts(CYW43_BTFW_ADDR as *const u8, CYW43_BTFW_LEN) };

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (_net_device, bt_device, mut control, runner) = cyw43::new_with_bluetooth(state, pwr, spi, fw, btfw).await;
    unwrap!(spawner.spawn(cyw43_task(runner)));
    control.init(clm).await;

    unwrap!(spawner.spawn(indicator_handler(control)));
    unwrap!(spawner.spawn(ble_task(BleController::new(bt_device), settings.device_name)));

    // Alarm
    let rtc = Rtc::new(p.RTC, Irqs);
    let controller = AlarmController::new(BoardActuator::new(motor), settings.controller);
    let service = AlarmService::new(controller, RtcClock::new(rtc));
    unwrap!(spawner.spawn(poll_loop(
        service,
        Duration::from_secs(settings.tick_interval_secs),
        settings.self_test_on_boot,
    )));
}
