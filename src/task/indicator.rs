//! # Indicator task
//! Drives the Pico W on-board LED, which is wired to GPIO 0 of the CYW43 radio and can
//! only be switched through its asynchronous control channel. The poll loop signals the
//! wanted level, this task applies it.
use defmt::info;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};

/// CYW43 GPIO carrying the on-board LED
const LED_GPIO: u8 = 0;

/// Signal for controlling the indicator, `true` is lit
static INDICATOR_SIGNAL: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Signals the indicator task with the wanted level
pub fn signal_indicator(on: bool) {
    INDICATOR_SIGNAL.signal(on);
}

/// Waits for the next indicator level
async fn wait_for_indicator_level() -> bool {
    INDICATOR_SIGNAL.wait().await
}

#[embassy_executor::task]
pub async fn indicator_handler(mut control: cyw43::Control<'static>) {
    info!("Indicator task started");

    // Initially turn off the LED
    control.gpio_set(LED_GPIO, false).await;
    let mut lit = false;

    loop {
        // Wait for the next level, only the latest one counts
        let on = wait_for_indicator_level().await;
        if on != lit {
            info!("Indicator {}", if on { "on" } else { "off" });
            control.gpio_set(LED_GPIO, on).await;
            lit = on;
        }
    }
}
