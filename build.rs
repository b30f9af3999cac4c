//! This build script does two things:
//! - it generates `alarm_config.rs` from `config/alarm_config.json`, so the firmware
//!   settings are compile time constants.
//! - for the thumb targets it copies the `memory.x` file from the crate root into
//!   a directory where the linker can always find it at build time, and passes the
//!   cortex-m linker scripts to the binary.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::print_stdout)]

use serde::Deserialize;
use std::{
    env, fs,
    fs::File,
    io,
    io::Write,
    path::{Path, PathBuf},
};

/// Default contents written to `config/alarm_config.json` if it does not exist yet
const DEFAULT_CONFIG: &str = r#"{
    "device_name": "PicoBLE",
    "snooze_minutes": 5,
    "ring_timeout_minutes": 5,
    "tick_interval_secs": 15,
    "motor_stop_mode": "brake",
    "self_test_on_boot": false
}
"#;

/// Shape of `config/alarm_config.json`
#[derive(Deserialize)]
struct AlarmConfigFile {
    /// Name advertised over BLE
    device_name: String,
    /// Minutes added to the current time on snooze
    snooze_minutes: u8,
    /// Minutes after which a ring stops by itself, 0 disables
    ring_timeout_minutes: u8,
    /// Seconds between two clock samples of the poll loop
    tick_interval_secs: u64,
    /// "brake" or "coast"
    motor_stop_mode: String,
    /// Pulse motor and led once at boot
    self_test_on_boot: bool,
}

fn main() {
    println!("in build.rs");
    alarm_config().unwrap();
    if env::var("TARGET").is_ok_and(|target| target.starts_with("thumb")) {
        memory_x();
    }
}

/// Generate `alarm_config.rs` from `alarm_config.json`
fn alarm_config() -> io::Result<()> {
    println!("in alarm_config");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR environment variable not set");
    let dest_path = Path::new(&out_dir).join("alarm_config.rs");
    let mut f = File::create(dest_path).expect("Could not create alarm_config.rs file");

    // Read the alarm_config.json file, or create it with default values if it doesn't exist
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR environment variable not set");
    let config_path = Path::new(&manifest_dir).join("config/alarm_config.json");
    println!("cargo:rerun-if-changed={}", config_path.display());
    let config_contents = if config_path.exists() {
        fs::read_to_string(&config_path).expect("Could not read alarm_config.json file")
    } else {
        println!("alarm_config.json not found, creating with default values");
        fs::create_dir_all(config_path.parent().expect("config path has a parent"))
            .expect("Could not create config directory");
        fs::write(&config_path, DEFAULT_CONFIG).expect("Could not write default alarm_config.json file");
        DEFAULT_CONFIG.to_string()
    };

    let config: AlarmConfigFile =
        serde_json::from_str(&config_contents).expect("Could not parse alarm_config.json file");

    assert!(
        (1..=59).contains(&config.snooze_minutes),
        "snooze_minutes must be within 1..=59, got {}",
        config.snooze_minutes
    );
    assert!(
        (1..=60).contains(&config.tick_interval_secs),
        "tick_interval_secs must be within 1..=60, got {}",
        config.tick_interval_secs
    );
    let brake_on_stop = match config.motor_stop_mode.as_str() {
        "brake" => true,
        "coast" => false,
        other => panic!("motor_stop_mode must be \"brake\" or \"coast\", got {other:?}"),
    };

    writeln!(f, "pub const DEVICE_NAME: &str = {:?};", config.device_name)?;
    writeln!(f, "pub const SNOOZE_MINUTES: u8 = {};", config.snooze_minutes)?;
    writeln!(f, "pub const RING_TIMEOUT_MINUTES: u8 = {};", config.ring_timeout_minutes)?;
    writeln!(f, "pub const TICK_INTERVAL_SECS: u64 = {};", config.tick_interval_secs)?;
    writeln!(f, "pub const MOTOR_BRAKE_ON_STOP: bool = {brake_on_stop};")?;
    writeln!(f, "pub const SELF_TEST_ON_BOOT: bool = {};", config.self_test_on_boot)?;
    Ok(())
}

/// Handle the `memory.x` linker script
fn memory_x() {
    println!("in memory_x");
    // Put `memory.x` in our output directory and ensure it's
    // on the linker search path.
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());

    // By specifying `memory.x` here, we ensure the build script is only re-run when
    // `memory.x` is changed.
    println!("cargo:rerun-if-changed=memory.x");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
