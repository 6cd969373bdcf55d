//! # MC3000 Protocol Constants and Types
//!
//! Core frame definitions shared by the BLE and USB codecs.

use std::fmt;
use std::time::Duration;

use super::tables::{Label, LedColor};

/// Frame header byte (first byte of every request frame)
pub const FRAME_HEADER: u8 = 0x0F;

/// Battery-info command byte (telemetry request and notification)
pub const CMD_BATTERY_INFO: u8 = 0x55;

/// BLE telemetry frame size (request and notification alike)
pub const TELEMETRY_FRAME_SIZE: usize = 20;

/// Number of independent battery bays on the charger
pub const SLOT_COUNT: u8 = 4;

/// USB bulk message size; shorter writes are zero-padded to this length
pub const USB_MESSAGE_SIZE: usize = 64;

/// USB slot-settings write frame header
pub const SETTINGS_WRITE_HEADER: [u8; 4] = [0x0F, 0x20, 0x11, 0x00];

/// USB slot-settings write frame size (header + body + checksum + tail)
pub const SETTINGS_WRITE_FRAME_SIZE: usize = 36;

/// Minimum USB read-response length covering every settings field
pub const SETTINGS_READ_MIN_SIZE: usize = 32;

/// USB slot-settings read request frame size
pub const READ_REQUEST_SIZE: usize = 8;

/// Raw internal-resistance values the firmware uses to mean "not applicable"
pub const RESISTANCE_NA_SENTINELS: [u16; 3] = [0, 1, 65535];

/// One decoded telemetry snapshot for a single slot
///
/// Produced fresh from each verified BLE notification; wire units are kept
/// as integers with conversion helpers for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryInfo {
    /// Slot index, 0-3
    pub slot: u8,

    /// Battery chemistry, resolved through the telemetry chemistry table
    pub chemistry: Label,

    /// Operation mode, resolved through the chemistry-gated mode list
    pub mode: Label,

    /// Charge-cycle count reported by the firmware
    pub cycle_count: u8,

    /// Slot status (normal state or fault), resolved through the status table
    pub status: Label,

    /// Elapsed/remaining time of the running operation in seconds
    pub seconds: u16,

    /// Battery voltage in millivolts
    pub voltage_mv: u16,

    /// Charge/discharge current in milliamps
    pub current_ma: u16,

    /// Accumulated capacity in mAh
    pub capacity_mah: u16,

    /// Battery temperature in degrees Celsius
    pub temperature_c: u8,

    /// Internal resistance in milliohms; `None` when the firmware reports
    /// one of the not-applicable sentinels (0, 1, 65535)
    pub resistance_mohm: Option<u16>,

    /// Slot LED color
    pub led: LedColor,
}

impl BatteryInfo {
    /// Battery voltage in volts
    pub fn volts(&self) -> f32 {
        self.voltage_mv as f32 / 1000.0
    }

    /// Charge/discharge current in amps
    pub fn amps(&self) -> f32 {
        self.current_ma as f32 / 1000.0
    }

    /// Elapsed/remaining time of the running operation
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.seconds as u64)
    }
}

impl fmt::Display for BatteryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = (self.seconds / 3600, (self.seconds / 60) % 60, self.seconds % 60);
        write!(
            f,
            "slot {} {} {} [{}] {:02}:{:02}:{:02} {:.3}V {:.3}A {}mAh {}C IR ",
            self.slot + 1,
            self.chemistry,
            self.mode,
            self.status,
            h,
            m,
            s,
            self.volts(),
            self.amps(),
            self.capacity_mah,
            self.temperature_c,
        )?;
        match self.resistance_mohm {
            Some(mohm) => write!(f, "{}mOhm", mohm)?,
            None => write!(f, "n/a")?,
        }
        write!(f, " led {} (cycle {})", self.led, self.cycle_count)
    }
}
