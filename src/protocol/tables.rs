//! # Enumeration Registry
//!
//! Static label tables for chemistry, operation-mode, status and LED codes.
//!
//! The telemetry (BLE) and configuration (USB) firmware paths carry their
//! own chemistry tables and their own chemistry-to-mode-group mappings. The
//! two disagree in size and grouping and are kept separate on purpose;
//! reconciling them would change decoded labels.
//!
//! Every lookup here is total: an unrecognized code resolves to a fallback
//! label instead of failing, so firmware revisions newer than this crate
//! degrade gracefully.

use std::fmt;

/// Chemistry labels as reported on the telemetry path (9 entries)
pub const TELEMETRY_CHEMISTRIES: [&str; 9] = [
    "LiIon", "LiFe", "LiIo4.35", "NiMH", "NiCd", "NiZn", "Eneloop", "RAM", "Batlto",
];

/// Chemistry labels as used by the configuration path (8 entries)
///
/// One fewer than the telemetry table; the configuration firmware never
/// reports `Batlto`.
pub const CONFIG_CHEMISTRIES: [&str; 8] = [
    "LiIon", "LiFe", "LiIo4.35", "NiMH", "NiCd", "NiZn", "Eneloop", "RAM",
];

/// Operation modes for lithium chemistries
pub const MODES_LI: [&str; 5] = ["Charge", "Refresh", "Storage", "Discharge", "Cycle"];

/// Operation modes for zinc/RAM chemistries
pub const MODES_ZN_RAM: [&str; 4] = ["Charge", "Refresh", "Discharge", "Cycle"];

/// Operation modes for nickel chemistries
pub const MODES_NI: [&str; 5] = ["Charge", "Refresh", "Break-in", "Discharge", "Cycle"];

/// A resolved label for a numeric protocol code
///
/// `Known` carries an entry from one of the static tables. `Fallback` carries
/// a synthesized label for a code outside the tables; resolution never fails,
/// which keeps decoding forward-compatible with newer firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    Known(&'static str),
    Fallback(String),
}

impl Label {
    /// The label text, regardless of provenance
    pub fn as_str(&self) -> &str {
        match self {
            Label::Known(s) => s,
            Label::Fallback(s) => s,
        }
    }

    /// Whether this label came from a static table
    pub fn is_known(&self) -> bool {
        matches!(self, Label::Known(_))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slot LED color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedColor {
    None,
    Red,
    Green,
}

impl fmt::Display for LedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LedColor::None => "none",
            LedColor::Red => "red",
            LedColor::Green => "green",
        })
    }
}

/// Resolve a telemetry-path chemistry code
pub fn telemetry_chemistry(code: u8) -> Label {
    match TELEMETRY_CHEMISTRIES.get(code as usize) {
        Some(label) => Label::Known(label),
        None => Label::Fallback("unknown".to_string()),
    }
}

/// Resolve a telemetry-path operation-mode code
///
/// The chemistry code selects which mode list applies: codes {0, 1, 2, 8}
/// use the lithium list, {5, 7} the zinc/RAM list, {3, 4, 6} the nickel
/// list. A chemistry or mode outside those resolves to "unknown".
pub fn telemetry_mode(chemistry_code: u8, mode_code: u8) -> Label {
    let modes: &[&'static str] = match chemistry_code {
        0 | 1 | 2 | 8 => &MODES_LI,
        5 | 7 => &MODES_ZN_RAM,
        3 | 4 | 6 => &MODES_NI,
        _ => return Label::Fallback("unknown".to_string()),
    };

    match modes.get(mode_code as usize) {
        Some(label) => Label::Known(label),
        None => Label::Fallback("unknown".to_string()),
    }
}

/// Resolve a configuration-path chemistry code
///
/// Unknown codes synthesize a `Type<N>` label.
pub fn config_chemistry(code: u8) -> Label {
    match CONFIG_CHEMISTRIES.get(code as usize) {
        Some(label) => Label::Known(label),
        None => Label::Fallback(format!("Type{}", code)),
    }
}

/// Resolve a configuration-path operation-mode code
///
/// The configuration firmware groups chemistries differently from the
/// telemetry path: {0, 1, 2} use the lithium list, {3, 4, 6} the nickel
/// list, everything else the zinc/RAM list. Out-of-range modes synthesize
/// a `Mode<N>` label.
pub fn config_mode(battery_type: u8, operation_mode: u8) -> Label {
    let modes: &[&'static str] = match battery_type {
        0 | 1 | 2 => &MODES_LI,
        3 | 4 | 6 => &MODES_NI,
        _ => &MODES_ZN_RAM,
    };

    match modes.get(operation_mode as usize) {
        Some(label) => Label::Known(label),
        None => Label::Fallback(format!("Mode{}", operation_mode)),
    }
}

/// Resolve a slot status code
///
/// Five normal states plus the fault band 128-140; anything else resolves
/// to "unknown error".
pub fn status(code: u8) -> Label {
    let label = match code {
        0 => "Standby",
        1 => "Charge",
        2 => "Discharge",
        3 => "Pause",
        4 => "Completed",
        128 => "Input low voltage",
        129 => "Input high voltage",
        130 => "ADC MCP3424-1 error",
        131 => "ADC MCP3424-2 error",
        132 => "Connection brake",
        133 => "Check voltage",
        134 => "Capacity limit reached",
        135 => "Time limit reached",
        136 => "SysTemp too hot",
        137 => "Battery too hot",
        138 => "Short circuit",
        139 => "Wrong polarity",
        140 => "Bad battery (high IR)",
        _ => return Label::Fallback("unknown error".to_string()),
    };
    Label::Known(label)
}

/// Resolve the LED color for a slot from the LED bitmask byte
///
/// Bit `slot` set means red; otherwise bit `slot + 4` set means green;
/// otherwise the LED is off. Red takes precedence when both bits are set.
pub fn resolve_led_color(mask: u8, slot: u8) -> LedColor {
    if (mask >> slot) & 1 == 1 {
        LedColor::Red
    } else if (mask >> (slot + 4)) & 1 == 1 {
        LedColor::Green
    } else {
        LedColor::None
    }
}
