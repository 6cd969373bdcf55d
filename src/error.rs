//! # Error Types
//!
//! Custom error types for the MC3000 tool using `thiserror`.
//!
//! Unknown chemistry/mode/status codes are deliberately absent here: they
//! resolve to fallback labels instead of failing, so newer firmware never
//! breaks decoding.

use thiserror::Error;

/// Main error type for the MC3000 tool
#[derive(Debug, Error)]
pub enum Mc3000Error {
    /// Frame failed its additive checksum; not interpretable as any record
    #[error("checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    Checksum { expected: u8, actual: u8 },

    /// Frame has the wrong shape (length, header) for its message type
    #[error("malformed frame: {0}")]
    Frame(String),

    /// A profile field failed integer coercion or its wire-width range
    #[error("field '{field}' has invalid value '{value}'")]
    InvalidField { field: &'static str, value: String },

    /// A required profile field is absent
    #[error("field '{0}' is missing")]
    MissingField(&'static str),

    /// Profile payload was valid JSON but not a flat object
    #[error("profile payload must be a flat JSON object")]
    ProfilePayload,

    /// No stored profile under the given identity token
    #[error("no profile with id '{0}'")]
    ProfileNotFound(String),

    /// The charger is not present on the USB bus
    #[error("charger not found, make sure it is connected via USB and the driver is working")]
    DeviceNotFound,

    /// USB transfer timed out waiting for the device
    #[error("USB transfer timed out")]
    UsbTimeout,

    /// USB transfer errors
    #[error("USB transfer error: {0}")]
    Usb(#[from] nusb::transfer::TransferError),

    /// Bluetooth errors
    #[error("bluetooth error: {0}")]
    Ble(#[from] bluest::Error),

    /// Missing adapter, service or characteristic during BLE setup
    #[error("bluetooth setup failed: {0}")]
    BleSetup(String),

    /// JSON decode errors
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the MC3000 tool
pub type Result<T> = std::result::Result<T, Mc3000Error>;
