//! # MC3000 Protocol Module
//!
//! Implementation of the SkyRC MC3000 binary protocol for both transports.
//!
//! This module handles:
//! - Telemetry notification decoding (20-byte BLE frames)
//! - Poll-request frame encoding (one per slot)
//! - Slot-settings decoding and encoding (USB read/write frames)
//! - Additive checksum calculation
//! - Chemistry/mode/status/LED label resolution

pub mod checksum;
pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod settings;
pub mod tables;

pub use decoder::{decode_slot_settings, decode_telemetry};
pub use encoder::{build_poll_request, encode_slot_settings, read_request_frame};
pub use frame::BatteryInfo;
pub use settings::SlotSettings;
pub use tables::{Label, LedColor};
