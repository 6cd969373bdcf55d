//! # MC3000 Library
//!
//! Monitor and configure the SkyRC MC3000 multi-slot battery charger.
//!
//! This library implements the charger's proprietary binary protocol over
//! its two transports: a BLE notify/write characteristic for live per-slot
//! telemetry, and USB bulk endpoints for reading and writing per-slot
//! configuration profiles. The codec is pure byte-in/record-out; sessions,
//! polling and persistence are layered on top.

pub mod ble;
pub mod config;
pub mod error;
pub mod protocol;
pub mod store;
pub mod usb;
