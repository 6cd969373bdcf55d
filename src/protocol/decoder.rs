//! # Frame Decoders
//!
//! Decodes BLE telemetry notifications and USB slot-settings read responses.
//! All multi-byte fields are big-endian at fixed offsets.

use super::checksum;
use super::frame::*;
use super::settings::SlotSettings;
use super::tables;
use crate::error::{Mc3000Error, Result};

/// Decode a 20-byte BLE telemetry notification
///
/// Returns `Ok(None)` for a well-formed frame whose command byte is not
/// battery-info; such frames belong to message types this crate does not
/// speak and are ignored by the polling loop.
///
/// # Arguments
///
/// * `frame` - Complete notification frame (20 bytes including checksum)
///
/// # Errors
///
/// Returns error if:
/// - Frame is not exactly 20 bytes
/// - The trailing checksum does not match
pub fn decode_telemetry(frame: &[u8]) -> Result<Option<BatteryInfo>> {
    if frame.len() != TELEMETRY_FRAME_SIZE {
        return Err(Mc3000Error::Frame(format!(
            "telemetry frame must be {} bytes, got {}",
            TELEMETRY_FRAME_SIZE,
            frame.len()
        )));
    }

    if !checksum::verify(frame) {
        return Err(Mc3000Error::Checksum {
            expected: checksum::compute(&frame[..frame.len() - 1]),
            actual: frame[frame.len() - 1],
        });
    }

    if frame[1] != CMD_BATTERY_INFO {
        return Ok(None);
    }

    let slot = frame[2];
    let chemistry_code = frame[3];
    let resistance_raw = u16::from_be_bytes([frame[16], frame[17]]);

    Ok(Some(BatteryInfo {
        slot,
        chemistry: tables::telemetry_chemistry(chemistry_code),
        mode: tables::telemetry_mode(chemistry_code, frame[4]),
        cycle_count: frame[5],
        status: tables::status(frame[6]),
        seconds: u16::from_be_bytes([frame[7], frame[8]]),
        voltage_mv: u16::from_be_bytes([frame[9], frame[10]]),
        current_ma: u16::from_be_bytes([frame[11], frame[12]]),
        capacity_mah: u16::from_be_bytes([frame[13], frame[14]]),
        temperature_c: frame[15],
        resistance_mohm: if RESISTANCE_NA_SENTINELS.contains(&resistance_raw) {
            None
        } else {
            Some(resistance_raw)
        },
        led: tables::resolve_led_color(frame[18], slot),
    }))
}

/// Decode a USB slot-settings read response
///
/// The caller is responsible for checksum-verifying the transport message;
/// the USB session does this before handing bytes to the decoder. The
/// original response bytes are retained on the record for diagnostics.
///
/// # Arguments
///
/// * `data` - Read-response bytes (at least 32)
///
/// # Errors
///
/// Returns error if the response is too short to cover every field.
pub fn decode_slot_settings(data: &[u8]) -> Result<SlotSettings> {
    if data.len() < SETTINGS_READ_MIN_SIZE {
        return Err(Mc3000Error::Frame(format!(
            "settings response too short: expected at least {} bytes, got {}",
            SETTINGS_READ_MIN_SIZE,
            data.len()
        )));
    }

    Ok(SlotSettings {
        slot_number: data[1],
        busy_tag: data[2],
        battery_type: data[3],
        operation_mode: data[4],
        capacity: u16::from_be_bytes([data[5], data[6]]),
        charge_current: u16::from_be_bytes([data[7], data[8]]),
        discharge_current: u16::from_be_bytes([data[9], data[10]]),
        discharge_cut_voltage: u16::from_be_bytes([data[11], data[12]]),
        charge_end_voltage: u16::from_be_bytes([data[13], data[14]]),
        charge_end_current: u16::from_be_bytes([data[15], data[16]]),
        discharge_reduce_current: u16::from_be_bytes([data[17], data[18]]),
        number_cycle: data[19],
        charge_resting_time: data[20],
        cycle_mode: data[21],
        peak_sense_voltage: data[22],
        trickle_current: data[23],
        restart_voltage: u16::from_be_bytes([data[24], data[25]]),
        cut_temperature: data[26],
        cut_time: u16::from_be_bytes([data[27], data[28]]),
        temperature_unit: data[29],
        trickle_time: data[30],
        discharge_resting_time: data[31],
        id: None,
        name: None,
        raw: Some(data.to_vec()),
    })
}

/// Build a checksummed 64-byte read response carrying the given settings,
/// laid out at the read-path offsets. Test scaffolding for both codec
/// directions.
#[cfg(test)]
pub(crate) fn build_read_response(settings: &SlotSettings) -> Vec<u8> {
    let mut data = vec![0u8; USB_MESSAGE_SIZE];
    data[0] = FRAME_HEADER;
    data[1] = settings.slot_number;
    data[2] = settings.busy_tag;
    data[3] = settings.battery_type;
    data[4] = settings.operation_mode;
    data[5..7].copy_from_slice(&settings.capacity.to_be_bytes());
    data[7..9].copy_from_slice(&settings.charge_current.to_be_bytes());
    data[9..11].copy_from_slice(&settings.discharge_current.to_be_bytes());
    data[11..13].copy_from_slice(&settings.discharge_cut_voltage.to_be_bytes());
    data[13..15].copy_from_slice(&settings.charge_end_voltage.to_be_bytes());
    data[15..17].copy_from_slice(&settings.charge_end_current.to_be_bytes());
    data[17..19].copy_from_slice(&settings.discharge_reduce_current.to_be_bytes());
    data[19] = settings.number_cycle;
    data[20] = settings.charge_resting_time;
    data[21] = settings.cycle_mode;
    data[22] = settings.peak_sense_voltage;
    data[23] = settings.trickle_current;
    data[24..26].copy_from_slice(&settings.restart_voltage.to_be_bytes());
    data[26] = settings.cut_temperature;
    data[27..29].copy_from_slice(&settings.cut_time.to_be_bytes());
    data[29] = settings.temperature_unit;
    data[30] = settings.trickle_time;
    data[31] = settings.discharge_resting_time;
    let sum = checksum::compute(&data[..USB_MESSAGE_SIZE - 1]);
    data[USB_MESSAGE_SIZE - 1] = sum;
    data
}
