//! # Frame Encoders
//!
//! Builds BLE poll-request frames and USB slot-settings write frames.

use super::checksum;
use super::frame::*;
use super::settings::SlotSettings;

/// The four slot-settings read requests, one per slot
///
/// Literal frames: header, command 0x04/0x5F, slot index, checksum over
/// bytes 2-4, 0xFF 0xFF tail. Precomputed constants, not built at call time.
pub const SLOT_READ_REQUESTS: [[u8; READ_REQUEST_SIZE]; 4] = [
    [0x0F, 0x04, 0x5F, 0x00, 0x00, 0x5F, 0xFF, 0xFF],
    [0x0F, 0x04, 0x5F, 0x00, 0x01, 0x60, 0xFF, 0xFF],
    [0x0F, 0x04, 0x5F, 0x00, 0x02, 0x61, 0xFF, 0xFF],
    [0x0F, 0x04, 0x5F, 0x00, 0x03, 0x62, 0xFF, 0xFF],
];

/// Build the 20-byte BLE write frame requesting telemetry for one slot
///
/// Header, battery-info command, slot index, zero padding, trailing
/// checksum over bytes 0-18. Pure function of the slot index; the frame
/// checksum is always self-consistent no matter how often it is called.
///
/// # Panics
///
/// Panics if `slot` is not 0-3.
pub fn build_poll_request(slot: u8) -> [u8; TELEMETRY_FRAME_SIZE] {
    assert!(slot < SLOT_COUNT, "slot index out of range: {}", slot);

    let mut frame = [0u8; TELEMETRY_FRAME_SIZE];
    frame[0] = FRAME_HEADER;
    frame[1] = CMD_BATTERY_INFO;
    frame[2] = slot;
    frame[TELEMETRY_FRAME_SIZE - 1] = checksum::compute(&frame[..TELEMETRY_FRAME_SIZE - 1]);
    frame
}

/// The precomputed settings read request for one slot
///
/// # Panics
///
/// Panics if `slot` is not 0-3.
pub fn read_request_frame(slot: u8) -> [u8; READ_REQUEST_SIZE] {
    SLOT_READ_REQUESTS[slot as usize]
}

/// Encode slot settings into a 36-byte USB write frame
///
/// Fixed header, 32-byte body with fields at the write-path offsets,
/// checksum over bytes 2-32 at byte 33, 0xFF 0xFF tail. The write layout
/// is not the read layout: fields sit at different offsets and
/// `temperature_unit` is read-only, it never travels back to the device.
pub fn encode_slot_settings(settings: &SlotSettings) -> [u8; SETTINGS_WRITE_FRAME_SIZE] {
    let mut data = [0u8; SETTINGS_WRITE_FRAME_SIZE];
    data[..4].copy_from_slice(&SETTINGS_WRITE_HEADER);
    data[4] = settings.slot_number;
    data[5] = settings.battery_type;
    data[6..8].copy_from_slice(&settings.capacity.to_be_bytes());
    data[8] = settings.operation_mode;
    data[9..11].copy_from_slice(&settings.charge_current.to_be_bytes());
    data[11..13].copy_from_slice(&settings.discharge_current.to_be_bytes());
    data[13..15].copy_from_slice(&settings.discharge_cut_voltage.to_be_bytes());
    data[15..17].copy_from_slice(&settings.charge_end_voltage.to_be_bytes());
    data[17..19].copy_from_slice(&settings.charge_end_current.to_be_bytes());
    data[19..21].copy_from_slice(&settings.discharge_reduce_current.to_be_bytes());
    data[21] = settings.number_cycle;
    data[22] = settings.charge_resting_time;
    data[23] = settings.discharge_resting_time;
    data[24] = settings.cycle_mode;
    data[25] = settings.peak_sense_voltage;
    data[26] = settings.trickle_current;
    data[27] = settings.trickle_time;
    data[28] = settings.cut_temperature;
    data[29..31].copy_from_slice(&settings.cut_time.to_be_bytes());
    data[31..33].copy_from_slice(&settings.restart_voltage.to_be_bytes());
    data[33] = checksum::compute(&data[2..33]);
    data[34] = 0xFF;
    data[35] = 0xFF;
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decoder::{build_read_response, decode_slot_settings};
    use crate::protocol::settings::tests::sample_settings;

    #[test]
    fn test_poll_request_structure() {
        for slot in 0..SLOT_COUNT {
            let frame = build_poll_request(slot);
            assert_eq!(frame.len(), TELEMETRY_FRAME_SIZE);
            assert_eq!(frame[0], FRAME_HEADER);
            assert_eq!(frame[1], CMD_BATTERY_INFO);
            assert_eq!(frame[2], slot);
            assert!(frame[3..19].iter().all(|&b| b == 0));
            assert!(checksum::verify(&frame));
        }
    }

    #[test]
    fn test_poll_request_checksum_value() {
        // 0x0F + 0x55 = 0x64, plus the slot index
        assert_eq!(build_poll_request(0)[19], 0x64);
        assert_eq!(build_poll_request(3)[19], 0x67);
    }

    #[test]
    fn test_poll_request_is_deterministic() {
        assert_eq!(build_poll_request(2), build_poll_request(2));
    }

    #[test]
    #[should_panic(expected = "slot index out of range")]
    fn test_poll_request_rejects_bad_slot() {
        build_poll_request(4);
    }

    #[test]
    fn test_read_request_constants_are_consistent() {
        for (slot, frame) in SLOT_READ_REQUESTS.iter().enumerate() {
            assert_eq!(frame[0], FRAME_HEADER);
            assert_eq!(frame[1], 0x04);
            assert_eq!(frame[2], 0x5F);
            assert_eq!(frame[4], slot as u8);
            assert_eq!(frame[5], checksum::compute(&frame[2..5]));
            assert_eq!(&frame[6..], &[0xFF, 0xFF]);
        }
    }

    #[test]
    fn test_read_request_frame_lookup() {
        assert_eq!(read_request_frame(0), SLOT_READ_REQUESTS[0]);
        assert_eq!(read_request_frame(3), SLOT_READ_REQUESTS[3]);
    }

    #[test]
    fn test_encode_header_and_tail() {
        let data = encode_slot_settings(&sample_settings());
        assert_eq!(data.len(), SETTINGS_WRITE_FRAME_SIZE);
        assert_eq!(&data[..4], &SETTINGS_WRITE_HEADER);
        assert_eq!(data[34], 0xFF);
        assert_eq!(data[35], 0xFF);
    }

    #[test]
    fn test_encode_field_placement() {
        let settings = sample_settings();
        let data = encode_slot_settings(&settings);

        assert_eq!(data[4], settings.slot_number);
        assert_eq!(data[5], settings.battery_type);
        assert_eq!(u16::from_be_bytes([data[6], data[7]]), settings.capacity);
        assert_eq!(data[8], settings.operation_mode);
        assert_eq!(u16::from_be_bytes([data[9], data[10]]), settings.charge_current);
        assert_eq!(u16::from_be_bytes([data[11], data[12]]), settings.discharge_current);
        assert_eq!(u16::from_be_bytes([data[13], data[14]]), settings.discharge_cut_voltage);
        assert_eq!(u16::from_be_bytes([data[15], data[16]]), settings.charge_end_voltage);
        assert_eq!(u16::from_be_bytes([data[17], data[18]]), settings.charge_end_current);
        assert_eq!(
            u16::from_be_bytes([data[19], data[20]]),
            settings.discharge_reduce_current
        );
        assert_eq!(data[21], settings.number_cycle);
        assert_eq!(data[22], settings.charge_resting_time);
        assert_eq!(data[23], settings.discharge_resting_time);
        assert_eq!(data[24], settings.cycle_mode);
        assert_eq!(data[25], settings.peak_sense_voltage);
        assert_eq!(data[26], settings.trickle_current);
        assert_eq!(data[27], settings.trickle_time);
        assert_eq!(data[28], settings.cut_temperature);
        assert_eq!(u16::from_be_bytes([data[29], data[30]]), settings.cut_time);
        assert_eq!(u16::from_be_bytes([data[31], data[32]]), settings.restart_voltage);
    }

    #[test]
    fn test_encode_checksum_covers_body() {
        let data = encode_slot_settings(&sample_settings());
        assert_eq!(data[33], checksum::compute(&data[2..33]));
    }

    #[test]
    fn test_device_round_trip_preserves_fields() {
        // Device -> host -> device: decode a read response, re-encode it,
        // and check every value the write frame carries survives intact
        let original = sample_settings();
        let decoded = decode_slot_settings(&build_read_response(&original)).unwrap();
        let written = encode_slot_settings(&decoded);

        let mut expected = original.clone();
        expected.raw = decoded.raw.clone();
        assert_eq!(decoded, expected);

        assert_eq!(written[4], original.slot_number);
        assert_eq!(u16::from_be_bytes([written[6], written[7]]), original.capacity);
        assert_eq!(
            u16::from_be_bytes([written[31], written[32]]),
            original.restart_voltage
        );
    }

    #[test]
    fn test_encode_max_values_stay_in_frame() {
        let mut settings = sample_settings();
        settings.capacity = u16::MAX;
        settings.restart_voltage = u16::MAX;
        settings.cut_time = u16::MAX;

        let data = encode_slot_settings(&settings);
        assert_eq!(u16::from_be_bytes([data[6], data[7]]), u16::MAX);
        assert_eq!(u16::from_be_bytes([data[29], data[30]]), u16::MAX);
        assert_eq!(u16::from_be_bytes([data[31], data[32]]), u16::MAX);
        assert_eq!(data[33], checksum::compute(&data[2..33]));
    }
}
