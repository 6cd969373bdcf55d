//! # USB Session Module
//!
//! Synchronous request/response communication with the charger over its
//! bulk endpoints: one write followed by one blocking read per logical
//! operation, against a single open device handle. Callers serialize their
//! own operations; the session holds no codec state.

pub mod transport;

use tracing::{debug, info};

use crate::error::{Mc3000Error, Result};
use crate::protocol::frame::USB_MESSAGE_SIZE;
use crate::protocol::{decode_slot_settings, encode_slot_settings, read_request_frame};
use crate::protocol::{checksum, SlotSettings};
use transport::{NusbTransport, UsbTransport};

/// Charger vendor id
pub const VID: u16 = 0x0000;

/// Charger product id
pub const PID: u16 = 0x0001;

/// An open USB session with the charger
pub struct ChargerUsb<T: UsbTransport> {
    transport: T,
}

impl ChargerUsb<NusbTransport> {
    /// Find the charger on the bus and claim its interface
    ///
    /// # Errors
    ///
    /// Returns [`Mc3000Error::DeviceNotFound`] when no device matches the
    /// charger's VID/PID.
    pub fn open() -> Result<Self> {
        let device_info = nusb::list_devices()?
            .find(|d| d.vendor_id() == VID && d.product_id() == PID)
            .ok_or(Mc3000Error::DeviceNotFound)?;

        info!(
            "found charger on bus {} addr {}",
            device_info.bus_number(),
            device_info.device_address()
        );

        let device = device_info.open()?;
        let interface = device.detach_and_claim_interface(0)?;

        Ok(Self::with_transport(NusbTransport::new(interface)))
    }
}

impl<T: UsbTransport> ChargerUsb<T> {
    /// Build a session over an already-open transport
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Write one message, zero-padded to the 64-byte bulk message size
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut message = data.to_vec();
        message.resize(USB_MESSAGE_SIZE, 0x00);
        debug!("USB TX: {}", hex::encode(&message));
        self.transport.write_message(message).await
    }

    /// Read one 64-byte message and verify its trailing checksum
    ///
    /// A corrupted configuration read must never be silently accepted, so
    /// unlike the telemetry path the checksum failure surfaces to the
    /// caller here.
    pub async fn read(&mut self) -> Result<Vec<u8>> {
        let data = self.transport.read_message().await?;
        debug!("USB RX: {}", hex::encode(&data));

        if !checksum::verify(&data) {
            return Err(Mc3000Error::Checksum {
                expected: checksum::compute(&data[..data.len().saturating_sub(1)]),
                actual: data.last().copied().unwrap_or(0),
            });
        }

        Ok(data)
    }

    /// Read the current settings of one slot
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not 0-3.
    pub async fn read_slot_settings(&mut self, slot: u8) -> Result<SlotSettings> {
        self.write(&read_request_frame(slot)).await?;
        let data = self.read().await?;
        decode_slot_settings(&data)
    }

    /// Write a validated settings record to its slot
    pub async fn write_slot_settings(&mut self, settings: &SlotSettings) -> Result<()> {
        let frame = encode_slot_settings(settings);
        self.write(&frame).await
    }
}
