//! Trait abstraction for USB bulk transfers to enable testing

use async_trait::async_trait;
use nusb::transfer::RequestBuffer;
use nusb::Interface;
use tokio::time::timeout;
use std::time::Duration;

use crate::error::{Mc3000Error, Result};
use crate::protocol::frame::USB_MESSAGE_SIZE;

/// USB endpoint for host-to-charger bulk writes
pub const ENDPOINT_OUT: u8 = 0x01;

/// USB endpoint for charger-to-host bulk reads
pub const ENDPOINT_IN: u8 = 0x81;

/// How long to wait for a single bulk transfer before giving up
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(2);

/// Trait for the charger's bulk-transfer endpoints
#[async_trait]
pub trait UsbTransport: Send {
    /// Write one message to the out endpoint
    async fn write_message(&mut self, data: Vec<u8>) -> Result<()>;

    /// Read one message from the in endpoint
    async fn read_message(&mut self) -> Result<Vec<u8>>;
}

/// Wrapper around a claimed `nusb` interface that implements [`UsbTransport`]
pub struct NusbTransport {
    interface: Interface,
}

impl NusbTransport {
    pub fn new(interface: Interface) -> Self {
        Self { interface }
    }
}

#[async_trait]
impl UsbTransport for NusbTransport {
    async fn write_message(&mut self, data: Vec<u8>) -> Result<()> {
        let transfer = self.interface.bulk_out(ENDPOINT_OUT, data);
        let completion = timeout(TRANSFER_TIMEOUT, transfer)
            .await
            .map_err(|_| Mc3000Error::UsbTimeout)?;
        completion.into_result()?;
        Ok(())
    }

    async fn read_message(&mut self) -> Result<Vec<u8>> {
        let transfer = self
            .interface
            .bulk_in(ENDPOINT_IN, RequestBuffer::new(USB_MESSAGE_SIZE));
        let completion = timeout(TRANSFER_TIMEOUT, transfer)
            .await
            .map_err(|_| Mc3000Error::UsbTimeout)?;
        Ok(completion.into_result()?)
    }
}
