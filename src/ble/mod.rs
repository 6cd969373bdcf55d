//! # BLE Session Module
//!
//! Live telemetry over the charger's notify/write characteristic.
//!
//! This module handles:
//! - Discovering and connecting to the charger
//! - The cooperative polling loop (one poll request per slot per cycle)
//! - Decoding notifications as they arrive, independent of poll cadence
//!
//! The polling loop is the only writer on the characteristic and must not
//! be run concurrently with itself. Integrity faults on incoming frames are
//! logged and dropped; polling continues.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bluest::{Adapter, AdvertisingDevice, Characteristic, Device, Uuid};
use futures_util::StreamExt;
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{Mc3000Error, Result};
use crate::protocol::frame::SLOT_COUNT;
use crate::protocol::{build_poll_request, decode_telemetry, BatteryInfo};

/// Telemetry service UUID (0000ffe0-0000-1000-8000-00805f9b34fb)
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x0000ffe0_0000_1000_8000_00805f9b34fb);

/// Telemetry notify/write characteristic UUID
pub const CHARACTERISTIC_UUID: Uuid = Uuid::from_u128(0x0000ffe1_0000_1000_8000_00805f9b34fb);

/// Advertised device name of the charger
pub const DEFAULT_DEVICE_NAME: &str = "MC3000";

/// How long to scan before giving up on discovery
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Handle for requesting a clean stop of the polling loop
///
/// The flag is checked once per poll cycle; cancellation is not
/// instantaneous mid-frame.
#[derive(Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(false, Ordering::Relaxed);
        info!("telemetry polling stop requested");
    }
}

/// An open BLE session with the charger
pub struct ChargerBle {
    adapter: Adapter,
    device: Device,
    characteristic: Characteristic,
    interval: Duration,
    settle: Duration,
    running: Arc<AtomicBool>,
}

impl ChargerBle {
    /// Discover the charger by advertised name and connect
    ///
    /// # Arguments
    ///
    /// * `device_name` - Advertised BLE name (usually "MC3000")
    /// * `poll_interval` - Length of one full polling cycle
    /// * `settle` - Delay before each per-slot poll write
    pub async fn connect(
        device_name: &str,
        poll_interval: Duration,
        settle: Duration,
    ) -> Result<Self> {
        let adapter = Adapter::default()
            .await
            .ok_or_else(|| Mc3000Error::BleSetup("no default adapter".to_string()))?;
        adapter.wait_available().await?;

        let discovered = timeout(DISCOVERY_TIMEOUT, Self::discover(device_name, &adapter))
            .await
            .map_err(|_| {
                Mc3000Error::BleSetup(format!("no device named '{}' found", device_name))
            })??;
        let device = discovered.device;

        adapter.connect_device(&device).await?;
        info!("connected to {}", device_name);

        let service = device
            .discover_services_with_uuid(SERVICE_UUID)
            .await?
            .first()
            .ok_or_else(|| {
                Mc3000Error::BleSetup("device does not expose the telemetry service".to_string())
            })?
            .clone();
        let characteristic = service
            .discover_characteristics_with_uuid(CHARACTERISTIC_UUID)
            .await?
            .first()
            .ok_or_else(|| {
                Mc3000Error::BleSetup(
                    "device does not expose the telemetry characteristic".to_string(),
                )
            })?
            .clone();

        Ok(Self {
            adapter,
            device,
            characteristic,
            interval: poll_interval,
            settle,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    async fn discover(name: &str, adapter: &Adapter) -> Result<AdvertisingDevice> {
        let required_services = [SERVICE_UUID];
        let mut scan = adapter.scan(&required_services).await?;
        while let Some(discovered) = scan.next().await {
            let device_name = discovered.device.name_async().await.unwrap_or_default();
            debug!("advertisement from '{}'", device_name);
            if device_name == name {
                return Ok(discovered);
            }
        }
        Err(Mc3000Error::BleSetup("scan ended before the device appeared".to_string()))
    }

    /// Handle for stopping a running poll loop from another task
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.running.clone())
    }

    /// Run the polling loop until stopped
    ///
    /// Each cycle writes one poll request per slot with a settle delay in
    /// between, then waits out the remainder of the polling interval.
    /// Notifications are decoded as they arrive and handed to `on_info`;
    /// frames failing their checksum are logged and dropped, frames of
    /// foreign message types are ignored.
    pub async fn run<F>(&mut self, mut on_info: F) -> Result<()>
    where
        F: FnMut(BatteryInfo) + Send,
    {
        self.running.store(true, Ordering::Relaxed);

        let mut notifications = self.characteristic.notify().await?;
        let mut cycle = interval(self.interval);
        cycle.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "telemetry polling started (interval {:?}, settle {:?})",
            self.interval, self.settle
        );

        loop {
            if !self.running.load(Ordering::Relaxed) {
                break;
            }

            tokio::select! {
                _ = cycle.tick() => {
                    for slot in 0..SLOT_COUNT {
                        sleep(self.settle).await;
                        self.characteristic.write(&build_poll_request(slot)).await?;
                    }
                }

                Some(event) = notifications.next() => {
                    match event {
                        Ok(data) => handle_notification(&data, &mut on_info),
                        Err(err) => warn!("notification error: {}", err),
                    }
                }
            }
        }

        info!("telemetry polling stopped");
        Ok(())
    }

    /// Disconnect from the charger
    pub async fn disconnect(self) -> Result<()> {
        self.adapter.disconnect_device(&self.device).await?;
        Ok(())
    }
}

fn handle_notification<F: FnMut(BatteryInfo)>(data: &[u8], on_info: &mut F) {
    debug!("BLE RX: {}", hex::encode(data));

    match decode_telemetry(data) {
        Ok(Some(info)) => on_info(info),
        Ok(None) => {}
        Err(err) => warn!("dropping telemetry frame: {}", err),
    }
}
