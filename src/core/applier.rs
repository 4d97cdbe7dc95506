//! Configuration applier: validate operator requests against each device's
//! bounds and apply them one device at a time.

use log::{info, warn};

use crate::core::device::DeviceQuery;
use crate::core::types::{ConfigRequest, ConfigResult, GpuDevice};
use crate::error::{Result, RigError};

/// Applies [`ConfigRequest`]s through a [`DeviceQuery`]
pub struct ConfigApplier<'a, D: DeviceQuery + ?Sized> {
    devices: &'a mut D,
}

impl<'a, D: DeviceQuery + ?Sized> ConfigApplier<'a, D> {
    pub fn new(devices: &'a mut D) -> Self {
        Self { devices }
    }

    /// Process every request in order and return one result per request.
    ///
    /// A failure on one device never stops the remaining requests.
    pub fn apply(&mut self, requests: &[ConfigRequest]) -> Vec<ConfigResult> {
        requests
            .iter()
            .map(|request| self.apply_one(request))
            .collect()
    }

    fn apply_one(&mut self, request: &ConfigRequest) -> ConfigResult {
        let index = request.device_index;

        let outcome = self
            .lookup(index)
            .and_then(|device| validate(request, &device))
            .and_then(|()| {
                self.devices.apply_settings(
                    index,
                    request.memory_clock_offset_mhz,
                    request.power_limit_w,
                )
            });

        match outcome {
            Ok(()) => {
                info!("GPU {}: configuration applied", index);
                ConfigResult::applied(index)
            }
            Err(e) => {
                warn!("GPU {}: configuration not applied: {}", index, e);
                ConfigResult::rejected(index, e.to_string())
            }
        }
    }

    /// Current state and bounds for one device, read fresh
    fn lookup(&self, index: u32) -> Result<GpuDevice> {
        self.devices.device(index)
    }
}

/// Check a request against the target device's power limit range
pub fn validate(request: &ConfigRequest, device: &GpuDevice) -> Result<()> {
    let power = request.power_limit_w;

    if power < device.power_limit_min_w {
        return Err(RigError::validation(format!(
            "power_limit_w {} is below min {}",
            power, device.power_limit_min_w
        )));
    }
    if power > device.power_limit_max_w {
        return Err(RigError::validation(format!(
            "power_limit_w {} exceeds max {}",
            power, device.power_limit_max_w
        )));
    }

    Ok(())
}
