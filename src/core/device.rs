//! Device query adapter.
//!
//! Wraps a GPU management library behind [`DeviceQuery`]: enumeration turns
//! raw per-index reads into [`GpuDevice`] records, and settings writes are
//! issued per sub-setting so one failing write never hides the other.

use log::{debug, info, warn};

use crate::core::types::{GpuDevice, GpuSetting};
use crate::error::{Result, RigError};

/// Live readings for one device, in console units (watts, MHz, bytes)
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReading {
    pub name: String,
    pub temperature_c: u32,
    pub utilization_percent: f32,
    pub memory_clock_mhz: u32,
    pub memory_total_bytes: Option<u64>,
    pub power_draw_w: Option<f32>,
    pub power_limit_w: u32,
}

/// Power limit range the driver accepts for a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerBounds {
    pub min_w: u32,
    pub max_w: u32,
}

/// Narrow boundary to the vendor management library.
///
/// Implementations own the initialized library handle; dropping them must
/// release it.
pub trait GpuLibrary {
    fn device_count(&self) -> Result<u32>;

    fn read_metrics(&self, index: u32) -> Result<DeviceReading>;

    fn read_power_bounds(&self, index: u32) -> Result<PowerBounds>;

    fn write_power_limit(&mut self, index: u32, watts: u32) -> Result<()>;

    fn write_memory_clock_offset(&mut self, index: u32, offset_mhz: i32) -> Result<()>;
}

/// Read/write access to the attached GPUs
pub trait DeviceQuery {
    /// Enumerate devices, omitting any that fail to read.
    ///
    /// Fails only with `DriverUnavailable`.
    fn list_devices(&self) -> Result<Vec<GpuDevice>>;

    /// Read a single device, reporting why it could not be read instead of
    /// dropping it.
    fn device(&self, index: u32) -> Result<GpuDevice> {
        self.list_devices()?
            .into_iter()
            .find(|d| d.index == index)
            .ok_or_else(|| RigError::device_not_found(index))
    }

    /// Write both settings to one device. No rollback on partial failure.
    fn apply_settings(
        &mut self,
        device_index: u32,
        memory_clock_offset_mhz: i32,
        power_limit_w: u32,
    ) -> Result<()>;
}

enum LibraryState<L> {
    Ready(L),
    Unavailable(String),
}

/// [`DeviceQuery`] over any [`GpuLibrary`]
pub struct DeviceQueryAdapter<L: GpuLibrary> {
    state: LibraryState<L>,
}

impl<L: GpuLibrary> DeviceQueryAdapter<L> {
    /// Wrap an already initialized library
    pub fn new(library: L) -> Self {
        Self {
            state: LibraryState::Ready(library),
        }
    }

    /// Adapter whose every call reports `DriverUnavailable`
    pub fn unavailable<S: Into<String>>(reason: S) -> Self {
        Self {
            state: LibraryState::Unavailable(reason.into()),
        }
    }

    /// Initialize the library once; an init failure degrades the adapter
    /// instead of failing the session.
    pub fn connect<F>(init: F) -> Self
    where
        F: FnOnce() -> Result<L>,
    {
        match init() {
            Ok(library) => {
                info!("GPU management library initialized");
                Self::new(library)
            }
            Err(e) => {
                warn!("GPU features disabled: {}", e);
                Self::unavailable(e.to_string())
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, LibraryState::Ready(_))
    }

    /// Reason the library could not be initialized, if it could not
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            LibraryState::Ready(_) => None,
            LibraryState::Unavailable(reason) => Some(reason),
        }
    }

    fn library(&self) -> Result<&L> {
        match &self.state {
            LibraryState::Ready(library) => Ok(library),
            LibraryState::Unavailable(reason) => Err(RigError::driver_unavailable(reason.clone())),
        }
    }

    fn library_mut(&mut self) -> Result<&mut L> {
        match &mut self.state {
            LibraryState::Ready(library) => Ok(library),
            LibraryState::Unavailable(reason) => Err(RigError::driver_unavailable(reason.clone())),
        }
    }
}

impl<L: GpuLibrary> DeviceQuery for DeviceQueryAdapter<L> {
    fn list_devices(&self) -> Result<Vec<GpuDevice>> {
        let library = self.library()?;
        let count = count_devices(library)?;

        let mut devices = Vec::with_capacity(count as usize);
        for index in 0..count {
            match read_device(library, index) {
                Ok(device) => devices.push(device),
                Err(e) => warn!("Omitting device from results: {}", e),
            }
        }

        debug!("Enumerated {} of {} GPU(s)", devices.len(), count);
        Ok(devices)
    }

    fn device(&self, index: u32) -> Result<GpuDevice> {
        let library = self.library()?;
        if index >= count_devices(library)? {
            return Err(RigError::device_not_found(index));
        }
        read_device(library, index)
    }

    fn apply_settings(
        &mut self,
        device_index: u32,
        memory_clock_offset_mhz: i32,
        power_limit_w: u32,
    ) -> Result<()> {
        let library = self.library_mut()?;

        let mut failed = Vec::new();
        let mut reasons = Vec::new();

        // Both writes are always attempted
        if let Err(e) = library.write_memory_clock_offset(device_index, memory_clock_offset_mhz) {
            warn!(
                "GPU {}: memory clock offset {} MHz not applied: {}",
                device_index, memory_clock_offset_mhz, e
            );
            failed.push(GpuSetting::MemoryClockOffset);
            reasons.push(e.to_string());
        }

        if let Err(e) = library.write_power_limit(device_index, power_limit_w) {
            warn!(
                "GPU {}: power limit {} W not applied: {}",
                device_index, power_limit_w, e
            );
            failed.push(GpuSetting::PowerLimit);
            reasons.push(e.to_string());
        }

        if failed.is_empty() {
            info!(
                "GPU {}: applied memory clock offset {} MHz, power limit {} W",
                device_index, memory_clock_offset_mhz, power_limit_w
            );
            Ok(())
        } else {
            Err(RigError::device_apply_failed(
                device_index,
                failed,
                reasons.join("; "),
            ))
        }
    }
}

fn count_devices<L: GpuLibrary>(library: &L) -> Result<u32> {
    library.device_count().map_err(|e| match e {
        e @ RigError::DriverUnavailable(_) => e,
        other => RigError::driver_unavailable(format!("device enumeration failed: {}", other)),
    })
}

fn read_device<L: GpuLibrary>(library: &L, index: u32) -> Result<GpuDevice> {
    let reading = library
        .read_metrics(index)
        .map_err(|e| as_query_failure(index, e))?;
    let bounds = library
        .read_power_bounds(index)
        .map_err(|e| as_query_failure(index, e))?;

    Ok(GpuDevice {
        index,
        name: reading.name,
        temperature_c: reading.temperature_c,
        utilization_percent: reading.utilization_percent,
        memory_clock_mhz: reading.memory_clock_mhz,
        memory_total_bytes: reading.memory_total_bytes,
        power_draw_w: reading.power_draw_w,
        power_limit_w: reading.power_limit_w,
        power_limit_min_w: bounds.min_w,
        power_limit_max_w: bounds.max_w,
    })
}

fn as_query_failure(index: u32, error: RigError) -> RigError {
    match error {
        e @ RigError::DeviceQueryFailed { .. } => e,
        other => RigError::device_query_failed(index, other.to_string()),
    }
}
