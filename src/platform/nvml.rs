//! NVML binding for the device query adapter.
//!
//! NVML (NVIDIA Management Library) is the library behind nvidia-smi. The
//! handle is initialized once per session and shut down when
//! [`NvmlLibrary`] is dropped.

#[cfg(feature = "nvml")]
use nvml_wrapper::{
    enum_wrappers::device::{Clock, PerformanceState, TemperatureSensor},
    error::NvmlError,
    Device, Nvml,
};

use crate::core::device::{DeviceReading, GpuLibrary, PowerBounds};
use crate::error::{Result, RigError};

/// Initialized NVML handle
pub struct NvmlLibrary {
    #[cfg(feature = "nvml")]
    nvml: Nvml,
}

#[cfg(feature = "nvml")]
impl NvmlLibrary {
    /// Load and initialize NVML.
    ///
    /// Fails with `DriverUnavailable` when the library or a compatible
    /// driver is missing.
    pub fn init() -> Result<Self> {
        let nvml = Nvml::init()
            .map_err(|e| RigError::driver_unavailable(format!("Failed to init NVML: {}", e)))?;

        if let Ok(version) = nvml.sys_driver_version() {
            log::info!("NVIDIA driver {}", version);
        }

        Ok(Self { nvml })
    }

    fn device(&self, index: u32) -> Result<Device<'_>> {
        self.nvml
            .device_by_index(index)
            .map_err(|e| query_error(index, "device handle", e))
    }
}

#[cfg(feature = "nvml")]
impl GpuLibrary for NvmlLibrary {
    fn device_count(&self) -> Result<u32> {
        self.nvml
            .device_count()
            .map_err(|e| RigError::driver_unavailable(format!("Failed to count GPUs: {}", e)))
    }

    fn read_metrics(&self, index: u32) -> Result<DeviceReading> {
        let device = self.device(index)?;

        let name = device.name().map_err(|e| query_error(index, "name", e))?;
        let temperature_c = device
            .temperature(TemperatureSensor::Gpu)
            .map_err(|e| query_error(index, "temperature", e))?;
        let utilization = device
            .utilization_rates()
            .map_err(|e| query_error(index, "utilization", e))?;
        let memory_clock_mhz = device
            .clock_info(Clock::Memory)
            .map_err(|e| query_error(index, "memory clock", e))?;
        let power_limit_w = device
            .power_management_limit()
            .map(|mw| mw / 1000) // mW to W
            .map_err(|e| query_error(index, "power limit", e))?;

        // Not every board reports these
        let memory_total_bytes = device.memory_info().ok().map(|m| m.total);
        let power_draw_w = device.power_usage().ok().map(|mw| mw as f32 / 1000.0);

        Ok(DeviceReading {
            name,
            temperature_c,
            utilization_percent: utilization.gpu as f32,
            memory_clock_mhz,
            memory_total_bytes,
            power_draw_w,
            power_limit_w,
        })
    }

    fn read_power_bounds(&self, index: u32) -> Result<PowerBounds> {
        let constraints = self
            .device(index)?
            .power_management_limit_constraints()
            .map_err(|e| query_error(index, "power limit constraints", e))?;

        Ok(PowerBounds {
            min_w: constraints.min_limit / 1000,
            max_w: constraints.max_limit / 1000,
        })
    }

    fn write_power_limit(&mut self, index: u32, watts: u32) -> Result<()> {
        let mut device = self.device(index)?;
        device
            .set_power_management_limit(watts.saturating_mul(1000))
            .map_err(|e| write_error("power limit", e))
    }

    /// Writes the memory clock offset for the P0 state. Boards that predate
    /// the clock offsets API fall back to the memory VF offset.
    fn write_memory_clock_offset(&mut self, index: u32, offset_mhz: i32) -> Result<()> {
        let mut device = self.device(index)?;

        match device.clock_offset(Clock::Memory, PerformanceState::Zero) {
            Ok(current) => {
                let range = OffsetRange {
                    current_mhz: current.clock_offset_mhz,
                    min_mhz: current.min_clock_offset_mhz,
                    max_mhz: current.max_clock_offset_mhz,
                };
                match plan_offset_write(offset_mhz, Some(range))? {
                    OffsetWrite::Unchanged => Ok(()),
                    OffsetWrite::Write(mhz) => device
                        .set_clock_offset(Clock::Memory, PerformanceState::Zero, mhz)
                        .map_err(|e| write_error("memory clock offset", e)),
                }
            }
            Err(NvmlError::FailedToLoadSymbol(_)) => {
                let current = match device.mem_clock_vf_offset() {
                    Ok(mhz) => Some(OffsetRange::unbounded(mhz)),
                    Err(NvmlError::NotSupported) => None,
                    Err(e) => return Err(write_error("memory clock offset", e)),
                };
                match plan_offset_write(offset_mhz, current)? {
                    OffsetWrite::Unchanged => Ok(()),
                    OffsetWrite::Write(mhz) => device
                        .set_mem_clock_vf_offset(mhz)
                        .map_err(|e| write_error("memory clock offset", e)),
                }
            }
            Err(NvmlError::NotSupported) => plan_offset_write(offset_mhz, None).map(|_| ()),
            Err(e) => Err(write_error("memory clock offset", e)),
        }
    }
}

#[cfg(feature = "nvml")]
fn query_error(index: u32, what: &str, e: NvmlError) -> RigError {
    RigError::device_query_failed(index, format!("{}: {}", what, e))
}

#[cfg(feature = "nvml")]
fn write_error(what: &str, e: NvmlError) -> RigError {
    match e {
        NvmlError::NoPermission => {
            RigError::other(format!("{}: permission denied (run as root/admin)", what))
        }
        NvmlError::NotSupported => RigError::other(format!("{}: not supported by this GPU", what)),
        other => RigError::other(format!("{}: {}", what, other)),
    }
}

#[cfg(not(feature = "nvml"))]
impl NvmlLibrary {
    pub fn init() -> Result<Self> {
        Err(RigError::driver_unavailable(
            "NVIDIA GPU support not enabled. Recompile with --features nvml",
        ))
    }
}

#[cfg(not(feature = "nvml"))]
impl GpuLibrary for NvmlLibrary {
    fn device_count(&self) -> Result<u32> {
        Err(disabled())
    }

    fn read_metrics(&self, _index: u32) -> Result<DeviceReading> {
        Err(disabled())
    }

    fn read_power_bounds(&self, _index: u32) -> Result<PowerBounds> {
        Err(disabled())
    }

    fn write_power_limit(&mut self, _index: u32, _watts: u32) -> Result<()> {
        Err(disabled())
    }

    fn write_memory_clock_offset(&mut self, _index: u32, _offset_mhz: i32) -> Result<()> {
        Err(disabled())
    }
}

#[cfg(not(feature = "nvml"))]
fn disabled() -> RigError {
    RigError::driver_unavailable("NVIDIA GPU support not enabled")
}

/// Memory clock offset the driver reports for a device, in MHz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetRange {
    pub current_mhz: i32,
    pub min_mhz: i32,
    pub max_mhz: i32,
}

impl OffsetRange {
    /// Current offset from an API that does not report limits
    pub fn unbounded(current_mhz: i32) -> Self {
        Self {
            current_mhz,
            min_mhz: i32::MIN,
            max_mhz: i32::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetWrite {
    Unchanged,
    Write(i32),
}

/// Decide whether a requested memory clock offset needs a driver write.
///
/// `range` is `None` when the board cannot report an offset at all; such a
/// board runs at offset 0, so only a zero request succeeds.
pub fn plan_offset_write(requested_mhz: i32, range: Option<OffsetRange>) -> Result<OffsetWrite> {
    let Some(range) = range else {
        return if requested_mhz == 0 {
            Ok(OffsetWrite::Unchanged)
        } else {
            Err(RigError::other("memory clock offset: not supported by this GPU"))
        };
    };

    if requested_mhz == range.current_mhz {
        return Ok(OffsetWrite::Unchanged);
    }
    if requested_mhz < range.min_mhz || requested_mhz > range.max_mhz {
        return Err(RigError::other(format!(
            "memory clock offset {} MHz is outside the supported range {}..{} MHz",
            requested_mhz, range.min_mhz, range.max_mhz
        )));
    }

    Ok(OffsetWrite::Write(requested_mhz))
}
