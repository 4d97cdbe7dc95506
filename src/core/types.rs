use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel used for host facts that could not be read
pub const UNKNOWN: &str = "unknown";

/// Static host facts, read once per session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostInfo {
    pub os_name: String,
    pub os_version: String,
    pub kernel_version: Option<String>,
    pub architecture: String,
    pub cpu_model: String,
    pub cpu_cores: usize,   // physical
    pub cpu_threads: usize, // logical
    pub total_memory_bytes: u64,
}

impl HostInfo {
    /// Host facts with every field set to its sentinel value
    pub fn unknown() -> Self {
        Self {
            os_name: UNKNOWN.to_string(),
            os_version: UNKNOWN.to_string(),
            kernel_version: None,
            architecture: std::env::consts::ARCH.to_string(),
            cpu_model: UNKNOWN.to_string(),
            cpu_cores: 0,
            cpu_threads: 0,
            total_memory_bytes: 0,
        }
    }
}

/// Host counters sampled once per polling tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveMetrics {
    pub cpu_percent: f32,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub timestamp: DateTime<Utc>,
}

/// One enumerated GPU. `index` is the only identifier that means anything
/// across calls, and only within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuDevice {
    pub index: u32,
    pub name: String,
    pub temperature_c: u32,
    pub utilization_percent: f32,
    pub memory_clock_mhz: u32,
    pub memory_total_bytes: Option<u64>,
    pub power_draw_w: Option<f32>,
    pub power_limit_w: u32,
    pub power_limit_min_w: u32,
    pub power_limit_max_w: u32,
}

/// Point-in-time combination of host and device state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub host: HostInfo,
    pub live: LiveMetrics,
    pub gpus: Vec<GpuDevice>,
}

impl Snapshot {
    /// Sum of the power draws the driver reported; devices without a reading are skipped
    pub fn total_power_draw_w(&self) -> f32 {
        self.gpus.iter().filter_map(|g| g.power_draw_w).sum()
    }
}

/// Operator intent for one device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRequest {
    pub device_index: u32,
    pub memory_clock_offset_mhz: i32,
    pub power_limit_w: u32,
}

/// Outcome of one ConfigRequest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResult {
    pub device_index: u32,
    pub applied: bool,
    pub error: Option<String>,
}

impl ConfigResult {
    pub fn applied(device_index: u32) -> Self {
        Self {
            device_index,
            applied: true,
            error: None,
        }
    }

    pub fn rejected<S: Into<String>>(device_index: u32, error: S) -> Self {
        Self {
            device_index,
            applied: false,
            error: Some(error.into()),
        }
    }
}

/// The two per-device settings this console writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpuSetting {
    MemoryClockOffset,
    PowerLimit,
}

impl fmt::Display for GpuSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuSetting::MemoryClockOffset => write!(f, "memory clock offset"),
            GpuSetting::PowerLimit => write!(f, "power limit"),
        }
    }
}
