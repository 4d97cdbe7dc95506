//! Host metrics adapter backed by `sysinfo`.

use std::thread;
use std::time::Duration;

use log::{debug, warn};
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use crate::core::types::{HostInfo, LiveMetrics, UNKNOWN};
use crate::error::{Result, RigError};

/// Default CPU sampling window for `live_metrics`
pub const DEFAULT_SAMPLE_WINDOW: Duration = Duration::from_millis(500);

/// Upper bound on the sampling window; the read path must stay sub-second
pub const MAX_SAMPLE_WINDOW: Duration = Duration::from_secs(1);

/// Source of host facts and counters
pub trait HostSource {
    /// Static facts; never fails, unknown fields hold the sentinel value
    fn static_info(&mut self) -> HostInfo;

    /// Blocks for one sampling window, then returns fresh counters
    fn live_metrics(&mut self) -> LiveMetrics;
}

/// [`HostSource`] over a single long-lived `sysinfo::System`
pub struct SysinfoHost {
    system: System,
    window: Duration,
}

impl SysinfoHost {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_SAMPLE_WINDOW)
    }

    /// Create with a custom CPU sampling window, clamped to what sysinfo can
    /// measure and to one second
    pub fn with_window(window: Duration) -> Self {
        let refresh = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::nothing().with_ram());

        Self {
            system: System::new_with_specifics(refresh),
            window: clamp_window(window),
        }
    }

    fn read_facts(&mut self) -> HostFacts {
        self.system.refresh_cpu_all();
        self.system.refresh_memory();

        let cpus = self.system.cpus();
        let cpu_brand = cpus
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|b| !b.is_empty())
            .or_else(cpuid_brand);

        HostFacts {
            os_name: System::name(),
            os_version: System::os_version(),
            kernel_version: System::kernel_version(),
            cpu_brand,
            physical_cores: System::physical_core_count(),
            logical_cpus: cpus.len(),
            total_memory_bytes: self.system.total_memory(),
        }
    }
}

/// Raw OS readings, before unknown values are filled in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostFacts {
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub kernel_version: Option<String>,
    pub cpu_brand: Option<String>,
    pub physical_cores: Option<usize>,
    pub logical_cpus: usize,
    pub total_memory_bytes: u64,
}

impl HostFacts {
    /// Fails when the OS reported neither CPUs nor memory
    fn check_counters(&self) -> Result<()> {
        if self.logical_cpus == 0 && self.total_memory_bytes == 0 {
            return Err(RigError::metrics_unavailable(
                "no CPU or memory information reported by the OS",
            ));
        }
        Ok(())
    }
}

/// Build [`HostInfo`] field by field; whatever could not be read becomes
/// `unknown` (or zero) while the rest is kept.
pub fn host_info_from(facts: HostFacts) -> HostInfo {
    if let Err(e) = facts.check_counters() {
        warn!("Failed to collect host info: {}", e);
    }

    HostInfo {
        os_name: or_unknown(facts.os_name),
        os_version: or_unknown(facts.os_version),
        kernel_version: facts
            .kernel_version
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
        architecture: std::env::consts::ARCH.to_string(),
        cpu_model: or_unknown(facts.cpu_brand),
        cpu_cores: facts.physical_cores.unwrap_or(facts.logical_cpus),
        cpu_threads: facts.logical_cpus,
        total_memory_bytes: facts.total_memory_bytes,
    }
}

impl Default for SysinfoHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostSource for SysinfoHost {
    fn static_info(&mut self) -> HostInfo {
        host_info_from(self.read_facts())
    }

    fn live_metrics(&mut self) -> LiveMetrics {
        // Usage is the delta between two refreshes one window apart
        self.system.refresh_cpu_usage();
        thread::sleep(self.window);
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let memory_total_bytes = self.system.total_memory();
        if memory_total_bytes == 0 {
            warn!("Memory totals unavailable; reporting zero");
        }

        let metrics = LiveMetrics {
            cpu_percent: self.system.global_cpu_usage().clamp(0.0, 100.0),
            memory_used_bytes: self.system.used_memory(),
            memory_total_bytes,
            timestamp: chrono::Utc::now(),
        };
        debug!(
            "Host sample: cpu {:.1}%, memory {}/{} bytes",
            metrics.cpu_percent, metrics.memory_used_bytes, metrics.memory_total_bytes
        );
        metrics
    }
}

fn clamp_window(window: Duration) -> Duration {
    window.clamp(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL, MAX_SAMPLE_WINDOW)
}

fn or_unknown(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// CPU brand straight from CPUID, for platforms where the OS reports none
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn cpuid_brand() -> Option<String> {
    use raw_cpuid::CpuId;

    let cpuid = CpuId::new();
    cpuid
        .get_processor_brand_string()
        .map(|brand| brand.as_str().trim().to_string())
        .filter(|b| !b.is_empty())
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn cpuid_brand() -> Option<String> {
    None
}
