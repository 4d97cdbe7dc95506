//! One operator session: the host adapter, the static host facts read at
//! start-up and the GPU library handle, held for the life of the process.

use std::time::Duration;

use log::info;

use crate::core::applier::ConfigApplier;
use crate::core::device::{DeviceQuery, DeviceQueryAdapter, GpuLibrary};
use crate::core::host::{HostSource, SysinfoHost};
use crate::core::snapshot::{run_loop, LoopStats, PollInterval, SnapshotAggregator, StopSignal};
use crate::core::types::{ConfigRequest, ConfigResult, GpuDevice, HostInfo, Snapshot};
use crate::error::Result;
use crate::platform::nvml::NvmlLibrary;

pub struct Session<L: GpuLibrary = NvmlLibrary, H: HostSource = SysinfoHost> {
    host_info: HostInfo,
    host: H,
    devices: DeviceQueryAdapter<L>,
}

impl Session<NvmlLibrary, SysinfoHost> {
    /// Read host facts and initialize NVML. Never fails: a missing driver
    /// only disables GPU features.
    pub fn open(sample_window: Duration) -> Self {
        let host = SysinfoHost::with_window(sample_window);
        let devices = DeviceQueryAdapter::connect(NvmlLibrary::init);
        Self::with_parts(host, devices)
    }
}

impl<L: GpuLibrary, H: HostSource> Session<L, H> {
    pub fn with_parts(mut host: H, devices: DeviceQueryAdapter<L>) -> Self {
        let host_info = host.static_info();
        info!(
            "Session started on {} {} ({})",
            host_info.os_name, host_info.os_version, host_info.cpu_model
        );
        Self {
            host_info,
            host,
            devices,
        }
    }

    pub fn host_info(&self) -> &HostInfo {
        &self.host_info
    }

    /// Why GPU features are disabled, if they are
    pub fn gpu_unavailable_reason(&self) -> Option<&str> {
        self.devices.unavailable_reason()
    }

    pub fn list_devices(&self) -> Result<Vec<GpuDevice>> {
        self.devices.list_devices()
    }

    pub fn snapshot(&mut self) -> Snapshot {
        SnapshotAggregator::new(&self.host_info, &mut self.host, &self.devices).snapshot()
    }

    pub fn monitor<F>(
        &mut self,
        interval: PollInterval,
        stop: &StopSignal,
        max_ticks: Option<u64>,
        render_fn: F,
    ) -> LoopStats
    where
        F: FnMut(&Snapshot) -> Result<()>,
    {
        let mut aggregator = SnapshotAggregator::new(&self.host_info, &mut self.host, &self.devices);
        run_loop(&mut aggregator, interval, stop, max_ticks, render_fn)
    }

    pub fn apply(&mut self, requests: &[ConfigRequest]) -> Vec<ConfigResult> {
        ConfigApplier::new(&mut self.devices).apply(requests)
    }
}
