// Hand-written stand-ins for the GPU library, the device adapter and the host

use std::cell::Cell;
use std::collections::HashSet;

use chrono::{Duration, TimeZone, Utc};
use rigmon::core::{
    DeviceQuery, DeviceReading, GpuDevice, GpuLibrary, HostInfo, HostSource, LiveMetrics,
    PowerBounds,
};
use rigmon::{Result, RigError};

pub fn gpu(index: u32, min_w: u32, max_w: u32) -> GpuDevice {
    GpuDevice {
        index,
        name: format!("Fake GPU {}", index),
        temperature_c: 58,
        utilization_percent: 97.0,
        memory_clock_mhz: 9501,
        memory_total_bytes: Some(8 * 1024 * 1024 * 1024),
        power_draw_w: Some(min_w as f32),
        power_limit_w: min_w,
        power_limit_min_w: min_w,
        power_limit_max_w: max_w,
    }
}

/// Device adapter with fixed devices, counting every call
pub struct FakeDevices {
    pub devices: Vec<GpuDevice>,
    pub failing: HashSet<u32>,
    pub list_calls: Cell<usize>,
    pub apply_calls: Vec<(u32, i32, u32)>,
}

impl FakeDevices {
    pub fn new(devices: Vec<GpuDevice>) -> Self {
        Self {
            devices,
            failing: HashSet::new(),
            list_calls: Cell::new(0),
            apply_calls: Vec::new(),
        }
    }

    pub fn failing_on(mut self, index: u32) -> Self {
        self.failing.insert(index);
        self
    }
}

impl DeviceQuery for FakeDevices {
    fn list_devices(&self) -> Result<Vec<GpuDevice>> {
        self.list_calls.set(self.list_calls.get() + 1);
        Ok(self.devices.clone())
    }

    fn apply_settings(
        &mut self,
        device_index: u32,
        memory_clock_offset_mhz: i32,
        power_limit_w: u32,
    ) -> Result<()> {
        self.apply_calls
            .push((device_index, memory_clock_offset_mhz, power_limit_w));
        if self.failing.contains(&device_index) {
            return Err(RigError::other(format!(
                "GPU {} rejected the write",
                device_index
            )));
        }
        Ok(())
    }
}

/// Management library returning canned readings
#[derive(Default)]
pub struct FakeLibrary {
    pub count: u32,
    pub unreadable: HashSet<u32>,
    pub bounds: Vec<PowerBounds>,
}

impl GpuLibrary for FakeLibrary {
    fn device_count(&self) -> Result<u32> {
        Ok(self.count)
    }

    fn read_metrics(&self, index: u32) -> Result<DeviceReading> {
        if self.unreadable.contains(&index) {
            return Err(RigError::device_query_failed(index, "Unknown Error"));
        }
        Ok(DeviceReading {
            name: format!("Fake GPU {}", index),
            temperature_c: 60,
            utilization_percent: 100.0,
            memory_clock_mhz: 7001,
            memory_total_bytes: None,
            power_draw_w: Some(120.0),
            power_limit_w: 150,
        })
    }

    fn read_power_bounds(&self, index: u32) -> Result<PowerBounds> {
        self.bounds
            .get(index as usize)
            .copied()
            .ok_or_else(|| RigError::other("no bounds"))
    }

    fn write_power_limit(&mut self, _index: u32, _watts: u32) -> Result<()> {
        Ok(())
    }

    fn write_memory_clock_offset(&mut self, _index: u32, _offset_mhz: i32) -> Result<()> {
        Ok(())
    }
}

/// Host whose samples are one second apart
pub struct FakeHost {
    pub samples: u32,
}

impl HostSource for FakeHost {
    fn static_info(&mut self) -> HostInfo {
        HostInfo {
            os_name: "Linux".to_string(),
            os_version: "22.04".to_string(),
            kernel_version: Some("6.5.0".to_string()),
            architecture: "x86_64".to_string(),
            cpu_model: "AMD Ryzen 5 5600X".to_string(),
            cpu_cores: 6,
            cpu_threads: 12,
            total_memory_bytes: 16 * 1024 * 1024 * 1024,
        }
    }

    fn live_metrics(&mut self) -> LiveMetrics {
        self.samples += 1;
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        LiveMetrics {
            cpu_percent: 25.0,
            memory_used_bytes: 4 * 1024 * 1024 * 1024,
            memory_total_bytes: 16 * 1024 * 1024 * 1024,
            timestamp: base + Duration::seconds(self.samples as i64),
        }
    }
}
