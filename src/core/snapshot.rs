//! Snapshot aggregation and the live polling loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::core::device::DeviceQuery;
use crate::core::host::HostSource;
use crate::core::types::{HostInfo, Snapshot};
use crate::error::{Result, RigError};

/// Shortest polling interval the loop accepts, in seconds
pub const MIN_INTERVAL_SECS: u64 = 1;

/// Granularity of the stop check while sleeping between ticks
const STOP_POLL: Duration = Duration::from_millis(100);

/// Anything that can produce one snapshot per tick
pub trait SnapshotSource {
    fn build_snapshot(&mut self) -> Result<Snapshot>;
}

/// Combines host and device adapters into one [`Snapshot`]
pub struct SnapshotAggregator<'a> {
    host_info: &'a HostInfo,
    host: &'a mut dyn HostSource,
    devices: &'a dyn DeviceQuery,
}

impl<'a> SnapshotAggregator<'a> {
    pub fn new(
        host_info: &'a HostInfo,
        host: &'a mut dyn HostSource,
        devices: &'a dyn DeviceQuery,
    ) -> Self {
        Self {
            host_info,
            host,
            devices,
        }
    }

    /// Build one snapshot. A missing driver yields an empty GPU list rather
    /// than an error.
    pub fn snapshot(&mut self) -> Snapshot {
        let live = self.host.live_metrics();

        let gpus = match self.devices.list_devices() {
            Ok(gpus) => gpus,
            Err(e) => {
                if e.is_driver_unavailable() {
                    debug!("Snapshot without GPUs: {}", e);
                } else {
                    warn!("GPU enumeration failed: {}", e);
                }
                Vec::new()
            }
        };

        Snapshot {
            host: self.host_info.clone(),
            live,
            gpus,
        }
    }
}

impl SnapshotSource for SnapshotAggregator<'_> {
    fn build_snapshot(&mut self) -> Result<Snapshot> {
        Ok(self.snapshot())
    }
}

/// Validated polling interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollInterval(Duration);

impl PollInterval {
    /// Refuses intervals below [`MIN_INTERVAL_SECS`]
    pub fn from_secs(secs: u64) -> Result<Self> {
        if secs < MIN_INTERVAL_SECS {
            return Err(RigError::validation(format!(
                "interval {}s is below the minimum of {}s",
                secs, MIN_INTERVAL_SECS
            )));
        }
        Ok(Self(Duration::from_secs(secs)))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self(Duration::from_secs(2))
    }
}

/// Cooperative stop flag shared between the loop and whoever ends it
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Re-arm before starting another loop
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    /// Install a Ctrl+C handler that raises this signal. Call once per process.
    pub fn install_ctrlc(&self) -> Result<()> {
        let flag = self.0.clone();
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::Relaxed);
        })
        .map_err(|e| RigError::other(format!("Failed to set Ctrl+C handler: {}", e)))
    }
}

/// Summary of one loop run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub failures: u64,
}

/// Build and render a snapshot every `interval` until `stop` is raised or
/// `max_ticks` ticks have run.
///
/// Every tick is independent: a failed build or render is logged and the
/// loop carries on with the next tick.
pub fn run_loop<S, F>(
    source: &mut S,
    interval: PollInterval,
    stop: &StopSignal,
    max_ticks: Option<u64>,
    mut render_fn: F,
) -> LoopStats
where
    S: SnapshotSource + ?Sized,
    F: FnMut(&Snapshot) -> Result<()>,
{
    let mut stats = LoopStats::default();

    while !stop.is_stopped() {
        let started = Instant::now();
        stats.ticks += 1;

        let outcome = source.build_snapshot().and_then(|snapshot| render_fn(&snapshot));
        if let Err(e) = outcome {
            stats.failures += 1;
            error!("Polling tick {} failed: {}", stats.ticks, e);
        }

        if max_ticks.is_some_and(|max| stats.ticks >= max) || stop.is_stopped() {
            break;
        }

        let remaining = interval.as_duration().saturating_sub(started.elapsed());
        sleep_unless_stopped(remaining, stop);
    }

    debug!(
        "Polling loop ended after {} tick(s), {} failure(s)",
        stats.ticks, stats.failures
    );
    stats
}

fn sleep_unless_stopped(total: Duration, stop: &StopSignal) {
    let deadline = Instant::now() + total;
    loop {
        let now = Instant::now();
        if now >= deadline || stop.is_stopped() {
            return;
        }
        thread::sleep(STOP_POLL.min(deadline - now));
    }
}
