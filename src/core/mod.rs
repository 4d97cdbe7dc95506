// Core monitoring and configuration logic

pub mod applier;
pub mod config;
pub mod device;
pub mod host;
pub mod session;
pub mod snapshot;
pub mod types;

// Re-export commonly used items
pub use applier::{validate, ConfigApplier};
pub use config::ConsoleSettings;
pub use device::{DeviceQuery, DeviceQueryAdapter, DeviceReading, GpuLibrary, PowerBounds};
pub use host::{host_info_from, HostFacts, HostSource, SysinfoHost};
pub use session::Session;
pub use snapshot::{
    run_loop, LoopStats, PollInterval, SnapshotAggregator, SnapshotSource, StopSignal,
    MIN_INTERVAL_SECS,
};
pub use types::*;
