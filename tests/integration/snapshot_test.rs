use rigmon::core::{
    DeviceQueryAdapter, PowerBounds, Session, SnapshotAggregator, SnapshotSource,
};

use super::fakes::{gpu, FakeDevices, FakeHost, FakeLibrary};

#[test]
fn test_driver_unavailable_yields_host_only_snapshot() {
    let devices: DeviceQueryAdapter<FakeLibrary> =
        DeviceQueryAdapter::unavailable("Failed to init NVML: a libloading error occurred");
    let mut session = Session::with_parts(FakeHost { samples: 0 }, devices);

    let snapshot = session.snapshot();

    assert!(snapshot.gpus.is_empty());
    assert_eq!(snapshot.host.cpu_model, "AMD Ryzen 5 5600X");
    assert_eq!(snapshot.live.memory_total_bytes, 16 * 1024 * 1024 * 1024);
    assert!(session.gpu_unavailable_reason().is_some());
}

#[test]
fn test_build_snapshot_never_fails_without_driver() {
    let mut host = FakeHost { samples: 0 };
    let host_info = rigmon::core::HostInfo::unknown();
    let devices: DeviceQueryAdapter<FakeLibrary> = DeviceQueryAdapter::unavailable("no driver");

    let mut aggregator = SnapshotAggregator::new(&host_info, &mut host, &devices);
    let snapshot = aggregator.build_snapshot().unwrap();

    assert!(snapshot.gpus.is_empty());
    assert_eq!(snapshot.live.cpu_percent, 25.0);
}

#[test]
fn test_snapshot_combines_host_and_devices() {
    let mut host = FakeHost { samples: 0 };
    let host_info = rigmon::core::HostInfo::unknown();
    let devices = FakeDevices::new(vec![gpu(0, 100, 200), gpu(1, 150, 250)]);

    let snapshot = SnapshotAggregator::new(&host_info, &mut host, &devices).snapshot();

    assert_eq!(snapshot.gpus.len(), 2);
    assert_eq!(snapshot.total_power_draw_w(), 250.0);
    assert_eq!(devices.list_calls.get(), 1);
    assert_eq!(host.samples, 1);
}

#[test]
fn test_session_reads_static_info_once() {
    let library = FakeLibrary {
        count: 1,
        bounds: vec![PowerBounds { min_w: 90, max_w: 220 }],
        ..Default::default()
    };
    let mut session = Session::with_parts(FakeHost { samples: 0 }, DeviceQueryAdapter::new(library));

    let first = session.snapshot();
    let second = session.snapshot();

    assert_eq!(first.host, second.host);
    assert_ne!(first.live.timestamp, second.live.timestamp);
    assert_eq!(first.gpus[0].power_limit_max_w, 220);
    assert!(session.gpu_unavailable_reason().is_none());
}
