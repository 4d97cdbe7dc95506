use rigmon::core::{ConfigApplier, ConfigRequest, ConfigResult, DeviceQueryAdapter, PowerBounds};

use super::fakes::{gpu, FakeDevices, FakeLibrary};

fn request(device_index: u32, memory_clock_offset_mhz: i32, power_limit_w: u32) -> ConfigRequest {
    ConfigRequest {
        device_index,
        memory_clock_offset_mhz,
        power_limit_w,
    }
}

#[test]
fn test_two_device_scenario() {
    let mut devices = FakeDevices::new(vec![gpu(0, 100, 200), gpu(1, 150, 250)]);

    let results =
        ConfigApplier::new(&mut devices).apply(&[request(0, 50, 180), request(1, 0, 300)]);

    assert_eq!(
        results,
        vec![
            ConfigResult {
                device_index: 0,
                applied: true,
                error: None,
            },
            ConfigResult {
                device_index: 1,
                applied: false,
                error: Some("power_limit_w 300 exceeds max 250".to_string()),
            },
        ]
    );
    // Only the valid request reached the device
    assert_eq!(devices.apply_calls, vec![(0, 50, 180)]);
}

#[test]
fn test_out_of_range_request_never_reaches_device() {
    let cases = [(99, "power_limit_w 99 is below min 100"), (201, "power_limit_w 201 exceeds max 200")];

    for (power, message) in cases {
        let mut devices = FakeDevices::new(vec![gpu(0, 100, 200)]);

        let results = ConfigApplier::new(&mut devices).apply(&[request(0, 0, power)]);

        assert_eq!(results.len(), 1);
        assert!(!results[0].applied);
        assert_eq!(results[0].error.as_deref(), Some(message));
        assert!(devices.apply_calls.is_empty(), "no write for {} W", power);
    }
}

#[test]
fn test_adapter_failure_does_not_block_siblings() {
    let count = 5;
    for failing in 0..count {
        let mut devices =
            FakeDevices::new((0..count).map(|i| gpu(i, 100, 200)).collect()).failing_on(failing);
        let requests: Vec<ConfigRequest> = (0..count).map(|i| request(i, 100, 150)).collect();

        let results = ConfigApplier::new(&mut devices).apply(&requests);

        assert_eq!(results.len(), count as usize);
        for result in &results {
            if result.device_index == failing {
                assert!(!result.applied);
                let error = result.error.as_deref().unwrap_or_default();
                assert!(error.contains("rejected the write"), "got: {}", error);
            } else {
                assert!(result.applied, "GPU {} should be applied", result.device_index);
                assert!(result.error.is_none());
            }
        }
        // Every request was attempted, in order
        let attempted: Vec<u32> = devices.apply_calls.iter().map(|c| c.0).collect();
        assert_eq!(attempted, (0..count).collect::<Vec<_>>());
    }
}

#[test]
fn test_reapplying_is_idempotent() {
    let mut devices = FakeDevices::new(vec![gpu(0, 100, 200)]);
    let r = request(0, 250, 170);

    let first = ConfigApplier::new(&mut devices).apply(&[r]);
    let second = ConfigApplier::new(&mut devices).apply(&[r]);

    assert_eq!(first, second);
    assert_eq!(first, vec![ConfigResult::applied(0)]);
    assert_eq!(devices.apply_calls, vec![(0, 250, 170), (0, 250, 170)]);
    // Bounds are looked up again for every request
    assert_eq!(devices.list_calls.get(), 2);
}

#[test]
fn test_requests_keep_supplied_order() {
    let mut devices = FakeDevices::new(vec![gpu(0, 100, 200), gpu(1, 100, 200), gpu(2, 100, 200)]);

    let results = ConfigApplier::new(&mut devices).apply(&[
        request(2, 0, 150),
        request(0, 0, 150),
        request(1, 0, 150),
    ]);

    let order: Vec<u32> = results.iter().map(|r| r.device_index).collect();
    assert_eq!(order, vec![2, 0, 1]);
}

#[test]
fn test_unavailable_driver_rejects_every_request() {
    let mut devices: DeviceQueryAdapter<FakeLibrary> =
        DeviceQueryAdapter::unavailable("NVML Shared Library Not Found");

    let results = ConfigApplier::new(&mut devices).apply(&[request(0, 0, 150), request(1, 0, 150)]);

    assert_eq!(results.len(), 2);
    for result in results {
        assert!(!result.applied);
        assert!(result
            .error
            .unwrap_or_default()
            .contains("NVML Shared Library Not Found"));
    }
}

#[test]
fn test_applier_over_real_adapter() {
    let library = FakeLibrary {
        count: 2,
        bounds: vec![
            PowerBounds { min_w: 100, max_w: 200 },
            PowerBounds { min_w: 150, max_w: 250 },
        ],
        ..Default::default()
    };
    let mut devices = DeviceQueryAdapter::new(library);

    let results = ConfigApplier::new(&mut devices).apply(&[request(0, 50, 180), request(1, 0, 300)]);

    assert!(results[0].applied);
    assert_eq!(
        results[1].error.as_deref(),
        Some("power_limit_w 300 exceeds max 250")
    );
}

#[test]
fn test_unreadable_device_reports_query_failure() {
    let library = FakeLibrary {
        count: 2,
        unreadable: [1].into_iter().collect(),
        bounds: vec![
            PowerBounds { min_w: 100, max_w: 200 },
            PowerBounds { min_w: 100, max_w: 200 },
        ],
    };
    let mut devices = DeviceQueryAdapter::new(library);

    let results = ConfigApplier::new(&mut devices).apply(&[
        request(1, 0, 150),
        request(0, 0, 150),
        request(4, 0, 150),
    ]);

    assert_eq!(
        results,
        vec![
            ConfigResult::rejected(1, "GPU 1: query failed: Unknown Error"),
            ConfigResult::applied(0),
            ConfigResult::rejected(4, "GPU 4 not found"),
        ]
    );
}
