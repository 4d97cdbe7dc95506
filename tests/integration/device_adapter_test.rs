use rigmon::core::{DeviceQuery, DeviceQueryAdapter, PowerBounds};

use super::fakes::FakeLibrary;

fn bounds(n: usize) -> Vec<PowerBounds> {
    vec![PowerBounds { min_w: 100, max_w: 200 }; n]
}

#[test]
fn test_unreadable_device_is_dropped() {
    let library = FakeLibrary {
        count: 3,
        unreadable: [0].into_iter().collect(),
        bounds: bounds(3),
    };
    let adapter = DeviceQueryAdapter::new(library);

    let devices = adapter.list_devices().unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].index, 1);
    assert_eq!(devices[1].index, 2);
}

#[test]
fn test_missing_bounds_drop_device() {
    let library = FakeLibrary {
        count: 2,
        bounds: bounds(1),
        ..Default::default()
    };
    let adapter = DeviceQueryAdapter::new(library);

    let devices = adapter.list_devices().unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].power_limit_min_w, 100);
    assert_eq!(devices[0].power_limit_max_w, 200);
}

#[test]
fn test_enumeration_order_follows_index() {
    let adapter = DeviceQueryAdapter::new(FakeLibrary {
        count: 4,
        bounds: bounds(4),
        ..Default::default()
    });

    let indices: Vec<u32> = adapter
        .list_devices()
        .unwrap()
        .iter()
        .map(|d| d.index)
        .collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}
