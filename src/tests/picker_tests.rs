use crate::picker::{
    DatastoreInfo, DatastorePicker, DiskConfig, DiskRequest, PickerError, PickerSettings,
};
use std::collections::HashMap;

fn picker_with(headroom: i64, trials: usize, seed: u64) -> DatastorePicker {
    DatastorePicker::new(PickerSettings { headroom, trials, seed: Some(seed) }).unwrap()
}

fn picker(headroom: i64) -> DatastorePicker {
    picker_with(headroom, 64, 7)
}

/// Sum of disk sizes assigned to every datastore, by name.
fn assigned_bytes(placement: &crate::picker::Placement<'_, DiskConfig>) -> HashMap<String, u64> {
    placement
        .datastores
        .iter()
        .map(|(name, ds)| (name.clone(), ds.disks.iter().map(|d| d.size).sum()))
        .collect()
}

#[test]
fn test_single_datastore_returns_only_valid_placement() {
    let mut picker = picker(0);
    picker.update([("ds-1", 1024_u64)]);

    let disks = vec![DiskConfig::new(256).on_datastore("ds-1"), DiskConfig::new(512)];
    let placement = picker.best_disk_placement(&disks).unwrap();

    assert_eq!(placement.datastores.len(), 1);
    let ds = &placement.datastores["ds-1"];
    assert_eq!(ds.free_space, 1024 - 512);
    assert_eq!(ds.disks, vec![&disks[0], &disks[1]]);
    assert_eq!(placement.migration_size, 0);
}

#[test]
fn test_no_valid_placement_is_an_error() {
    let mut picker = picker(0);
    picker.update([("ds-1", 1024_u64)]);

    let disks = vec![DiskConfig::new(999_999)];
    let err = picker.best_disk_placement(&disks).unwrap_err();

    assert!(matches!(err, PickerError::NoValidPlacement { size: 999_999, .. }));
    assert!(!err.is_configuration_error());
    assert!(err.to_string().contains("No valid placement"), "message: {err}");
}

#[test]
fn test_batch_fails_atomically_when_one_disk_cannot_fit() {
    let mut picker = picker(0);
    picker.update([("ds-1", 1024_u64), ("ds-2", 2048)]);

    let disks = vec![DiskConfig::new(256), DiskConfig::new(512).matching("^ds-3$")];
    let err = picker.best_disk_placement(&disks).unwrap_err();

    match err {
        PickerError::NoValidPlacement { size, pattern, existing } => {
            assert_eq!(size, 512);
            assert_eq!(pattern, "^ds-3$");
            assert_eq!(existing, None);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_places_disks_respecting_pattern_and_balance() {
    let mut picker = picker(0);
    picker.update([("ds-1", 512_u64), ("ds-2", 1024)]);

    let disks = vec![DiskConfig::new(256).matching("ds-2"), DiskConfig::new(512)];
    let placement = picker.best_disk_placement(&disks).unwrap();

    // Only {ds-1: 512, ds-2: 256} and {ds-1: 0, ds-2: 768} are feasible;
    // the first scores 1024 against 768.
    assert_eq!(placement.datastores["ds-1"].free_space, 512);
    assert!(placement.datastores["ds-1"].disks.is_empty());
    assert_eq!(placement.datastores["ds-2"].free_space, 256);
    assert_eq!(placement.datastores["ds-2"].disks, vec![&disks[0], &disks[1]]);
    assert_eq!(placement.balance_score, 1024);
}

#[test]
fn test_default_headroom_is_reserved() {
    let mut picker = DatastorePicker::new(PickerSettings { seed: Some(3), ..Default::default() })
        .unwrap();
    assert_eq!(picker.settings().headroom, 1024);
    picker.update([("ds-1", 1536_u64), ("ds-2", 2048)]);

    // Usable space is 512 and 1024, so a 600-byte disk only fits on ds-2.
    let disks = vec![DiskConfig::new(600)];
    let placement = picker.best_disk_placement(&disks).unwrap();

    assert_eq!(placement.datastores["ds-1"].free_space, 512);
    assert_eq!(placement.datastores["ds-2"].free_space, 1024 - 600);
    assert_eq!(placement.datastores["ds-2"].disks, vec![&disks[0]]);

    let too_big = vec![DiskConfig::new(1100)];
    assert!(picker.best_disk_placement(&too_big).is_err());
}

#[test]
fn test_custom_headroom_is_reserved() {
    let mut picker = picker(512);
    picker.update([("ds-1", 1536_u64), ("ds-2", 2048)]);

    let disks = vec![DiskConfig::new(256).matching("ds-2"), DiskConfig::new(1100)];
    let placement = picker.best_disk_placement(&disks).unwrap();

    // ds-1 has 1024 usable bytes, too few for the 1100-byte disk.
    assert_eq!(placement.datastores["ds-1"].free_space, 1024);
    assert_eq!(placement.datastores["ds-2"].free_space, 1536 - 256 - 1100);
    assert_eq!(placement.disk_count(), 2);
}

#[test]
fn test_existing_disk_stays_on_its_datastore() {
    let mut picker = picker(0);
    picker.update([("ds-1", 512_u64), ("ds-2", 1024)]);

    let disks = vec![DiskConfig::new(256).on_datastore("ds-2"), DiskConfig::new(512)];
    let placement = picker.best_disk_placement(&disks).unwrap();

    assert_eq!(placement.datastores["ds-1"].free_space, 512);
    assert!(placement.datastores["ds-1"].disks.is_empty());
    assert_eq!(placement.datastores["ds-2"].free_space, 512);
    assert_eq!(placement.datastores["ds-2"].disks, vec![&disks[0], &disks[1]]);
    assert_eq!(placement.migration_size, 0);
}

#[test]
fn test_stickiness_beats_free_space_for_any_seed() {
    for seed in 0..32 {
        let mut picker = picker_with(0, 1, seed);
        picker.update([("roomy", 1_000_000_u64), ("ds-2", 512)]);

        let disks = vec![DiskConfig::new(256).on_datastore("ds-2")];
        let placement = picker.best_disk_placement(&disks).unwrap();

        assert_eq!(placement.datastore_of(&disks[0]), Some("ds-2"), "seed {seed}");
        assert_eq!(placement.migration_size, 0);
    }
}

#[test]
fn test_unavailable_existing_datastore_counts_as_migration() {
    let mut picker = picker(0);
    picker.update([("ds-1", 512_u64), ("ds-2", 1024)]);

    let disks = vec![
        DiskConfig::new(256).on_datastore("non-accessible-ds"),
        DiskConfig::new(512),
    ];
    let placement = picker.best_disk_placement(&disks).unwrap();

    assert_eq!(placement.migration_size, 256);
    assert_eq!(placement.disk_count(), 2);
    assert_ne!(placement.datastore_of(&disks[0]), Some("non-accessible-ds"));
}

#[test]
fn test_existing_datastore_rejected_by_pattern_migrates() {
    let mut picker = picker(0);
    picker.update([("old-ds", 4096_u64), ("new-ds", 4096)]);

    let disks = vec![DiskConfig::new(300).on_datastore("old-ds").matching("^new-")];
    let placement = picker.best_disk_placement(&disks).unwrap();

    assert_eq!(placement.datastore_of(&disks[0]), Some("new-ds"));
    assert_eq!(placement.migration_size, 300);
}

#[test]
fn test_single_exact_fit_datastore_ignores_seed() {
    for seed in 0..16 {
        let mut picker = picker_with(0, 4, seed);
        picker.update([("exact", 1000_u64), ("tiny", 50)]);

        let disks = vec![DiskConfig::new(400), DiskConfig::new(600)];
        let placement = picker.best_disk_placement(&disks).unwrap();

        assert_eq!(placement.datastores["exact"].disks.len(), 2, "seed {seed}");
        assert_eq!(placement.datastores["exact"].free_space, 0);
        assert!(placement.datastores["tiny"].disks.is_empty());
    }
}

#[test]
fn test_capacity_invariant_and_every_disk_placed_once() {
    let sizes = [300_u64, 1200, 50, 800, 800, 2000, 10, 640];
    let disks: Vec<DiskConfig> = sizes.iter().map(|&s| DiskConfig::new(s)).collect();
    // 5800 bytes requested against 8800 usable; "a" alone holds any disk.
    let free = [("a", 4000_u64), ("b", 2500), ("c", 1800), ("d", 900)];
    let headroom = 100;

    for seed in 0..20 {
        let mut picker = picker_with(headroom, 3, seed);
        picker.update(free);

        let placement = picker.best_disk_placement(&disks).unwrap();

        assert_eq!(placement.disk_count(), disks.len(), "seed {seed}");
        for disk in &disks {
            let homes = placement
                .datastores
                .values()
                .filter(|ds| ds.disks.iter().any(|d| std::ptr::eq(*d, disk)))
                .count();
            assert_eq!(homes, 1, "seed {seed}: disk placed {homes} times");
        }

        let used = assigned_bytes(&placement);
        for (name, capacity) in free {
            let limit = capacity - headroom as u64;
            assert!(used[name] <= limit, "seed {seed}: {name}: {} > {limit}", used[name]);
            assert_eq!(placement.datastores[name].free_space, limit as i64 - used[name] as i64);
        }
    }
}

#[test]
fn test_feasible_batch_is_placed_whatever_the_draw_order() {
    // The small disk comes first and usually lands on "big", which would
    // leave nowhere for the large one.
    let disks = vec![DiskConfig::new(100), DiskConfig::new(1000)];

    for seed in 0..200 {
        let mut picker = picker_with(0, 8, seed);
        picker.update([("big", 1000_u64), ("small", 100)]);

        let placement = picker.best_disk_placement(&disks).unwrap();

        assert_eq!(placement.datastore_of(&disks[0]), Some("small"), "seed {seed}");
        assert_eq!(placement.datastore_of(&disks[1]), Some("big"), "seed {seed}");
        assert_eq!(placement.datastores["big"].free_space, 0);
        assert_eq!(placement.datastores["small"].free_space, 0);
    }
}

#[test]
fn test_tight_batch_with_default_headroom_is_always_placed() {
    let disks: Vec<DiskConfig> = [700_u64, 300, 900, 200, 400].map(DiskConfig::new).to_vec();

    for seed in 0..200 {
        let mut picker =
            DatastorePicker::new(PickerSettings { seed: Some(seed), ..Default::default() })
                .unwrap();
        // Usable: 1000, 900 and 600 against 2500 requested.
        picker.update([("ds-1", 2024_u64), ("ds-2", 1924), ("ds-3", 1624)]);

        let placement = picker.best_disk_placement(&disks).unwrap();

        assert_eq!(placement.disk_count(), disks.len(), "seed {seed}");
        for ds in placement.datastores.values() {
            assert!(ds.free_space >= 0, "seed {seed}: overcommitted {ds:?}");
        }
    }
}

#[test]
fn test_error_names_disk_that_cannot_fit_anywhere() {
    // Random draws often strand the 1000-byte disk first, but the 5000-byte
    // one is the disk that can never be placed.
    let disks = vec![DiskConfig::new(100), DiskConfig::new(1000), DiskConfig::new(5000)];

    for seed in 0..32 {
        let mut picker = picker_with(0, 4, seed);
        picker.update([("big", 1000_u64), ("small", 100)]);

        let err = picker.best_disk_placement(&disks).unwrap_err();
        assert!(
            matches!(err, PickerError::NoValidPlacement { size: 5000, .. }),
            "seed {seed}: {err}"
        );
    }
}

#[test]
fn test_error_names_disk_left_without_room_by_search() {
    let disks = vec![DiskConfig::new(600), DiskConfig::new(950)];
    let mut picker = picker_with(0, 8, 1);
    picker.update([("big", 1000_u64), ("small", 100)]);

    // Each disk fits alone; after the larger one takes "big" the other has nowhere to go.
    let err = picker.best_disk_placement(&disks).unwrap_err();
    assert!(matches!(err, PickerError::NoValidPlacement { size: 600, .. }), "error: {err}");
}

#[test]
fn test_huge_free_space_weights_do_not_overflow() {
    let mut picker = picker_with(0, 8, 5);
    picker.update([("ds-1", u64::MAX), ("ds-2", u64::MAX - 1), ("ds-3", u64::MAX)]);

    let disks: Vec<DiskConfig> = [1_u64, 1 << 40, 1 << 50].map(DiskConfig::new).to_vec();
    let placement = picker.best_disk_placement(&disks).unwrap();

    assert_eq!(placement.disk_count(), 3);
    assert_eq!(placement.migration_size, 0);
}

#[test]
fn test_assigned_disks_keep_request_order() {
    let mut picker = picker(0);
    picker.update([("ds-1", 4096_u64)]);

    let disks = vec![
        DiskConfig::new(100),
        DiskConfig::new(200).on_datastore("ds-1"),
        DiskConfig::new(300),
        DiskConfig::new(400).on_datastore("ds-1"),
    ];
    let placement = picker.best_disk_placement(&disks).unwrap();

    let expected: Vec<&DiskConfig> = disks.iter().collect();
    assert_eq!(placement.datastores["ds-1"].disks, expected);
}

#[test]
fn test_same_seed_reproduces_placement() {
    let disks: Vec<DiskConfig> = [256_u64, 512, 512, 1024, 64].map(DiskConfig::new).to_vec();
    let catalog = [("ds-1", 51_200_u64), ("ds-2", 10_240), ("ds-3", 20_480), ("ds-4", 10_240)];

    let mut first = picker_with(0, 2, 99);
    let mut second = picker_with(0, 2, 99);
    first.update(catalog);
    second.update(catalog);

    for _ in 0..10 {
        let a = first.best_disk_placement(&disks).unwrap();
        let b = second.best_disk_placement(&disks).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_placement_frequency_tracks_free_space() {
    let mut picker = picker_with(0, 1, 2024);
    picker.update([
        ("datastore-1", 51_200_u64),
        ("datastore-2", 10_240),
        ("datastore-3", 20_480),
        ("datastore-4", 10_240),
    ]);
    let disks: Vec<DiskConfig> = [256_u64, 512, 512, 1024].map(DiskConfig::new).to_vec();

    let mut counts: HashMap<String, usize> = HashMap::new();
    let runs = 1000;
    for _ in 0..runs {
        let placement = picker.best_disk_placement(&disks).unwrap();
        for (name, ds) in &placement.datastores {
            *counts.entry(name.clone()).or_default() += ds.disks.len();
        }
    }

    let count = |name: &str| counts.get(name).copied().unwrap_or(0);
    let total = runs * disks.len();

    assert_eq!(counts.values().sum::<usize>(), total);
    assert!(count("datastore-1") < total, "everything went to the largest datastore");
    assert!(count("datastore-1") > count("datastore-3"));
    assert!(count("datastore-3") > count("datastore-2"));
    assert!(count("datastore-3") > count("datastore-4"));
    assert!(count("datastore-2") > 0);
    assert!(count("datastore-4") > 0);
}

#[test]
fn test_update_replaces_catalog() {
    let mut picker = picker(0);
    picker.update([("ds-a", 1024_u64), ("ds-b", 1024)]);
    picker.update([("ds-c", 2048_u64)]);

    assert_eq!(picker.catalog().len(), 1);
    assert!(picker.catalog().get("ds-a").is_none());

    let disks = vec![DiskConfig::new(10).matching("ds-a")];
    assert!(picker.best_disk_placement(&disks).is_err());

    let disks = vec![DiskConfig::new(10)];
    let placement = picker.best_disk_placement(&disks).unwrap();
    assert_eq!(placement.datastores.keys().collect::<Vec<_>>(), vec!["ds-c"]);
}

#[test]
fn test_duplicate_catalog_names_keep_latest_free_space() {
    let mut picker = picker(0);
    picker.update([("ds-1", 100_u64), ("ds-2", 200), ("ds-1", 300)]);

    let names: Vec<&str> = picker.catalog().iter().map(|ds| ds.name.as_str()).collect();
    assert_eq!(names, vec!["ds-1", "ds-2"]);
    assert_eq!(picker.catalog().get("ds-1").map(|ds| ds.free_space), Some(300));
    assert_eq!(picker.catalog().total_free_space(), 500);
}

#[test]
fn test_configuration_errors_are_eager() {
    assert!(matches!(
        DatastorePicker::new(PickerSettings::with_headroom(-1)),
        Err(PickerError::NegativeHeadroom(-1))
    ));
    assert!(matches!(
        DatastorePicker::new(PickerSettings { trials: 0, ..Default::default() }),
        Err(PickerError::InvalidTrials(0))
    ));

    let mut picker = picker(0);
    picker.update([("ds-1", 1024_u64)]);

    // The malformed pattern is rejected even though the first disk would fit.
    let disks = vec![DiskConfig::new(10), DiskConfig::new(10).matching("ds-(")];
    let err = picker.best_disk_placement(&disks).unwrap_err();
    assert!(matches!(err, PickerError::InvalidPattern { .. }));
    assert!(err.is_configuration_error());

    let err = picker.best_disk_placement(&[DiskConfig::new(0)]).unwrap_err();
    assert!(matches!(err, PickerError::InvalidDiskSize));
}

/// Caller-side types only need to expose the capabilities the picker reads.
struct InventoryDatastore {
    capacity: u64,
    used: u64,
}

impl DatastoreInfo for InventoryDatastore {
    fn free_space(&self) -> u64 {
        self.capacity - self.used
    }
}

struct PersistentDisk {
    size_mb: u64,
    home: Option<&'static str>,
}

impl DiskRequest for PersistentDisk {
    fn size(&self) -> u64 {
        self.size_mb * 1024 * 1024
    }

    fn existing_datastore_name(&self) -> Option<&str> {
        self.home
    }

    fn target_datastore_pattern(&self) -> &str {
        "^vsan-"
    }
}

#[test]
fn test_accepts_any_type_with_the_right_capabilities() {
    let mut picker = picker(0);
    picker.update([
        ("vsan-1", InventoryDatastore { capacity: 10 << 30, used: 9 << 30 }),
        ("nfs-1", InventoryDatastore { capacity: 100 << 30, used: 0 }),
    ]);

    let disks = [
        PersistentDisk { size_mb: 512, home: Some("vsan-1") },
        PersistentDisk { size_mb: 256, home: None },
    ];
    let placement = picker.best_disk_placement(&disks).unwrap();

    assert_eq!(placement.datastores["vsan-1"].disks.len(), 2);
    assert!(placement.datastores["nfs-1"].disks.is_empty());
    assert_eq!(placement.datastores["vsan-1"].free_space, (1 << 30) - (256 << 20));
}
