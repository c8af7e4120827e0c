mod common;

use std::fs;

use chrono::Utc;
use common::{fast_config, paths, portrait_data, Host};
use portrait_stealer_lib::PortraitRuntime;
use ps_core::{CachedEntry, CapturedPortrait};

#[test]
fn startup_sweeps_stale_cache_files() {
    let dir = tempfile::tempdir().unwrap();
    let paths = paths(dir.path());
    fs::create_dir_all(&paths.duty_cache_dir).unwrap();
    fs::create_dir_all(&paths.plate_dir).unwrap();

    let leftover_duty = paths.duty_cache_dir.join("500_638000000000000000.png");
    let orphan_plate = paths.plate_dir.join("Nobody_20240101000000.png");
    let kept_plate = paths.plate_dir.join("Krile_20240101000000.png");
    let missing_plate = paths.plate_dir.join("Urianger_20240101000000.png");
    let legacy = dir.path().join("adventurer_plate_20230101.png");
    for file in [&leftover_duty, &orphan_plate, &kept_plate, &legacy] {
        fs::write(file, b"png").unwrap();
    }

    let entries: Vec<CachedEntry> = [("Krile", &kept_plate), ("Urianger", &missing_plate)]
        .into_iter()
        .map(|(name, path)| {
            let portrait = CapturedPortrait::new(portrait_data(24), "WHM", Utc::now())
                .with_player_name(name)
                .with_image_path(path.as_path());
            CachedEntry::from_portrait(portrait).unwrap()
        })
        .collect();
    fs::write(
        &paths.plate_index_path,
        serde_json::to_string(&entries).unwrap(),
    )
    .unwrap();

    let host = Host::new();
    let runtime = PortraitRuntime::start_with(fast_config(), paths.clone(), host.services()).unwrap();

    assert!(!leftover_duty.exists());
    assert!(!orphan_plate.exists());
    assert!(!legacy.exists());
    assert!(kept_plate.exists());
    assert!(paths.plate_index_path.exists());

    let plates = runtime.cached_plates();
    assert_eq!(plates.len(), 1);
    assert_eq!(plates[0].key, "Krile");
}

#[test]
fn startup_creates_cache_directories() {
    let dir = tempfile::tempdir().unwrap();
    let paths = paths(&dir.path().join("fresh"));
    let host = Host::new();

    let runtime = PortraitRuntime::start_with(fast_config(), paths.clone(), host.services()).unwrap();

    assert!(paths.duty_cache_dir.is_dir());
    assert!(paths.plate_dir.is_dir());
    assert!(runtime.cached_plates().is_empty());
}
