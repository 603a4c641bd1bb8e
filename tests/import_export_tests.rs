use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use time_scheduler::{
    PersistenceError, Position, Timeline, TimelineMetadata, load_timeline_from_csv,
    load_timeline_from_json, save_timeline_to_csv, save_timeline_to_json,
};
use tempfile::NamedTempFile;

fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn build_sample_timeline() -> Timeline {
    let mut metadata = TimelineMetadata::default();
    metadata.name = "Export Timeline".into();
    metadata.description = "Testing persistence, with a comma".into();
    metadata.default_color = "#336699".into();

    let mut timeline = Timeline::new_with_metadata(metadata);
    timeline
        .upsert_position(Position::range(1, "red", ts(2025, 1, 6, 9), ts(2025, 1, 10, 17)))
        .unwrap();
    timeline
        .upsert_position(Position::offset(2, "#00aa00", 12.5, 0.0))
        .unwrap();
    timeline
        .upsert_position(Position::range(3, "blue", ts(2025, 2, 1, 0), ts(2025, 2, 1, 0)))
        .unwrap();
    timeline
}

#[test]
fn json_round_trip_preserves_timeline() {
    let timeline = build_sample_timeline();
    let file = NamedTempFile::new().unwrap();

    save_timeline_to_json(&timeline, file.path()).unwrap();
    let loaded = load_timeline_from_json(file.path()).unwrap();

    assert_eq!(loaded.metadata(), timeline.metadata());
    assert_eq!(loaded.positions().unwrap(), timeline.positions().unwrap());
}

#[test]
fn csv_round_trip_preserves_timeline() {
    let timeline = build_sample_timeline();
    let file = NamedTempFile::new().unwrap();

    save_timeline_to_csv(&timeline, file.path()).unwrap();
    let loaded = load_timeline_from_csv(file.path()).unwrap();

    assert_eq!(loaded.metadata(), timeline.metadata());
    assert_eq!(loaded.positions().unwrap(), timeline.positions().unwrap());
}

#[test]
fn csv_without_metadata_row_uses_default_metadata() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        "id,color,kind,from,to,position,duration,metadata_json\n\
         1,red,offset,,,2,3,\n\
         2,blue,range,2025-01-01T00:00:00Z,2025-01-02T00:00:00Z,,,\n",
    )
    .unwrap();

    let loaded = load_timeline_from_csv(file.path()).unwrap();
    assert_eq!(loaded.metadata(), &TimelineMetadata::default());
    assert_eq!(
        loaded.positions().unwrap(),
        vec![
            Position::offset(1, "red", 2.0, 3.0),
            Position::range(2, "blue", ts(2025, 1, 1, 0), ts(2025, 1, 2, 0)),
        ]
    );
}

#[test]
fn csv_round_trip_of_empty_timeline_keeps_metadata() {
    let mut timeline = Timeline::new();
    timeline.set_name("Empty Timeline").unwrap();
    let file = NamedTempFile::new().unwrap();
    save_timeline_to_csv(&timeline, file.path()).unwrap();

    let loaded = load_timeline_from_csv(file.path()).unwrap();
    assert!(loaded.is_empty());
    assert_eq!(loaded.metadata(), timeline.metadata());
}

#[test]
fn csv_with_no_rows_is_rejected() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        "id,color,kind,from,to,position,duration,metadata_json\n",
    )
    .unwrap();

    match load_timeline_from_csv(file.path()) {
        Err(PersistenceError::InvalidData(msg)) => {
            assert!(msg.contains("no rows"), "unexpected message: {msg}")
        }
        Ok(_) => panic!("expected empty csv to be rejected"),
        Err(other) => panic!("expected InvalidData error, got {other:?}"),
    }
}

#[test]
fn csv_with_second_metadata_row_is_rejected() {
    let timeline = build_sample_timeline();
    let file = NamedTempFile::new().unwrap();
    save_timeline_to_csv(&timeline, file.path()).unwrap();

    let contents = fs::read_to_string(file.path()).unwrap();
    let metadata_line = contents
        .lines()
        .nth(1)
        .expect("metadata row follows the header")
        .to_string();
    fs::write(file.path(), format!("{contents}{metadata_line}\n")).unwrap();

    match load_timeline_from_csv(file.path()) {
        Err(PersistenceError::InvalidData(msg)) => {
            assert!(msg.contains("multiple metadata rows"), "unexpected message: {msg}")
        }
        Ok(_) => panic!("expected second metadata row to be rejected"),
        Err(other) => panic!("expected InvalidData error, got {other:?}"),
    }
}

#[test]
fn csv_with_unknown_kind_is_rejected() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        "id,color,kind,from,to,position,duration,metadata_json\n1,red,circle,,,1,1,\n",
    )
    .unwrap();

    let result = load_timeline_from_csv(file.path());
    assert!(matches!(result, Err(PersistenceError::InvalidData(_))));
}

#[test]
fn json_load_rejects_duplicate_ids() {
    let snapshot = serde_json::json!({
        "metadata": TimelineMetadata::default(),
        "positions": [
            Position::offset(1, "red", 0.0, 1.0),
            Position::offset(1, "blue", 1.0, 1.0)
        ]
    });

    let file = NamedTempFile::new().unwrap();
    serde_json::to_writer_pretty(file.as_file(), &snapshot).unwrap();

    match load_timeline_from_json(file.path()) {
        Ok(_) => panic!("expected duplicate ids to be rejected"),
        Err(PersistenceError::InvalidData(msg)) => assert!(
            msg.contains("duplicate position id"),
            "unexpected message: {msg}"
        ),
        Err(other) => panic!("expected InvalidData error, got {other:?}"),
    }
}

#[test]
fn json_load_rejects_inverted_range() {
    let snapshot = serde_json::json!({
        "metadata": TimelineMetadata::default(),
        "positions": [
            Position::range(1, "red", ts(2025, 3, 2, 0), ts(2025, 3, 1, 0))
        ]
    });
    let file = NamedTempFile::new().unwrap();
    serde_json::to_writer_pretty(file.as_file(), &snapshot).unwrap();

    assert!(matches!(
        load_timeline_from_json(file.path()),
        Err(PersistenceError::InvalidData(_))
    ));
}

#[test]
fn missing_file_surfaces_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    assert!(matches!(
        load_timeline_from_json(&path),
        Err(PersistenceError::Io(_))
    ));
}
