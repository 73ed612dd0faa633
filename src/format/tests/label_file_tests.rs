//! Tests for malformed input and file handling.

use std::path::Path;

use crate::format::{FormatError, decode, label_path, load, save};
use crate::model::{AnnotationSet, ClassType, ImageSize, Point, Polygon};

fn triangle_set(key: &str) -> AnnotationSet {
    let mut set = AnnotationSet::new(key);
    set.add(Polygon::from_points(
        "hold_1",
        ClassType::Hold,
        [
            Point::new(20.0, 20.0),
            Point::new(60.0, 20.0),
            Point::new(40.0, 50.0),
        ],
    ));
    set
}

#[test]
fn test_two_point_line_is_rejected() {
    let report = decode("0 0.1 0.1 0.3 0.1", "wall_01", ImageSize::new(200, 200)).unwrap();
    assert!(report.set.is_empty());
    assert_eq!(report.skipped_count(), 1);
    assert!(matches!(
        report.skipped[0].error,
        FormatError::TooFewPoints {
            found: 2,
            required: 3
        }
    ));
}

#[test]
fn test_odd_coordinate_count_is_not_truncated() {
    // Seven values would silently become three points if truncated
    let report = decode(
        "0 0.1 0.1 0.3 0.1 0.3 0.3 0.5",
        "wall_01",
        ImageSize::new(200, 200),
    )
    .unwrap();
    assert!(report.set.is_empty());
    assert!(matches!(
        report.skipped[0].error,
        FormatError::OddCoordinateCount { count: 7 }
    ));
}

#[test]
fn test_bad_lines_are_skipped_and_counted() {
    let text = "0 0.1 0.1 0.2 0.1 0.2 0.2\n\
                \n\
                garbage\n\
                1 0.5 0.5 0.6 0.5 0.6 0.6\n\
                3 0.5 0.5 0.6 0.5 0.6 0.6\n\
                0 0.1 0.1 0.3\n";
    let report = decode(text, "wall_01", ImageSize::new(100, 100)).unwrap();

    assert_eq!(report.set.len(), 2);
    assert_eq!(report.skipped_count(), 3);
    let lines: Vec<usize> = report.skipped.iter().map(|s| s.line_number).collect();
    assert_eq!(lines, vec![3, 5, 6]);
    assert!(matches!(
        report.skipped[1].error,
        FormatError::UnknownClass { id: 3 }
    ));
}

#[test]
fn test_missing_dimensions() {
    assert!(matches!(
        decode("0 0.1 0.1 0.2 0.1 0.2 0.2", "wall_01", ImageSize::new(0, 100)),
        Err(FormatError::MissingDimensions { .. })
    ));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wall_01.txt");
    assert!(matches!(
        save(&path, &triangle_set("wall_01"), ImageSize::new(100, 0)),
        Err(FormatError::MissingDimensions { .. })
    ));
    assert!(!path.exists());
    assert!(matches!(
        load(&path, "wall_01", ImageSize::new(0, 0)),
        Err(FormatError::MissingDimensions { .. })
    ));
}

#[test]
fn test_save_then_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = label_path(&dir.path().join("annotations"), Path::new("images/wall_01.jpg"));
    let size = ImageSize::new(100, 100);

    let report = save(&path, &triangle_set("wall_01"), size).unwrap();
    assert_eq!(report.polygons_written, 1);
    assert_eq!(report.skipped, 0);
    assert!(path.exists());

    let loaded = load(&path, "wall_01", size).unwrap();
    assert!(loaded.is_clean());
    assert_eq!(loaded.set.len(), 1);
    let polygon = loaded.set.iter().next().unwrap();
    assert!((polygon.points()[2].y - 50.0).abs() < 1e-3);
}

#[test]
fn test_save_replaces_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wall_01.txt");
    let size = ImageSize::new(100, 100);

    let mut set = triangle_set("wall_01");
    set.add(Polygon::from_points(
        "volume_1",
        ClassType::Volume,
        [
            Point::new(70.0, 70.0),
            Point::new(90.0, 70.0),
            Point::new(80.0, 90.0),
        ],
    ));
    save(&path, &set, size).unwrap();
    save(&path, &triangle_set("wall_01"), size).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path() != path)
        .collect();
    assert!(leftovers.is_empty(), "temporary file left behind");
}

#[test]
fn test_failed_save_removes_temporary_file() {
    let dir = tempfile::tempdir().unwrap();
    // A non-empty directory in the way makes the final rename fail
    let path = dir.path().join("wall_01.txt");
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(path.join("keep"), "x").unwrap();

    let result = save(&path, &triangle_set("wall_01"), ImageSize::new(100, 100));
    assert!(matches!(result, Err(FormatError::Io(_))));
    assert!(!dir.path().join("wall_01.txt.tmp").exists());
    assert!(path.join("keep").exists());
}

#[test]
fn test_save_snapshot_ignores_later_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wall_01.txt");
    let size = ImageSize::new(100, 100);

    let mut set = triangle_set("wall_01");
    save(&path, &set, size).unwrap();
    let saved = std::fs::read_to_string(&path).unwrap();

    let id = set.iter().next().unwrap().id();
    set.get_mut(id).unwrap().move_all(10.0, 10.0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), saved);
}

#[test]
fn test_load_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let report = load(&dir.path().join("nothing.txt"), "nothing", ImageSize::new(10, 10)).unwrap();
    assert!(report.set.is_empty());
    assert!(report.is_clean());
    assert_eq!(report.set.image_key(), "nothing");
}
