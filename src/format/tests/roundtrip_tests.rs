//! Round-trip tests: pixel coordinates -> label text -> pixel coordinates.

use crate::format::{decode, encode};
use crate::model::{AnnotationSet, ClassType, ImageSize, Point, Polygon};

/// Half a unit in the sixth decimal, scaled to pixels, plus f32 slack.
fn tolerance(size: ImageSize) -> f32 {
    size.width.max(size.height) as f32 * 5e-7 + 1e-3
}

fn create_wall_set() -> AnnotationSet {
    let mut set = AnnotationSet::new("wall_01");
    set.add(Polygon::from_points(
        "hold_1",
        ClassType::Hold,
        [
            Point::new(10.0, 10.0),
            Point::new(110.0, 10.0),
            Point::new(110.0, 110.0),
            Point::new(10.0, 110.0),
        ],
    ));
    set.add(Polygon::from_points(
        "volume_1",
        ClassType::Volume,
        [
            Point::new(120.5, 130.25),
            Point::new(190.0, 140.0),
            Point::new(150.75, 199.0),
        ],
    ));
    set
}

#[test]
fn test_hold_square_scenario() {
    let size = ImageSize::new(200, 200);
    let mut set = AnnotationSet::new("wall_01");
    set.add(Polygon::from_points(
        "hold_1",
        ClassType::Hold,
        [
            Point::new(10.0, 10.0),
            Point::new(110.0, 10.0),
            Point::new(110.0, 110.0),
            Point::new(10.0, 110.0),
        ],
    ));

    let text = encode(&set, size).unwrap();
    assert_eq!(
        text,
        "0 0.050000 0.050000 0.550000 0.050000 0.550000 0.550000 0.050000 0.550000\n"
    );

    let report = decode(&text, "wall_01", size).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.set.len(), 1);

    let polygon = report.set.iter().next().unwrap();
    assert_eq!(polygon.name(), "hold_1");
    assert_eq!(polygon.class_type(), ClassType::Hold);
    for (loaded, original) in polygon.points().iter().zip(set.iter().next().unwrap().points()) {
        assert!((loaded.x - original.x).abs() < tolerance(size));
        assert!((loaded.y - original.y).abs() < tolerance(size));
    }
}

#[test]
fn test_roundtrip_preserves_order_class_and_coordinates() {
    for size in [
        ImageSize::new(200, 200),
        ImageSize::new(640, 480),
        ImageSize::new(4032, 3024),
    ] {
        let set = create_wall_set();
        let text = encode(&set, size).unwrap();
        let loaded = decode(&text, "wall_01", size).unwrap().set;

        assert_eq!(loaded.len(), set.len());
        for (a, b) in loaded.iter().zip(set.iter()) {
            assert_eq!(a.class_type(), b.class_type());
            assert_eq!(a.len(), b.len());
            for (pa, pb) in a.points().iter().zip(b.points()) {
                assert!(
                    (pa.x - pb.x).abs() < tolerance(size),
                    "{:?} vs {:?} at {:?}",
                    pa,
                    pb,
                    size
                );
                assert!((pa.y - pb.y).abs() < tolerance(size));
            }
        }
    }
}

#[test]
fn test_names_are_regenerated_per_class() {
    let size = ImageSize::new(100, 100);
    let text = "0 0.1 0.1 0.2 0.1 0.2 0.2\n\
                1 0.5 0.5 0.6 0.5 0.6 0.6\n\
                0 0.7 0.7 0.8 0.7 0.8 0.8\n";
    let set = decode(text, "wall_02", size).unwrap().set;

    let names: Vec<&str> = set.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["hold_1", "volume_1", "hold_2"]);
    assert!(!set.is_dirty());
}

#[test]
fn test_encode_uses_six_decimals() {
    let size = ImageSize::new(3, 7);
    let mut set = AnnotationSet::new("tiny");
    set.add(Polygon::from_points(
        "volume_1",
        ClassType::Volume,
        [Point::new(1.0, 1.0), Point::new(2.0, 1.0), Point::new(2.0, 6.0)],
    ));

    let text = encode(&set, size).unwrap();
    assert_eq!(text, "1 0.333333 0.142857 0.666667 0.142857 0.666667 0.857143\n");
}

#[test]
fn test_encode_skips_open_polygons() {
    let size = ImageSize::new(100, 100);
    let mut set = create_wall_set();
    let mut open = Polygon::new("hold_2", ClassType::Hold);
    open.add_point(1.0, 1.0);
    open.add_point(2.0, 2.0);
    set.add(open);

    let text = encode(&set, size).unwrap();
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn test_empty_set_encodes_to_empty_text() {
    let set = AnnotationSet::new("empty");
    assert_eq!(encode(&set, ImageSize::new(10, 10)).unwrap(), "");
}
