//! Polygon label text format.
//!
//! One text file per image, one line per polygon:
//!
//! ```text
//! <class_id> <x1> <y1> <x2> <y2> ... <xn> <yn>
//! ```
//!
//! Coordinates are normalized by the image width/height and written with six
//! decimals. Class ids are 0 for holds and 1 for volumes. Polygon names are not
//! stored; they are regenerated as `"{class}_{ordinal}"` on load.

use std::path::{Path, PathBuf};

use crate::constants::{COORDINATE_PRECISION, LABEL_EXTENSION, MIN_POLYGON_VERTICES};
use crate::format::error::FormatError;
use crate::model::{AnnotationSet, ClassType, ImageSize, Point, Polygon};

/// A label line that could not be turned into a polygon.
#[derive(Debug)]
pub struct SkippedLine {
    /// 1-based line number in the file
    pub line_number: usize,
    /// Why the line was rejected
    pub error: FormatError,
}

/// Result of loading a label file.
#[derive(Debug)]
pub struct LoadReport {
    /// Polygons that parsed successfully.
    pub set: AnnotationSet,
    /// Lines that were rejected; loading continued past them.
    pub skipped: Vec<SkippedLine>,
}

impl LoadReport {
    /// Number of rejected lines.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Check if every non-blank line was loaded.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Result of saving a label file.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Polygons written to the file.
    pub polygons_written: usize,
    /// Polygons left out because they cannot enclose area.
    pub skipped: usize,
}

/// Path of the label file for an image: `<labels_dir>/<image stem>.txt`.
pub fn label_path(labels_dir: &Path, image_path: &Path) -> PathBuf {
    let mut name = image_path.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(LABEL_EXTENSION);
    labels_dir.join(name)
}

/// Serialize a set to label text. Open polygons are left out.
pub fn encode(set: &AnnotationSet, size: ImageSize) -> Result<String, FormatError> {
    encode_counted(set, size).map(|(text, _)| text)
}

fn encode_counted(set: &AnnotationSet, size: ImageSize) -> Result<(String, SaveReport), FormatError> {
    if !size.is_valid() {
        return Err(FormatError::missing_dimensions(set.image_key()));
    }

    let width = f64::from(size.width);
    let height = f64::from(size.height);
    let mut text = String::new();
    let mut report = SaveReport::default();

    for polygon in set.iter() {
        if !polygon.is_closed() {
            log::warn!(
                "Skipping polygon '{}' with {} points (needs {})",
                polygon.name(),
                polygon.len(),
                MIN_POLYGON_VERTICES
            );
            report.skipped += 1;
            continue;
        }

        let mut line = polygon.class_type().class_id().to_string();
        for point in polygon.points() {
            line.push_str(&format!(
                " {:.prec$} {:.prec$}",
                f64::from(point.x) / width,
                f64::from(point.y) / height,
                prec = COORDINATE_PRECISION
            ));
        }
        text.push_str(&line);
        text.push('\n');
        report.polygons_written += 1;
    }

    Ok((text, report))
}

/// Parse label text into a fresh set. Bad lines are skipped and reported.
pub fn decode(
    text: &str,
    image_key: &str,
    size: ImageSize,
) -> Result<LoadReport, FormatError> {
    if !size.is_valid() {
        return Err(FormatError::missing_dimensions(image_key));
    }

    let mut set = AnnotationSet::new(image_key);
    let mut skipped = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_line(line, size) {
            Ok((class_type, points)) => {
                let name = set.next_name(class_type);
                set.add(Polygon::from_points(name, class_type, points));
            }
            Err(error) => {
                log::warn!("Skipping line {} of '{}': {}", idx + 1, image_key, error);
                skipped.push(SkippedLine {
                    line_number: idx + 1,
                    error,
                });
            }
        }
    }

    set.clear_dirty();
    Ok(LoadReport { set, skipped })
}

/// Parse a single label line into a class and denormalized points.
fn parse_line(line: &str, size: ImageSize) -> Result<(ClassType, Vec<Point>), FormatError> {
    let mut tokens = line.split_whitespace();
    let class_token = tokens
        .next()
        .ok_or_else(|| FormatError::invalid_format("empty line"))?;
    let class_id: u32 = class_token
        .parse()
        .map_err(|_| FormatError::invalid_format(format!("invalid class id '{}'", class_token)))?;
    let class_type =
        ClassType::from_class_id(class_id).ok_or(FormatError::UnknownClass { id: class_id })?;

    let values = tokens
        .map(|token| match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            Ok(_) => Err(FormatError::invalid_coordinates(format!(
                "non-finite value '{}'",
                token
            ))),
            Err(_) => Err(FormatError::invalid_coordinates(format!(
                "invalid number '{}'",
                token
            ))),
        })
        .collect::<Result<Vec<f64>, _>>()?;

    if values.len() % 2 != 0 {
        return Err(FormatError::OddCoordinateCount {
            count: values.len(),
        });
    }

    let width = f64::from(size.width);
    let height = f64::from(size.height);
    let points: Vec<Point> = values
        .chunks_exact(2)
        .map(|xy| Point::new((xy[0] * width) as f32, (xy[1] * height) as f32))
        .collect();

    if points.len() < MIN_POLYGON_VERTICES {
        return Err(FormatError::TooFewPoints {
            found: points.len(),
            required: MIN_POLYGON_VERTICES,
        });
    }

    Ok((class_type, points))
}

/// Write a set to `path`, replacing the previous file in one step.
///
/// The whole set is encoded before anything touches the disk, so later
/// in-memory edits never leak into an issued save.
pub fn save(path: &Path, set: &AnnotationSet, size: ImageSize) -> Result<SaveReport, FormatError> {
    let (text, report) = encode_counted(set, size)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);
    let written = std::fs::write(&tmp_path, &text).and_then(|()| std::fs::rename(&tmp_path, path));
    if let Err(e) = written {
        if let Err(cleanup) = std::fs::remove_file(&tmp_path) {
            log::debug!("Could not remove {:?}: {}", tmp_path, cleanup);
        }
        return Err(e.into());
    }

    log::info!(
        "Saved {} polygons for '{}' to {:?}",
        report.polygons_written,
        set.image_key(),
        path
    );
    Ok(report)
}

/// Read the label file at `path`. A missing file yields an empty set.
pub fn load(path: &Path, image_key: &str, size: ImageSize) -> Result<LoadReport, FormatError> {
    if !size.is_valid() {
        return Err(FormatError::missing_dimensions(image_key));
    }

    if !path.exists() {
        log::debug!("No label file at {:?}, starting empty", path);
        return Ok(LoadReport {
            set: AnnotationSet::new(image_key),
            skipped: Vec::new(),
        });
    }

    let text = std::fs::read_to_string(path)?;
    let report = decode(&text, image_key, size)?;
    log::info!(
        "Loaded {} polygons for '{}' ({} lines skipped)",
        report.set.len(),
        image_key,
        report.skipped_count()
    );
    Ok(report)
}
