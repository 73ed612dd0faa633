//! Label file import/export.
//!
//! Labels are stored per image as normalized polygon lines (see
//! [`label_txt`]). Normalization means the file carries no pixel sizes, so
//! every load and save takes the image's [`ImageSize`](crate::model::ImageSize).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use holdlabel::format;
//!
//! let path = format::label_path(labels_dir, image_path);
//! let report = format::load(&path, "wall_01", size)?;
//! if !report.is_clean() {
//!     log::warn!("{} lines skipped", report.skipped_count());
//! }
//! format::save(&path, &report.set, size)?;
//! ```

mod error;
pub mod label_txt;

#[cfg(test)]
mod tests;

pub use error::FormatError;
pub use label_txt::{LoadReport, SaveReport, SkippedLine, decode, encode, label_path, load, save};
