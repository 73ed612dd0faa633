//! Error types for label file operations.

use thiserror::Error;

/// Errors that can occur while reading or writing label files.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid line structure or content
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },

    /// Class id outside the known vocabulary
    #[error("Unknown class id: {id}")]
    UnknownClass {
        /// The class id found in the file
        id: u32,
    },

    /// Coordinate tokens do not pair up into points
    #[error("Odd number of coordinate values: {count}")]
    OddCoordinateCount {
        /// Number of coordinate tokens after the class id
        count: usize,
    },

    /// Polygon cannot enclose area
    #[error("Polygon has {found} points, at least {required} required")]
    TooFewPoints {
        /// Points found on the line
        found: usize,
        /// Minimum number of points
        required: usize,
    },

    /// Invalid coordinate values
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates {
        /// Description of the coordinate error
        message: String,
    },

    /// Image dimensions required but not available
    #[error("Image dimensions required but not available for image '{image}'")]
    MissingDimensions {
        /// The image missing dimensions
        image: String,
    },
}

impl FormatError {
    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an invalid coordinates error.
    pub fn invalid_coordinates(message: impl Into<String>) -> Self {
        Self::InvalidCoordinates {
            message: message.into(),
        }
    }

    /// Create a missing dimensions error.
    pub fn missing_dimensions(image: impl Into<String>) -> Self {
        Self::MissingDimensions {
            image: image.into(),
        }
    }
}
