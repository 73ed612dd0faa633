//! Annotation classes and polygon provenance.

use serde::{Deserialize, Serialize};

/// The two annotation classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassType {
    /// A climbing hold
    #[default]
    Hold,
    /// A larger support volume
    Volume,
}

impl ClassType {
    /// Lowercase name, used as the polygon name prefix.
    pub fn name(&self) -> &'static str {
        match self {
            ClassType::Hold => "hold",
            ClassType::Volume => "volume",
        }
    }

    /// Class id written to label files.
    pub fn class_id(&self) -> u32 {
        match self {
            ClassType::Hold => 0,
            ClassType::Volume => 1,
        }
    }

    /// Inverse of [`ClassType::class_id`].
    pub fn from_class_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(ClassType::Hold),
            1 => Some(ClassType::Volume),
            _ => None,
        }
    }

    /// Parse a class label as produced by a detector ("hold", "Volume", ...).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "hold" => Some(ClassType::Hold),
            "volume" => Some(ClassType::Volume),
            _ => None,
        }
    }

    pub fn all() -> &'static [ClassType] {
        &[ClassType::Hold, ClassType::Volume]
    }
}

impl std::fmt::Display for ClassType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a polygon came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Drawn or edited by hand
    #[default]
    Manual,
    /// Proposed by an external detector; replaced in bulk when proposals change
    Detector,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_id_mapping() {
        for class in ClassType::all() {
            assert_eq!(ClassType::from_class_id(class.class_id()), Some(*class));
        }
        assert_eq!(ClassType::Hold.class_id(), 0);
        assert_eq!(ClassType::Volume.class_id(), 1);
        assert_eq!(ClassType::from_class_id(2), None);
    }

    #[test]
    fn test_from_label() {
        assert_eq!(ClassType::from_label("Hold"), Some(ClassType::Hold));
        assert_eq!(ClassType::from_label(" volume "), Some(ClassType::Volume));
        assert_eq!(ClassType::from_label("crimp"), None);
    }
}
