//! The maintenance categories into which road segments are classified.
use serde::Serialize;
use strum::{EnumCount, EnumIter, IntoStaticStr};

/// A treatment category for a road segment.
///
/// Variants are declared in descending order of severity, which is also the order in which the
/// classification rules are evaluated. Every segment falls into exactly one category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumCount,
    IntoStaticStr,
    Serialize,
    strum::Display,
)]
pub enum MaintenanceCategory {
    /// Full-depth reconstruction of the pavement
    #[strum(serialize = "Road Reconstruction")]
    #[serde(rename = "Road Reconstruction")]
    RoadReconstruction,
    /// Structural strengthening overlay
    #[strum(serialize = "Structural Overlay")]
    #[serde(rename = "Structural Overlay")]
    StructuralOverlay,
    /// Surface treatment restoring the wearing course
    #[strum(serialize = "Surface Restoration")]
    #[serde(rename = "Surface Restoration")]
    SurfaceRestoration,
    /// Treatment restoring surface texture and friction
    #[strum(serialize = "Restoration of Skid Resistance")]
    #[serde(rename = "Restoration of Skid Resistance")]
    SkidResistance,
    /// Catch-all category for segments which meet no other rule
    #[strum(serialize = "Routine Maintenance")]
    #[serde(rename = "Routine Maintenance")]
    RoutineMaintenance,
}

impl MaintenanceCategory {
    /// Short code used to key costs in scenario files (e.g. `rr` for road reconstruction)
    pub fn code(self) -> &'static str {
        match self {
            Self::RoadReconstruction => "rr",
            Self::StructuralOverlay => "so",
            Self::SurfaceRestoration => "sr",
            Self::SkidResistance => "rs",
            Self::RoutineMaintenance => "rm",
        }
    }

    /// The human-readable label for this category
    pub fn label(self) -> &'static str {
        self.into()
    }
}
