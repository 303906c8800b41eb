//! Road segments carry one set of pavement condition measurements for a fixed length of road.
use crate::id::define_id_type;
use crate::region::RegionID;
use serde::Deserialize;
use strum::{Display, EnumIter};

define_id_type! {SegmentID}

/// One 100 m unit of road with its survey measurements.
///
/// Segments are loaded once and never mutated; they are only filtered and aggregated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoadSegment {
    /// Unique identifier within the network
    #[serde(deserialize_with = "deserialise_segment_id")]
    pub id: SegmentID,
    /// The region (local authority) the segment lies in
    #[serde(alias = "county")]
    pub region: RegionID,
    /// International Roughness Index
    pub iri: f64,
    /// Rut depth (mm)
    pub rut: f64,
    /// Pavement Surface Condition Index, 1 (worst) to 10 (best)
    pub psci: u8,
    /// Characteristic SCRIM Coefficient
    pub csc: f64,
    /// Mean Profile Depth (mm)
    pub mpd: f64,
}

/// Segment IDs appear as numbers in some datasets and as strings in others
fn deserialise_segment_id<'de, D>(deserialiser: D) -> Result<SegmentID, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawID {
        Number(u64),
        Text(String),
    }

    Ok(match RawID::deserialize(deserialiser)? {
        RawID::Number(n) => n.to_string().into(),
        RawID::Text(s) => s.into(),
    })
}

/// A condition measurement which the maintenance rules compare against thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Field {
    /// Roughness
    Iri,
    /// Rut depth
    Rut,
    /// Surface condition
    Psci,
    /// Skid resistance
    Csc,
    /// Texture depth
    Mpd,
}

impl Field {
    /// The value of this measurement for `segment`
    pub fn value(self, segment: &RoadSegment) -> f64 {
        match self {
            Self::Iri => segment.iri,
            Self::Rut => segment.rut,
            Self::Psci => f64::from(segment.psci),
            Self::Csc => segment.csc,
            Self::Mpd => segment.mpd,
        }
    }
}
