//! Regions (local authorities) are the administrative areas used to restrict which road segments
//! take part in a calculation.
use crate::id::{IDCollection, define_id_type};
use anyhow::{Result, ensure};
use indexmap::IndexSet;
use std::fmt;

define_id_type! {RegionID}

/// A selection of regions whose segments participate in an aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegionFilter {
    /// No filtering: every segment participates
    #[default]
    All,
    /// Only segments belonging to one of these regions participate
    Regions(IndexSet<RegionID>),
}

impl RegionFilter {
    /// A filter matching a single region
    pub fn single(region: &str) -> Self {
        Self::Regions(IndexSet::from([RegionID::new(region)]))
    }

    /// A filter matching any of the given regions.
    ///
    /// An empty selection is treated the same as [`RegionFilter::All`].
    pub fn from_regions<I>(regions: I) -> Self
    where
        I: IntoIterator<Item = RegionID>,
    {
        let regions: IndexSet<_> = regions.into_iter().collect();
        if regions.is_empty() {
            Self::All
        } else {
            Self::Regions(regions)
        }
    }

    /// Whether a segment in `region` participates under this filter.
    ///
    /// An empty selection matches every region, the same as [`RegionFilter::All`].
    pub fn matches(&self, region: &RegionID) -> bool {
        match self {
            Self::All => true,
            Self::Regions(regions) => regions.is_empty() || regions.contains(region),
        }
    }

    /// Check that every selected region is one of `known`
    pub fn validate(&self, known: &IndexSet<RegionID>) -> Result<()> {
        if let Self::Regions(regions) = self {
            for region in regions {
                known.get_id_by_str(region.as_str())?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Regions(regions) => {
                let names: Vec<_> = regions.iter().map(RegionID::as_str).collect();
                write!(f, "{}", names.join(";"))
            }
        }
    }
}

/// Parse a string of regions separated by semicolons into a [`RegionFilter`].
///
/// The string can be either "all" (case-insensitive), empty (equivalent to "all"), a single
/// region, or a semicolon-separated list of regions (e.g. "Cork;Kerry" or "Cork; Kerry")
pub fn parse_region_str(s: &str) -> Result<RegionFilter> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("all") {
        return Ok(RegionFilter::All);
    }

    let names: Vec<_> = s.split(';').map(str::trim).collect();
    ensure!(
        names.iter().all(|name| !name.is_empty()),
        "Empty region name in list: {s}"
    );

    Ok(RegionFilter::from_regions(names.into_iter().map(RegionID::new)))
}
