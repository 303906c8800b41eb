//! Per-category length and cost totals, and the in-memory aggregator which computes them.
use crate::category::MaintenanceCategory;
use crate::parameters::{CostInputs, MaintenanceParameters};
use crate::region::RegionFilter;
use crate::rules::DecisionTable;
use crate::segment::RoadSegment;
use crate::units::{Kilometres, Metres, Money, SEGMENT_LENGTH, STANDARD_ROAD_WIDTH};
use indexmap::IndexMap;
use serde::Serialize;
use strum::IntoEnumIterator;

/// Length and cost of road in one category
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CategoryTotals {
    /// Number of segments (or features) in the category
    pub segment_count: u64,
    /// Total road length
    pub length: Kilometres,
    /// Total treatment cost
    pub cost: Money,
}

impl CategoryTotals {
    /// Totals for `length` of road treated at the given unit cost
    pub fn from_length(
        segment_count: u64,
        length: Metres,
        costs: &CostInputs,
        category: MaintenanceCategory,
    ) -> Self {
        let area = length * STANDARD_ROAD_WIDTH;
        Self {
            segment_count,
            length: length.to_kilometres(),
            cost: area * costs.cost_per_square_metre(category),
        }
    }

    /// Totals for `segment_count` segments of the fixed survey length
    pub fn from_segment_count(
        segment_count: u64,
        costs: &CostInputs,
        category: MaintenanceCategory,
    ) -> Self {
        Self::from_length(
            segment_count,
            SEGMENT_LENGTH * segment_count as f64,
            costs,
            category,
        )
    }
}

/// Length and cost for every maintenance category.
///
/// Every category is always present, in priority order, so an empty result is all zeros rather
/// than missing entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    categories: IndexMap<MaintenanceCategory, CategoryTotals>,
}

impl Default for AggregationResult {
    fn default() -> Self {
        Self::zero()
    }
}

impl AggregationResult {
    /// A result with every category zeroed
    pub fn zero() -> Self {
        Self {
            categories: MaintenanceCategory::iter()
                .map(|category| (category, CategoryTotals::default()))
                .collect(),
        }
    }

    /// Build a result from per-category totals. Categories not supplied are zero.
    pub fn from_totals<I>(totals: I) -> Self
    where
        I: IntoIterator<Item = (MaintenanceCategory, CategoryTotals)>,
    {
        let mut result = Self::zero();
        for (category, category_totals) in totals {
            result.categories.insert(category, category_totals);
        }

        result
    }

    /// The totals for one category
    pub fn get(&self, category: MaintenanceCategory) -> &CategoryTotals {
        &self.categories[&category]
    }

    /// Iterate over categories in priority order
    pub fn iter(&self) -> impl Iterator<Item = (MaintenanceCategory, &CategoryTotals)> {
        self.categories.iter().map(|(category, totals)| (*category, totals))
    }

    /// Length of road in `category`
    pub fn length(&self, category: MaintenanceCategory) -> Kilometres {
        self.get(category).length
    }

    /// Cost of treating `category`
    pub fn cost(&self, category: MaintenanceCategory) -> Money {
        self.get(category).cost
    }

    /// Total length across all categories
    pub fn total_length(&self) -> Kilometres {
        self.categories.values().map(|totals| totals.length).sum()
    }

    /// Total cost across all categories
    pub fn total_cost(&self) -> Money {
        self.categories.values().map(|totals| totals.cost).sum()
    }

    /// Total number of segments across all categories
    pub fn total_segment_count(&self) -> u64 {
        self.categories.values().map(|totals| totals.segment_count).sum()
    }

    /// Whether every category is empty
    pub fn is_empty(&self) -> bool {
        self.total_segment_count() == 0
    }

    /// Percentage of total length in `category` (zero if the total is zero)
    pub fn length_share(&self, category: MaintenanceCategory) -> f64 {
        percentage(self.length(category).value(), self.total_length().value())
    }

    /// Percentage of total cost in `category` (zero if the total is zero)
    pub fn cost_share(&self, category: MaintenanceCategory) -> f64 {
        percentage(self.cost(category).value(), self.total_cost().value())
    }
}

fn percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

/// Classify each segment matching `region_filter` and total the length and cost per category.
///
/// Lengths are accumulated as segment counts and converted once, so the result matches the
/// count-based remote aggregation exactly.
pub fn aggregate(
    segments: &[RoadSegment],
    params: &MaintenanceParameters,
    costs: &CostInputs,
    region_filter: &RegionFilter,
) -> AggregationResult {
    let table = DecisionTable::new(params);
    let mut counts: IndexMap<MaintenanceCategory, u64> =
        MaintenanceCategory::iter().map(|category| (category, 0)).collect();

    for segment in segments
        .iter()
        .filter(|segment| region_filter.matches(&segment.region))
    {
        *counts.entry(table.classify(segment)).or_default() += 1;
    }

    AggregationResult::from_totals(counts.into_iter().map(|(category, count)| {
        (
            category,
            CategoryTotals::from_segment_count(count, costs, category),
        )
    }))
}
