//! Direct classification of a single segment.
use crate::category::MaintenanceCategory;
use crate::parameters::MaintenanceParameters;
use crate::rules::DecisionTable;
use crate::segment::RoadSegment;

impl DecisionTable {
    /// Assign `segment` to exactly one category: the first rule whose condition holds, or
    /// routine maintenance if none do.
    pub fn classify(&self, segment: &RoadSegment) -> MaintenanceCategory {
        self.rules()
            .iter()
            .find(|rule| rule.is_triggered(segment))
            .map_or(MaintenanceCategory::RoutineMaintenance, |rule| {
                rule.category
            })
    }
}

/// Classify one segment with the given thresholds.
///
/// When classifying many segments, build a [`DecisionTable`] once and call
/// [`DecisionTable::classify`] instead.
pub fn classify(segment: &RoadSegment, params: &MaintenanceParameters) -> MaintenanceCategory {
    DecisionTable::new(params).classify(segment)
}
