//! Aggregation against a remote feature-query backend.
//!
//! For each category the combined region/category predicate is sent to the backend, which
//! answers with the number of matching features (and, in measured mode, the summed length of the
//! matching features). No record-level data is transferred.
use crate::aggregate::{AggregationResult, CategoryTotals};
use crate::category::MaintenanceCategory;
use crate::parameters::{CostInputs, MaintenanceParameters};
use crate::predicate::{Predicate, build_combined_predicate};
use crate::region::RegionFilter;
use crate::units::Metres;
use async_trait::async_trait;
use futures::future::try_join_all;
use log::debug;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use strum::IntoEnumIterator;

pub mod feature_service;
pub mod memory;

/// A failure while querying the remote backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteError {
    /// The request could not be sent or no response was received
    #[error("Request to feature service failed: {0}")]
    Transport(String),
    /// The backend answered with an error
    #[error("Feature service returned error {code}: {message}")]
    Backend {
        /// Error code reported by the backend
        code: i64,
        /// Error message reported by the backend
        message: String,
    },
    /// The response could not be understood
    #[error("Invalid response from feature service: {0}")]
    InvalidResponse(String),
    /// A query for one category failed
    #[error("Query for {category} failed: {source}")]
    Category {
        /// The category whose query failed
        category: MaintenanceCategory,
        /// The underlying failure
        source: Box<RemoteError>,
    },
}

/// A remote dataset of road segments which can answer attribute-filtered queries
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Count the features matching `predicate`
    async fn count(&self, predicate: &Predicate) -> Result<u64, RemoteError>;

    /// Sum the measured length of the features matching `predicate`
    async fn sum_length(&self, predicate: &Predicate) -> Result<Metres, RemoteError>;
}

/// How feature length is derived in remote aggregation.
///
/// A deployment picks one mode; the two are never mixed within a run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
)]
pub enum LengthMode {
    /// Every matching feature is one fixed-length survey segment
    #[default]
    #[string = "fixed"]
    FixedSegment,
    /// Use the summed length attribute of the matching features
    #[string = "measured"]
    Measured,
}

/// Compute the totals for one category
async fn aggregate_category(
    source: &dyn FeatureSource,
    predicate: &Predicate,
    costs: &CostInputs,
    category: MaintenanceCategory,
    length_mode: LengthMode,
) -> Result<(MaintenanceCategory, CategoryTotals), RemoteError> {
    let wrap = |err| RemoteError::Category {
        category,
        source: Box::new(err),
    };

    let count = source.count(predicate).await.map_err(wrap)?;
    let totals = match length_mode {
        LengthMode::FixedSegment => CategoryTotals::from_segment_count(count, costs, category),
        LengthMode::Measured => {
            let length = source.sum_length(predicate).await.map_err(wrap)?;
            CategoryTotals::from_length(count, length, costs, category)
        }
    };
    debug!("{category}: {count} features, {} km", totals.length);

    Ok((category, totals))
}

/// Aggregate length and cost per category by querying `source`.
///
/// The five category queries are issued concurrently. Any failing query aborts the whole
/// aggregation with that error; there are no retries.
pub async fn aggregate_remote(
    source: &dyn FeatureSource,
    params: &MaintenanceParameters,
    costs: &CostInputs,
    region_filter: &RegionFilter,
    length_mode: LengthMode,
) -> Result<AggregationResult, RemoteError> {
    let predicates: Vec<_> = MaintenanceCategory::iter()
        .map(|category| {
            (
                category,
                build_combined_predicate(params, region_filter, Some(category)),
            )
        })
        .collect();

    let totals = try_join_all(predicates.iter().map(|(category, predicate)| {
        aggregate_category(source, predicate, costs, *category, length_mode)
    }))
    .await?;

    Ok(AggregationResult::from_totals(totals))
}

#[cfg(test)]
mod tests {
    use super::memory::InMemoryFeatureSource;
    use super::*;
    use crate::aggregate::aggregate;
    use crate::fixture::{assert_result_approx_eq, segments};
    use crate::segment::RoadSegment;
    use crate::units::{Kilometres, Money};
    use indexmap::IndexSet;
    use rstest::rstest;
    use std::sync::Arc;

    /// A source whose queries fail for one category's predicate
    struct FailingSource {
        inner: InMemoryFeatureSource,
        failing: Predicate,
    }

    #[async_trait]
    impl FeatureSource for FailingSource {
        async fn count(&self, predicate: &Predicate) -> Result<u64, RemoteError> {
            if *predicate == self.failing {
                return Err(RemoteError::Transport("connection reset".into()));
            }
            self.inner.count(predicate).await
        }

        async fn sum_length(&self, predicate: &Predicate) -> Result<Metres, RemoteError> {
            self.inner.sum_length(predicate).await
        }
    }

    #[rstest]
    #[case("fixed", LengthMode::FixedSegment)]
    #[case("measured", LengthMode::Measured)]
    #[case("Measured", LengthMode::Measured)]
    fn test_length_mode_from_str(#[case] s: &str, #[case] expected: LengthMode) {
        assert_eq!(s.parse::<LengthMode>().unwrap(), expected);
    }

    #[test]
    fn test_length_mode_from_str_invalid() {
        assert_eq!(
            "approximate".parse::<LengthMode>().unwrap_err(),
            "invalid LengthMode: approximate"
        );
    }

    #[rstest]
    #[case(RegionFilter::All)]
    #[case(RegionFilter::single("Cork"))]
    #[case(RegionFilter::from_regions(["Cork".into(), "Kerry".into()]))]
    #[case(RegionFilter::single("Nowhere"))]
    #[case(RegionFilter::Regions(IndexSet::new()))]
    #[tokio::test]
    async fn test_remote_matches_local(
        segments: Vec<RoadSegment>,
        #[case] filter: RegionFilter,
    ) {
        let params = MaintenanceParameters::default();
        let costs = CostInputs::default();
        let source = InMemoryFeatureSource::new(Arc::from(segments.clone()));

        let remote =
            aggregate_remote(&source, &params, &costs, &filter, LengthMode::FixedSegment)
                .await
                .unwrap();
        let local = aggregate(&segments, &params, &costs, &filter);
        assert_eq!(remote, local);
    }

    #[rstest]
    #[tokio::test]
    async fn test_measured_mode_uses_feature_lengths(segments: Vec<RoadSegment>) {
        let params = MaintenanceParameters::default();
        let costs = CostInputs::default();
        let n = segments.len();
        let source = InMemoryFeatureSource::with_lengths(
            Arc::from(segments.clone()),
            vec![Metres(50.0); n],
        );

        let all = RegionFilter::All;
        let result = aggregate_remote(&source, &params, &costs, &all, LengthMode::Measured)
            .await
            .unwrap();
        let local = aggregate(&segments, &params, &costs, &RegionFilter::All);

        // Half-length features: half the length and cost, same counts
        assert_eq!(result.total_segment_count(), local.total_segment_count());
        assert_result_approx_eq(
            &result,
            &AggregationResult::from_totals(local.iter().map(|(category, totals)| {
                (
                    category,
                    CategoryTotals {
                        segment_count: totals.segment_count,
                        length: Kilometres(totals.length.value() / 2.0),
                        cost: Money(totals.cost.value() / 2.0),
                    },
                )
            })),
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_single_failure_aborts(segments: Vec<RoadSegment>) {
        let params = MaintenanceParameters::default();
        let failing = build_combined_predicate(
            &params,
            &RegionFilter::All,
            Some(MaintenanceCategory::SurfaceRestoration),
        );
        let source = FailingSource {
            inner: InMemoryFeatureSource::new(Arc::from(segments)),
            failing,
        };

        let err = aggregate_remote(
            &source,
            &params,
            &CostInputs::default(),
            &RegionFilter::All,
            LengthMode::FixedSegment,
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Query for Surface Restoration failed: Request to feature service failed: \
             connection reset"
        );
    }
}
