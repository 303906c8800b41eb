//! Fixtures for tests

use crate::aggregate::AggregationResult;
use crate::region::RegionID;
use crate::segment::{RoadSegment, SegmentID};
use float_cmp::approx_eq;
use rstest::fixture;
use std::sync::atomic::{AtomicU64, Ordering};

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

static NEXT_SEGMENT_ID: AtomicU64 = AtomicU64::new(1);

/// A segment in the given region with the given measurements and a fresh ID
pub fn segment_in(region: &str, iri: f64, rut: f64, psci: u8, csc: f64, mpd: f64) -> RoadSegment {
    let id = NEXT_SEGMENT_ID.fetch_add(1, Ordering::Relaxed);
    RoadSegment {
        id: SegmentID::from(id.to_string()),
        region: RegionID::new(region),
        iri,
        rut,
        psci,
        csc,
        mpd,
    }
}

/// A segment in Cork with the given measurements
pub fn segment_with(iri: f64, rut: f64, psci: u8, csc: f64, mpd: f64) -> RoadSegment {
    segment_in("Cork", iri, rut, psci, csc, mpd)
}

/// A segment in good condition (routine maintenance with default parameters)
#[fixture]
pub fn segment() -> RoadSegment {
    segment_with(1.0, 1.0, 9, 0.9, 1.5)
}

/// A small network spanning two regions, with every category represented under default
/// parameters
#[fixture]
pub fn segments() -> Vec<RoadSegment> {
    vec![
        segment_in("Cork", 13.0, 10.0, 8, 0.5, 0.9), // reconstruction
        segment_in("Cork", 2.0, 45.0, 9, 0.5, 0.9),  // reconstruction
        segment_in("Cork", 8.0, 5.0, 9, 0.5, 0.9),   // overlay
        segment_in("Cork", 1.0, 1.0, 5, 0.5, 0.9),   // restoration
        segment_in("Cork", 1.0, 1.0, 8, 0.3, 0.9),   // skid resistance
        segment_in("Cork", 1.0, 1.0, 9, 0.9, 1.5),   // routine
        segment_in("Kerry", 3.0, 3.0, 1, 0.5, 0.9),  // reconstruction
        segment_in("Kerry", 1.0, 25.0, 9, 0.5, 0.9), // overlay
        segment_in("Kerry", 6.5, 1.0, 6, 0.5, 0.9),  // restoration
        segment_in("Kerry", 1.0, 1.0, 9, 0.5, 0.6),  // skid resistance
        segment_in("Kerry", 1.0, 1.0, 10, 0.2, 0.2), // routine
        segment_in("Kerry", 2.0, 2.0, 8, 0.6, 1.2),  // routine
    ]
}

/// Assert that two aggregation results agree to within floating-point tolerance
pub fn assert_result_approx_eq(actual: &AggregationResult, expected: &AggregationResult) {
    for ((category, a), (_, e)) in actual.iter().zip(expected.iter()) {
        assert_eq!(a.segment_count, e.segment_count, "{category}: segment count");
        assert!(
            approx_eq!(f64, a.length.value(), e.length.value(), epsilon = 1e-9),
            "{category}: length {} != {}",
            a.length,
            e.length
        );
        assert!(
            approx_eq!(f64, a.cost.value(), e.cost.value(), epsilon = 1e-6),
            "{category}: cost {} != {}",
            a.cost,
            e.cost
        );
    }
}
