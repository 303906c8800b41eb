//! Chooses between remote and local aggregation and publishes the latest result.
//!
//! The caller owns all mutable state (parameters, costs, region filter) and passes an immutable
//! snapshot to each run. Runs may overlap; only the result of the most recently started run is
//! published, and results from superseded runs are discarded when they arrive.
use crate::aggregate::{AggregationResult, aggregate};
use crate::parameters::{CostInputs, MaintenanceParameters};
use crate::region::RegionFilter;
use crate::remote::{FeatureSource, LengthMode, RemoteError, aggregate_remote};
use crate::segment::RoadSegment;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// The inputs to one calculation run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalculationInputs {
    /// Classification thresholds
    pub parameters: MaintenanceParameters,
    /// Unit costs
    pub costs: CostInputs,
    /// Regions taking part
    pub region_filter: RegionFilter,
}

/// Which data source produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum CalculationSource {
    /// The remote feature source
    #[strum(serialize = "remote feature service")]
    Remote,
    /// The locally cached segment collection
    #[strum(serialize = "local segments")]
    Local,
    /// Neither source was usable; the result is all zeros
    #[strum(serialize = "no data")]
    NoData,
}

/// The result of one calculation run
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationOutcome {
    /// Sequence number of the run which produced this outcome
    pub generation: u64,
    /// Where the numbers came from
    pub source: CalculationSource,
    /// Per-category totals
    pub result: AggregationResult,
    /// Set if the remote source was tried and failed
    pub remote_failure: Option<RemoteError>,
}

impl CalculationOutcome {
    /// Whether a remote query failure contributed to this outcome
    pub fn is_degraded(&self) -> bool {
        self.remote_failure.is_some()
    }
}

/// Runs calculations against whichever data sources are available
pub struct Calculator {
    remote: Option<Arc<dyn FeatureSource>>,
    segments: Option<Arc<[RoadSegment]>>,
    length_mode: LengthMode,
    started: AtomicU64,
    latest: Mutex<Option<CalculationOutcome>>,
}

impl Calculator {
    /// Create a calculator. Either data source may be absent.
    pub fn new(
        remote: Option<Arc<dyn FeatureSource>>,
        segments: Option<Arc<[RoadSegment]>>,
        length_mode: LengthMode,
    ) -> Self {
        Self {
            remote,
            segments,
            length_mode,
            started: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    /// Run a calculation for `inputs`, publish it if no newer run has started, and return it.
    ///
    /// The remote source is preferred. If it is absent or fails, local segments are used; if
    /// there are none, the outcome is zero with [`CalculationSource::NoData`].
    pub async fn run_calculations(&self, inputs: &CalculationInputs) -> CalculationOutcome {
        let generation = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Starting calculation run {generation}");

        let mut remote_failure = None;
        if let Some(remote) = &self.remote {
            match aggregate_remote(
                remote.as_ref(),
                &inputs.parameters,
                &inputs.costs,
                &inputs.region_filter,
                self.length_mode,
            )
            .await
            {
                Ok(result) => {
                    return self.publish(CalculationOutcome {
                        generation,
                        source: CalculationSource::Remote,
                        result,
                        remote_failure: None,
                    });
                }
                Err(err) => {
                    warn!("Remote calculation failed: {err}");
                    remote_failure = Some(err);
                }
            }
        }

        let (source, result) = if let Some(segments) = &self.segments {
            if remote_failure.is_some() {
                info!("Falling back to {} local segments", segments.len());
            }
            let result = aggregate(
                segments,
                &inputs.parameters,
                &inputs.costs,
                &inputs.region_filter,
            );
            (CalculationSource::Local, result)
        } else {
            (CalculationSource::NoData, AggregationResult::zero())
        };

        self.publish(CalculationOutcome {
            generation,
            source,
            result,
            remote_failure,
        })
    }

    /// Store `outcome` as the latest result unless a newer run has started since
    fn publish(&self, outcome: CalculationOutcome) -> CalculationOutcome {
        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        if outcome.generation == self.started.load(Ordering::SeqCst) {
            *latest = Some(outcome.clone());
        } else {
            debug!(
                "Discarding result of superseded calculation run {}",
                outcome.generation
            );
        }

        outcome
    }

    /// The most recently published outcome, if any
    pub fn latest(&self) -> Option<CalculationOutcome> {
        self.latest
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
