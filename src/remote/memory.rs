//! A feature source backed by an in-memory segment collection.
use super::{FeatureSource, RemoteError};
use crate::predicate::Predicate;
use crate::segment::RoadSegment;
use crate::units::{Metres, SEGMENT_LENGTH};
use async_trait::async_trait;
use std::sync::Arc;

/// Answers feature queries by evaluating predicates against a local copy of the dataset.
///
/// Useful for mirroring a remote dataset offline and for checking that remote aggregation agrees
/// with local aggregation.
pub struct InMemoryFeatureSource {
    segments: Arc<[RoadSegment]>,
    lengths: Option<Vec<Metres>>,
}

impl InMemoryFeatureSource {
    /// A source in which every feature has the fixed survey segment length
    pub fn new(segments: Arc<[RoadSegment]>) -> Self {
        Self {
            segments,
            lengths: None,
        }
    }

    /// A source with a measured length for each feature, in the same order as `segments`
    pub fn with_lengths(segments: Arc<[RoadSegment]>, lengths: Vec<Metres>) -> Self {
        assert_eq!(
            segments.len(),
            lengths.len(),
            "Need exactly one length per segment"
        );

        Self {
            segments,
            lengths: Some(lengths),
        }
    }

    fn length_of(&self, index: usize) -> Metres {
        self.lengths
            .as_ref()
            .map_or(SEGMENT_LENGTH, |lengths| lengths[index])
    }
}

#[async_trait]
impl FeatureSource for InMemoryFeatureSource {
    async fn count(&self, predicate: &Predicate) -> Result<u64, RemoteError> {
        Ok(self
            .segments
            .iter()
            .filter(|segment| predicate.evaluate(segment))
            .count() as u64)
    }

    async fn sum_length(&self, predicate: &Predicate) -> Result<Metres, RemoteError> {
        Ok(self
            .segments
            .iter()
            .enumerate()
            .filter(|(_, segment)| predicate.evaluate(segment))
            .map(|(index, _)| self.length_of(index))
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::segments;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn test_count_and_length(segments: Vec<RoadSegment>) {
        let n = segments.len();
        let source = InMemoryFeatureSource::new(Arc::from(segments));
        assert_eq!(source.count(&Predicate::True).await.unwrap(), n as u64);
        assert_eq!(
            source.sum_length(&Predicate::True).await.unwrap(),
            Metres(100.0 * n as f64)
        );
        let none = Predicate::Not(Box::new(Predicate::True));
        assert_eq!(source.count(&none).await.unwrap(), 0);
        assert_eq!(source.sum_length(&none).await.unwrap(), Metres(0.0));
    }
}
