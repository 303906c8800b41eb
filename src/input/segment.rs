//! Code for reading the road segment dataset.
use super::{input_err_msg, read_csv, read_json};
use crate::region::RegionID;
use crate::segment::RoadSegment;
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use std::collections::HashSet;
use std::path::Path;

/// The segment dataset as a JSON array of records
const SEGMENTS_JSON_FILE_NAME: &str = "segments.json";

/// The segment dataset as a CSV table
const SEGMENTS_CSV_FILE_NAME: &str = "segments.csv";

/// Read the road segments from the specified data directory.
///
/// `segments.json` is preferred; `segments.csv` is read if there is no JSON file. If neither file
/// is present, `None` is returned, as a dataset is not needed when a remote source is in use.
///
/// # Arguments
///
/// * `data_dir` - Folder containing the dataset
///
/// # Returns
///
/// The segments, or an error if a file could not be read or contains duplicate IDs
pub fn read_segments(data_dir: &Path) -> Result<Option<Vec<RoadSegment>>> {
    let json_path = data_dir.join(SEGMENTS_JSON_FILE_NAME);
    let csv_path = data_dir.join(SEGMENTS_CSV_FILE_NAME);

    let (segments, file_path) = if json_path.is_file() {
        (read_json::<Vec<RoadSegment>>(&json_path)?, json_path)
    } else if csv_path.is_file() {
        (read_csv::<RoadSegment>(&csv_path)?, csv_path)
    } else {
        return Ok(None);
    };

    check_unique_ids(&segments).with_context(|| input_err_msg(&file_path))?;

    Ok(Some(segments))
}

/// Check that no two segments share an ID
fn check_unique_ids(segments: &[RoadSegment]) -> Result<()> {
    let mut ids = HashSet::new();
    for segment in segments {
        ensure!(
            ids.insert(segment.id.clone()),
            "Duplicate segment ID: {}",
            segment.id
        );
    }

    Ok(())
}

/// The distinct regions in which `segments` lie, in order of first appearance
pub fn known_regions(segments: &[RoadSegment]) -> IndexSet<RegionID> {
    segments
        .iter()
        .map(|segment| segment.region.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, segments};
    use crate::segment::SegmentID;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_read_segments_json() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(SEGMENTS_JSON_FILE_NAME)).unwrap();
            writeln!(
                file,
                r#"[
                    {{"id": 1, "county": "Cork", "iri": 13.0, "rut": 5.0, "psci": 8, "csc": 0.5, "mpd": 0.9}},
                    {{"id": 2, "county": "Kerry", "iri": 1.0, "rut": 1.0, "psci": 9, "csc": 0.5, "mpd": 1.2}}
                ]"#
            )
            .unwrap();
        }

        let segments = read_segments(dir.path()).unwrap().unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].id, SegmentID::new("2"));
        assert_eq!(segments[1].region, RegionID::new("Kerry"));
    }

    #[test]
    fn test_read_segments_csv() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(SEGMENTS_CSV_FILE_NAME)).unwrap();
            writeln!(
                file,
                "id,region,iri,rut,psci,csc,mpd\nA1,Cork,13.0,5.0,8,0.5,0.9\nA2,Cork,1.0,1.0,9,0.5,1.2"
            )
            .unwrap();
        }

        let segments = read_segments(dir.path()).unwrap().unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].id, SegmentID::new("A1"));
        assert_eq!(segments[0].iri, 13.0);
    }

    #[test]
    fn test_read_segments_json_preferred() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(SEGMENTS_JSON_FILE_NAME)).unwrap();
            writeln!(file, "[]").unwrap();
            let mut file = File::create(dir.path().join(SEGMENTS_CSV_FILE_NAME)).unwrap();
            writeln!(file, "id,region,iri,rut,psci,csc,mpd\nA1,Cork,13.0,5.0,8,0.5,0.9").unwrap();
        }

        assert_eq!(read_segments(dir.path()).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_read_segments_header_only_csv() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(SEGMENTS_CSV_FILE_NAME)).unwrap();
            writeln!(file, "id,region,iri,rut,psci,csc,mpd").unwrap();
        }

        assert_eq!(read_segments(dir.path()).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_read_segments_missing() {
        let dir = tempdir().unwrap();
        assert_eq!(read_segments(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_read_segments_duplicate_id() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(SEGMENTS_CSV_FILE_NAME)).unwrap();
            writeln!(
                file,
                "id,region,iri,rut,psci,csc,mpd\nA1,Cork,13.0,5.0,8,0.5,0.9\nA1,Kerry,1.0,1.0,9,0.5,1.2"
            )
            .unwrap();
        }

        let err = read_segments(dir.path()).unwrap_err();
        assert_eq!(err.root_cause().to_string(), "Duplicate segment ID: A1");
    }

    #[rstest]
    fn test_check_unique_ids(segments: Vec<RoadSegment>) {
        assert!(check_unique_ids(&segments).is_ok());

        let mut duplicated = segments.clone();
        duplicated.push(segments[0].clone());
        assert_error!(
            check_unique_ids(&duplicated),
            format!("Duplicate segment ID: {}", segments[0].id)
        );
    }

    #[rstest]
    fn test_known_regions(segments: Vec<RoadSegment>) {
        let regions = known_regions(&segments);
        assert_eq!(
            regions,
            IndexSet::from([RegionID::new("Cork"), RegionID::new("Kerry")])
        );
    }
}
