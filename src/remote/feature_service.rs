//! Client for an ArcGIS-style REST feature layer.
//!
//! Counts use `returnCountOnly`; measured lengths use a `sum` output statistic over the schema's
//! length field. Queries are sent as form-encoded POST requests because category predicates can
//! be too long for a URL.
use super::{FeatureSource, RemoteError};
use crate::predicate::{FieldSchema, Predicate};
use crate::units::Metres;
use async_trait::async_trait;
use log::trace;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// Name given to the summed length in statistics queries
const TOTAL_LENGTH_ALIAS: &str = "total_length";

/// Error body returned by the service in place of a result
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Feature {
    attributes: Map<String, Value>,
}

/// The subset of a query response which is used
#[derive(Debug, Deserialize)]
struct QueryResponse {
    error: Option<ErrorBody>,
    count: Option<u64>,
    features: Option<Vec<Feature>>,
}

impl QueryResponse {
    /// Parse a response body, turning embedded service errors into [`RemoteError::Backend`]
    fn parse(body: &str) -> Result<Self, RemoteError> {
        let response: Self = serde_json::from_str(body)
            .map_err(|err| RemoteError::InvalidResponse(err.to_string()))?;
        match response.error {
            Some(ErrorBody { code, message }) => Err(RemoteError::Backend { code, message }),
            None => Ok(response),
        }
    }

    fn into_count(self) -> Result<u64, RemoteError> {
        self.count
            .ok_or_else(|| RemoteError::InvalidResponse("missing count".into()))
    }

    fn into_total_length(self) -> Result<Metres, RemoteError> {
        let features = self
            .features
            .ok_or_else(|| RemoteError::InvalidResponse("missing features".into()))?;
        let Some(feature) = features.first() else {
            return Ok(Metres(0.0));
        };

        // The service reports null when no features match
        match feature.attributes.get(TOTAL_LENGTH_ALIAS) {
            None | Some(Value::Null) => Ok(Metres(0.0)),
            Some(value) => value.as_f64().map(Metres).ok_or_else(|| {
                RemoteError::InvalidResponse(format!("non-numeric {TOTAL_LENGTH_ALIAS}: {value}"))
            }),
        }
    }
}

/// A remote feature layer queried over HTTP
pub struct FeatureServiceClient {
    client: reqwest::Client,
    query_url: String,
    schema: FieldSchema,
}

impl FeatureServiceClient {
    /// Create a client for the feature layer at `layer_url` (e.g.
    /// `https://host/arcgis/rest/services/Roads/FeatureServer/0`)
    pub fn new(
        layer_url: &str,
        schema: FieldSchema,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            query_url: query_url(layer_url),
            schema,
        })
    }

    /// Form parameters for a count query
    fn count_params(&self, predicate: &Predicate) -> Vec<(&'static str, String)> {
        vec![
            ("where", predicate.to_sql(&self.schema)),
            ("returnCountOnly", "true".into()),
            ("returnGeometry", "false".into()),
            ("f", "json".into()),
        ]
    }

    /// Form parameters for a summed-length statistics query
    fn length_params(&self, predicate: &Predicate) -> Vec<(&'static str, String)> {
        let statistics = serde_json::json!([{
            "statisticType": "sum",
            "onStatisticField": self.schema.length,
            "outStatisticFieldName": TOTAL_LENGTH_ALIAS,
        }]);

        vec![
            ("where", predicate.to_sql(&self.schema)),
            ("outStatistics", statistics.to_string()),
            ("returnGeometry", "false".into()),
            ("f", "json".into()),
        ]
    }

    async fn query(&self, params: &[(&'static str, String)]) -> Result<QueryResponse, RemoteError> {
        trace!("Querying {} with {:?}", self.query_url, params);
        let body = self
            .client
            .post(&self.query_url)
            .form(params)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| RemoteError::Transport(err.to_string()))?
            .text()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        QueryResponse::parse(&body)
    }
}

/// The query endpoint for a layer URL
fn query_url(layer_url: &str) -> String {
    let layer_url = layer_url.trim_end_matches('/');
    if layer_url.ends_with("/query") {
        layer_url.to_string()
    } else {
        format!("{layer_url}/query")
    }
}

#[async_trait]
impl FeatureSource for FeatureServiceClient {
    async fn count(&self, predicate: &Predicate) -> Result<u64, RemoteError> {
        self.query(&self.count_params(predicate)).await?.into_count()
    }

    async fn sum_length(&self, predicate: &Predicate) -> Result<Metres, RemoteError> {
        self.query(&self.length_params(predicate))
            .await?
            .into_total_length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn client() -> FeatureServiceClient {
        FeatureServiceClient::new(
            "https://example.com/FeatureServer/0/",
            FieldSchema::default(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[rstest]
    #[case("https://example.com/FeatureServer/0", "https://example.com/FeatureServer/0/query")]
    #[case("https://example.com/FeatureServer/0/", "https://example.com/FeatureServer/0/query")]
    #[case("https://example.com/FeatureServer/0/query", "https://example.com/FeatureServer/0/query")]
    fn test_query_url(#[case] layer_url: &str, #[case] expected: &str) {
        assert_eq!(query_url(layer_url), expected);
    }

    #[test]
    fn test_count_params() {
        let params = client().count_params(&Predicate::RegionEq("Cork".into()));
        assert_eq!(params[0], ("where", "LA = 'Cork'".to_string()));
        assert!(params.contains(&("returnCountOnly", "true".to_string())));
    }

    #[test]
    fn test_length_params() {
        let params = client().length_params(&Predicate::True);
        let (_, statistics) = params.iter().find(|(k, _)| *k == "outStatistics").unwrap();
        let statistics: Value = serde_json::from_str(statistics).unwrap();
        assert_eq!(statistics[0]["onStatisticField"], "Shape_Length");
        assert_eq!(statistics[0]["statisticType"], "sum");
    }

    #[test]
    fn test_parse_count() {
        let response = QueryResponse::parse(r#"{"count": 42}"#).unwrap();
        assert_eq!(response.into_count().unwrap(), 42);
    }

    #[test]
    fn test_parse_backend_error() {
        let err = QueryResponse::parse(
            r#"{"error": {"code": 400, "message": "Invalid where clause", "details": []}}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            RemoteError::Backend {
                code: 400,
                message: "Invalid where clause".into()
            }
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            QueryResponse::parse("<html>"),
            Err(RemoteError::InvalidResponse(_))
        ));
        assert!(matches!(
            QueryResponse::parse("{}").unwrap().into_count(),
            Err(RemoteError::InvalidResponse(_))
        ));
    }

    #[rstest]
    #[case(r#"{"features": [{"attributes": {"total_length": 1234.5}}]}"#, 1234.5)]
    #[case(r#"{"features": [{"attributes": {"total_length": null}}]}"#, 0.0)]
    #[case(r#"{"features": []}"#, 0.0)]
    fn test_parse_total_length(#[case] body: &str, #[case] expected: f64) {
        let response = QueryResponse::parse(body).unwrap();
        assert_eq!(response.into_total_length().unwrap(), Metres(expected));
    }
}
