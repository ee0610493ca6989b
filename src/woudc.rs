//! This module provides the main entry point for the WOUDC client.
//! It validates query arguments, turns them into WFS GetFeature requests and runs the
//! WOUDC WPS validation processes.

use crate::clients::metadata_client::MetadataClient;
use crate::error::WoudcError;
use crate::ows::capabilities::feature_type_names;
use crate::ows::error::OwsError;
use crate::ows::filter::{build_filter, Predicate};
use crate::ows::wfs::{FeatureQuery, WfsTransport};
use crate::ows::wps::{ProcessResult, ProcessStatus, WpsTransport};
use crate::types::bbox::{Bbox, BboxInput};
use crate::types::payload::{empty_collection, is_json_format, Payload, GEOJSON_OUTPUT_FORMAT};
use crate::types::sort_order::SortOrder;
use crate::types::temporal::{Temporal, TemporalInput};
use crate::types::variables::{Variables, VariablesInput};
use bon::bon;
use geojson::{Feature, FeatureCollection};
use log::{debug, info, warn};
use reqwest::{Client, Url};
use std::time::Duration;

/// Production WOUDC OGC web services endpoint.
pub const DEFAULT_URL: &str = "http://geo.woudc.org/ows";
/// Human readable documentation of the WOUDC data access services.
pub const ABOUT_URL: &str = "http://woudc.org/about/data-access.php";
pub const DEFAULT_MAX_FEATURES: usize = 25_000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// WPS process identifier of the Extended CSV format validator.
pub const EXTCSV_PROCESS: &str = "woudc-data-validate-extcsv";
/// WPS process identifier of the Data Quality Assessment.
pub const QA_PROCESS: &str = "woudc-data-qa";
/// Feature property holding the observation time of data records.
pub const TIME_PROPERTY: &str = "instance_datetime";

const GEOMETRY_PROPERTY: &str = "msGeometry";
const EXTCSV_INPUT: &str = "extcsv";

/// The main client for the WOUDC web services.
///
/// A client is bound to a single endpoint URL. It holds one HTTP connection pool, shared
/// by WFS data queries and WPS validation requests, so it should be created once and
/// reused.
///
/// Create an instance using [`WoudcClient::new()`] for the production endpoint with
/// default settings, or [`WoudcClient::builder()`] to change them.
///
/// # Examples
///
/// ```no_run
/// # use woudc::{WoudcClient, WoudcError};
/// # #[tokio::main]
/// # async fn main() -> Result<(), WoudcError> {
/// let client = WoudcClient::new()?;
/// let stations = client.metadata().stations().await?;
/// println!("WOUDC knows {} stations", stations.features.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WoudcClient {
    url: Url,
    about: String,
    output_format: String,
    max_features: usize,
    timeout: Duration,
    extcsv_process: String,
    qa_process: String,
    wfs: WfsTransport,
    wps: WpsTransport,
}

#[bon]
impl WoudcClient {
    /// Creates a client for the production endpoint ([`DEFAULT_URL`]) with a 30 second
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`WoudcError::Ows`] if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, WoudcError> {
        Self::builder().build()
    }

    /// Creates a client with custom settings.
    ///
    /// This method uses a builder pattern. Every setting is optional.
    ///
    /// # Arguments
    ///
    /// * `.url(impl Into<String>)`: Endpoint of the OGC web services. Defaults to [`DEFAULT_URL`].
    /// * `.timeout_secs(u64)`: Timeout of each HTTP request. Defaults to `30`.
    /// * `.output_format(impl Into<String>)`: WFS output format. Defaults to GeoJSON.
    /// * `.max_features(usize)`: Maximum number of features per request. Defaults to `25000`.
    /// * `.extcsv_process(impl Into<String>)`: WPS identifier of the Extended CSV validator.
    /// * `.qa_process(impl Into<String>)`: WPS identifier of the Data Quality Assessment.
    ///
    /// # Errors
    ///
    /// Returns [`WoudcError::InvalidUrl`] if the URL cannot be parsed, and
    /// [`WoudcError::InvalidArgument`] for a zero timeout or a zero `max_features`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use woudc::{WoudcClient, WoudcError};
    /// # fn main() -> Result<(), WoudcError> {
    /// let client = WoudcClient::builder()
    ///     .url("https://geo.woudc.org/ows")
    ///     .timeout_secs(120)
    ///     .max_features(1000)
    ///     .build()?;
    /// assert_eq!(client.max_features(), 1000);
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = builder, finish_fn = build)]
    #[doc(hidden)]
    pub fn with_options(
        #[builder(into)] url: Option<String>,
        timeout_secs: Option<u64>,
        #[builder(into)] output_format: Option<String>,
        max_features: Option<usize>,
        #[builder(into)] extcsv_process: Option<String>,
        #[builder(into)] qa_process: Option<String>,
    ) -> Result<Self, WoudcError> {
        let url = url.unwrap_or_else(|| DEFAULT_URL.to_string());
        let url = Url::parse(&url).map_err(|e| WoudcError::InvalidUrl(url.clone(), e))?;

        let timeout_secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(WoudcError::invalid("timeout must be a positive number of seconds"));
        }
        let max_features = max_features.unwrap_or(DEFAULT_MAX_FEATURES);
        if max_features == 0 {
            return Err(WoudcError::invalid("max_features must be at least 1"));
        }

        let timeout = Duration::from_secs(timeout_secs);
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(OwsError::ClientBuild)?;

        Ok(Self {
            wfs: WfsTransport::new(http.clone(), url.clone()),
            wps: WpsTransport::new(http, url.clone()),
            url,
            about: ABOUT_URL.to_string(),
            output_format: output_format.unwrap_or_else(|| GEOJSON_OUTPUT_FORMAT.to_string()),
            max_features,
            timeout,
            extcsv_process: extcsv_process.unwrap_or_else(|| EXTCSV_PROCESS.to_string()),
            qa_process: qa_process.unwrap_or_else(|| QA_PROCESS.to_string()),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn about(&self) -> &str {
        &self.about
    }

    pub fn output_format(&self) -> &str {
        &self.output_format
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Shortcuts for the WOUDC metadata layers (stations, instruments, contributors).
    pub fn metadata(&self) -> MetadataClient<'_> {
        MetadataClient::new(self)
    }

    /// Fetches every feature of a metadata layer, without any filter.
    ///
    /// The typename is not checked locally; an unknown layer surfaces as the
    /// [`OwsError::ServiceException`] (or HTTP error) reported by the server.
    ///
    /// # Arguments
    ///
    /// * `typename` - The WFS layer, e.g. `"stations"` or `"contributors"`.
    /// * `.raw(bool)`: Optional. Return the response body untouched instead of decoding it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use woudc::{WoudcClient, WoudcError};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), WoudcError> {
    /// let client = WoudcClient::new()?;
    /// let raw = client.get_metadata("contributors").raw(true).call().await?;
    /// println!("{}", raw.raw().unwrap_or_default());
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = get_metadata)]
    #[doc(hidden)]
    pub async fn build_metadata(
        &self,
        #[builder(start_fn)] typename: &str,
        raw: Option<bool>,
    ) -> Result<Payload, WoudcError> {
        let raw = raw.unwrap_or(false);
        if !raw && !is_json_format(&self.output_format) {
            return Err(Self::non_json_error(&self.output_format));
        }
        info!("Fetching metadata {}", typename);
        let query = FeatureQuery::new(typename, &self.output_format, self.max_features);
        let body = self.wfs.get_feature(&query).await?;
        if raw {
            return Ok(Payload::Raw(body));
        }
        Ok(Payload::Collection(Self::decode_collection(&body)?))
    }

    /// Queries a WOUDC dataset.
    ///
    /// All arguments are validated before any request is made. In parsed mode the
    /// results are paged through in steps of `max_features` and merged into one
    /// collection; in raw mode the first page is returned as-is.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `dataset` - The WFS typename of the dataset, e.g. `"totalozone"` or `"ozonesonde"`.
    /// * `.bbox(impl Into<BboxInput>)`: Optional. `"minx,miny,maxx,maxy"` or 4 numbers.
    /// * `.temporal(impl Into<TemporalInput>)`: Optional. `"begin/end"` or a sequence of
    ///   exactly 2 instants. Matched against `instance_datetime`.
    /// * `.sort_by(impl Into<String>)`: Optional. Property to sort on. Defaults to
    ///   `instance_datetime` when only `sort_order` is given.
    /// * `.sort_order(impl Into<String>)`: Optional. `"A"` or `"D"`.
    /// * `.variables(impl Into<VariablesInput>)`: Optional. List of properties to return.
    /// * `.property_name(..)` / `.property_value(..)`: Optional. Equality filter; both or neither.
    /// * `.output_format(impl Into<String>)`: Optional. Overrides the client's output format.
    /// * `.max_features(usize)`: Optional. Overrides the client's page size.
    /// * `.raw(bool)`: Optional. Return the response body untouched.
    ///
    /// # Errors
    ///
    /// Returns [`WoudcError::InvalidArgument`] for a malformed bbox, temporal range,
    /// sort order, variable list or property filter. Transport failures are returned as
    /// [`WoudcError::Ows`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use woudc::{WoudcClient, WoudcError};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), WoudcError> {
    /// let client = WoudcClient::new()?;
    /// let data = client
    ///     .get_data("totalozone")
    ///     .bbox("-142,42,-53,84")
    ///     .temporal("2000-11-11/2001-10-30")
    ///     .sort_order("D")
    ///     .variables(["daily_date", "daily_columnO3"])
    ///     .call()
    ///     .await?;
    /// if let Some(collection) = data.collection() {
    ///     println!("Found {} observations", collection.features.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = get_data)]
    #[doc(hidden)]
    #[allow(clippy::too_many_arguments)]
    pub async fn build_data(
        &self,
        #[builder(start_fn)] dataset: &str,
        #[builder(into)] bbox: Option<BboxInput>,
        #[builder(into)] temporal: Option<TemporalInput>,
        #[builder(into)] sort_by: Option<String>,
        #[builder(into)] sort_order: Option<String>,
        #[builder(into)] variables: Option<VariablesInput>,
        #[builder(into)] property_name: Option<String>,
        #[builder(into)] property_value: Option<String>,
        #[builder(into)] output_format: Option<String>,
        max_features: Option<usize>,
        raw: Option<bool>,
    ) -> Result<Payload, WoudcError> {
        let bbox = bbox.map(Bbox::try_from).transpose()?;
        let temporal = temporal.map(Temporal::try_from).transpose()?;
        let sort_order = sort_order
            .as_deref()
            .map(str::parse::<SortOrder>)
            .transpose()?;
        let variables = variables.map(Variables::try_from).transpose()?;
        let equal_to = match (property_name, property_value) {
            (Some(property), Some(value)) => Some(Predicate::EqualTo { property, value }),
            (None, None) => None,
            _ => {
                return Err(WoudcError::invalid(
                    "property_name and property_value must be given together",
                ))
            }
        };

        let output_format = output_format.unwrap_or_else(|| self.output_format.clone());
        let max_features = max_features.unwrap_or(self.max_features);
        if max_features == 0 {
            return Err(WoudcError::invalid("max_features must be at least 1"));
        }
        let raw = raw.unwrap_or(false);
        if !raw && !is_json_format(&output_format) {
            return Err(Self::non_json_error(&output_format));
        }

        let mut predicates = Vec::new();
        if let Some(bbox) = bbox {
            predicates.push(Predicate::Bbox {
                property: GEOMETRY_PROPERTY.to_string(),
                bbox,
            });
        }
        if let Some(temporal) = &temporal {
            predicates.push(Predicate::Between {
                property: TIME_PROPERTY.to_string(),
                lower: temporal.begin().to_string(),
                upper: temporal.end().to_string(),
            });
        }
        predicates.extend(equal_to);

        let mut query = FeatureQuery::new(dataset, &output_format, max_features);
        query.filter = build_filter(&predicates);
        query.property_names = variables.map(Variables::into_inner).unwrap_or_default();
        query.sort_by = match (sort_by, sort_order) {
            (None, None) => None,
            (property, order) => Some(format!(
                "{} {}",
                property.as_deref().unwrap_or(TIME_PROPERTY),
                order.unwrap_or_default()
            )),
        };

        info!("Downloading dataset {}", dataset);
        debug!(
            "bbox: {:?}, temporal: {:?}, sortBy: {:?}, propertyName: {:?}",
            bbox, temporal, query.sort_by, query.property_names
        );

        if raw {
            let body = self.wfs.get_feature(&query).await?;
            return Ok(Payload::Raw(body));
        }
        Ok(Payload::Collection(self.fetch_all_pages(query).await?))
    }

    /// Validates Extended CSV content with the WOUDC format validator.
    ///
    /// # Errors
    ///
    /// Returns [`WoudcError::InvalidArgument`] if the content is empty or if the
    /// validator rejects it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use woudc::{WoudcClient, WoudcError};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), WoudcError> {
    /// let client = WoudcClient::new()?;
    /// let extcsv = std::fs::read_to_string("19830601.ECC.na.na.MSC.csv").unwrap();
    /// let result = client.data_extcsv(&extcsv).await?;
    /// assert!(result.succeeded());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn data_extcsv(&self, data: &str) -> Result<ProcessResult, WoudcError> {
        self.run_process(&self.extcsv_process, data).await
    }

    /// Runs the WOUDC Data Quality Assessment on Extended CSV content.
    ///
    /// # Errors
    ///
    /// Returns [`WoudcError::InvalidArgument`] if the content is empty, is not valid
    /// Extended CSV, or comes from an instrument the assessment does not support
    /// (such as Lidar).
    pub async fn data_qa(&self, data: &str) -> Result<ProcessResult, WoudcError> {
        self.run_process(&self.qa_process, data).await
    }

    /// Fetches the WFS capabilities document as returned by the server.
    pub async fn get_capabilities(&self) -> Result<String, WoudcError> {
        Ok(self.wfs.get_capabilities().await?)
    }

    /// Lists the typenames advertised by the endpoint.
    pub async fn feature_types(&self) -> Result<Vec<String>, WoudcError> {
        let capabilities = self.wfs.get_capabilities().await?;
        Ok(feature_type_names(&capabilities)?)
    }

    pub(crate) async fn metadata_collection(
        &self,
        typename: &str,
    ) -> Result<FeatureCollection, WoudcError> {
        let payload = self.get_metadata(typename).call().await?;
        Ok(payload.into_collection().unwrap_or_else(empty_collection))
    }

    async fn fetch_all_pages(&self, mut query: FeatureQuery) -> Result<FeatureCollection, WoudcError> {
        let mut collection: Option<FeatureCollection> = None;
        let mut previous_page: Option<Vec<Feature>> = None;
        let mut matched: Option<usize> = None;
        loop {
            debug!(
                "Fetching features {} - {} of {}",
                query.start_index,
                query.start_index + query.max_features,
                query.typename
            );
            let body = self.wfs.get_feature(&query).await?;
            if body.trim().is_empty() {
                debug!("Empty response, stopping");
                break;
            }
            let page = Self::decode_collection(&body)?;
            let page_len = page.features.len();
            debug!("Found {} features", page_len);

            // A server that ignores startIndex hands back the same page forever
            if page_len > 0 && previous_page.as_ref() == Some(&page.features) {
                warn!(
                    "Page at startIndex {} repeats the previous page, stopping",
                    query.start_index
                );
                break;
            }
            if matched.is_none() {
                matched = Self::number_matched(&page);
            }
            previous_page = Some(page.features.clone());

            let total = if let Some(existing) = collection.as_mut() {
                existing.features.extend(page.features);
                existing.features.len()
            } else {
                collection = Some(page);
                page_len
            };

            if page_len < query.max_features {
                break;
            }
            if matched.is_some_and(|matched| total >= matched) {
                debug!("Collected all {} matched features", total);
                break;
            }
            query.start_index += query.max_features;
        }

        let collection = collection.unwrap_or_else(empty_collection);
        info!(
            "Found {} total features in {}",
            collection.features.len(),
            query.typename
        );
        Ok(collection)
    }

    /// Total hit count advertised by the server, as `numberMatched` (WFS 2.0 style) or
    /// `totalFeatures` (GeoServer style).
    fn number_matched(page: &FeatureCollection) -> Option<usize> {
        let members = page.foreign_members.as_ref()?;
        ["numberMatched", "totalFeatures"]
            .iter()
            .find_map(|key| members.get(*key).and_then(|value| value.as_u64()))
            .map(|matched| matched as usize)
    }

    async fn run_process(&self, process: &str, data: &str) -> Result<ProcessResult, WoudcError> {
        if data.trim().is_empty() {
            return Err(WoudcError::invalid(
                "Expected Extended CSV content, got empty input",
            ));
        }
        info!("Executing WPS process {}", process);
        let result = self.wps.execute(process, &[(EXTCSV_INPUT, data)]).await?;
        match &result.status {
            ProcessStatus::Succeeded(_) => Ok(result),
            ProcessStatus::Failed(message) => {
                warn!("Process {} rejected the input: {}", process, message);
                Err(WoudcError::invalid(format!(
                    "{process} rejected the input: {message}"
                )))
            }
            ProcessStatus::Pending(state) => Err(OwsError::ServiceException {
                url: self.url.to_string(),
                message: format!("{process} did not complete ({state})"),
            }
            .into()),
        }
    }

    fn decode_collection(body: &str) -> Result<FeatureCollection, WoudcError> {
        if body.trim().is_empty() {
            return Ok(empty_collection());
        }
        serde_json::from_str::<FeatureCollection>(body)
            .map_err(|e| WoudcError::from(OwsError::from(e)))
    }

    fn non_json_error(output_format: &str) -> WoudcError {
        WoudcError::invalid(format!(
            "output format '{output_format}' can only be returned raw"
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::WoudcError;
    use crate::ows::error::OwsError;
    use crate::woudc::{WoudcClient, DEFAULT_URL};
    use mockito::{Matcher, Server, ServerGuard};
    use std::time::Duration;

    const STATIONS: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "id": "stations.1", "geometry": {"type": "Point", "coordinates": [-79.47, 43.78]},
         "properties": {"woudc_id": "065", "name": "Toronto"}},
        {"type": "Feature", "id": "stations.2", "geometry": {"type": "Point", "coordinates": [-94.97, 74.72]},
         "properties": {"woudc_id": "024", "name": "Resolute"}}
    ]}"#;

    fn page(ids: &[u32]) -> String {
        let features: Vec<String> = ids
            .iter()
            .map(|id| {
                format!(
                    r#"{{"type": "Feature", "id": "totalozone.{id}", "geometry": null, "properties": {{"daily_columnO3": {id}}}}}"#
                )
            })
            .collect();
        format!(
            r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
            features.join(",")
        )
    }

    fn client_for(server: &ServerGuard) -> Result<WoudcClient, WoudcError> {
        WoudcClient::builder()
            .url(format!("{}/ows", server.url()))
            .build()
    }

    #[test]
    fn test_defaults() -> Result<(), WoudcError> {
        let client = WoudcClient::new()?;
        assert_eq!(client.url().as_str(), DEFAULT_URL);
        assert_eq!(client.about(), "http://woudc.org/about/data-access.php");
        assert_eq!(client.output_format(), "application/json; subtype=geojson");
        assert_eq!(client.max_features(), 25_000);
        assert_eq!(client.timeout(), Duration::from_secs(30));
        Ok(())
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            WoudcClient::builder().url("not a url").build(),
            Err(WoudcError::InvalidUrl(..))
        ));
        assert!(WoudcClient::builder()
            .max_features(0)
            .build()
            .unwrap_err()
            .is_invalid_argument());
        assert!(WoudcClient::builder()
            .timeout_secs(0)
            .build()
            .unwrap_err()
            .is_invalid_argument());
    }

    #[tokio::test]
    async fn test_get_metadata_parsed_and_raw() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex("^/ows".to_string()))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("service".into(), "WFS".into()),
                Matcher::UrlEncoded("version".into(), "1.1.0".into()),
                Matcher::UrlEncoded("request".into(), "GetFeature".into()),
                Matcher::UrlEncoded("typename".into(), "stations".into()),
                Matcher::UrlEncoded(
                    "outputFormat".into(),
                    "application/json; subtype=geojson".into(),
                ),
                Matcher::UrlEncoded("maxFeatures".into(), "25000".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(STATIONS)
            .expect(2)
            .create_async()
            .await;
        let client = client_for(&server)?;

        let parsed = client.get_metadata("stations").call().await?;
        let collection = parsed.collection().expect("parsed payload");
        assert_eq!(collection.features.len(), 2);
        assert_eq!(
            collection.features[0]
                .property("name")
                .and_then(|v| v.as_str()),
            Some("Toronto")
        );

        let raw = client.get_metadata("stations").raw(true).call().await?;
        assert!(raw.is_raw());
        assert!(raw.raw().unwrap().contains(r#""type": "FeatureCollection""#));

        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_metadata_shortcuts() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex("^/ows".to_string()))
            .match_query(Matcher::UrlEncoded("typename".into(), "contributors".into()))
            .with_status(200)
            .with_body(STATIONS)
            .create_async()
            .await;
        let client = client_for(&server)?;

        let contributors = client.metadata().contributors().await?;
        assert_eq!(contributors.features.len(), 2);
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_typename_propagates_service_exception() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Regex("^/ows".to_string()))
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows" version="1.1.0">
  <ows:Exception exceptionCode="InvalidParameterValue" locator="typename">
    <ows:ExceptionText>TYPENAME 'nope' doesn't exist in this server</ows:ExceptionText>
  </ows:Exception>
</ows:ExceptionReport>"#,
            )
            .create_async()
            .await;
        let client = client_for(&server)?;

        let err = client.get_metadata("nope").call().await.unwrap_err();
        match err {
            WoudcError::Ows(OwsError::ServiceException { message, .. }) => {
                assert!(message.contains("doesn't exist"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_http_errors_propagate() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Regex("^/ows".to_string()))
            .with_status(503)
            .create_async()
            .await;
        let client = client_for(&server)?;

        let err = client.get_data("totalozone").call().await.unwrap_err();
        assert!(matches!(
            err,
            WoudcError::Ows(OwsError::HttpStatus { status, .. }) if status.as_u16() == 503
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_arguments_issue_no_request() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let client = client_for(&server)?;
        let dataset = "totalozone";

        let bad_bbox = client.get_data(dataset).bbox([42.0, -52.0, 84.0]).call().await;
        assert!(bad_bbox.unwrap_err().is_invalid_argument());

        let bad_bbox_text = client.get_data(dataset).bbox("-142,42,north,84").call().await;
        assert!(bad_bbox_text.unwrap_err().is_invalid_argument());

        let bad_temporal = client
            .get_data(dataset)
            .temporal("2000-11-11/2001-10-30/2002-01-01")
            .call()
            .await;
        assert!(bad_temporal.unwrap_err().is_invalid_argument());

        let single_instant = client
            .get_data(dataset)
            .temporal(vec!["2000-11-11"])
            .call()
            .await;
        assert!(single_instant.unwrap_err().is_invalid_argument());

        let single_instant_text = client.get_data(dataset).temporal("2000-11-11").call().await;
        assert!(single_instant_text.unwrap_err().is_invalid_argument());

        let too_many_instants = client
            .get_data(dataset)
            .temporal(vec!["2000-11-11", "2000-11-12", "2000-11-13"])
            .call()
            .await;
        assert!(too_many_instants.unwrap_err().is_invalid_argument());

        let bad_sort = client.get_data(dataset).sort_order("bad").call().await;
        assert!(bad_sort.unwrap_err().is_invalid_argument());

        let bare_variables = client.get_data(dataset).variables("foo").call().await;
        let err = bare_variables.unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("Expected list of variables"));

        let half_filter = client
            .get_data(dataset)
            .property_name("platform_id")
            .call()
            .await;
        assert!(half_filter.unwrap_err().is_invalid_argument());

        let parsed_csv = client.get_data(dataset).output_format("csv").call().await;
        assert!(parsed_csv.unwrap_err().is_invalid_argument());

        let empty_extcsv = client.data_extcsv("   ").await;
        assert!(empty_extcsv.unwrap_err().is_invalid_argument());

        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_get_data_builds_filter_and_sort() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex("^/ows".to_string()))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("typename".into(), "totalozone".into()),
                Matcher::UrlEncoded("sortBy".into(), "instance_datetime D".into()),
                Matcher::UrlEncoded("propertyName".into(), "daily_date,daily_columnO3".into()),
                Matcher::Regex("filter=".to_string()),
                Matcher::Regex("PropertyIsBetween".to_string()),
                Matcher::Regex("BBOX".to_string()),
            ]))
            .with_status(200)
            .with_body(page(&[1, 2]))
            .create_async()
            .await;
        let client = client_for(&server)?;

        let data = client
            .get_data("totalozone")
            .bbox("-142,42,-53,84")
            .temporal("2000-11-11/2001-10-30")
            .sort_order("D")
            .variables(["daily_date", "daily_columnO3"])
            .call()
            .await?;
        assert_eq!(data.collection().unwrap().features.len(), 2);

        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_get_data_valid_sort_and_variables_do_not_raise() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex("^/ows".to_string()))
            .with_status(200)
            .with_body(page(&[]))
            .expect(3)
            .create_async()
            .await;
        let client = client_for(&server)?;

        for order in ["A", "D"] {
            client.get_data("totalozone").sort_order(order).call().await?;
        }
        client
            .get_data("totalozone")
            .variables(vec!["station_id"])
            .call()
            .await?;

        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_get_data_pages_through_results() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", Matcher::Regex("^/ows".to_string()))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("maxFeatures".into(), "2".into()),
                Matcher::UrlEncoded("startIndex".into(), "0".into()),
            ]))
            .with_status(200)
            .with_body(page(&[1, 2]))
            .create_async()
            .await;
        let second = server
            .mock("GET", Matcher::Regex("^/ows".to_string()))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("maxFeatures".into(), "2".into()),
                Matcher::UrlEncoded("startIndex".into(), "2".into()),
            ]))
            .with_status(200)
            .with_body(page(&[3]))
            .create_async()
            .await;
        let client = client_for(&server)?;

        let data = client
            .get_data("totalozone")
            .max_features(2)
            .call()
            .await?
            .into_collection()
            .unwrap();
        let values: Vec<u64> = data
            .features
            .iter()
            .filter_map(|f| f.property("daily_columnO3").and_then(|v| v.as_u64()))
            .collect();
        assert_eq!(values, [1, 2, 3]);

        first.assert_async().await;
        second.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_get_data_stops_when_start_index_is_ignored() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex("^/ows".to_string()))
            .with_status(200)
            .with_body(page(&[7]))
            .expect(2)
            .create_async()
            .await;
        let client = client_for(&server)?;

        let data = tokio::time::timeout(
            Duration::from_secs(5),
            client.get_data("totalozone").max_features(1).call(),
        )
        .await
        .expect("paging should terminate")?;
        assert_eq!(data.collection().unwrap().features.len(), 1);

        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_get_data_stops_at_number_matched() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex("^/ows".to_string()))
            .with_status(200)
            .with_body(
                r#"{"type": "FeatureCollection", "numberMatched": 2, "features": [
                    {"type": "Feature", "geometry": null, "properties": {"daily_columnO3": 1}},
                    {"type": "Feature", "geometry": null, "properties": {"daily_columnO3": 2}}
                ]}"#,
            )
            .expect(1)
            .create_async()
            .await;
        let client = client_for(&server)?;

        let data = client.get_data("totalozone").max_features(2).call().await?;
        assert_eq!(data.collection().unwrap().features.len(), 2);

        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_get_data_raw_fetches_single_page() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        let body = page(&[1, 2]);
        let mock = server
            .mock("GET", Matcher::Regex("^/ows".to_string()))
            .with_status(200)
            .with_body(body.clone())
            .expect(1)
            .create_async()
            .await;
        let client = client_for(&server)?;

        let raw = client
            .get_data("totalozone")
            .max_features(2)
            .raw(true)
            .call()
            .await?;
        assert_eq!(raw.raw(), Some(body.as_str()));

        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_get_data_blank_response_is_empty_collection() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Regex("^/ows".to_string()))
            .with_status(200)
            .with_body("   \n")
            .create_async()
            .await;
        let client = client_for(&server)?;

        let data = client.get_data("totalozone").call().await?;
        assert!(data.collection().unwrap().features.is_empty());
        Ok(())
    }

    const WPS_SUCCEEDED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wps:ExecuteResponse xmlns:wps="http://www.opengis.net/wps/1.0.0" xmlns:ows="http://www.opengis.net/ows/1.1" service="WPS" version="1.0.0">
  <wps:Status><wps:ProcessSucceeded>OK</wps:ProcessSucceeded></wps:Status>
  <wps:ProcessOutputs>
    <wps:Output><ows:Identifier>result</ows:Identifier><wps:Data><wps:LiteralData>valid</wps:LiteralData></wps:Data></wps:Output>
  </wps:ProcessOutputs>
</wps:ExecuteResponse>"#;

    const WPS_LIDAR_FAILED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wps:ExecuteResponse xmlns:wps="http://www.opengis.net/wps/1.0.0" xmlns:ows="http://www.opengis.net/ows/1.1" service="WPS" version="1.0.0">
  <wps:Status>
    <wps:ProcessFailed>
      <ows:ExceptionReport><ows:Exception exceptionCode="NoApplicableCode">
        <ows:ExceptionText>QA not supported for instrument Lidar</ows:ExceptionText>
      </ows:Exception></ows:ExceptionReport>
    </wps:ProcessFailed>
  </wps:Status>
</wps:ExecuteResponse>"#;

    const EXTCSV: &str = "#CONTENT\nClass,Category,Level,Form\nWOUDC,OzoneSonde,1.0,1\n";

    #[tokio::test]
    async fn test_data_extcsv_success() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex("^/ows".to_string()))
            .match_body(Matcher::Regex(
                "<ows:Identifier>woudc-data-validate-extcsv</ows:Identifier>".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body(WPS_SUCCEEDED)
            .create_async()
            .await;
        let client = client_for(&server)?;

        let result = client.data_extcsv(EXTCSV).await?;
        assert!(result.succeeded());
        assert_eq!(result.output("result"), Some("valid"));

        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_data_extcsv_rejects_bad_data() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        server
            .mock("POST", Matcher::Regex("^/ows".to_string()))
            .with_status(400)
            .with_header("content-type", "text/xml")
            .with_body(
                r#"<ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows/1.1"><ows:Exception exceptionCode="InvalidParameterValue"><ows:ExceptionText>Not an Extended CSV file</ows:ExceptionText></ows:Exception></ows:ExceptionReport>"#,
            )
            .create_async()
            .await;
        let client = client_for(&server)?;

        let err = client.data_extcsv("bad data").await.unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("Not an Extended CSV file"));
        Ok(())
    }

    #[tokio::test]
    async fn test_data_qa_unsupported_instrument() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex("^/ows".to_string()))
            .match_body(Matcher::Regex(
                "<ows:Identifier>woudc-data-qa</ows:Identifier>".to_string(),
            ))
            .with_status(200)
            .with_body(WPS_LIDAR_FAILED)
            .create_async()
            .await;
        let client = client_for(&server)?;

        let err = client.data_qa(EXTCSV).await.unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("Lidar"));

        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_data_qa_success() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        server
            .mock("POST", Matcher::Regex("^/ows".to_string()))
            .with_status(200)
            .with_body(WPS_SUCCEEDED)
            .create_async()
            .await;
        let client = client_for(&server)?;

        assert!(client.data_qa(EXTCSV).await?.succeeded());
        Ok(())
    }

    #[tokio::test]
    async fn test_feature_types() -> Result<(), WoudcError> {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Regex("^/ows".to_string()))
            .match_query(Matcher::UrlEncoded(
                "request".into(),
                "GetCapabilities".into(),
            ))
            .with_status(200)
            .with_body(
                r#"<wfs:WFS_Capabilities xmlns:wfs="http://www.opengis.net/wfs" version="1.1.0"><wfs:FeatureTypeList><wfs:FeatureType><wfs:Name>stations</wfs:Name></wfs:FeatureType></wfs:FeatureTypeList></wfs:WFS_Capabilities>"#,
            )
            .create_async()
            .await;
        let client = client_for(&server)?;

        assert_eq!(client.feature_types().await?, vec!["stations"]);
        Ok(())
    }

    // Live tests against the production endpoint
    #[tokio::test]
    #[ignore = "requires network access to geo.woudc.org"]
    async fn test_live_get_metadata() -> Result<(), WoudcError> {
        let client = WoudcClient::new()?;
        for typename in ["stations", "contributors"] {
            let data = client.get_metadata(typename).call().await?;
            let collection = data.collection().expect("parsed payload");
            assert!(
                !collection.features.is_empty(),
                "Expected non-empty {typename} list"
            );

            let raw = client.get_metadata(typename).raw(true).call().await?;
            assert!(raw.raw().unwrap().contains(r#""type": "FeatureCollection""#));
        }
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires network access to geo.woudc.org"]
    async fn test_live_validation_rejects_bad_data() -> Result<(), WoudcError> {
        let client = WoudcClient::new()?;
        assert!(client.data_extcsv("bad data").await.unwrap_err().is_invalid_argument());
        assert!(client.data_qa("bad data").await.unwrap_err().is_invalid_argument());
        Ok(())
    }
}
