use crate::ows::error::OwsError;
use crate::ows::exception::exception_message;
use log::{debug, warn};
use reqwest::{Client, Url};

pub const WFS_VERSION: &str = "1.1.0";

/// Parameters of one KVP-encoded WFS 1.1.0 GetFeature request.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FeatureQuery {
    pub typename: String,
    pub output_format: String,
    pub max_features: usize,
    pub start_index: usize,
    pub filter: Option<String>,
    pub property_names: Vec<String>,
    pub sort_by: Option<String>,
}

impl FeatureQuery {
    pub fn new(typename: &str, output_format: &str, max_features: usize) -> Self {
        Self {
            typename: typename.to_string(),
            output_format: output_format.to_string(),
            max_features,
            start_index: 0,
            filter: None,
            property_names: vec![],
            sort_by: None,
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("service", "WFS".to_string()),
            ("version", WFS_VERSION.to_string()),
            ("request", "GetFeature".to_string()),
            ("typename", self.typename.clone()),
            ("outputFormat", self.output_format.clone()),
            ("maxFeatures", self.max_features.to_string()),
            ("startIndex", self.start_index.to_string()),
        ];
        if let Some(filter) = &self.filter {
            params.push(("filter", filter.clone()));
        }
        if !self.property_names.is_empty() {
            params.push(("propertyName", self.property_names.join(",")));
        }
        if let Some(sort_by) = &self.sort_by {
            params.push(("sortBy", sort_by.clone()));
        }
        params
    }
}

/// Minimal WFS 1.1.0 transport: GetFeature and GetCapabilities over HTTP GET.
#[derive(Debug, Clone)]
pub(crate) struct WfsTransport {
    http: Client,
    url: Url,
}

impl WfsTransport {
    pub fn new(http: Client, url: Url) -> Self {
        Self { http, url }
    }

    pub async fn get_feature(&self, query: &FeatureQuery) -> Result<String, OwsError> {
        self.get(&query.to_params()).await
    }

    pub async fn get_capabilities(&self) -> Result<String, OwsError> {
        self.get(&[
            ("service", "WFS".to_string()),
            ("version", WFS_VERSION.to_string()),
            ("request", "GetCapabilities".to_string()),
        ])
        .await
    }

    async fn get(&self, params: &[(&'static str, String)]) -> Result<String, OwsError> {
        let url = self.url.to_string();
        debug!("GET {} with {:?}", url, params);

        let response = self
            .http
            .get(self.url.clone())
            .query(params)
            .send()
            .await
            .map_err(|e| OwsError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    OwsError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    OwsError::NetworkRequest(url, e)
                });
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| OwsError::NetworkRequest(url.clone(), e))?;

        if let Some(message) = exception_message(&body) {
            warn!("Service exception from {}: {}", url, message);
            return Err(OwsError::ServiceException { url, message });
        }
        Ok(body)
    }
}
