use thiserror::Error;

#[derive(Debug, Error)]
pub enum OwsError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    // The endpoint answered with an OWS ExceptionReport instead of a payload
    #[error("Service exception from {url}: {message}")]
    ServiceException { url: String, message: String },

    #[error("Failed to parse GeoJSON response")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to parse XML response")]
    XmlParse(#[from] quick_xml::Error),
}
