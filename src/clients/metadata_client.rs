//! Provides the `MetadataClient` for fetching the WOUDC metadata layers.
//!
//! This client is obtained via [`WoudcClient::metadata()`] and wraps
//! [`WoudcClient::get_metadata()`] for the layers that describe the WOUDC network.

use crate::{WoudcClient, WoudcError};
use geojson::FeatureCollection;

/// WFS typename of the station metadata layer.
pub const STATIONS_TYPENAME: &str = "stations";
/// WFS typename of the instrument metadata layer.
pub const INSTRUMENTS_TYPENAME: &str = "instruments";
/// WFS typename of the contributor (agency) metadata layer.
pub const CONTRIBUTORS_TYPENAME: &str = "contributors";

/// A helper for fetching complete WOUDC metadata layers as GeoJSON.
///
/// Instances are created by calling [`WoudcClient::metadata()`]. Every method returns
/// the decoded [`FeatureCollection`] of one layer, so the client must be configured with
/// a JSON output format.
pub struct MetadataClient<'a> {
    /// A reference to the main WOUDC client instance.
    client: &'a WoudcClient,
}

impl<'a> MetadataClient<'a> {
    /// Creates a new `MetadataClient`.
    ///
    /// This is typically called internally by [`WoudcClient::metadata()`] and not directly by users.
    pub(crate) fn new(client: &'a WoudcClient) -> Self {
        Self { client }
    }

    /// Fetches all WOUDC stations.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use woudc::{WoudcClient, WoudcError};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), WoudcError> {
    /// let client = WoudcClient::new()?;
    /// let stations = client.metadata().stations().await?;
    /// for station in stations.features.iter().take(5) {
    ///     println!("{:?}", station.property("name"));
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn stations(&self) -> Result<FeatureCollection, WoudcError> {
        self.layer(STATIONS_TYPENAME).await
    }

    /// Fetches all registered instruments.
    pub async fn instruments(&self) -> Result<FeatureCollection, WoudcError> {
        self.layer(INSTRUMENTS_TYPENAME).await
    }

    /// Fetches all contributing agencies.
    pub async fn contributors(&self) -> Result<FeatureCollection, WoudcError> {
        self.layer(CONTRIBUTORS_TYPENAME).await
    }

    /// Fetches any layer by typename.
    ///
    /// # Errors
    ///
    /// Returns [`WoudcError::InvalidArgument`] if the client is configured with a
    /// non-JSON output format, and [`WoudcError::Ows`] for transport failures or an
    /// unknown typename.
    pub async fn layer(&self, typename: &str) -> Result<FeatureCollection, WoudcError> {
        self.client.metadata_collection(typename).await
    }
}
