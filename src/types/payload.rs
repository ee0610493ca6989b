use geojson::FeatureCollection;

/// Output format requested from the WFS unless overridden.
pub const GEOJSON_OUTPUT_FORMAT: &str = "application/json; subtype=geojson";

/// The result of a feature query: either the decoded GeoJSON or the response body as
/// returned by the server.
#[derive(Debug, Clone)]
pub enum Payload {
    Collection(FeatureCollection),
    Raw(String),
}

impl Payload {
    pub fn collection(&self) -> Option<&FeatureCollection> {
        match self {
            Payload::Collection(collection) => Some(collection),
            Payload::Raw(_) => None,
        }
    }

    pub fn into_collection(self) -> Option<FeatureCollection> {
        match self {
            Payload::Collection(collection) => Some(collection),
            Payload::Raw(_) => None,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        match self {
            Payload::Raw(text) => Some(text),
            Payload::Collection(_) => None,
        }
    }

    pub fn into_raw(self) -> Option<String> {
        match self {
            Payload::Raw(text) => Some(text),
            Payload::Collection(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Payload::Raw(_))
    }
}

pub(crate) fn is_json_format(output_format: &str) -> bool {
    output_format.to_ascii_lowercase().contains("json")
}

pub(crate) fn empty_collection() -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: vec![],
        foreign_members: None,
    }
}
