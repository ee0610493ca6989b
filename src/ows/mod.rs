//! The slice of the OGC web service protocols (WFS 1.1.0, WPS 1.0.0, Filter Encoding 1.1)
//! needed to talk to the WOUDC endpoint.

pub mod capabilities;
pub mod error;
pub mod exception;
pub mod filter;
pub mod wfs;
pub mod wps;
