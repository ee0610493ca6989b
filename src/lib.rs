mod clients;
mod error;
mod ows;
mod types;
mod woudc;

pub use error::{Result, WoudcError};
pub use woudc::*;

pub use clients::metadata_client::*;

pub use ows::error::OwsError;
pub use ows::wps::{ProcessOutput, ProcessResult, ProcessStatus};

pub use types::bbox::{Bbox, BboxInput};
pub use types::date::{date2string, DateBound, DateInput, DATETIME_FORMAT};
pub use types::payload::{Payload, GEOJSON_OUTPUT_FORMAT};
pub use types::sort_order::SortOrder;
pub use types::temporal::{Temporal, TemporalInput, RANGE_SEPARATOR};
pub use types::variables::{Variables, VariablesInput};

pub use geojson;
