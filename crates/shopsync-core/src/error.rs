//! Typed errors for component boundaries that callers need to inspect.

use thiserror::Error;

/// An upstream record could not be turned into a canonical model.
///
/// Malformed records are fatal: the pipeline run that encounters one stops
/// and the error propagates to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("malformed {collection} record: missing or invalid field `{field}`")]
    Malformed {
        collection: &'static str,
        field: &'static str,
    },

    #[error("malformed {collection} record: {message}")]
    Undecodable {
        collection: &'static str,
        message: String,
    },
}

impl RecordError {
    pub fn malformed(collection: &'static str, field: &'static str) -> Self {
        Self::Malformed { collection, field }
    }
}

/// Internal failure of a reverse geocoding lookup.
///
/// Never crosses [`Geocoder::resolve_country`](crate::geocode::Geocoder::resolve_country);
/// it only exists so implementations can use `?` internally.
#[derive(Debug, Error, PartialEq)]
pub enum GeocodeError {
    #[error("coordinates are not finite: ({lat}, {lng})")]
    NotFinite { lat: f64, lng: f64 },

    #[error("coordinates out of range: ({lat}, {lng})")]
    OutOfRange { lat: f64, lng: f64 },

    #[error("no country known for code `{code}`")]
    UnknownCountryCode { code: String },
}
