//! Reverse geocoding: coordinates → country name.
//!
//! [`Geocoder::resolve_country`] never fails. Implementations report
//! problems through [`Geocoder::lookup`]; the provided method logs them and
//! substitutes [`UNKNOWN_COUNTRY`].
//!
//! [`GeoNamesGeocoder`] searches the GeoNames cities table bundled with
//! `reverse_geocoder` for the nearest city, then names its ISO 3166 country.
//! No network access is involved.

use isocountry::CountryCode;
use reverse_geocoder::ReverseGeocoder;

use crate::error::GeocodeError;

/// Country reported when a lookup fails for any reason.
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";

pub trait Geocoder: Send + Sync {
    /// Resolve a country, reporting internal failures.
    fn lookup(&self, lat: f64, lng: f64) -> Result<String, GeocodeError>;

    /// Resolve a country, falling back to [`UNKNOWN_COUNTRY`].
    fn resolve_country(&self, lat: f64, lng: f64) -> String {
        match self.lookup(lat, lng) {
            Ok(country) => {
                tracing::debug!(lat, lng, %country, "country recognized by coordinates");
                country
            }
            Err(e) => {
                tracing::error!(lat, lng, error = %e, "country lookup failed");
                UNKNOWN_COUNTRY.to_string()
            }
        }
    }
}

/// Nearest-city geocoder over the bundled GeoNames data.
///
/// Building the search tree takes a moment; create one per process and
/// share it.
pub struct GeoNamesGeocoder {
    cities: ReverseGeocoder,
}

impl GeoNamesGeocoder {
    pub fn new() -> Self {
        Self {
            cities: ReverseGeocoder::new(),
        }
    }
}

impl Default for GeoNamesGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Geocoder for GeoNamesGeocoder {
    fn lookup(&self, lat: f64, lng: f64) -> Result<String, GeocodeError> {
        check_coordinates(lat, lng)?;
        let nearest = self.cities.search((lat, lng));
        tracing::trace!(city = %nearest.record.name, cc = %nearest.record.cc, "nearest city");
        country_name(&nearest.record.cc)
    }
}

fn check_coordinates(lat: f64, lng: f64) -> Result<(), GeocodeError> {
    if !lat.is_finite() || !lng.is_finite() {
        return Err(GeocodeError::NotFinite { lat, lng });
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(GeocodeError::OutOfRange { lat, lng });
    }
    Ok(())
}

/// English short name for an ISO 3166-1 alpha-2 code.
pub fn country_name(code: &str) -> Result<String, GeocodeError> {
    CountryCode::for_alpha2(code)
        .map(|country| country.name().to_string())
        .map_err(|_| GeocodeError::UnknownCountryCode {
            code: code.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn geocoder() -> &'static GeoNamesGeocoder {
        static GEOCODER: OnceLock<GeoNamesGeocoder> = OnceLock::new();
        GEOCODER.get_or_init(GeoNamesGeocoder::default)
    }

    struct Broken;

    impl Geocoder for Broken {
        fn lookup(&self, lat: f64, lng: f64) -> Result<String, GeocodeError> {
            Err(GeocodeError::OutOfRange { lat, lng })
        }
    }

    #[test]
    fn test_failure_falls_back_to_unknown() {
        assert_eq!(Broken.resolve_country(1.0, 2.0), UNKNOWN_COUNTRY);
    }

    #[test]
    fn test_cities_resolve_to_their_country() {
        let geocoder = geocoder();
        assert_eq!(geocoder.resolve_country(45.76, 4.84), "France"); // Lyon
        assert_eq!(geocoder.resolve_country(35.68, 139.69), "Japan"); // Tokyo
        assert_eq!(geocoder.resolve_country(43.65, -79.38), "Canada"); // Toronto
        assert_eq!(geocoder.resolve_country(46.95, 7.45), "Switzerland"); // Bern
        assert_eq!(geocoder.resolve_country(14.63, -90.51), "Guatemala"); // Guatemala City
    }

    #[test]
    fn test_border_cities_are_not_attracted_by_neighbours() {
        let geocoder = geocoder();
        // Seattle sits close to Canada; Prague close to Austria and Germany.
        let seattle = geocoder.resolve_country(47.61, -122.33);
        assert!(seattle.starts_with("United States"), "got {}", seattle);
        assert_ne!(geocoder.resolve_country(50.08, 14.44), "Austria");
    }

    #[test]
    fn test_invalid_coordinates_are_recovered() {
        let geocoder = geocoder();
        assert_eq!(geocoder.resolve_country(f64::NAN, 0.0), UNKNOWN_COUNTRY);
        assert_eq!(geocoder.resolve_country(95.0, 0.0), UNKNOWN_COUNTRY);
        assert_eq!(geocoder.resolve_country(0.0, -181.0), UNKNOWN_COUNTRY);
        assert!(matches!(
            geocoder.lookup(f64::INFINITY, 0.0),
            Err(GeocodeError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_country_codes() {
        assert_eq!(country_name("JP").unwrap(), "Japan");
        assert_eq!(
            country_name("ZZ"),
            Err(GeocodeError::UnknownCountryCode {
                code: "ZZ".to_string()
            })
        );
    }
}
