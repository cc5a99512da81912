//! Report a configured position, handy for desktops without a location source
use super::{GeolocationError, GeolocationProvider, PositionOptions};
use crate::gps::GeoPoint;
use city_navigator_derive::FromServiceConfig;

#[derive(Clone, Debug, FromServiceConfig)]
pub struct FixedLocation {
    longitude: Option<f64>,
    latitude: Option<f64>,
    name: String,
}

impl Default for FixedLocation {
    fn default() -> Self {
        FixedLocation {
            longitude: None,
            latitude: None,
            name: "My location".to_string(),
        }
    }
}

impl GeolocationProvider for FixedLocation {
    fn current_position(&self, _options: &PositionOptions) -> Result<GeoPoint, GeolocationError> {
        match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) => Ok(GeoPoint::named(self.name.clone(), lon, lat)),
            _ => Err(GeolocationError::Unavailable(
                "fixed location requires both longitude and latitude".to_string(),
            )),
        }
    }
}
