//! Estimate the current position from the public IP address using the ip-api.com JSON API
use super::{GeolocationError, GeolocationProvider, PositionOptions};
use crate::gps::GeoPoint;
use city_navigator_derive::FromServiceConfig;
use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Response {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    city: Option<String>,
}

/// Defines the connection parameters to the IP geolocation API
#[derive(Clone, Debug, FromServiceConfig)]
pub struct IpApi {
    base_url: String,
    /// look up this address instead of the caller's own
    query: Option<String>,
}

impl IpApi {
    fn request_url(&self) -> String {
        match &self.query {
            Some(ip) => format!("{}/json/{}", self.base_url.trim_end_matches('/'), ip),
            None => format!("{}/json", self.base_url.trim_end_matches('/')),
        }
    }
}

impl Default for IpApi {
    fn default() -> Self {
        IpApi {
            base_url: "http://ip-api.com".to_string(),
            query: None,
        }
    }
}

fn into_position(resp: Response) -> Result<GeoPoint, GeolocationError> {
    if resp.status != "success" {
        return Err(GeolocationError::Unavailable(
            resp.message.unwrap_or(resp.status),
        ));
    }
    match (resp.lon, resp.lat) {
        (Some(lon), Some(lat)) => Ok(match resp.city {
            Some(city) => GeoPoint::named(city, lon, lat),
            None => GeoPoint::new(lon, lat),
        }),
        _ => Err(GeolocationError::Unavailable(
            "response did not include coordinates".to_string(),
        )),
    }
}

impl GeolocationProvider for IpApi {
    fn current_position(&self, options: &PositionOptions) -> Result<GeoPoint, GeolocationError> {
        // every call is a fresh lookup, nothing is cached so maximum_age is always honoured
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| GeolocationError::Unavailable(e.to_string()))?;
        let request_url = self.request_url();
        debug!("requesting position from {}", request_url);
        let resp = client
            .get(&request_url)
            .query(&[("fields", "status,message,lat,lon,city")])
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    GeolocationError::Timeout
                } else {
                    GeolocationError::Unavailable(e.to_string())
                }
            })?;

        let code = resp.status();
        if code == StatusCode::FORBIDDEN || code == StatusCode::UNAUTHORIZED {
            return Err(GeolocationError::PermissionDenied(format!(
                "the geolocation service refused the request ({})",
                code
            )));
        } else if !code.is_success() {
            return Err(GeolocationError::Unavailable(format!(
                "the geolocation service answered with {}",
                code
            )));
        }
        let json: Response = resp.json().map_err(|e| {
            if e.is_timeout() {
                GeolocationError::Timeout
            } else {
                GeolocationError::Unavailable(e.to_string())
            }
        })?;
        into_position(json)
    }
}
