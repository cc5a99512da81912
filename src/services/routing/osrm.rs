//! Fetch routes from an OSRM instance using its version 1 route API
use super::{RouteRequest, RouteResponse, RoutingService};
use crate::travel_mode::TravelMode;
use crate::Error;
use city_navigator_derive::FromServiceConfig;
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
}

/// Defines the connection parameters to request routes from an OSRM server
#[derive(Clone, Debug, FromServiceConfig)]
pub struct Osrm {
    base_url: String,
    #[service_config(skip)]
    api_version: &'static str,
    driving_profile: String,
    cycling_profile: String,
    walking_profile: String,
    timeout_secs: u64,
}

impl Osrm {
    pub fn profile(&self, mode: TravelMode) -> &str {
        match mode {
            TravelMode::Driving => &self.driving_profile,
            TravelMode::Cycling => &self.cycling_profile,
            TravelMode::Walking => &self.walking_profile,
        }
    }

    fn request_url(&self, request: &RouteRequest) -> String {
        // Ex.: http://localhost:5000/route/v1/driving/2.3522,48.8566;4.8357,45.764
        format!(
            "{}/route/{}/{}/{},{};{},{}",
            self.base_url.trim_end_matches('/'),
            self.api_version,
            self.profile(request.mode()),
            request.start().longitude(),
            request.start().latitude(),
            request.end().longitude(),
            request.end().latitude(),
        )
    }
}

impl Default for Osrm {
    fn default() -> Self {
        Osrm {
            base_url: "https://router.project-osrm.org".to_string(),
            api_version: "v1",
            driving_profile: TravelMode::Driving.profile().to_string(),
            cycling_profile: TravelMode::Cycling.profile().to_string(),
            walking_profile: TravelMode::Walking.profile().to_string(),
            timeout_secs: 15,
        }
    }
}

impl RoutingService for Osrm {
    fn fetch_route(&self, request: &RouteRequest) -> Result<RouteResponse, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()?;
        let request_url = self.request_url(request);
        debug!(
            "requesting {} route (token={}): {}",
            request.mode(),
            request.token(),
            request_url
        );
        let resp = client
            .get(&request_url)
            .query(&[
                ("overview", "full"),
                ("geometries", "geojson"),
                ("steps", "true"),
            ])
            .send()?;

        let code = resp.status();
        let text = resp.text()?;
        if code.is_success() {
            Ok(serde_json::from_str(&text)?)
        } else {
            // OSRM reports the failure reason in the body, fall back to the raw text
            let msg = match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(err) => match err.message {
                    Some(message) => format!("{}: {}", err.code, message),
                    None => err.code,
                },
                Err(_) => text,
            };
            Err(Error::RequestError(code, msg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FromServiceConfig, ServiceConfig};
    use crate::gps::GeoPoint;

    fn paris_to_lyon(mode: TravelMode) -> RouteRequest {
        RouteRequest::new(
            1,
            GeoPoint::named("Paris", 2.3522, 48.8566),
            GeoPoint::named("Lyon", 4.8357, 45.764),
            mode,
        )
    }

    #[test]
    fn builds_route_url() {
        let osrm = Osrm {
            base_url: "http://localhost:5000/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            osrm.request_url(&paris_to_lyon(TravelMode::Cycling)),
            "http://localhost:5000/route/v1/cycling/2.3522,48.8566;4.8357,45.764"
        );
    }

    #[test]
    fn profiles_come_from_config() {
        let config: ServiceConfig = serde_yaml::from_str(
            "handler: osrm
configuration:
  base_url: http://osrm.local
  walking_profile: foot
  timeout_secs: 5
",
        )
        .unwrap();
        let osrm = Osrm::from_config(&config).unwrap();
        assert_eq!(osrm.profile(TravelMode::Walking), "foot");
        assert_eq!(osrm.profile(TravelMode::Driving), "driving");
        assert_eq!(osrm.timeout_secs, 5);
        assert!(osrm
            .request_url(&paris_to_lyon(TravelMode::Walking))
            .starts_with("http://osrm.local/route/v1/foot/"));
    }

    #[test]
    fn negative_timeout_is_rejected() {
        let config: ServiceConfig =
            serde_yaml::from_str("handler: osrm\nconfiguration:\n  timeout_secs: -1\n").unwrap();
        assert!(matches!(
            Osrm::from_config(&config),
            Err(Error::InvalidConfigurationValue(_))
        ));
    }
}
