//! Request routes between two points from an external routing service
use crate::config::{FromServiceConfig, ServiceConfig};
use crate::gps::GeoPoint;
use crate::travel_mode::TravelMode;
use crate::Error;
use serde::Deserialize;
mod osrm;
pub use osrm::Osrm;

/// A single routing request for a (start, end, mode) triple.
///
/// The token identifies the request generation that issued it so a late response can be
/// matched against the latest request before it is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteRequest {
    token: u64,
    start: GeoPoint,
    end: GeoPoint,
    mode: TravelMode,
}

impl RouteRequest {
    pub fn new(token: u64, start: GeoPoint, end: GeoPoint, mode: TravelMode) -> Self {
        RouteRequest {
            token,
            start,
            end,
            mode,
        }
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn start(&self) -> &GeoPoint {
        &self.start
    }

    pub fn end(&self) -> &GeoPoint {
        &self.end
    }

    pub fn mode(&self) -> TravelMode {
        self.mode
    }
}

/// Top level body returned by the routing service
#[derive(Clone, Debug, Deserialize)]
pub struct RouteResponse {
    /// "Ok" on success, otherwise an error code such as "NoRoute"
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<RouteCandidate>,
}

impl RouteResponse {
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RouteCandidate {
    /// meters
    pub distance: f64,
    /// seconds
    pub duration: f64,
    pub geometry: LineString,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

/// GeoJSON line geometry, coordinates are `[longitude, latitude]`
#[derive(Clone, Debug, Deserialize)]
pub struct LineString {
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RouteLeg {
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RouteStep {
    pub distance: f64,
    pub duration: f64,
    #[serde(default)]
    pub name: String,
    pub maneuver: RawManeuver,
    #[serde(default)]
    pub geometry: Option<LineString>,
    #[serde(default)]
    pub instruction: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawManeuver {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub modifier: Option<String>,
    pub location: [f64; 2],
    #[serde(default)]
    pub exit: Option<u32>,
    #[serde(default)]
    pub instruction: Option<String>,
}

/// trait that defines how a route is fetched for a pair of points and a travel mode
pub trait RoutingService: Send + Sync {
    /// Issue a single request for full geometry and step level detail
    fn fetch_route(&self, request: &RouteRequest) -> Result<RouteResponse, Error>;
}

pub fn new_routing_handler(config: &ServiceConfig) -> Result<Box<dyn RoutingService>, Error> {
    match config.handler() {
        "osrm" => Ok(Box::new(Osrm::from_config(config)?)),
        _ => Err(Error::UnknownServiceHandler(format!(
            "no routing handler exists for: {}",
            config.handler()
        ))),
    }
}
