//! Determine the user's current position from an external location source
use crate::config::{FromServiceConfig, ServiceConfig};
use crate::gps::GeoPoint;
use crate::Error;
use std::fmt;
use std::time::Duration;
mod fixed;
pub use fixed::FixedLocation;
mod ip_api;
pub use ip_api::IpApi;

/// Constraints for a single position request
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionOptions {
    /// give up after this long
    pub timeout: Duration,
    /// oldest cached position that may be reused, zero forces a fresh fix
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        PositionOptions {
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(0),
        }
    }
}

/// Why a position could not be determined, each variant carries text shown to the user
#[derive(Clone, Debug, PartialEq)]
pub enum GeolocationError {
    Unsupported,
    PermissionDenied(String),
    Timeout,
    Unavailable(String),
}

impl GeolocationError {
    pub fn reason(&self) -> String {
        match self {
            GeolocationError::Unsupported => {
                "geolocation is not supported, configure a geolocation service".to_string()
            }
            GeolocationError::PermissionDenied(msg) => format!("permission denied: {}", msg),
            GeolocationError::Timeout => "timed out waiting for a position".to_string(),
            GeolocationError::Unavailable(msg) => format!("position unavailable: {}", msg),
        }
    }
}

impl fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason())
    }
}

impl std::error::Error for GeolocationError {}

/// trait that defines how a one-shot position fix is obtained
pub trait GeolocationProvider {
    fn current_position(&self, options: &PositionOptions) -> Result<GeoPoint, GeolocationError>;
}

pub fn new_geolocation_handler(
    config: &ServiceConfig,
) -> Result<Box<dyn GeolocationProvider>, Error> {
    match config.handler() {
        "fixed" => Ok(Box::new(FixedLocation::from_config(config)?)),
        "ip_api" => Ok(Box::new(IpApi::from_config(config)?)),
        _ => Err(Error::UnknownServiceHandler(format!(
            "no geolocation handler exists for: {}",
            config.handler()
        ))),
    }
}
