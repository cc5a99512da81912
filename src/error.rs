//! Defines the general error type for the crate and various conversions into it
use crate::services::geolocation::GeolocationError;
use std::convert;
use std::fmt;

/// General error type for the crate
#[derive(Debug)]
pub enum Error {
    Geolocation(GeolocationError),
    Http(reqwest::Error),
    InvalidConfigurationValue(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    MapUnavailable(String),
    Other(String),
    RequestError(reqwest::StatusCode, String),
    RouteUnavailable(String),
    UnknownLocation(String),
    UnknownServiceHandler(String),
    UnknownStyle(String),
    Yaml(serde_yaml::Error),
}

impl convert::From<GeolocationError> for Error {
    fn from(err: GeolocationError) -> Error {
        Error::Geolocation(err)
    }
}

impl convert::From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Error::Http(err)
    }
}

impl convert::From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl convert::From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl convert::From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Error {
        Error::Yaml(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Geolocation(e) => write!(f, "Could not determine your location: {}", e),
            Error::Http(e) => write!(f, "{}", e),
            Error::InvalidConfigurationValue(msg) => write!(f, "{}", msg),
            Error::Io(e) => write!(f, "{}", e),
            Error::Json(e) => write!(f, "Malformed service response: {}", e),
            Error::MapUnavailable(msg) => write!(f, "Map is unavailable: {}", msg),
            Error::Other(msg) => write!(f, "{}", msg),
            Error::RequestError(code, msg) => {
                write!(f, "Request failed with code: {} - {}", code, msg)
            }
            Error::RouteUnavailable(reason) => write!(f, "No route available: {}", reason),
            Error::UnknownLocation(name) => write!(
                f,
                "'{}' is neither a known city nor a 'longitude,latitude' pair",
                name
            ),
            Error::UnknownServiceHandler(msg) => write!(f, "{}", msg),
            Error::UnknownStyle(name) => write!(f, "No map style named '{}'", name),
            Error::Yaml(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {}
