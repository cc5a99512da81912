//! Module with GPS specific structures
use crate::Error;
use serde::{Deserialize, Serialize};
use std::char;
use std::fmt;
use std::str::FromStr;

/// Stores a single geospatial point, optionally tagged with a place name
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// longitude coordinate in degrees
    longitude: f64,
    /// latitude coordinate in degrees
    latitude: f64,
    /// human readable name, e.g. a city
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl GeoPoint {
    /// Create an unnamed point from degrees
    pub fn new(longitude: f64, latitude: f64) -> Self {
        GeoPoint {
            longitude,
            latitude,
            name: None,
        }
    }

    /// Create a point tagged with a place name
    pub fn named<S: Into<String>>(name: S, longitude: f64, latitude: f64) -> Self {
        GeoPoint {
            longitude,
            latitude,
            name: Some(name.into()),
        }
    }

    /// Build a point from a `[longitude, latitude]` pair as used by GeoJSON
    pub fn from_lon_lat(pair: [f64; 2]) -> Self {
        GeoPoint::new(pair[0], pair[1])
    }

    /// Return longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Return latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{:.5}, {:.5}", self.latitude, self.longitude),
        }
    }
}

impl FromStr for GeoPoint {
    type Err = Error;

    /// Parse a `longitude,latitude` pair
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(str::trim);
        let (lon, lat) = match (parts.next(), parts.next(), parts.next()) {
            (Some(lon), Some(lat), None) => (lon, lat),
            _ => return Err(Error::UnknownLocation(s.to_string())),
        };
        let longitude: f64 = lon
            .parse()
            .map_err(|_| Error::UnknownLocation(s.to_string()))?;
        let latitude: f64 = lat
            .parse()
            .map_err(|_| Error::UnknownLocation(s.to_string()))?;
        if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::UnknownLocation(s.to_string()));
        }
        Ok(GeoPoint::new(longitude, latitude))
    }
}

/// Encodes a slice of coordinates into Google Encoded Polyline format.
///
/// This code was extracted and simplified for our use case from:
/// https://github.com/georust/polyline
/// https://developers.google.com/maps/documentation/utilities/polylinealgorithm
pub fn encode_coordinates(coordinates: &[GeoPoint]) -> Result<String, String> {
    let mut output = String::new();
    let mut b = (0, 0);

    for a in coordinates {
        let a = (scale(a.latitude), scale(a.longitude));
        output.push_str(&encode(a.0, b.0)?);
        output.push_str(&encode(a.1, b.1)?);
        b = a;
    }

    Ok(output)
}

/// Scale a floating point value into an integer at the given precision
#[inline]
fn scale(n: f64) -> i64 {
    static FACTOR: f64 = 100_000.0; // use 5 digits of precision
    (FACTOR * n).round() as i64
}

/// Encode a single latitude or longitude value into the polyline format
fn encode(current: i64, previous: i64) -> Result<String, String> {
    let mut coordinate = (current - previous) << 1;
    if (current - previous) < 0 {
        coordinate = !coordinate;
    }
    let mut output = String::new();
    while coordinate >= 0x20 {
        let from_char = char::from_u32(((0x20 | (coordinate & 0x1f)) + 63) as u32)
            .ok_or("Couldn't convert character")?;
        output.push(from_char);
        coordinate >>= 5;
    }
    let from_char = char::from_u32((coordinate + 63) as u32).ok_or("Couldn't convert character")?;
    output.push(from_char);
    Ok(output)
}
