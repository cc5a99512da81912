//! Store application configuration that gets read from disk
use crate::gps::GeoPoint;
use crate::map::{Camera, MapSession, MapStyle};
use crate::services::{
    new_geolocation_handler, new_map_rendering_handler, new_routing_handler, new_speech_handler,
    GeolocationProvider, MapRenderingService, RoutingService, SpeechEngine,
};
use crate::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value;
use simplelog::LevelFilter;
use std::collections::HashMap;
use std::io::prelude::*;
use std::iter::Iterator;
use std::str::FromStr;

/// Defines the allowed keys under the services map
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Geolocation,
    MapRendering,
    Routing,
    Speech,
}

/// Type alias for clarity
pub type ServiceParameters = HashMap<String, Value>;

/// Configuration options for a single service of any type
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    handler: String,
    #[serde(default)]
    configuration: ServiceParameters,
}

impl ServiceConfig {
    /// Service configuration that only names a handler, every parameter keeps its default
    pub fn with_handler<S: Into<String>>(handler: S) -> Self {
        ServiceConfig {
            handler: handler.into(),
            configuration: HashMap::new(),
        }
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn parameters(&self) -> impl Iterator<Item = &String> + '_ {
        self.configuration.keys()
    }

    pub fn get_parameter(&self, key: &str) -> Option<&Value> {
        self.configuration.get(key)
    }

    pub fn get_parameter_as_string(&self, key: &str) -> Option<Result<String, Error>> {
        self.configuration.get(key).map(|value| {
            value
                .as_str()
                .ok_or_else(|| self.invalid_value(key, "a string", value))
                .map(|v| v.to_string())
        })
    }

    pub fn get_parameter_as_i64(&self, key: &str) -> Option<Result<i64, Error>> {
        self.configuration.get(key).map(|value| {
            value
                .as_i64()
                .ok_or_else(|| self.invalid_value(key, "an integer", value))
        })
    }

    pub fn get_parameter_as_f64(&self, key: &str) -> Option<Result<f64, Error>> {
        self.configuration.get(key).map(|value| {
            value
                .as_f64()
                .ok_or_else(|| self.invalid_value(key, "a floating point value", value))
        })
    }

    pub fn get_parameter_as_bool(&self, key: &str) -> Option<Result<bool, Error>> {
        self.configuration.get(key).map(|value| {
            value
                .as_bool()
                .ok_or_else(|| self.invalid_value(key, "a boolean", value))
        })
    }

    fn invalid_value(&self, key: &str, expected: &str, value: &Value) -> Error {
        Error::InvalidConfigurationValue(format!(
            "invalid value for {}.{}, expected {}: {:?}",
            &self.handler, key, expected, value
        ))
    }
}

/// Build a service handler from its configuration, implemented with
/// `#[derive(FromServiceConfig)]` on structs that also implement `Default`
pub trait FromServiceConfig: Sized {
    fn from_config(config: &ServiceConfig) -> Result<Self, Error>;
}

/// What the map looks like when the navigator opens
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    styles: Vec<MapStyle>,
    initial_style: Option<String>,
    center: GeoPoint,
    zoom: f64,
    bearing: f64,
    pitch: f64,
}

impl MapConfig {
    pub fn styles(&self) -> &[MapStyle] {
        &self.styles
    }

    pub fn camera(&self) -> Camera {
        Camera::new(self.center.clone(), self.zoom, self.bearing, self.pitch)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            styles: vec![
                MapStyle::new("Streets", "mapbox://styles/mapbox/streets-v12"),
                MapStyle::new("Outdoors", "mapbox://styles/mapbox/outdoors-v12"),
                MapStyle::new("Satellite", "mapbox://styles/mapbox/satellite-streets-v12"),
                MapStyle::new("Dark", "mapbox://styles/mapbox/dark-v11"),
            ],
            initial_style: None,
            center: GeoPoint::new(8.5, 48.5),
            zoom: 4.0,
            bearing: 0.0,
            pitch: 0.0,
        }
    }
}

fn default_cities() -> Vec<GeoPoint> {
    vec![
        GeoPoint::named("Paris", 2.3522, 48.8566),
        GeoPoint::named("Berlin", 13.405, 52.52),
        GeoPoint::named("Madrid", -3.7038, 40.4168),
        GeoPoint::named("Rome", 12.4964, 41.9028),
        GeoPoint::named("Amsterdam", 4.9041, 52.3676),
        GeoPoint::named("Brussels", 4.3517, 50.8503),
        GeoPoint::named("Vienna", 16.3738, 48.2082),
        GeoPoint::named("Prague", 14.4378, 50.0755),
    ]
}

fn default_language() -> String {
    "en-US".to_string()
}

/// Configuration struct that we can create from the config file used
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(
        deserialize_with = "deserialize_level_filter",
        serialize_with = "serialize_level_filter",
        default = "default_level_filter"
    )]
    log_level: LevelFilter,
    /// language tag used to pick a narration voice
    #[serde(default = "default_language")]
    language: String,
    #[serde(default)]
    map: MapConfig,
    #[serde(default = "default_cities")]
    cities: Vec<GeoPoint>,
    #[serde(default)]
    services: HashMap<ServiceType, ServiceConfig>,
}

impl Config {
    pub fn load<T: Read>(source: &mut T) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(source)
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn map(&self) -> &MapConfig {
        &self.map
    }

    pub fn cities(&self) -> &[GeoPoint] {
        &self.cities
    }

    /// Look up a configured city, ignoring case
    pub fn find_city(&self, name: &str) -> Option<&GeoPoint> {
        let name = name.trim();
        self.cities
            .iter()
            .find(|c| c.name().map_or(false, |n| n.eq_ignore_ascii_case(name)))
    }

    /// Resolve a configured city name or a `lon,lat` pair
    pub fn resolve_location(&self, text: &str) -> Result<GeoPoint, Error> {
        match self.find_city(text) {
            Some(city) => Ok(city.clone()),
            None => text.parse(),
        }
    }

    /// Create the map session described by the `map` section
    pub fn map_session(&self) -> Result<MapSession, Error> {
        MapSession::new(
            self.map.styles.clone(),
            self.map.initial_style.as_deref(),
            self.map.camera(),
        )
    }

    pub fn get_routing_handler(&self) -> Result<Box<dyn RoutingService>, Error> {
        match self.services.get(&ServiceType::Routing) {
            Some(cfg) => new_routing_handler(cfg),
            // the public OSRM demo server works without any credentials
            None => new_routing_handler(&ServiceConfig::with_handler("osrm")),
        }
    }

    pub fn get_speech_handler(&self) -> Result<Box<dyn SpeechEngine>, Error> {
        match self.services.get(&ServiceType::Speech) {
            Some(cfg) => new_speech_handler(cfg),
            // use terminal as default narrator since we always have that
            None => new_speech_handler(&ServiceConfig::with_handler("transcript")),
        }
    }

    /// A missing geolocation service means geolocation is unsupported
    pub fn get_geolocation_handler(&self) -> Result<Option<Box<dyn GeolocationProvider>>, Error> {
        self.services
            .get(&ServiceType::Geolocation)
            .map(new_geolocation_handler)
            .transpose()
    }

    pub fn get_map_rendering_handler(&self) -> Result<Box<dyn MapRenderingService>, Error> {
        match self.services.get(&ServiceType::MapRendering) {
            Some(cfg) => new_map_rendering_handler(cfg),
            None => Err(Error::UnknownServiceHandler(
                "no service configuration defined for map rendering".to_string(),
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_level_filter(),
            language: default_language(),
            map: MapConfig::default(),
            cities: default_cities(),
            services: HashMap::new(),
        }
    }
}

fn deserialize_level_filter<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
where
    D: Deserializer<'de>,
{
    let buf = String::deserialize(deserializer)?;
    LevelFilter::from_str(&buf)
        .map_err(|_| serde::de::Error::custom(format!("invalid level value: {}", buf)))
}

fn serialize_level_filter<S>(level: &LevelFilter, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&level.to_string())
}

fn default_level_filter() -> LevelFilter {
    LevelFilter::Info
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = "
log_level: debug
language: fr-FR
map:
  styles:
    - name: Bright
      url: http://localhost:8080/styles/osm-bright/style.json
    - name: Basic
      url: http://localhost:8080/styles/basic/style.json
  initial_style: basic
  zoom: 9
cities:
  - name: Lyon
    longitude: 4.8357
    latitude: 45.764
services:
  routing:
    handler: osrm
    configuration:
      base_url: http://localhost:5000
      walking_profile: foot
  geolocation:
    handler: fixed
    configuration:
      longitude: 4.8
      latitude: 45.7
  map_rendering:
    handler: openmaptiles
    configuration:
      stroke_width: 4
";

    fn config() -> Config {
        Config::load(&mut CONFIG.as_bytes()).unwrap()
    }

    #[test]
    fn loads_every_section() {
        let config = config();
        assert_eq!(config.log_level(), LevelFilter::Debug);
        assert_eq!(config.language(), "fr-FR");
        assert_eq!(config.cities().len(), 1);
        assert_eq!(config.map().styles().len(), 2);
        assert_eq!(config.map().camera().zoom(), 9.0);
        let session = config.map_session().unwrap();
        assert_eq!(session.style().name(), "Basic");
        assert!(config.get_routing_handler().is_ok());
        assert!(config.get_speech_handler().is_ok());
        assert!(config.get_geolocation_handler().unwrap().is_some());
        assert!(config.get_map_rendering_handler().is_ok());
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = Config::load(&mut "{}".as_bytes()).unwrap();
        assert_eq!(config.log_level(), LevelFilter::Info);
        assert_eq!(config.language(), "en-US");
        assert_eq!(config.cities().len(), 8);
        assert_eq!(config.map_session().unwrap().style().name(), "Streets");
        assert!(config.get_geolocation_handler().unwrap().is_none());
        assert!(matches!(
            config.get_map_rendering_handler(),
            Err(Error::UnknownServiceHandler(_))
        ));
    }

    #[test]
    fn resolves_city_names_and_coordinates() {
        let config = Config::default();
        assert_eq!(
            config.resolve_location(" berlin ").unwrap(),
            GeoPoint::named("Berlin", 13.405, 52.52)
        );
        assert_eq!(
            config.resolve_location("2.5,48.1").unwrap(),
            GeoPoint::new(2.5, 48.1)
        );
        assert!(matches!(
            config.resolve_location("Atlantis"),
            Err(Error::UnknownLocation(_))
        ));
    }

    #[test]
    fn unknown_handler_is_rejected() {
        let config = Config::load(
            &mut "services:\n  speech:\n    handler: telepathy\n".as_bytes(),
        )
        .unwrap();
        assert!(matches!(
            config.get_speech_handler(),
            Err(Error::UnknownServiceHandler(_))
        ));
    }

    #[test]
    fn wrongly_typed_parameters_are_errors() {
        let config: ServiceConfig = serde_yaml::from_str(
            "handler: osrm\nconfiguration:\n  timeout_secs: soon\n  base_url: http://x\n",
        )
        .unwrap();
        assert!(config.get_parameter_as_string("base_url").unwrap().is_ok());
        assert!(matches!(
            config.get_parameter_as_i64("timeout_secs"),
            Some(Err(Error::InvalidConfigurationValue(_)))
        ));
        assert!(config.get_parameter_as_bool("missing").is_none());
        assert!(new_routing_handler(&config).is_err());
    }
}
