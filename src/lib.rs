use std::path::PathBuf;

pub mod cli;
pub mod config;
mod error;
pub use error::Error;
pub mod format;
pub mod gps;
pub use gps::GeoPoint;
pub mod itinerary;
pub use itinerary::{compute_itinerary, ManeuverStep, RouteItinerary};
pub mod maneuver;
pub mod map;
pub use map::MapSession;
pub mod narration;
pub mod planner;
pub use planner::RoutePlanner;
pub mod services;
#[cfg(test)]
mod test_utils;
pub mod travel_mode;
pub use travel_mode::TravelMode;
pub mod widget;

static APP_DIR_NAME: &str = "city-navigator";
static CONFIG_FILE_NAME: &str = "config.yml";
static LOG_FILE_NAME: &str = "city-navigator.log";

/// Default location of the configuration file
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_default()
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Where the interactive navigator writes its log so the terminal stays clean
pub fn log_path() -> PathBuf {
    dirs::data_dir().unwrap_or_default().join(LOG_FILE_NAME)
}
