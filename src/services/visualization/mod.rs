//! Render a map session (style, camera, markers and route) to an image
use crate::config::{FromServiceConfig, ServiceConfig};
use crate::map::MapSession;
use crate::Error;
mod mapbox;
pub use mapbox::MapBox;
mod openmaptiles;
pub use openmaptiles::OpenMapTiles;

/// trait that defines how a map session is turned into image data
pub trait MapRenderingService {
    fn render(&self, session: &MapSession) -> Result<Vec<u8>, Box<dyn std::error::Error>>;
}

pub fn new_map_rendering_handler(
    config: &ServiceConfig,
) -> Result<Box<dyn MapRenderingService>, Error> {
    match config.handler() {
        "mapbox" => Ok(Box::new(MapBox::from_config(config)?)),
        "openmaptiles" => Ok(Box::new(OpenMapTiles::from_config(config)?)),
        _ => Err(Error::UnknownServiceHandler(format!(
            "no map rendering handler exists for: {}",
            config.handler()
        ))),
    }
}
