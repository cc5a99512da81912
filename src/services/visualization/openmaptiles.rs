//! Use an instance of open map tiles to draw a map session
use super::MapRenderingService;
use crate::map::MapSession;
use crate::Error;
use city_navigator_derive::FromServiceConfig;
use log::debug;
use reqwest::blocking::Client;

/// Defines connection parameters to request static maps from an OpenMapTiles server
#[derive(Debug, FromServiceConfig)]
pub struct OpenMapTiles {
    base_url: String,
    /// used when the session style doesn't point at a `/styles/{id}/style.json` document
    style: String,
    image_width: u32,
    image_height: u32,
    image_format: String,
    stroke_color: String,
    stroke_width: u32,
}

impl OpenMapTiles {
    /// Style id from a `{server}/styles/{id}/style.json` URL
    fn style_id<'a>(&'a self, url: &'a str) -> &'a str {
        url.strip_suffix("/style.json")
            .and_then(|rest| rest.rsplit('/').next())
            .filter(|id| !id.is_empty())
            .unwrap_or(self.style.as_str())
    }

    fn request_url(&self, session: &MapSession) -> String {
        // Ex.: http://localhost:8080/styles/osm-bright/static/2.35,48.85,11@0,0/1800x1200.png
        let camera = session.camera();
        format!(
            "{}/styles/{}/static/{},{},{:.2}@{:.0},{:.0}/{}x{}.{}",
            self.base_url,
            self.style_id(session.style().url()),
            camera.center().longitude(),
            camera.center().latitude(),
            camera.zoom(),
            camera.bearing(),
            camera.pitch(),
            self.image_width,
            self.image_height,
            self.image_format
        )
    }

    /// The route is drawn as a `lon,lat|lon,lat` path, markers are not supported by the server
    fn query(&self, session: &MapSession) -> Vec<(&'static str, String)> {
        let route = match session.route() {
            Some(route) if !route.path().is_empty() => route,
            _ => return Vec::new(),
        };
        let path = route
            .path()
            .iter()
            .map(|p| format!("{},{}", p.longitude(), p.latitude()))
            .collect::<Vec<String>>()
            .join("|");
        vec![
            ("stroke", self.stroke_color.clone()),
            ("width", self.stroke_width.to_string()),
            ("path", path),
        ]
    }
}

impl Default for OpenMapTiles {
    fn default() -> Self {
        OpenMapTiles {
            base_url: "http://localhost:8080".to_string(),
            style: "osm-bright".to_string(),
            image_width: 1800,
            image_height: 1200,
            image_format: "png".to_string(), // other formats are available but the list is short,
            stroke_color: "red".to_string(),
            stroke_width: 3,
        }
    }
}

impl MapRenderingService for OpenMapTiles {
    fn render(&self, session: &MapSession) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        if !session.markers().is_empty() {
            debug!(
                "OpenMapTiles does not draw markers, skipping {}",
                session.markers().len()
            );
        }

        // request image data
        let client = Client::new();
        let request_url = self.request_url(session);
        let resp = client
            .get(&request_url)
            .query(&self.query(session))
            .send()?;
        if resp.status().is_success() {
            // return image data
            match resp.bytes() {
                Ok(data) => Ok(data.to_vec()),
                Err(e) => Err(Box::new(e)),
            }
        } else {
            let code = resp.status();
            Err(Box::new(Error::RequestError(
                code,
                "OpenMapTiles drawing failed".to_string(),
            )))
        }
    }
}
