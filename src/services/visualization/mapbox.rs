//! Use the MapBox static images API to draw a map session
use super::MapRenderingService;
use crate::gps::encode_coordinates;
use crate::map::{MapSession, MarkerDescriptor, MarkerIcon};
use crate::Error;
use city_navigator_derive::FromServiceConfig;
use log::warn;
use reqwest::blocking::Client;

/// Defines parameters to interact with the MapBox API
#[derive(Debug, FromServiceConfig)]
pub struct MapBox {
    base_url: String,
    api_version: String,
    /// fallback account when the session style isn't a mapbox:// URL
    username: String,
    /// fallback style when the session style isn't a mapbox:// URL
    style: String,
    image_width: u32,
    image_height: u32,
    marker_style: String,
    city_color: String,
    start_color: String,
    end_color: String,
    user_color: String,
    stroke_color: String,
    stroke_width: u32,
    stroke_opacity: f32,
    /// let the API frame the overlays instead of using the session camera
    auto_fit: bool,
    access_token: String,
}

impl MapBox {
    /// Split a `mapbox://styles/{username}/{style}` URL
    fn style_path<'a>(&'a self, url: &'a str) -> (&'a str, &'a str) {
        let parts: Vec<&str> = url
            .strip_prefix("mapbox://styles/")
            .map(|rest| rest.split('/').collect())
            .unwrap_or_default();
        match parts.as_slice() {
            [username, style] if !username.is_empty() && !style.is_empty() => (*username, *style),
            _ => {
                warn!(
                    "style URL '{}' is not a mapbox style, using {}/{}",
                    url, self.username, self.style
                );
                (self.username.as_str(), self.style.as_str())
            }
        }
    }

    fn marker_overlay(&self, marker: &MarkerDescriptor) -> String {
        let (label, color) = match marker.icon() {
            MarkerIcon::City => (None, &self.city_color),
            MarkerIcon::Start => (Some("a"), &self.start_color),
            MarkerIcon::End => (Some("b"), &self.end_color),
            MarkerIcon::UserLocation => (Some("marker"), &self.user_color),
        };
        let pin = match label {
            Some(label) => format!("pin-{}-{}+{}", self.marker_style, label, color),
            None => format!("pin-{}+{}", self.marker_style, color),
        };
        format!(
            "{}({},{})",
            pin,
            marker.position().longitude(),
            marker.position().latitude()
        )
    }

    fn request_url(&self, session: &MapSession) -> Result<String, Error> {
        let mut overlays: Vec<String> = session
            .markers()
            .iter()
            .map(|m| self.marker_overlay(m))
            .collect();
        if let Some(route) = session.route() {
            let encoded_path = encode_coordinates(route.path()).map_err(Error::Other)?;
            let encoded_path: String =
                form_urlencoded::byte_serialize(encoded_path.as_bytes()).collect();
            overlays.push(format!(
                "path-{}+{}-{}({})",
                self.stroke_width, self.stroke_color, self.stroke_opacity, encoded_path
            ));
        }

        let camera = session.camera();
        let position = if self.auto_fit && !overlays.is_empty() {
            "auto".to_string()
        } else {
            format!(
                "{},{},{:.2},{:.0},{:.0}",
                camera.center().longitude(),
                camera.center().latitude(),
                camera.zoom(),
                camera.bearing(),
                camera.pitch()
            )
        };
        let overlay = if overlays.is_empty() {
            String::new()
        } else {
            format!("{}/", overlays.join(","))
        };

        let (username, style) = self.style_path(session.style().url());
        let url = format!(
            "{}/styles/{}/{}/{}/static/{}{}/{}x{}",
            self.base_url,
            self.api_version,
            username,
            style,
            overlay,
            position,
            self.image_width,
            self.image_height,
        );

        // mapbox has a URL limit of 8192 bytes, the access_token=[..] part in the query takes up
        // around 100 bytes by itself
        if url.len() > 8192 {
            warn!(
                "URL length exceeds 8KB due to a long route, request may fail (size={:.2}KB).",
                url.len() as f32 / 1024.0
            );
        }

        Ok(url)
    }
}

impl Default for MapBox {
    fn default() -> Self {
        MapBox {
            base_url: "https://api.mapbox.com".to_string(),
            api_version: "v1".to_string(),
            username: "mapbox".to_string(),
            style: "streets-v12".to_string(),
            image_width: 1280,
            image_height: 1280,
            marker_style: "l".to_string(),
            city_color: "555555".to_string(),
            start_color: "2e7d32".to_string(),
            end_color: "c62828".to_string(),
            user_color: "1565c0".to_string(),
            stroke_color: "3887be".to_string(),
            stroke_width: 5,
            stroke_opacity: 0.75,
            auto_fit: false,
            access_token: String::new(),
        }
    }
}

impl MapRenderingService for MapBox {
    fn render(&self, session: &MapSession) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        // request image data
        let client = Client::new();
        let request_url = self.request_url(session)?;
        let resp = client
            .get(&request_url)
            .query(&[("access_token", &self.access_token)])
            .send()?;
        if resp.status().is_success() {
            // return image data
            match resp.bytes() {
                Ok(data) => Ok(data.into_iter().collect()),
                Err(e) => Err(Box::new(e)),
            }
        } else {
            let code = resp.status();
            Err(Box::new(Error::RequestError(
                code,
                "MapBox drawing failed".to_string(),
            )))
        }
    }
}
