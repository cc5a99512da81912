//! State of the map surface: style, camera, markers and the drawn route
use crate::gps::GeoPoint;
use crate::travel_mode::TravelMode;
use crate::Error;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Largest zoom level rendering services accept
pub const MAX_ZOOM: f64 = 22.0;
/// Steepest camera tilt in degrees
pub const MAX_PITCH: f64 = 60.0;

/// A named map style
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapStyle {
    name: String,
    url: String,
}

impl MapStyle {
    pub fn new<S: Into<String>, U: Into<String>>(name: S, url: U) -> Self {
        MapStyle {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Where the map is looking
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    center: GeoPoint,
    zoom: f64,
    /// degrees clockwise from north, [0, 360)
    bearing: f64,
    /// degrees away from straight down
    pitch: f64,
}

impl Camera {
    pub fn new(center: GeoPoint, zoom: f64, bearing: f64, pitch: f64) -> Self {
        Camera {
            center,
            zoom: zoom.max(0.0).min(MAX_ZOOM),
            bearing: bearing.rem_euclid(360.0),
            pitch: pitch.max(0.0).min(MAX_PITCH),
        }
    }

    pub fn center(&self) -> &GeoPoint {
        &self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn bearing(&self) -> f64 {
        self.bearing
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }
}

/// Visual variant of a marker
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerIcon {
    City,
    Start,
    End,
    UserLocation,
}

/// Declarative description of a marker, rendering is left to the map surface
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerDescriptor {
    position: GeoPoint,
    icon: MarkerIcon,
    label: String,
}

impl MarkerDescriptor {
    pub fn new(position: GeoPoint, icon: MarkerIcon, label: String) -> Self {
        MarkerDescriptor {
            position,
            icon,
            label,
        }
    }

    /// Marker for a point, labelled with its name when it has one
    pub fn for_point(position: &GeoPoint, icon: MarkerIcon) -> Self {
        let label = match (position.name(), icon) {
            (Some(name), _) => name.to_string(),
            (None, MarkerIcon::Start) => "A".to_string(),
            (None, MarkerIcon::End) => "B".to_string(),
            (None, MarkerIcon::UserLocation) => "You".to_string(),
            (None, MarkerIcon::City) => position.to_string(),
        };
        MarkerDescriptor::new(position.clone(), icon, label)
    }

    pub fn position(&self) -> &GeoPoint {
        &self.position
    }

    pub fn icon(&self) -> MarkerIcon {
        self.icon
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// The line layer that draws the current route
#[derive(Clone, Debug, PartialEq)]
pub struct RouteLayer {
    mode: TravelMode,
    path: Vec<GeoPoint>,
}

impl RouteLayer {
    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    pub fn path(&self) -> &[GeoPoint] {
        &self.path
    }
}

/// Explicit handle to one map surface, owned by the navigator and handed to whatever needs to
/// move the camera or change what is drawn.
#[derive(Clone, Debug)]
pub struct MapSession {
    styles: Vec<MapStyle>,
    style: usize,
    camera: Camera,
    markers: Vec<MarkerDescriptor>,
    route: Option<RouteLayer>,
}

impl MapSession {
    /// Create a session showing `initial_style`, or the first style when none is given
    pub fn new(
        styles: Vec<MapStyle>,
        initial_style: Option<&str>,
        camera: Camera,
    ) -> Result<Self, Error> {
        if styles.is_empty() {
            return Err(Error::MapUnavailable("no map styles configured".to_string()));
        }
        let style = match initial_style {
            Some(name) => find_style(&styles, name)?,
            None => 0,
        };
        info!("map session created with style '{}'", styles[style].name());
        Ok(MapSession {
            styles,
            style,
            camera,
            markers: Vec::new(),
            route: None,
        })
    }

    pub fn styles(&self) -> &[MapStyle] {
        &self.styles
    }

    pub fn style(&self) -> &MapStyle {
        &self.styles[self.style]
    }

    /// Switch to the style called `name` (case insensitive)
    pub fn set_style(&mut self, name: &str) -> Result<&MapStyle, Error> {
        self.style = find_style(&self.styles, name)?;
        debug!("map style set to '{}'", self.style().name());
        Ok(self.style())
    }

    /// Switch to the style after the current one, wrapping around
    pub fn cycle_style(&mut self) -> &MapStyle {
        self.style = (self.style + 1) % self.styles.len();
        self.style()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Center on `center`, keeping bearing and pitch
    pub fn fly_to(&mut self, center: GeoPoint, zoom: f64) {
        self.camera = Camera::new(center, zoom, self.camera.bearing, self.camera.pitch);
    }

    /// Center the camera on the bounding box of `points` and pick a zoom that fits it
    pub fn fit_to(&mut self, points: &[GeoPoint]) {
        let first = match points.first() {
            Some(p) => p,
            None => return,
        };
        let mut min_lat = first.latitude();
        let mut max_lat = first.latitude();
        let mut min_lon = first.longitude();
        let mut max_lon = first.longitude();
        for p in points {
            min_lat = min_lat.min(p.latitude());
            max_lat = max_lat.max(p.latitude());
            min_lon = min_lon.min(p.longitude());
            max_lon = max_lon.max(p.longitude());
        }
        let center = GeoPoint::new((min_lon + max_lon) / 2.0, (min_lat + max_lat) / 2.0);
        // a world wide span fits at zoom 0, every halving of the span adds a level
        let span = (max_lon - min_lon).max((max_lat - min_lat) * 2.0);
        let zoom = if span > 0.0 {
            (360.0 / span).log2().floor()
        } else {
            14.0
        };
        self.fly_to(center, zoom);
    }

    pub fn markers(&self) -> &[MarkerDescriptor] {
        &self.markers
    }

    pub fn add_marker(&mut self, marker: MarkerDescriptor) {
        self.markers.push(marker);
    }

    /// Replace every marker of kind `icon` with `markers`
    pub fn set_markers(&mut self, icon: MarkerIcon, markers: Vec<MarkerDescriptor>) {
        self.markers.retain(|m| m.icon != icon);
        self.markers.extend(markers);
    }

    /// Closest marker of kind `icon` within `tolerance` degrees of `point`
    pub fn marker_near(
        &self,
        point: &GeoPoint,
        icon: MarkerIcon,
        tolerance: f64,
    ) -> Option<&MarkerDescriptor> {
        let distance = |m: &MarkerDescriptor| {
            let dx = m.position.longitude() - point.longitude();
            let dy = m.position.latitude() - point.latitude();
            (dx * dx + dy * dy).sqrt()
        };
        self.markers
            .iter()
            .filter(|m| m.icon == icon && distance(*m) <= tolerance)
            .min_by(|a, b| {
                distance(*a)
                    .partial_cmp(&distance(*b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    pub fn route(&self) -> Option<&RouteLayer> {
        self.route.as_ref()
    }

    pub fn draw_route(&mut self, mode: TravelMode, path: Vec<GeoPoint>) {
        self.route = Some(RouteLayer {
            mode,
            path,
        });
    }

    pub fn clear_route(&mut self) {
        self.route = None;
    }
}

fn find_style(styles: &[MapStyle], name: &str) -> Result<usize, Error> {
    styles
        .iter()
        .position(|s| s.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::UnknownStyle(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> MapSession {
        MapSession::new(
            vec![
                MapStyle::new("Streets", "mapbox://styles/mapbox/streets-v12"),
                MapStyle::new("Dark", "mapbox://styles/mapbox/dark-v11"),
            ],
            None,
            Camera::new(GeoPoint::new(2.35, 48.85), 5.0, 0.0, 0.0),
        )
        .unwrap()
    }

    #[test]
    fn requires_at_least_one_style() {
        let camera = Camera::new(GeoPoint::new(0.0, 0.0), 2.0, 0.0, 0.0);
        assert!(matches!(
            MapSession::new(Vec::new(), None, camera.clone()),
            Err(Error::MapUnavailable(_))
        ));
        let styles = vec![MapStyle::new("Streets", "x")];
        assert!(matches!(
            MapSession::new(styles, Some("Satellite"), camera),
            Err(Error::UnknownStyle(_))
        ));
    }

    #[test]
    fn switches_styles_by_name() {
        let mut map = session();
        assert_eq!(map.set_style("dark").unwrap().name(), "Dark");
        assert!(map.set_style("Neon").is_err());
        assert_eq!(map.style().name(), "Dark");
        assert_eq!(map.cycle_style().name(), "Streets");
    }

    #[test]
    fn camera_values_are_clamped() {
        let camera = Camera::new(GeoPoint::new(0.0, 0.0), 30.0, -90.0, 85.0);
        assert_eq!(camera.zoom(), MAX_ZOOM);
        assert_eq!(camera.bearing(), 270.0);
        assert_eq!(camera.pitch(), MAX_PITCH);
    }

    #[test]
    fn fits_camera_to_points() {
        let mut map = session();
        map.fit_to(&[GeoPoint::new(2.0, 48.0), GeoPoint::new(4.0, 46.0)]);
        assert_eq!(map.camera().center(), &GeoPoint::new(3.0, 47.0));
        // the latitude span counts double: log2(360 / 4) = 6.49
        assert_eq!(map.camera().zoom(), 6.0);
    }

    #[test]
    fn markers_are_replaced_by_kind() {
        let mut map = session();
        map.add_marker(MarkerDescriptor::for_point(
            &GeoPoint::named("Paris", 2.35, 48.85),
            MarkerIcon::City,
        ));
        map.set_markers(
            MarkerIcon::Start,
            vec![MarkerDescriptor::for_point(&GeoPoint::new(1.0, 1.0), MarkerIcon::Start)],
        );
        map.set_markers(
            MarkerIcon::Start,
            vec![MarkerDescriptor::for_point(&GeoPoint::new(2.0, 2.0), MarkerIcon::Start)],
        );
        assert_eq!(map.markers().len(), 2);
        assert_eq!(map.markers()[1].label(), "A");
        map.set_markers(MarkerIcon::Start, Vec::new());
        assert_eq!(map.markers().len(), 1);
        assert_eq!(map.markers()[0].label(), "Paris");
    }

    #[test]
    fn finds_nearest_marker_within_tolerance() {
        let mut map = session();
        for (name, lon, lat) in [("Paris", 2.35, 48.85), ("Versailles", 2.13, 48.8)].iter() {
            map.add_marker(MarkerDescriptor::for_point(
                &GeoPoint::named(*name, *lon, *lat),
                MarkerIcon::City,
            ));
        }
        let hit = map.marker_near(&GeoPoint::new(2.3, 48.84), MarkerIcon::City, 0.2);
        assert_eq!(hit.map(|m| m.label()), Some("Paris"));
        assert!(map
            .marker_near(&GeoPoint::new(5.0, 45.0), MarkerIcon::City, 0.2)
            .is_none());
    }
}
