//! The navigator: turns user events into planner, map and narration updates
use crate::gps::GeoPoint;
use crate::itinerary::{compute_itinerary, ManeuverStep, RouteItinerary};
use crate::map::{MapSession, MarkerDescriptor, MarkerIcon};
use crate::narration::{Narration, NarrationService};
use crate::planner::{Completion, RoutePlanner, RouteStatus};
use crate::services::geolocation::{GeolocationError, GeolocationProvider, PositionOptions};
use crate::services::routing::{RouteRequest, RoutingService};
use crate::travel_mode::TravelMode;
use crate::Error;
use log::{error, info, warn};
use std::fmt;
use std::sync::Arc;

/// Zoom used when centering on the user's position
const LOCATE_ZOOM: f64 = 13.0;
/// A map click this close to a city marker (in degrees) counts as a click on the marker
const MARKER_CLICK_TOLERANCE: f64 = 0.05;

/// Transient, dismissable message shown over the navigator
#[derive(Clone, Debug, PartialEq)]
pub enum Feedback {
    RouteUnavailable(String),
    Geolocation(String),
    MapUnavailable(String),
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::RouteUnavailable(reason) => write!(f, "Route unavailable: {}", reason),
            Feedback::Geolocation(reason) => write!(f, "Location unavailable: {}", reason),
            Feedback::MapUnavailable(reason) => write!(f, "Map unavailable: {}", reason),
        }
    }
}

/// Owns every piece of navigator state. Methods that change the route triple return the
/// request to send; the caller decides whether to run it inline with `compute` or on a
/// worker and hand the result back through `complete`.
pub struct NavigatorWidget {
    map: Option<MapSession>,
    planner: RoutePlanner,
    narration: NarrationService,
    cities: Vec<GeoPoint>,
    routing: Arc<dyn RoutingService>,
    geolocation: Option<Box<dyn GeolocationProvider>>,
    feedback: Option<Feedback>,
}

impl NavigatorWidget {
    /// A failed map session is logged and replaced by a placeholder, the rest keeps working
    pub fn new(
        map: Result<MapSession, Error>,
        cities: Vec<GeoPoint>,
        routing: Arc<dyn RoutingService>,
        narration: NarrationService,
        geolocation: Option<Box<dyn GeolocationProvider>>,
    ) -> Self {
        let mut feedback = None;
        let map = match map {
            Ok(mut session) => {
                let markers = cities
                    .iter()
                    .map(|c| MarkerDescriptor::for_point(c, MarkerIcon::City))
                    .collect();
                session.set_markers(MarkerIcon::City, markers);
                Some(session)
            }
            Err(e) => {
                error!("map initialization failed: {}", e);
                feedback = Some(Feedback::MapUnavailable(e.to_string()));
                None
            }
        };
        NavigatorWidget {
            map,
            planner: RoutePlanner::default(),
            narration,
            cities,
            routing,
            geolocation,
            feedback,
        }
    }

    pub fn map(&self) -> Option<&MapSession> {
        self.map.as_ref()
    }

    pub fn planner(&self) -> &RoutePlanner {
        &self.planner
    }

    pub fn itinerary(&self) -> Option<&RouteItinerary> {
        self.planner.itinerary()
    }

    pub fn cities(&self) -> &[GeoPoint] {
        &self.cities
    }

    /// Shared handle for running requests off the UI thread
    pub fn routing(&self) -> Arc<dyn RoutingService> {
        Arc::clone(&self.routing)
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn dismiss_feedback(&mut self) {
        self.feedback = None;
    }

    pub fn narration_enabled(&self) -> bool {
        self.narration.is_enabled()
    }

    /// A click on the map fills the start, then the end, then starts over. Clicks landing on a
    /// city marker pick that city.
    pub fn click_map(&mut self, point: GeoPoint) -> Option<RouteRequest> {
        let point = self
            .map
            .as_ref()
            .and_then(|map| map.marker_near(&point, MarkerIcon::City, MARKER_CLICK_TOLERANCE))
            .map(|marker| marker.position().clone())
            .unwrap_or(point);
        let request = self.planner.select_point(point);
        self.sync_map();
        request
    }

    /// Same as a map click on the city called `name`
    pub fn click_city(&mut self, name: &str) -> Result<Option<RouteRequest>, Error> {
        let city = self
            .cities
            .iter()
            .find(|c| c.name().map_or(false, |n| n.eq_ignore_ascii_case(name)))
            .cloned()
            .ok_or_else(|| Error::UnknownLocation(name.to_string()))?;
        Ok(self.click_map(city))
    }

    pub fn set_start(&mut self, point: GeoPoint) -> Option<RouteRequest> {
        let request = self.planner.set_start(point);
        self.sync_map();
        request
    }

    pub fn set_end(&mut self, point: GeoPoint) -> Option<RouteRequest> {
        let request = self.planner.set_end(point);
        self.sync_map();
        request
    }

    pub fn set_mode(&mut self, mode: TravelMode) -> Option<RouteRequest> {
        let request = self.planner.set_mode(mode);
        self.sync_map();
        request
    }

    pub fn cycle_mode(&mut self) -> Option<RouteRequest> {
        self.set_mode(self.planner.mode().next())
    }

    /// Clear both points, the route and the cursor
    pub fn reset(&mut self) {
        self.planner.reset();
        if let Some(Feedback::RouteUnavailable(_)) = self.feedback {
            self.feedback = None;
        }
        self.sync_map();
    }

    /// Ask again for the current triple after a failure
    pub fn retry(&mut self) -> Option<RouteRequest> {
        let request = self.planner.retry();
        self.sync_map();
        request
    }

    /// Hand back the outcome of `request`. Stale results change nothing.
    pub fn complete(&mut self, token: u64, result: Result<RouteItinerary, Error>) -> Completion {
        let completion = self.planner.complete(token, result);
        if completion == Completion::Stale {
            return completion;
        }
        match self.planner.status() {
            RouteStatus::Unavailable(reason) => {
                warn!("route unavailable: {}", reason);
                self.feedback = Some(Feedback::RouteUnavailable(reason.clone()));
            }
            _ => {
                if let Some(Feedback::RouteUnavailable(_)) = self.feedback {
                    self.feedback = None;
                }
            }
        }
        self.sync_map();
        if let (Some(map), Some(itinerary)) = (self.map.as_mut(), self.planner.itinerary()) {
            map.fit_to(itinerary.geometry());
        }
        completion
    }

    /// Run `request` on the calling thread and apply the result
    pub fn compute(&mut self, request: RouteRequest) -> Completion {
        let result = compute_itinerary(self.routing.as_ref(), &request);
        self.complete(request.token(), result)
    }

    /// Move the step cursor, show the step on the map and narrate it
    pub fn select_step(&mut self, index: usize) -> Option<Narration> {
        let step = self.planner.select_step(index)?;
        Some(follow_step(self.map.as_mut(), &mut self.narration, step))
    }

    pub fn next_step(&mut self) -> Option<Narration> {
        let step = self.planner.next_step()?;
        Some(follow_step(self.map.as_mut(), &mut self.narration, step))
    }

    pub fn previous_step(&mut self) -> Option<Narration> {
        let step = self.planner.previous_step()?;
        Some(follow_step(self.map.as_mut(), &mut self.narration, step))
    }

    /// Last sentence handed to the speech engine
    pub fn last_utterance(&self) -> Option<&str> {
        self.narration.last_utterance()
    }

    /// Flip narration on or off, returning the new state
    pub fn toggle_narration(&mut self) -> bool {
        let enabled = self.narration.toggle();
        info!("narration {}", if enabled { "enabled" } else { "disabled" });
        enabled
    }

    /// One-shot position fix. On success the user marker moves and the camera follows.
    pub fn locate_user(&mut self) -> Option<GeoPoint> {
        let result = match &self.geolocation {
            Some(provider) => provider.current_position(&PositionOptions::default()),
            None => Err(GeolocationError::Unsupported),
        };
        match result {
            Ok(position) => {
                info!("located user at {}", position);
                if let Some(map) = self.map.as_mut() {
                    map.set_markers(
                        MarkerIcon::UserLocation,
                        vec![MarkerDescriptor::for_point(
                            &position,
                            MarkerIcon::UserLocation,
                        )],
                    );
                    map.fly_to(position.clone(), LOCATE_ZOOM);
                }
                if let Some(Feedback::Geolocation(_)) = self.feedback {
                    self.feedback = None;
                }
                Some(position)
            }
            Err(e) => {
                warn!("geolocation failed: {}", e);
                self.feedback = Some(Feedback::Geolocation(e.reason()));
                None
            }
        }
    }

    /// Locate the user and use the fix as the start point
    pub fn start_from_user_location(&mut self) -> Option<RouteRequest> {
        let position = self.locate_user()?;
        self.set_start(position)
    }

    pub fn set_style(&mut self, name: &str) -> Result<(), Error> {
        match self.map.as_mut() {
            Some(map) => map.set_style(name).map(|_| ()),
            None => Err(Error::MapUnavailable(
                "no map session to change the style of".to_string(),
            )),
        }
    }

    /// Next style in the list, `None` without a map
    pub fn cycle_style(&mut self) -> Option<String> {
        self.map
            .as_mut()
            .map(|map| map.cycle_style().name().to_string())
    }

    /// Bring the A/B markers and the route layer in line with the planner
    fn sync_map(&mut self) {
        let map = match self.map.as_mut() {
            Some(map) => map,
            None => return,
        };
        let start = self
            .planner
            .start()
            .map(|p| MarkerDescriptor::for_point(p, MarkerIcon::Start));
        let end = self
            .planner
            .end()
            .map(|p| MarkerDescriptor::for_point(p, MarkerIcon::End));
        map.set_markers(MarkerIcon::Start, start.into_iter().collect());
        map.set_markers(MarkerIcon::End, end.into_iter().collect());
        match self.planner.itinerary() {
            Some(itinerary) => map.draw_route(itinerary.mode(), itinerary.geometry().to_vec()),
            None => map.clear_route(),
        }
    }
}

fn follow_step(
    map: Option<&mut MapSession>,
    narration: &mut NarrationService,
    step: &ManeuverStep,
) -> Narration {
    if let Some(map) = map {
        map.fit_to(step.geometry());
    }
    narration.narrate_step(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Camera, MapStyle};
    use crate::services::speech::Voice;
    use crate::test_utils::{
        lyon, paris, FakeGeolocation, FakeRouting, RecordingSpeech, SpeechLog,
    };
    use std::sync::Mutex;

    fn session() -> Result<MapSession, Error> {
        MapSession::new(
            vec![
                MapStyle::new("Streets", "mapbox://styles/mapbox/streets-v12"),
                MapStyle::new("Dark", "mapbox://styles/mapbox/dark-v11"),
            ],
            None,
            Camera::new(GeoPoint::new(8.5, 48.5), 4.0, 0.0, 0.0),
        )
    }

    fn widget_with(
        map: Result<MapSession, Error>,
        routing: Arc<FakeRouting>,
        geolocation: Option<Box<dyn GeolocationProvider>>,
    ) -> (NavigatorWidget, Arc<Mutex<SpeechLog>>) {
        let (engine, log) = RecordingSpeech::new(vec![Voice::new("Samantha", "en-US")]);
        let narration = NarrationService::new(Box::new(engine), "en-US".to_string(), true);
        let widget = NavigatorWidget::new(
            map,
            vec![paris(), lyon()],
            routing,
            narration,
            geolocation,
        );
        (widget, log)
    }

    fn widget(routing: Arc<FakeRouting>) -> (NavigatorWidget, Arc<Mutex<SpeechLog>>) {
        widget_with(session(), routing, None)
    }

    fn markers(widget: &NavigatorWidget, icon: MarkerIcon) -> Vec<String> {
        widget
            .map()
            .unwrap()
            .markers()
            .iter()
            .filter(|m| m.icon() == icon)
            .map(|m| m.label().to_string())
            .collect()
    }

    #[test]
    fn city_markers_are_placed_on_creation() {
        let (widget, _) = widget(Arc::new(FakeRouting::succeeding()));
        assert_eq!(markers(&widget, MarkerIcon::City), vec!["Paris", "Lyon"]);
        assert!(widget.feedback().is_none());
    }

    #[test]
    fn two_clicks_plan_and_draw_a_route() {
        let routing = Arc::new(FakeRouting::succeeding());
        let (mut widget, _) = widget(routing.clone());
        assert!(widget.click_city("paris").unwrap().is_none());
        let request = widget.click_city("Lyon").unwrap().unwrap();
        assert_eq!(markers(&widget, MarkerIcon::Start), vec!["Paris"]);
        assert_eq!(markers(&widget, MarkerIcon::End), vec!["Lyon"]);

        assert_eq!(widget.compute(request), Completion::Applied);
        assert_eq!(routing.calls(), 1);
        let itinerary = widget.itinerary().unwrap();
        let layer = widget.map().unwrap().route().unwrap();
        assert_eq!(layer.path(), itinerary.geometry());
        assert_eq!(layer.mode(), TravelMode::Driving);
    }

    #[test]
    fn unknown_city_is_an_error() {
        let (mut widget, _) = widget(Arc::new(FakeRouting::succeeding()));
        assert!(matches!(
            widget.click_city("Atlantis"),
            Err(Error::UnknownLocation(_))
        ));
    }

    #[test]
    fn mode_change_discards_the_route_and_stale_results() {
        let routing = Arc::new(FakeRouting::succeeding());
        let (mut widget, _) = widget(routing.clone());
        widget.set_start(paris());
        let first = widget.set_end(lyon()).unwrap();
        assert_eq!(widget.compute(first.clone()), Completion::Applied);

        let second = widget.set_mode(TravelMode::Cycling).unwrap();
        assert_eq!(second.mode(), TravelMode::Cycling);
        assert!(widget.itinerary().is_none());
        assert!(widget.map().unwrap().route().is_none());

        let late = compute_itinerary(routing.as_ref(), &first);
        assert_eq!(widget.complete(first.token(), late), Completion::Stale);
        assert!(widget.itinerary().is_none());

        assert_eq!(widget.compute(second), Completion::Applied);
        assert_eq!(widget.itinerary().unwrap().mode(), TravelMode::Cycling);
        assert_eq!(widget.set_mode(TravelMode::Cycling), None);

        let modes: Vec<TravelMode> = routing.requests().iter().map(|r| r.mode()).collect();
        assert_eq!(
            modes,
            vec![TravelMode::Driving, TravelMode::Driving, TravelMode::Cycling]
        );
    }

    #[test]
    fn clicks_near_a_city_marker_pick_the_city() {
        let (mut widget, _) = widget(Arc::new(FakeRouting::succeeding()));
        widget.click_map(GeoPoint::new(2.36, 48.85));
        assert_eq!(widget.planner().start(), Some(&paris()));

        let field = GeoPoint::new(3.5, 47.0);
        widget.click_map(field.clone());
        assert_eq!(widget.planner().end(), Some(&field));
    }

    #[test]
    fn selected_step_is_brought_into_view() {
        let (mut widget, _) = widget(Arc::new(FakeRouting::succeeding()));
        widget.set_start(paris());
        let request = widget.set_end(lyon()).unwrap();
        widget.compute(request);

        widget.select_step(1);
        let step = widget.planner().current_step().unwrap();
        let (from, to) = (&step.geometry()[0], &step.geometry()[1]);
        let center = widget.map().unwrap().camera().center();
        assert!((center.longitude() - (from.longitude() + to.longitude()) / 2.0).abs() < 1e-9);
        assert!((center.latitude() - (from.latitude() + to.latitude()) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn routing_failure_shows_feedback() {
        let (mut widget, _) = widget(Arc::new(FakeRouting::failing()));
        widget.set_start(paris());
        let request = widget.set_end(lyon()).unwrap();
        assert_eq!(widget.compute(request), Completion::Applied);
        assert!(widget.itinerary().is_none());
        assert!(widget.map().unwrap().route().is_none());
        assert!(matches!(
            widget.feedback(),
            Some(Feedback::RouteUnavailable(_))
        ));
        widget.reset();
        assert!(widget.feedback().is_none());
        assert!(markers(&widget, MarkerIcon::Start).is_empty());
    }

    #[test]
    fn missing_map_keeps_routing_alive() {
        let (mut widget, _) = widget_with(
            Err(Error::MapUnavailable("no map styles configured".to_string())),
            Arc::new(FakeRouting::succeeding()),
            None,
        );
        assert!(widget.map().is_none());
        assert!(matches!(
            widget.feedback(),
            Some(Feedback::MapUnavailable(_))
        ));
        assert!(widget.set_style("Dark").is_err());
        widget.set_start(paris());
        let request = widget.set_end(lyon()).unwrap();
        assert_eq!(widget.compute(request), Completion::Applied);
        assert!(widget.itinerary().is_some());
    }

    #[test]
    fn selecting_steps_narrates_once_each() {
        let (mut widget, log) = widget(Arc::new(FakeRouting::succeeding()));
        widget.set_start(paris());
        let request = widget.set_end(lyon()).unwrap();
        widget.compute(request);

        assert_eq!(widget.select_step(1), Some(Narration::Spoken));
        let expected = widget.planner().current_step().unwrap().narration();
        assert_eq!(log.lock().unwrap().spoken.len(), 1);
        assert_eq!(log.lock().unwrap().spoken[0].0, expected);

        // the first utterance is still playing
        assert_eq!(widget.next_step(), Some(Narration::Busy));
        assert_eq!(widget.planner().current_step_index(), 2);
        log.lock().unwrap().speaking = false;

        assert_eq!(widget.select_step(99), None);
        assert_eq!(widget.previous_step(), Some(Narration::Spoken));
        assert_eq!(log.lock().unwrap().spoken.len(), 2);
    }

    #[test]
    fn turning_narration_off_silences_it() {
        let (mut widget, log) = widget(Arc::new(FakeRouting::succeeding()));
        widget.set_start(paris());
        let request = widget.set_end(lyon()).unwrap();
        widget.compute(request);
        widget.select_step(0);
        assert!(log.lock().unwrap().speaking);

        assert!(!widget.toggle_narration());
        assert!(!log.lock().unwrap().speaking);
        assert_eq!(widget.next_step(), Some(Narration::Disabled));
        assert_eq!(log.lock().unwrap().spoken.len(), 1);
    }

    #[test]
    fn geolocation_without_provider_is_unsupported() {
        let (mut widget, _) = widget(Arc::new(FakeRouting::succeeding()));
        assert!(widget.locate_user().is_none());
        assert_eq!(
            widget.feedback(),
            Some(&Feedback::Geolocation(GeolocationError::Unsupported.reason()))
        );
        widget.dismiss_feedback();
        assert!(widget.feedback().is_none());
    }

    #[test]
    fn denied_geolocation_reports_the_reason() {
        let provider = FakeGeolocation(Err(GeolocationError::PermissionDenied(
            "blocked by user".to_string(),
        )));
        let (mut widget, _) = widget_with(
            session(),
            Arc::new(FakeRouting::succeeding()),
            Some(Box::new(provider)),
        );
        assert!(widget.start_from_user_location().is_none());
        match widget.feedback() {
            Some(Feedback::Geolocation(reason)) => assert!(reason.contains("blocked by user")),
            other => panic!("unexpected feedback: {:?}", other),
        }
        assert!(widget.planner().start().is_none());
    }

    #[test]
    fn located_user_becomes_the_start() {
        let here = GeoPoint::named("My location", 4.8, 45.7);
        let provider = FakeGeolocation(Ok(here.clone()));
        let (mut widget, _) = widget_with(
            session(),
            Arc::new(FakeRouting::succeeding()),
            Some(Box::new(provider)),
        );
        widget.set_end(paris());
        let request = widget.start_from_user_location().unwrap();
        assert_eq!(request.start(), &here);
        assert_eq!(markers(&widget, MarkerIcon::UserLocation), vec!["My location"]);
        assert_eq!(widget.map().unwrap().camera().center(), &here);
    }

    #[test]
    fn styles_switch_by_name_and_cycle() {
        let (mut widget, _) = widget(Arc::new(FakeRouting::succeeding()));
        widget.set_style("dark").unwrap();
        assert_eq!(widget.map().unwrap().style().name(), "Dark");
        assert_eq!(widget.cycle_style(), Some("Streets".to_string()));
        assert!(matches!(
            widget.set_style("Neon"),
            Err(Error::UnknownStyle(_))
        ));
    }
}
