//! Normalize a routing service response into an itinerary of maneuver steps
use crate::format::format_distance;
use crate::gps::GeoPoint;
use crate::maneuver::{synthesize_instruction, ManeuverIcon, ManeuverType, Modifier};
use crate::services::routing::{
    RouteCandidate, RouteRequest, RouteResponse, RouteStep, RoutingService,
};
use crate::travel_mode::TravelMode;
use crate::Error;
use log::{debug, warn};

/// Where and how the traveller changes direction
#[derive(Clone, Debug, PartialEq)]
pub struct Maneuver {
    kind: ManeuverType,
    modifier: Option<Modifier>,
    location: GeoPoint,
    /// roundabout exit number, if any
    exit: Option<u32>,
}

impl Maneuver {
    pub fn new(
        kind: ManeuverType,
        modifier: Option<Modifier>,
        location: GeoPoint,
        exit: Option<u32>,
    ) -> Self {
        Maneuver {
            kind,
            modifier,
            location,
            exit,
        }
    }

    pub fn kind(&self) -> &ManeuverType {
        &self.kind
    }

    pub fn modifier(&self) -> Option<Modifier> {
        self.modifier
    }

    pub fn location(&self) -> &GeoPoint {
        &self.location
    }

    pub fn exit(&self) -> Option<u32> {
        self.exit
    }
}

/// One instruction of an itinerary
#[derive(Clone, Debug, PartialEq)]
pub struct ManeuverStep {
    instruction: String,
    /// meters
    distance: f64,
    /// seconds
    duration: f64,
    maneuver: Maneuver,
    road: String,
    /// stretch of the route covered by this step, empty when the service sent none
    geometry: Vec<GeoPoint>,
}

impl ManeuverStep {
    fn from_route_step(step: RouteStep) -> Self {
        let RouteStep {
            distance,
            duration,
            name,
            maneuver: raw,
            instruction,
            geometry,
        } = step;
        let maneuver = Maneuver::new(
            ManeuverType::parse(&raw.kind),
            raw.modifier.as_deref().and_then(Modifier::parse),
            GeoPoint::from_lon_lat(raw.location),
            raw.exit,
        );
        // service provided text wins over our own templates
        let instruction = non_blank(instruction)
            .or_else(|| non_blank(raw.instruction))
            .unwrap_or_else(|| {
                synthesize_instruction(maneuver.kind(), maneuver.modifier(), &name, maneuver.exit())
            });

        ManeuverStep {
            instruction,
            distance,
            duration,
            maneuver,
            road: name,
            geometry: geometry
                .map(|line| line.coordinates.into_iter().map(GeoPoint::from_lon_lat).collect())
                .unwrap_or_default(),
        }
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn maneuver(&self) -> &Maneuver {
        &self.maneuver
    }

    pub fn road(&self) -> &str {
        &self.road
    }

    pub fn geometry(&self) -> &[GeoPoint] {
        &self.geometry
    }

    pub fn icon(&self) -> ManeuverIcon {
        ManeuverIcon::for_maneuver(self.maneuver.kind(), self.maneuver.modifier())
    }

    /// Sentence spoken when this step gets selected
    pub fn narration(&self) -> String {
        if self.distance > 0.0 {
            format!(
                "{}, then continue for {}",
                self.instruction,
                format_distance(self.distance)
            )
        } else {
            self.instruction.clone()
        }
    }
}

/// A computed route, replaced wholesale whenever it gets recalculated
#[derive(Clone, Debug, PartialEq)]
pub struct RouteItinerary {
    mode: TravelMode,
    /// meters, as reported by the routing service
    distance: f64,
    /// seconds, as reported by the routing service
    duration: f64,
    geometry: Vec<GeoPoint>,
    steps: Vec<ManeuverStep>,
}

impl RouteItinerary {
    /// Build an itinerary from the first route candidate of a successful response
    pub fn from_response(mode: TravelMode, response: RouteResponse) -> Result<Self, Error> {
        if !response.is_ok() {
            let reason = match response.message {
                Some(message) => format!("{}: {}", response.code, message),
                None => response.code,
            };
            return Err(Error::RouteUnavailable(reason));
        }
        match response.routes.into_iter().next() {
            Some(candidate) => Ok(Self::from_candidate(mode, candidate)),
            None => Err(Error::RouteUnavailable(
                "the routing service returned no route candidates".to_string(),
            )),
        }
    }

    fn from_candidate(mode: TravelMode, candidate: RouteCandidate) -> Self {
        let geometry = candidate
            .geometry
            .coordinates
            .into_iter()
            .map(GeoPoint::from_lon_lat)
            .collect();
        // legs are flattened in service order, nothing gets merged or dropped
        let steps = candidate
            .legs
            .into_iter()
            .flat_map(|leg| leg.steps)
            .map(ManeuverStep::from_route_step)
            .collect();

        RouteItinerary {
            mode,
            distance: candidate.distance,
            duration: candidate.duration,
            geometry,
            steps,
        }
    }

    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn geometry(&self) -> &[GeoPoint] {
        &self.geometry
    }

    pub fn steps(&self) -> &[ManeuverStep] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&ManeuverStep> {
        self.steps.get(index)
    }

    /// Sum of the per step distances, normally within rounding of `distance()`
    pub fn step_distance_total(&self) -> f64 {
        self.steps.iter().map(|s| s.distance).sum()
    }

    pub fn step_duration_total(&self) -> f64 {
        self.steps.iter().map(|s| s.duration).sum()
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Request a route for `request` and normalize it.
///
/// Network failures, error statuses, malformed bodies and empty candidate lists all come back
/// as `Error::RouteUnavailable`.
pub fn compute_itinerary(
    service: &dyn RoutingService,
    request: &RouteRequest,
) -> Result<RouteItinerary, Error> {
    let result = service
        .fetch_route(request)
        .and_then(|response| RouteItinerary::from_response(request.mode(), response));
    match result {
        Ok(itinerary) => {
            debug!(
                "route {} -> {} ({}): {} steps, {:.0} m",
                request.start(),
                request.end(),
                request.mode(),
                itinerary.steps().len(),
                itinerary.distance()
            );
            Ok(itinerary)
        }
        Err(Error::RouteUnavailable(reason)) => {
            warn!("no route available (token={}): {}", request.token(), reason);
            Err(Error::RouteUnavailable(reason))
        }
        Err(e) => {
            warn!("routing request failed (token={}): {}", request.token(), e);
            Err(Error::RouteUnavailable(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{paris_request, FakeRouting, NO_ROUTE_FIXTURE, ROUTE_FIXTURE};

    fn fixture_itinerary() -> RouteItinerary {
        let response: RouteResponse = serde_json::from_str(ROUTE_FIXTURE).unwrap();
        RouteItinerary::from_response(TravelMode::Driving, response).unwrap()
    }

    #[test]
    fn aggregates_are_copied_verbatim() {
        let itinerary = fixture_itinerary();
        assert_eq!(itinerary.distance(), 2870.4);
        assert_eq!(itinerary.duration(), 412.9);
        assert!((itinerary.step_distance_total() - itinerary.distance()).abs() < 0.01);
        assert!((itinerary.step_duration_total() - itinerary.duration()).abs() < 0.01);
        assert_eq!(itinerary.geometry().len(), 5);
        assert_eq!(itinerary.geometry()[0], GeoPoint::new(2.3522, 48.8566));
    }

    #[test]
    fn legs_are_flattened_in_service_order() {
        let itinerary = fixture_itinerary();
        let kinds: Vec<&str> = itinerary
            .steps()
            .iter()
            .map(|s| s.maneuver().kind().as_str())
            .collect();
        assert_eq!(
            kinds,
            vec!["depart", "turn", "arrive", "roundabout", "teleport", "arrive"]
        );
    }

    #[test]
    fn step_geometries_partition_the_path() {
        let itinerary = fixture_itinerary();
        let steps = itinerary.steps();
        assert!(steps.iter().all(|s| !s.geometry().is_empty()));
        for pair in steps.windows(2) {
            assert_eq!(pair[0].geometry().last(), pair[1].geometry().first());
        }
        assert_eq!(
            steps.first().unwrap().geometry().first(),
            itinerary.geometry().first()
        );
        assert_eq!(
            steps.last().unwrap().geometry().last(),
            itinerary.geometry().last()
        );
        // every route vertex shows up in some step, in travel order
        let mut walked: Vec<&GeoPoint> = steps.iter().flat_map(|s| s.geometry()).collect();
        walked.dedup();
        assert_eq!(walked, itinerary.geometry().iter().collect::<Vec<_>>());
    }

    #[test]
    fn instructions_prefer_service_text() {
        let itinerary = fixture_itinerary();
        let text: Vec<&str> = itinerary.steps().iter().map(|s| s.instruction()).collect();
        assert_eq!(
            text,
            vec![
                "Depart onto Rue de Rivoli",
                "Turn left onto Boulevard de Sébastopol",
                "You have arrived at your destination",
                "Take the 3rd exit at Place de la République",
                "Continue",
                "You have arrived at your destination",
            ]
        );
        assert_eq!(itinerary.step(3).unwrap().maneuver().exit(), Some(3));
        assert_eq!(itinerary.step(1).unwrap().icon(), ManeuverIcon::Left);
    }

    #[test]
    fn narration_mentions_the_distance() {
        let itinerary = fixture_itinerary();
        assert_eq!(
            itinerary.step(1).unwrap().narration(),
            "Turn left onto Boulevard de Sébastopol, then continue for 1.3 km"
        );
        assert_eq!(
            itinerary.step(2).unwrap().narration(),
            "You have arrived at your destination"
        );
    }

    #[test]
    fn error_codes_are_unavailable() {
        let response: RouteResponse = serde_json::from_str(NO_ROUTE_FIXTURE).unwrap();
        match RouteItinerary::from_response(TravelMode::Walking, response) {
            Err(Error::RouteUnavailable(reason)) => {
                assert!(reason.starts_with("NoRoute"), "{}", reason)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn empty_candidate_list_is_unavailable() {
        let response: RouteResponse =
            serde_json::from_str(r#"{"code": "Ok", "routes": []}"#).unwrap();
        assert!(matches!(
            RouteItinerary::from_response(TravelMode::Driving, response),
            Err(Error::RouteUnavailable(_))
        ));
    }

    #[test]
    fn service_errors_collapse_into_unavailable() {
        let service = FakeRouting::failing();
        let result = compute_itinerary(&service, &paris_request(7, TravelMode::Cycling));
        assert!(matches!(result, Err(Error::RouteUnavailable(_))));
        assert_eq!(service.calls(), 1);
    }

    #[test]
    fn computes_with_the_request_mode() {
        let service = FakeRouting::succeeding();
        let itinerary = compute_itinerary(&service, &paris_request(1, TravelMode::Walking)).unwrap();
        assert_eq!(itinerary.mode(), TravelMode::Walking);
        assert_eq!(itinerary.steps().len(), 6);
    }
}
