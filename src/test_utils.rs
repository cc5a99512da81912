//! Shared fakes for unit tests
use crate::gps::GeoPoint;
use crate::services::geolocation::{GeolocationError, GeolocationProvider, PositionOptions};
use crate::services::routing::{RouteRequest, RouteResponse, RoutingService};
use crate::services::speech::{SpeechEngine, Voice};
use crate::travel_mode::TravelMode;
use crate::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ROUTE_FIXTURE: &str = include_str!("../tests/fixtures/osrm_route.json");
pub const NO_ROUTE_FIXTURE: &str = include_str!("../tests/fixtures/osrm_no_route.json");

pub fn paris() -> GeoPoint {
    GeoPoint::named("Paris", 2.3522, 48.8566)
}

pub fn lyon() -> GeoPoint {
    GeoPoint::named("Lyon", 4.8357, 45.764)
}

pub fn paris_request(token: u64, mode: TravelMode) -> RouteRequest {
    RouteRequest::new(token, paris(), lyon(), mode)
}

/// Routing service answering every request from a canned body
pub struct FakeRouting {
    body: Option<&'static str>,
    calls: AtomicUsize,
    requests: Mutex<Vec<RouteRequest>>,
}

impl FakeRouting {
    pub fn succeeding() -> Self {
        Self::with_body(Some(ROUTE_FIXTURE))
    }

    pub fn failing() -> Self {
        Self::with_body(None)
    }

    fn with_body(body: Option<&'static str>) -> Self {
        FakeRouting {
            body,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RouteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl RoutingService for FakeRouting {
    fn fetch_route(&self, request: &RouteRequest) -> Result<RouteResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        match self.body {
            Some(body) => Ok(serde_json::from_str(body)?),
            None => Err(Error::Other("connection refused".to_string())),
        }
    }
}

/// Everything a `RecordingSpeech` engine was asked to do
#[derive(Debug, Default)]
pub struct SpeechLog {
    pub spoken: Vec<(String, Option<String>)>,
    pub cancels: usize,
    pub speaking: bool,
}

/// Speech engine that records utterances instead of playing them. An utterance stays "in
/// flight" until the test clears `speaking` through the shared log.
pub struct RecordingSpeech {
    voices: Vec<Voice>,
    log: Arc<Mutex<SpeechLog>>,
}

impl RecordingSpeech {
    pub fn new(voices: Vec<Voice>) -> (Self, Arc<Mutex<SpeechLog>>) {
        let log = Arc::new(Mutex::new(SpeechLog::default()));
        (
            RecordingSpeech {
                voices,
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl SpeechEngine for RecordingSpeech {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&mut self, utterance: &str, voice: Option<&Voice>) -> Result<(), Error> {
        let mut log = self.log.lock().unwrap();
        log.spoken
            .push((utterance.to_string(), voice.map(|v| v.name().to_string())));
        log.speaking = true;
        Ok(())
    }

    fn cancel(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.cancels += 1;
        log.speaking = false;
    }

    fn is_speaking(&mut self) -> bool {
        self.log.lock().unwrap().speaking
    }
}

/// Geolocation provider with a fixed answer
pub struct FakeGeolocation(pub Result<GeoPoint, GeolocationError>);

impl GeolocationProvider for FakeGeolocation {
    fn current_position(&self, _options: &PositionOptions) -> Result<GeoPoint, GeolocationError> {
        self.0.clone()
    }
}
