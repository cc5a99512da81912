//! Track the selected points, travel mode and the itinerary derived from them
use crate::gps::GeoPoint;
use crate::itinerary::{ManeuverStep, RouteItinerary};
use crate::services::routing::RouteRequest;
use crate::travel_mode::TravelMode;
use crate::Error;
use log::{debug, info};

/// Where the planner is in its request/response cycle
#[derive(Clone, Debug, PartialEq)]
pub enum RouteStatus {
    /// start or end point missing
    Idle,
    /// a request was issued and its response hasn't been applied
    Pending,
    Ready,
    /// the last request failed, holds the reason shown to the user
    Unavailable(String),
}

/// Outcome of handing a routing result back to the planner
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// the result belongs to a superseded request and was dropped
    Stale,
}

/// Owns the (start, end, mode) triple and the single itinerary slot.
///
/// Every change to the triple discards the current itinerary straight away and, when both
/// points are set, hands back exactly one `RouteRequest` for the caller to execute. Requests
/// carry a token that increases with every change; `complete` only accepts the result of the
/// latest one.
#[derive(Debug)]
pub struct RoutePlanner {
    start: Option<GeoPoint>,
    end: Option<GeoPoint>,
    mode: TravelMode,
    itinerary: Option<RouteItinerary>,
    status: RouteStatus,
    latest_token: u64,
    current_step: usize,
}

impl RoutePlanner {
    pub fn new(mode: TravelMode) -> Self {
        RoutePlanner {
            start: None,
            end: None,
            mode,
            itinerary: None,
            status: RouteStatus::Idle,
            latest_token: 0,
            current_step: 0,
        }
    }

    pub fn start(&self) -> Option<&GeoPoint> {
        self.start.as_ref()
    }

    pub fn end(&self) -> Option<&GeoPoint> {
        self.end.as_ref()
    }

    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    pub fn itinerary(&self) -> Option<&RouteItinerary> {
        self.itinerary.as_ref()
    }

    pub fn status(&self) -> &RouteStatus {
        &self.status
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step
    }

    pub fn current_step(&self) -> Option<&ManeuverStep> {
        self.itinerary.as_ref()?.step(self.current_step)
    }

    pub fn set_start(&mut self, point: GeoPoint) -> Option<RouteRequest> {
        self.start = Some(point);
        self.invalidate()
    }

    pub fn set_end(&mut self, point: GeoPoint) -> Option<RouteRequest> {
        self.end = Some(point);
        self.invalidate()
    }

    /// Switch travel mode, selecting the mode already in use changes nothing
    pub fn set_mode(&mut self, mode: TravelMode) -> Option<RouteRequest> {
        if mode == self.mode {
            return None;
        }
        self.mode = mode;
        self.invalidate()
    }

    /// Fill the start point first, then the end point. Picking a third point starts over with
    /// it as the new start.
    pub fn select_point(&mut self, point: GeoPoint) -> Option<RouteRequest> {
        match (self.start.is_some(), self.end.is_some()) {
            (false, _) => self.set_start(point),
            (true, false) => self.set_end(point),
            (true, true) => {
                self.end = None;
                self.set_start(point)
            }
        }
    }

    pub fn clear_start(&mut self) {
        self.start = None;
        self.invalidate();
    }

    pub fn clear_end(&mut self) {
        self.end = None;
        self.invalidate();
    }

    /// Clear both points together
    pub fn reset(&mut self) {
        self.start = None;
        self.end = None;
        self.invalidate();
    }

    /// Issue a fresh request for the current triple, e.g. after a failure
    pub fn retry(&mut self) -> Option<RouteRequest> {
        self.invalidate()
    }

    fn invalidate(&mut self) -> Option<RouteRequest> {
        self.itinerary = None;
        self.current_step = 0;
        // retire whatever request is still in flight
        self.latest_token += 1;
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => {
                self.status = RouteStatus::Pending;
                Some(RouteRequest::new(
                    self.latest_token,
                    start.clone(),
                    end.clone(),
                    self.mode,
                ))
            }
            _ => {
                self.status = RouteStatus::Idle;
                None
            }
        }
    }

    /// Apply the result of the request identified by `token`
    pub fn complete(&mut self, token: u64, result: Result<RouteItinerary, Error>) -> Completion {
        if token != self.latest_token || self.status != RouteStatus::Pending {
            debug!(
                "discarding routing result for token {} (latest is {})",
                token, self.latest_token
            );
            return Completion::Stale;
        }

        self.current_step = 0;
        match result {
            Ok(itinerary) => {
                info!(
                    "{} route ready with {} steps",
                    itinerary.mode(),
                    itinerary.steps().len()
                );
                self.itinerary = Some(itinerary);
                self.status = RouteStatus::Ready;
            }
            Err(e) => {
                let reason = match e {
                    Error::RouteUnavailable(reason) => reason,
                    other => other.to_string(),
                };
                self.itinerary = None;
                self.status = RouteStatus::Unavailable(reason);
            }
        }
        Completion::Applied
    }

    /// Move the cursor to `index`, returning the step to narrate. Out of range is ignored.
    pub fn select_step(&mut self, index: usize) -> Option<&ManeuverStep> {
        let len = self.itinerary.as_ref()?.steps().len();
        if index >= len {
            return None;
        }
        self.current_step = index;
        self.itinerary.as_ref()?.step(index)
    }

    pub fn next_step(&mut self) -> Option<&ManeuverStep> {
        self.select_step(self.current_step + 1)
    }

    pub fn previous_step(&mut self) -> Option<&ManeuverStep> {
        if self.current_step == 0 {
            return None;
        }
        self.select_step(self.current_step - 1)
    }
}

impl Default for RoutePlanner {
    fn default() -> Self {
        RoutePlanner::new(TravelMode::default())
    }
}
