//! Service module that exports interfaces to external applications, APIs, etc.

pub mod geolocation;
pub mod routing;
pub mod speech;
pub mod visualization;

// rexport some traits and utilty functions
pub use geolocation::{new_geolocation_handler, GeolocationProvider};
pub use routing::{new_routing_handler, RoutingService};
pub use speech::{new_speech_handler, SpeechEngine};
pub use visualization::{new_map_rendering_handler, MapRenderingService};
