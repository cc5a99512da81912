//! Define the route subcommand
use super::{build_widget, step_line, summary_line};
use crate::config::Config;
use crate::narration::Narration;
use crate::planner::RouteStatus;
use crate::travel_mode::TravelMode;
use crate::Error;
use chrono::Local;
use log::{info, warn};
use structopt::StructOpt;

/// Compute a route between two places and print the steps to follow
#[derive(Debug, StructOpt)]
pub struct RouteOpts {
    /// Start of the route, a configured city name or "lon,lat"
    #[structopt(name = "FROM")]
    from: String,
    /// End of the route, a configured city name or "lon,lat"
    #[structopt(name = "TO")]
    to: String,
    /// Travel mode: driving, cycling or walking
    #[structopt(short, long, default_value = "driving")]
    mode: TravelMode,
    /// Select this step (0 based) and narrate it
    #[structopt(short, long)]
    step: Option<usize>,
    /// Speak the selected step, the first one when no step is given
    #[structopt(long)]
    speak: bool,
}

pub fn route_command(config: Config, opts: RouteOpts) -> Result<(), Box<dyn std::error::Error>> {
    let start = config.resolve_location(&opts.from)?;
    let end = config.resolve_location(&opts.to)?;
    let mut widget = build_widget(&config, opts.speak || opts.step.is_some(), false)?;

    widget.set_mode(opts.mode);
    widget.set_start(start);
    let request = widget
        .set_end(end)
        .ok_or_else(|| Error::Other("route end points were not accepted".to_string()))?;
    widget.compute(request);
    if let RouteStatus::Unavailable(reason) = widget.planner().status() {
        return Err(Box::new(Error::RouteUnavailable(reason.clone())));
    }

    if opts.speak || opts.step.is_some() {
        let index = opts.step.unwrap_or(0);
        match widget.select_step(index) {
            Some(Narration::Spoken) => info!("narrated step {}", index),
            Some(outcome) => warn!("step {} was not narrated: {:?}", index, outcome),
            None => warn!("route has no step {}", index),
        }
    }

    let planner = widget.planner();
    let itinerary = match planner.itinerary() {
        Some(itinerary) => itinerary,
        None => {
            return Err(Box::new(Error::RouteUnavailable(
                "no itinerary was produced".to_string(),
            )))
        }
    };
    if let (Some(start), Some(end)) = (planner.start(), planner.end()) {
        println!("{} -> {}", start, end);
    }
    println!("{}", summary_line(itinerary, Local::now()));
    for (index, step) in itinerary.steps().iter().enumerate() {
        let cursor = if opts.step.is_some() && index == planner.current_step_index() {
            ">"
        } else {
            " "
        };
        println!("{}{:>3}. {}", cursor, index, step_line(step));
    }

    Ok(())
}
