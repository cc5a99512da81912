//! Define the application's command line interface
use crate::config::Config;
use crate::format::{format_arrival, format_distance, format_duration};
use crate::itinerary::{ManeuverStep, RouteItinerary};
use crate::narration::NarrationService;
use crate::services::SpeechEngine;
use crate::widget::NavigatorWidget;
use crate::Error;
use chrono::{DateTime, TimeZone};
use simplelog::LevelFilter;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use structopt::StructOpt;

mod list_cities;
use list_cities::{list_cities_command, ListCitiesOpts};
mod list_styles;
use list_styles::{list_styles_command, ListStylesOpts};
mod locate;
use locate::{locate_command, LocateOpts};
mod navigate;
use navigate::{navigate_command, NavigateOpts};
mod route;
use route::{route_command, RouteOpts};
mod route_image;
use route_image::{route_image_command, RouteImageOpts};

/// Plan routes between cities and follow them step by step with voice guidance
#[derive(Debug, StructOpt)]
pub struct Cli {
    /// Set logging level to debug, use a second time (e.g. -vv) to set logging to trace
    #[structopt(short, long, parse(from_occurrences))]
    verbose: i32,
    /// Suppress info logging messages use a second time (e.g. -qq) to hide warnings
    #[structopt(short, long, parse(from_occurrences))]
    quiet: i32,
    /// Read configuration from this file instead of the default location
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,
    #[structopt(subcommand)]
    cmd: Command,
}

impl Cli {
    /// Return the verbose flag counts as a log level filter
    pub fn verbosity(&self, default: LevelFilter) -> LevelFilter {
        if self.quiet == 1 {
            LevelFilter::Warn
        } else if self.quiet > 1 {
            LevelFilter::Error
        } else if self.verbose == 1 {
            LevelFilter::Debug
        } else if self.verbose > 1 {
            LevelFilter::Trace
        } else {
            default
        }
    }

    /// Configuration file given on the command line, if any
    pub fn config_file(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    /// The navigator owns the terminal, so log output has to go somewhere else
    pub fn is_interactive(&self) -> bool {
        matches!(self.cmd, Command::Navigate(_))
    }

    /// Consume options struct and return the result of subcommand execution
    pub fn execute_subcommand(self, config: Config) -> Result<(), Box<dyn std::error::Error>> {
        self.cmd.execute(config)
    }
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// List the cities that can be used as route end points
    #[structopt(name = "list-cities")]
    ListCities(ListCitiesOpts),
    /// List the configured map styles
    #[structopt(name = "list-styles")]
    ListStyles(ListStylesOpts),
    /// Print the current position reported by the geolocation service
    #[structopt(name = "locate")]
    Locate(LocateOpts),
    /// Follow a route interactively in the terminal
    #[structopt(name = "navigate")]
    Navigate(NavigateOpts),
    /// Compute a route and print its turn-by-turn itinerary
    #[structopt(name = "route")]
    Route(RouteOpts),
    /// Render a map image of a route
    #[structopt(name = "route-image")]
    RouteImage(RouteImageOpts),
}

impl Command {
    /// Consume enum variant and return the result of the command's execution
    fn execute(self, config: Config) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Command::ListCities(opts) => list_cities_command(config, opts),
            Command::ListStyles(opts) => list_styles_command(config, opts),
            Command::Locate(opts) => locate_command(config, opts),
            Command::Navigate(opts) => navigate_command(config, opts),
            Command::Route(opts) => route_command(config, opts),
            Command::RouteImage(opts) => route_image_command(config, opts),
        }
    }
}

/// Assemble a navigator from the configured services, `full_screen` when a terminal interface
/// will own stdout
fn build_widget(
    config: &Config,
    narrate: bool,
    full_screen: bool,
) -> Result<NavigatorWidget, Error> {
    let routing = Arc::from(config.get_routing_handler()?);
    let narration = NarrationService::new(
        speech_engine(config, full_screen)?,
        config.language().to_string(),
        narrate,
    );
    let geolocation = config.get_geolocation_handler()?;
    Ok(NavigatorWidget::new(
        config.map_session(),
        config.cities().to_vec(),
        routing,
        narration,
        geolocation,
    ))
}

fn speech_engine(config: &Config, full_screen: bool) -> Result<Box<dyn SpeechEngine>, Error> {
    let mut engine = config.get_speech_handler()?;
    if full_screen {
        engine.release_terminal();
    }
    Ok(engine)
}

/// One line overview: distance, travel time and arrival clock time
fn summary_line<Tz>(itinerary: &RouteItinerary, departure: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{} by {}, {} (arrive at {})",
        format_distance(itinerary.distance()),
        itinerary.mode().label().to_lowercase(),
        format_duration(itinerary.duration()),
        format_arrival(departure, itinerary.duration())
    )
}

fn step_line(step: &ManeuverStep) -> String {
    if step.distance() > 0.0 {
        format!(
            "{} {} ({}, {})",
            step.icon().symbol(),
            step.instruction(),
            format_distance(step.distance()),
            format_duration(step.duration())
        )
    } else {
        format!("{} {}", step.icon().symbol(), step.instruction())
    }
}
