//! Define route image subcommand
use super::build_widget;
use crate::config::Config;
use crate::planner::RouteStatus;
use crate::travel_mode::TravelMode;
use crate::Error;
use log::info;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use structopt::StructOpt;

/// Generate a map image with the route between two places drawn on it
#[derive(Debug, StructOpt)]
pub struct RouteImageOpts {
    /// Start of the route, a configured city name or "lon,lat"
    #[structopt(name = "FROM")]
    from: String,
    /// End of the route, a configured city name or "lon,lat"
    #[structopt(name = "TO")]
    to: String,
    /// Travel mode: driving, cycling or walking
    #[structopt(short, long, default_value = "driving")]
    mode: TravelMode,
    /// name of file to output image data to, if not provided or "-" is used data is written to stdout
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
    /// Map style to draw with (use list-styles command to see names)
    #[structopt(long)]
    style: Option<String>,
}

pub fn route_image_command(
    config: Config,
    opts: RouteImageOpts,
) -> Result<(), Box<dyn std::error::Error>> {
    let renderer = config.get_map_rendering_handler()?;
    let start = config.resolve_location(&opts.from)?;
    let end = config.resolve_location(&opts.to)?;
    let mut widget = build_widget(&config, false, false)?;
    if let Some(style) = &opts.style {
        widget.set_style(style)?;
    }

    widget.set_mode(opts.mode);
    widget.set_start(start);
    if let Some(request) = widget.set_end(end) {
        widget.compute(request);
    }
    if let RouteStatus::Unavailable(reason) = widget.planner().status() {
        return Err(Box::new(Error::RouteUnavailable(reason.clone())));
    }

    let session = match widget.map() {
        Some(session) => session,
        None => {
            return Err(Box::new(Error::MapUnavailable(
                "the map session could not be created".to_string(),
            )))
        }
    };
    let image_data = renderer.render(session)?;
    info!(
        "rendered {} bytes with style '{}'",
        image_data.len(),
        session.style().name()
    );
    if let Some(path) = opts.output {
        if path.to_string_lossy() == "-" {
            write_to_stdout(&image_data)?
        } else {
            let mut fp = File::create(path)?;
            fp.write_all(&image_data)?
        }
    } else {
        write_to_stdout(&image_data)?
    }

    Ok(())
}

fn write_to_stdout(data: &[u8]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(data)
}
