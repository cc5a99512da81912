//! Define the locate subcommand
use crate::config::Config;
use crate::services::geolocation::{GeolocationError, PositionOptions};
use crate::Error;
use log::error;
use structopt::StructOpt;

/// Ask the geolocation service for a single position fix
#[derive(Debug, StructOpt)]
pub struct LocateOpts {
    /// Seconds to wait for a position before giving up
    #[structopt(short, long)]
    timeout: Option<u64>,
}

pub fn locate_command(config: Config, opts: LocateOpts) -> Result<(), Box<dyn std::error::Error>> {
    let provider = match config.get_geolocation_handler()? {
        Some(provider) => provider,
        None => {
            error!("no geolocation service is configured");
            return Err(Box::new(Error::from(GeolocationError::Unsupported)));
        }
    };
    let mut options = PositionOptions::default();
    if let Some(secs) = opts.timeout {
        options.timeout = std::time::Duration::from_secs(secs);
    }

    let position = provider.current_position(&options).map_err(Error::from)?;
    println!(
        "{:.5}, {:.5} ({})",
        position.latitude(),
        position.longitude(),
        position.name().unwrap_or("unnamed")
    );
    Ok(())
}
