//! Define the list-cities subcommand
use crate::config::Config;
use structopt::StructOpt;

/// List the configured cities and their coordinates
#[derive(Debug, StructOpt)]
pub struct ListCitiesOpts {}

pub fn list_cities_command(
    config: Config,
    _opts: ListCitiesOpts,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("City, Longitude, Latitude");
    for city in config.cities() {
        println!(
            "{}, {:.4}, {:.4}",
            city,
            city.longitude(),
            city.latitude()
        );
    }
    Ok(())
}
