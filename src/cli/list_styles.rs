//! Define the list-styles subcommand
use crate::config::Config;
use structopt::StructOpt;

/// List the configured map styles, the one shown first is marked with "*"
#[derive(Debug, StructOpt)]
pub struct ListStylesOpts {}

pub fn list_styles_command(
    config: Config,
    _opts: ListStylesOpts,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = config.map_session()?;
    for style in session.styles() {
        let marker = if style == session.style() { "*" } else { " " };
        println!("{} {} ({})", marker, style.name(), style.url());
    }
    Ok(())
}
