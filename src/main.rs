use city_navigator::cli::Cli;
use city_navigator::config::Config;
use city_navigator::{config_path, log_path};
use log::debug;
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode, WriteLogger};
use std::fs::{create_dir_all, File};
use structopt::StructOpt;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = Cli::from_args();

    // an explicit config file must exist, the default one is optional
    let path = opt.config_file().cloned().unwrap_or_else(config_path);
    let config = if opt.config_file().is_some() || path.exists() {
        let mut fp = File::open(&path)?;
        Config::load(&mut fp)?
    } else {
        Config::default()
    };

    let level_filter = opt.verbosity(config.log_level());
    if opt.is_interactive() {
        // the navigator draws on the whole terminal so log lines go to a file instead
        let log_file = log_path();
        if let Some(dir) = log_file.parent() {
            create_dir_all(dir)?;
        }
        WriteLogger::init(level_filter, LogConfig::default(), File::create(log_file)?)?;
    } else {
        TermLogger::init(
            level_filter,
            LogConfig::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )?;
    }
    if path.exists() {
        debug!("configuration read from {:?}", path);
    } else {
        debug!("no configuration at {:?}, using defaults", path);
    }

    opt.execute_subcommand(config)
}
