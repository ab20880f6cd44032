use std::io::stdout;

use color_eyre::Result;
use env_logger::Env;

use cpair::swatch;
use cpair::{Config, TermCaps};

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    // Load configuration
    let config = Config::load()?;

    // Detect terminal capabilities and print the swatch
    swatch::run(&mut stdout(), &config, TermCaps::from_env())?;

    Ok(())
}
