use clap::Parser;

use solarops_bom::{BomConfig, run};

fn main() {
    let config = BomConfig::parse();
    solarops_observability::init_with(config.log_format);

    match run(&config) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "report failed");
            std::process::exit(1);
        }
    }
}
