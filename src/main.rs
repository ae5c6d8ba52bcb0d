use clap::{self, Parser};
use log::{error, info};
use simple_logger::init_with_level;

use looper::{
    cli::{Args, SubArgs},
    config::Project,
    core::{check, run},
};

fn main() {
    let start = std::time::Instant::now();
    let args: Args = Args::parse();

    if let Err(e) = init_with_level(args.level()) {
        eprintln!("ERROR: could not initialize logger: {}", e);
        std::process::exit(1);
    }

    match args.command {
        SubArgs::Run { args } => {
            args.check().unwrap_or_else(|e| {
                error!("{}", e);
                std::process::exit(1);
            });

            let project = Project::read(args.config.clone()).unwrap_or_else(|e| {
                error!("ERROR: Could not read config file: {}", e);
                std::process::exit(1);
            });

            run(&project, &args.options()).unwrap_or_else(|e| {
                error!("{}", e);
                std::process::exit(1);
            });
        }
        SubArgs::Check { args } => {
            let project = Project::read(args.config.clone()).unwrap_or_else(|e| {
                error!("ERROR: Could not read config file: {}", e);
                std::process::exit(1);
            });

            check(&project, !args.no_priority).unwrap_or_else(|e| {
                error!("{}", e);
                std::process::exit(1);
            });
        }
    }

    let elapsed = start.elapsed();
    info!("Elapsed time: {:.3?}", elapsed);
}
