use std::process::ExitCode;
use clap::Parser as ClapParser;
use log::LevelFilter;
use pascal_interpreter::Config;

fn main() -> ExitCode {
    let config: Config = Config::parse();

    env_logger::Builder::new()
        .filter_level(if config.verbose { LevelFilter::Debug } else { LevelFilter::Warn })
        .parse_default_env()
        .init();

    match pascal_interpreter::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        },
    }
}
