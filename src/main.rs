use std::path::Path;
use std::process::ExitCode;

use cubegl::engine::config::{ AppConfig, CONFIG_FILE_NAME };

const RESOURCES_DIR: &str = "resources";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::load(&Path::new(RESOURCES_DIR).join(CONFIG_FILE_NAME)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match cubegl::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
