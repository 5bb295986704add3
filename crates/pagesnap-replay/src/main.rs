//! Replay a scene file and print the commit log as JSON.

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: pagesnap-replay <scene.json>");
        return ExitCode::from(2);
    };

    log::info!("Starting PageSnap replay of {}", path);
    match pagesnap_replay::run(&path) {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Replay of {} failed: {}", path, e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
