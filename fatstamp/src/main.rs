use clap::Parser;
use fatstamp::{app, cli::Cli, config::FlashConfig, logging};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = FlashConfig::from_cli(&Cli::parse());
    logging::init(config.verbose);

    match app::run(config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
