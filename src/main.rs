mod cli;
mod client;
mod config;
mod dto;
mod error;
mod file;
mod server;
mod validate;

use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Commands};
use client::TranscriptionClient;
use config::Settings;

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    let outcome = match cli.command {
        Commands::Serve { host, port } => server::run_server(host, port, settings).await,
        Commands::TranscribeFile(args) => match TranscriptionClient::new(&settings) {
            Ok(client) => file::run_file(args, &client).await,
            Err(e) => Err(e.into()),
        },
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
