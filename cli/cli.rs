mod cli_args;
mod commands;
mod output;

use clap::Parser;
use colored::*;
use log;
use std::process;

use cli_args::{Cli, normalize_legacy_flags};
use gemctx_core::AppError;

fn main() {
    let cli_args = Cli::parse_from(normalize_legacy_flags(std::env::args_os()));

    setup_logging(cli_args.quiet, cli_args.verbose);

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match commands::ask::handle_ask_command(cli_args) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(e.downcast_ref::<AppError>());
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn exit_code_for(core_err: Option<&AppError>) -> i32 {
    match core_err {
        Some(AppError::Config(_)) => 1,
        Some(AppError::TomlParse(_)) => 1,
        Some(AppError::InvalidArgument(_)) => 1,
        Some(AppError::DurationParse(_)) => 1,
        Some(AppError::FileRead { .. }) => 2,
        Some(AppError::Authentication(_)) => 3,
        Some(AppError::ModelNotFound { .. }) => 4,
        Some(AppError::RemoteApi { .. }) => 5,
        Some(AppError::Http(_)) => 5,
        Some(AppError::EmptyResponse(_)) => 5,
        Some(AppError::JsonSerialize(_)) => 5,
        Some(AppError::TikToken(_)) => 6,
        Some(_) => 1,
        None => 1,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}
