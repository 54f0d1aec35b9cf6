use crate::cli_args::Cli;
use crate::output::{
    print_dry_run_summary, print_skip_notices, print_token_estimate, print_token_usage,
    write_to_file, write_to_stdout,
};
use anyhow::{Context, Result};
use colored::*;
use gemctx_core::{
    self as core, AppError, Config, Dispatch, DispatchOptions, FileFilter, GeminiClient,
};
use log;
use std::env;

pub fn handle_ask_command(args: Cli) -> Result<()> {
    let quiet = args.quiet;
    core::validate_question(&args.question)?;
    let cwd = env::current_dir().context("Failed to determine current directory")?;

    let config = Config::load(&cwd, args.config.as_deref(), args.no_config)
        .context("Failed to load configuration")?;
    log::debug!("Effective config: {:?}", config);

    // Credentials are resolved before any file is read, and only when sending.
    let api_key = if args.dry_run {
        None
    } else {
        Some(core::resolve_api_key(
            &config.api.key_env,
            &core::default_env_files(),
        )?)
    };
    let timeout = config.get_timeout()?;

    let filter_config =
        config.build_filter_config(&args.exclude_ext, &args.exclude_name, args.max_bytes)?;
    log::debug!("Filter config: {:?}", filter_config);
    let filter = FileFilter::new(filter_config);

    let assembly = core::assemble(&args.question, &args.files, &args.dirs, &filter)
        .context("Failed to assemble prompt")?;

    let options = DispatchOptions {
        model: config.get_effective_model(args.model.as_deref()),
        dry_run: args.dry_run,
        token_usage: args.token_usage,
    };

    if !args.dry_run && !quiet {
        print_skip_notices(&assembly);
        eprintln!(
            "{} {} ({} files, {} bytes)...",
            "Sending request to Gemini API using model".blue(),
            options.model.bold(),
            assembly.aggregation.files.len(),
            assembly.prompt.len()
        );
    }

    let base_url = config.api.base_url.clone();
    let outcome = core::dispatch(assembly.prompt.clone(), &options, move || {
        let api_key = api_key.ok_or_else(|| {
            AppError::Authentication("No API key was resolved.".to_string())
        })?;
        GeminiClient::new(api_key, base_url, timeout)
    })?;

    match outcome {
        Dispatch::Preview {
            prompt,
            token_estimate,
        } => {
            write_to_stdout(prompt.as_str())?;
            if !quiet {
                print_dry_run_summary(&assembly, token_estimate);
            } else if let Some(tokens) = token_estimate {
                print_token_estimate(tokens);
            }
        }
        Dispatch::Response(response) => {
            write_to_stdout(&response.text)?;
            if let Some(path) = &args.output {
                match write_to_file(path, &response.text) {
                    Ok(()) => {
                        if !quiet {
                            eprintln!(
                                "{} Response saved to: {}",
                                "✅".green(),
                                path.display().to_string().blue()
                            );
                        }
                    }
                    Err(e) => {
                        eprintln!(
                            "{} Error saving response to file {}: {:#}",
                            "⚠️".yellow(),
                            path.display(),
                            e
                        );
                    }
                }
            }
            if args.token_usage {
                print_token_usage(response.usage.as_ref());
            }
        }
    }
    Ok(())
}
