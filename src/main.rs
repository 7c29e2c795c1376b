use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use repcount::app::{RunOptions, run_count_command};
use repcount::cli::{Cli, Commands, ConfigAction};
use repcount::config::Config;
use repcount::diagnostics::check_dependencies;
use repcount::output::{render_dependency_report, render_exercises};
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    repcount::telemetry::init(cli.quiet, cli.verbose);

    match cli.command {
        None => {
            let Some(exercise) = cli.exercise.clone() else {
                Cli::command()
                    .error(
                        ErrorKind::MissingRequiredArgument,
                        "an exercise name is required, e.g. `repcount \"Bench Press\"` (see `repcount exercises`)",
                    )
                    .exit();
            };
            let config = load_config(cli.config.as_deref())?;
            let options = RunOptions {
                source: cli.source.clone(),
                delay: cli.delay,
                width: cli.width,
                height: cli.height,
                jpeg_quality: cli.jpeg_quality,
                estimator: cli.estimator_command(),
                landmarks: cli.landmarks.clone(),
                draw_landmarks: cli.draw_landmarks,
            };
            let summary = run_count_command(config, &exercise, options).await?;
            if !cli.quiet {
                eprintln!(
                    "{} {} repetitions over {} frames",
                    "Done:".green(),
                    summary.repetitions,
                    summary.frames_read
                );
            }
        }
        Some(Commands::Exercises) => {
            print!("{}", render_exercises());
        }
        Some(Commands::Check) => {
            let config = load_config(cli.config.as_deref())?;
            let report = check_dependencies(&config.estimator.command);
            print!("{}", render_dependency_report(&report));
            if !report.capture_ready() {
                std::process::exit(1);
            }
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "repcount",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config), which must exist
/// 2. Default config path (~/.config/repcount/config.toml)
/// 3. Built-in defaults
///
/// Environment variable overrides apply on top of all three.
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path()?)?
    };
    Ok(config.with_env_overrides()?)
}

/// Handle configuration commands.
fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            let path = match custom_path {
                Some(path) => PathBuf::from(path),
                None => Config::default_path()?,
            };
            println!("{}", path.display());
        }
    }
    Ok(())
}
