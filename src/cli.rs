//! Command-line interface for repcount
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Count exercise repetitions from a live camera or video
#[derive(Parser, Debug)]
#[command(
    name = "repcount",
    version,
    about = "Count exercise repetitions from a live camera or video",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Exercise to count (e.g. "Bench Press" or bench-press)
    #[arg(value_name = "EXERCISE")]
    pub exercise: Option<String>,

    /// Camera index, video file, stream URL or image directory (default: 0)
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: info, -vv: debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Pause after each emitted frame (default: 50ms). Examples: 100, 100ms, 1s
    #[arg(long, value_name = "DURATION", value_parser = parse_delay)]
    pub delay: Option<Duration>,

    /// Capture width in pixels
    #[arg(long, value_name = "PIXELS", value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Capture height in pixels
    #[arg(long, value_name = "PIXELS", value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// JPEG quality of emitted frames (1-100)
    #[arg(long, value_name = "QUALITY", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub jpeg_quality: Option<u8>,

    /// Pose estimator command, e.g. "python3 pose_sidecar.py"
    #[arg(long, value_name = "COMMAND", conflicts_with = "landmarks")]
    pub estimator: Option<String>,

    /// Replay recorded landmarks (JSON lines, one per frame) instead of running an estimator
    #[arg(long, value_name = "FILE")]
    pub landmarks: Option<PathBuf>,

    /// Draw the detected skeleton on emitted frames
    #[arg(long)]
    pub draw_landmarks: bool,
}

impl Cli {
    /// The estimator command split into program and arguments.
    pub fn estimator_command(&self) -> Option<Vec<String>> {
        let command: Vec<String> = self
            .estimator
            .as_deref()?
            .split_whitespace()
            .map(str::to_string)
            .collect();
        (!command.is_empty()).then_some(command)
    }
}

/// Parse a pacing delay.
///
/// Bare numbers are milliseconds; anything else goes through `humantime`
/// (`100ms`, `1s`, `1s500ms`).
fn parse_delay(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if let Ok(ms) = s.parse::<u64>() {
        return Ok(Duration::from_millis(ms));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List supported exercises and their counting rules
    Exercises,

    /// Check system dependencies (ffmpeg, pose estimator)
    Check,

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_without_arguments() {
        let cli = Cli::try_parse_from(["repcount"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.exercise.is_none());
        assert!(cli.source.is_none());
        assert!(cli.delay.is_none());
        assert!(cli.estimator.is_none());
        assert!(cli.landmarks.is_none());
        assert!(!cli.draw_landmarks);
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_exercise_and_source() {
        let cli = Cli::try_parse_from(["repcount", "Bench Press", "/videos/set1.mp4"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.exercise.as_deref(), Some("Bench Press"));
        assert_eq!(cli.source.as_deref(), Some("/videos/set1.mp4"));
    }

    #[test]
    fn test_parse_exercise_only() {
        let cli = Cli::try_parse_from(["repcount", "squats"]).unwrap();
        assert_eq!(cli.exercise.as_deref(), Some("squats"));
        assert!(cli.source.is_none());
    }

    #[test]
    fn test_parse_verbose_double() {
        let cli = Cli::try_parse_from(["repcount", "-vv", "Squats"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_options() {
        let cli = Cli::try_parse_from([
            "repcount",
            "Push-ups",
            "2",
            "--delay",
            "100",
            "--width",
            "320",
            "--height",
            "240",
            "--jpeg-quality",
            "70",
            "--estimator",
            "python3 pose_sidecar.py --lite",
            "--draw-landmarks",
        ])
        .unwrap();

        assert_eq!(cli.source.as_deref(), Some("2"));
        assert_eq!(cli.delay, Some(Duration::from_millis(100)));
        assert_eq!(cli.width, Some(320));
        assert_eq!(cli.height, Some(240));
        assert_eq!(cli.jpeg_quality, Some(70));
        assert_eq!(
            cli.estimator_command(),
            Some(vec![
                "python3".to_string(),
                "pose_sidecar.py".to_string(),
                "--lite".to_string()
            ])
        );
        assert!(cli.draw_landmarks);
    }

    #[test]
    fn test_blank_estimator_is_none() {
        let cli = Cli::try_parse_from(["repcount", "Squats", "--estimator", "  "]).unwrap();
        assert_eq!(cli.estimator_command(), None);
    }

    #[test]
    fn test_estimator_conflicts_with_landmarks() {
        let result = Cli::try_parse_from([
            "repcount",
            "Squats",
            "--estimator",
            "helper",
            "--landmarks",
            "poses.jsonl",
        ]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ArgumentConflict
        );
    }

    #[test]
    fn test_jpeg_quality_out_of_range() {
        let result = Cli::try_parse_from(["repcount", "Squats", "--jpeg-quality", "0"]);
        assert!(result.is_err());
        let result = Cli::try_parse_from(["repcount", "Squats", "--jpeg-quality", "101"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_width_rejected() {
        let result = Cli::try_parse_from(["repcount", "Squats", "--width", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_delay_formats() {
        assert_eq!(parse_delay("50"), Ok(Duration::from_millis(50)));
        assert_eq!(parse_delay("0"), Ok(Duration::ZERO));
        assert_eq!(parse_delay("100ms"), Ok(Duration::from_millis(100)));
        assert_eq!(parse_delay(" 1s "), Ok(Duration::from_secs(1)));
        assert!(parse_delay("soon").is_err());
    }

    #[test]
    fn test_parse_exercises_subcommand() {
        let cli = Cli::try_parse_from(["repcount", "exercises"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Exercises)));
        assert!(cli.exercise.is_none());
    }

    #[test]
    fn test_parse_check_with_trailing_global_quiet() {
        let cli = Cli::try_parse_from(["repcount", "check", "--quiet"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.command, Some(Commands::Check)));
    }

    #[test]
    fn test_parse_config_actions() {
        let cli = Cli::try_parse_from(["repcount", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Show
            })
        ));

        let cli = Cli::try_parse_from(["repcount", "config", "path"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Path
            })
        ));
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["repcount", "completions", "bash"]).unwrap();
        match cli.command {
            Some(Commands::Completions { shell }) => assert_eq!(shell, Shell::Bash),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["repcount", "Squats", "--config", "/path/to/config.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.toml")));
    }

    #[test]
    fn test_help_flag() {
        let err = Cli::try_parse_from(["repcount", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
