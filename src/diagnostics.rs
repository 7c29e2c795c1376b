//! System diagnostics and dependency checking.
//!
//! Verifies that the capture tool and the configured pose estimator exist.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Result of a dependency check.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckResult {
    /// Tool is installed and working
    Ok,
    /// Tool is not found
    NotFound,
    /// Tool is found but has issues
    Warning(String),
    /// Nothing to check
    Skipped(String),
}

/// Outcome of every check run by `repcount check`.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyReport {
    pub ffmpeg: CheckResult,
    pub video_devices: CheckResult,
    pub estimator: CheckResult,
}

impl DependencyReport {
    /// Whether live capture can work at all.
    pub fn capture_ready(&self) -> bool {
        self.ffmpeg == CheckResult::Ok
    }
}

/// Check if a command exists and answers its version flag.
fn check_command(command: &str, version_flag: &str) -> CheckResult {
    match Command::new(command).arg(version_flag).output() {
        Ok(output) if output.status.success() => CheckResult::Ok,
        Ok(_) => CheckResult::Warning(format!("'{}' found but {} failed", command, version_flag)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", command, e)),
    }
}

/// Look for `/dev/video*` nodes under `dev_dir`.
fn check_video_devices(dev_dir: &Path) -> CheckResult {
    let Ok(entries) = std::fs::read_dir(dev_dir) else {
        return CheckResult::Warning(format!("cannot read {}", dev_dir.display()));
    };
    let mut devices: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("video"))
        .collect();
    devices.sort();

    if devices.is_empty() {
        CheckResult::Warning("no video devices found (files and image directories still work)".into())
    } else {
        tracing::debug!(devices = ?devices, "video devices found");
        CheckResult::Ok
    }
}

/// Resolve `program` the way the shell would: paths as-is, bare names via `$PATH`.
pub fn find_program(program: &str) -> Option<PathBuf> {
    if program.contains('/') {
        let path = PathBuf::from(program);
        return path.is_file().then_some(path);
    }
    let search = std::env::var_os("PATH")?;
    std::env::split_paths(&search)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Check that the estimator program can be found.
fn check_estimator(command: &[String]) -> CheckResult {
    let Some(program) = command.first() else {
        return CheckResult::Skipped(
            "not configured (frames will carry no pose, counts stay at 0)".to_string(),
        );
    };
    match find_program(program) {
        Some(_) => CheckResult::Ok,
        None => CheckResult::NotFound,
    }
}

/// Run all dependency checks.
pub fn check_dependencies(estimator_command: &[String]) -> DependencyReport {
    DependencyReport {
        ffmpeg: check_command("ffmpeg", "-version"),
        video_devices: check_video_devices(Path::new("/dev")),
        estimator: check_estimator(estimator_command),
    }
}
