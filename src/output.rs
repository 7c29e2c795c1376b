//! Human-readable terminal rendering for the `exercises` and `check` commands.
//!
//! The record stream on stdout is never routed through here.

use crate::diagnostics::{CheckResult, DependencyReport};
use crate::exercise::{ExerciseKind, Metric, MetricSpec, Predicate, metric};
use owo_colors::OwoColorize;

/// `angle(a, b, c)` or `a.y - b.y`.
pub fn describe_metric(metric: &Metric) -> String {
    match metric {
        Metric::JointAngle {
            proximal,
            vertex,
            distal,
        } => format!("angle({}, {}, {})", proximal, vertex, distal),
        Metric::VerticalOffset { first, second } => format!("{}.y - {}.y", first, second),
    }
}

/// `< 90` / `> 0`.
pub fn describe_predicate(predicate: &Predicate) -> String {
    match predicate {
        Predicate::Below(threshold) => format!("< {}", threshold),
        Predicate::Above(threshold) => format!("> {}", threshold),
    }
}

fn describe_rule(spec: &MetricSpec) -> String {
    format!(
        "{} [{}]  {} {}  {} {}",
        describe_metric(&spec.metric),
        spec.metric.unit(),
        "start".dimmed(),
        describe_predicate(&spec.activate),
        "count".dimmed(),
        describe_predicate(&spec.complete),
    )
}

/// One line per supported exercise: name, alias and counting rule.
pub fn render_exercises() -> String {
    let width = ExerciseKind::ALL
        .iter()
        .map(|kind| kind.display_name().len())
        .max()
        .unwrap_or(0);

    let mut out = String::from("Supported exercises:\n");
    for spec in metric::table() {
        let name = format!("{:<width$}", spec.kind.display_name());
        let alias = format!("{:<18}", format!("({})", spec.kind.slug()));
        out.push_str(&format!(
            "  {}  {}  {}\n",
            name.green(),
            alias.dimmed(),
            describe_rule(spec),
        ));
    }
    out
}

fn render_result(label: &str, result: &CheckResult, hint: &str) -> String {
    match result {
        CheckResult::Ok => format!("{}: {}\n", label, "✓ OK".green()),
        CheckResult::NotFound => {
            let mut line = format!("{}: {}\n", label, "✗ NOT FOUND".red());
            if !hint.is_empty() {
                line.push_str(&format!("  {}\n", hint.dimmed()));
            }
            line
        }
        CheckResult::Warning(msg) => format!("{}: {} {}\n", label, "⚠ WARNING:".yellow(), msg),
        CheckResult::Skipped(msg) => format!("{}: {}\n", label, msg.dimmed()),
    }
}

/// Multi-line report for `repcount check`.
pub fn render_dependency_report(report: &DependencyReport) -> String {
    let mut out = String::from("Checking system dependencies...\n\n");
    out.push_str(&render_result(
        "ffmpeg (camera and video capture)",
        &report.ffmpeg,
        "Install: sudo apt install ffmpeg  (Debian/Ubuntu)",
    ));
    out.push_str(&render_result(
        "video devices",
        &report.video_devices,
        "",
    ));
    out.push_str(&render_result(
        "pose estimator",
        &report.estimator,
        "Set [estimator] command in the config file or pass --estimator",
    ));
    out
}
