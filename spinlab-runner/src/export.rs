//! Export: JSON reports and CSV tables for external tools.
//!
//! - **JSON**: the full `AnalysisReport`, schema-versioned; newer versions are
//!   rejected on import
//! - **CSV**: per-number table, feature windows for an external classifier,
//!   and walk-forward steps
//!
//! An artifact directory bundles the JSON report with its CSV tables.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use spinlab_core::deviation::{DeviationRecord, PercentDeviation};
use spinlab_core::features::FeatureWindow;
use spinlab_core::wheel::POCKETS;
use spinlab_core::{topology, AnalysisReport, Outcome, SCHEMA_VERSION};

use crate::walk_forward::WalkForwardResult;

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_report_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize an `AnalysisReport`, rejecting schema versions newer than ours.
pub fn import_report_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn format_percent(p: PercentDeviation) -> String {
    match p.value() {
        Some(v) => format!("{v:.4}"),
        None => p.to_string(),
    }
}

/// One row per pocket, in numeric order.
///
/// Columns: number, color, dozen, column, section, count, expected,
/// percent_deviation
pub fn export_number_table_csv(report: &AnalysisReport) -> Result<String> {
    let table = &report.frequencies;
    let expected = table.total_spins as f64 / POCKETS as f64;
    let wheel = topology();

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "number",
        "color",
        "dozen",
        "column",
        "section",
        "count",
        "expected",
        "percent_deviation",
    ])?;
    for outcome in Outcome::ALL {
        let record = DeviationRecord::new(table.number_count(outcome), expected);
        wtr.write_record([
            outcome.value().to_string(),
            wheel.color_of(outcome).to_string(),
            outcome.dozen().map_or(0, |d| d.index()).to_string(),
            outcome.column().map_or(0, |c| c.index()).to_string(),
            wheel.section_of(outcome).name().to_string(),
            record.actual.to_string(),
            format!("{:.4}", record.expected),
            format_percent(record.percent_deviation),
        ])?;
    }
    finish(wtr)
}

/// Feature windows as a training table.
///
/// Columns: f1..fw, next, dozen_label. The window width is taken from the
/// first row; every row must share it.
pub fn export_windows_csv(windows: &[FeatureWindow]) -> Result<String> {
    let width = windows.first().map_or(0, |w| w.features.len());
    let mut header: Vec<String> = (1..=width).map(|i| format!("f{i}")).collect();
    header.push("next".to_string());
    header.push("dozen_label".to_string());

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(&header)?;
    for (i, window) in windows.iter().enumerate() {
        if window.features.len() != width {
            bail!(
                "window {i} has {} features, expected {width}",
                window.features.len()
            );
        }
        let mut row: Vec<String> = window.features.iter().map(u8::to_string).collect();
        row.push(window.next.to_string());
        row.push(window.dozen_label.to_string());
        wtr.write_record(&row)?;
    }
    finish(wtr)
}

/// Walk-forward steps.
///
/// Columns: index, actual, predicted_numbers, number_hit, predicted_dozen,
/// dozen_hit, predicted_column, column_hit. Predicted numbers are joined
/// with spaces; a missing prediction is an empty cell.
pub fn export_walk_forward_csv(result: &WalkForwardResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "index",
        "actual",
        "predicted_numbers",
        "number_hit",
        "predicted_dozen",
        "dozen_hit",
        "predicted_column",
        "column_hit",
    ])?;
    for step in &result.steps {
        let numbers: Vec<String> = step.predicted_numbers.iter().map(u8::to_string).collect();
        wtr.write_record([
            step.index.to_string(),
            step.actual.to_string(),
            numbers.join(" "),
            step.number_hit().to_string(),
            step.predicted_dozen
                .map_or_else(String::new, |d| d.index().to_string()),
            step.dozen_hit().to_string(),
            step.predicted_column
                .map_or_else(String::new, |c| c.index().to_string()),
            step.column_hit().to_string(),
        ])?;
    }
    finish(wtr)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save a report and its tables under `output_dir`.
///
/// Creates `analysis_{short sequence hash}/` containing:
/// - `report.json`: the full `AnalysisReport`
/// - `numbers.csv`: per-number counts and deviations
/// - `windows.csv`: feature windows, when any are given
///
/// Re-saving the same history overwrites the same directory. Returns its path.
pub fn save_artifacts(
    report: &AnalysisReport,
    windows: &[FeatureWindow],
    output_dir: &Path,
) -> Result<PathBuf> {
    let dirname = format!("analysis_{}", report.fingerprint.sequence_hash.short());
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let write = |name: &str, content: String| -> Result<()> {
        let path = run_dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))
    };
    write("report.json", export_report_json(report)?)?;
    write("numbers.csv", export_number_table_csv(report)?)?;
    if !windows.is_empty() {
        write("windows.csv", export_windows_csv(windows)?)?;
    }

    info!(dir = %run_dir.display(), "saved analysis artifacts");
    Ok(run_dir)
}

/// Load the report from an artifact directory.
pub fn load_artifacts(dir: &Path) -> Result<AnalysisReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_report_json(&json)
}
