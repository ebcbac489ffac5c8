//! Plain-text rendering of analysis and walk-forward results.

use std::fmt::Write;

use spinlab_core::deviation::DeviationRecord;
use spinlab_core::prediction::Axis;
use spinlab_core::trend::NumberTrend;
use spinlab_core::{AnalysisReport, StageStatus};
use spinlab_runner::{AxisScore, WalkForwardResult};

fn status_label(status: &StageStatus) -> String {
    match status {
        StageStatus::Insufficient { required, actual } => {
            format!("insufficient ({actual}/{required} spins)")
        }
        StageStatus::LowConfidence { spins } => format!("low confidence ({spins} spins)"),
        StageStatus::Complete => "complete".to_string(),
    }
}

fn percent(rate: Option<f64>) -> String {
    rate.map_or_else(|| "-".to_string(), |r| format!("{:.1}%", r * 100.0))
}

fn number_list(trends: &[NumberTrend]) -> String {
    if trends.is_empty() {
        return "none".to_string();
    }
    trends
        .iter()
        .map(|t| format!("{} ({}x, {})", t.number, t.actual, t.percent_deviation))
        .collect::<Vec<_>>()
        .join(", ")
}

fn category_line<K: std::fmt::Display>(
    out: &mut String,
    label: &str,
    items: &std::collections::BTreeMap<K, DeviationRecord>,
) {
    if items.is_empty() {
        return;
    }
    let cells: Vec<String> = items
        .iter()
        .map(|(k, r)| format!("{k}: {} ({})", r.actual, r.percent_deviation))
        .collect();
    let _ = writeln!(out, "  {label:<9} {}", cells.join(" | "));
}

/// Multi-section text report, one block per stage.
pub fn analysis_report(report: &AnalysisReport) -> String {
    let mut out = String::with_capacity(2048);
    let fp = &report.fingerprint;

    let _ = writeln!(out, "=== Spin Analysis ===");
    let _ = writeln!(out, "Spins:          {}", fp.total_spins);
    let _ = writeln!(out, "History hash:   {}", fp.sequence_hash.short());
    let f = &report.frequencies;
    if f.total_spins > 0 {
        let colors: Vec<String> = f.colors.iter().map(|(c, n)| format!("{c} {n}")).collect();
        let _ = writeln!(out, "Colors:         {}", colors.join(", "));
        let _ = writeln!(out, "Zeros:          {}", f.zero_count());
    }

    let t = &report.trends;
    let _ = writeln!(out);
    let _ = writeln!(out, "--- Trends [{}] ---", status_label(&t.status));
    let _ = writeln!(out, "{}", t.message);
    if !t.status.is_insufficient() {
        let _ = writeln!(out, "  Hot:      {}", number_list(&t.hot_numbers));
        let _ = writeln!(out, "  Cold:     {}", number_list(&t.cold_numbers));
        let c = &t.category_trends;
        category_line(&mut out, "Colors", &c.colors);
        category_line(&mut out, "Dozens", &c.dozens);
        category_line(&mut out, "Columns", &c.columns);
        category_line(&mut out, "Halves", &c.halves);
        category_line(&mut out, "Parity", &c.parities);
    }

    let p = &report.patterns;
    let _ = writeln!(out);
    let _ = writeln!(out, "--- Patterns [{}] ---", status_label(&p.status));
    let _ = writeln!(out, "{}", p.message);
    if !p.status.is_insufficient() {
        let longest = &p.number_repeats.longest;
        if let Some(n) = longest.value {
            let _ = writeln!(out, "  Longest repeat:   {n} x{}", longest.length);
        }
        let _ = writeln!(
            out,
            "  Immediate repeats: {}",
            p.number_repeats.total_immediate_repeats
        );
        let _ = writeln!(out, "  Red/black alternation: {}", p.alternating_color_streak);
        if let Some(d) = p.dozen_streak.value {
            let _ = writeln!(out, "  Dozen streak:     dozen {d} x{}", p.dozen_streak.length);
        }
        if let Some(c) = p.column_streak.value {
            let _ = writeln!(out, "  Column streak:    column {c} x{}", p.column_streak.length);
        }
    }

    let b = &report.biases;
    let _ = writeln!(out);
    let _ = writeln!(out, "--- Bias [{}] ---", status_label(&b.status));
    let _ = writeln!(out, "{}", b.message);
    if let Some(test) = b.chi_squared.test() {
        let _ = writeln!(
            out,
            "  Chi-squared: {:.2} (critical {:.1}, df {}, p {:.4})",
            test.statistic, test.critical_value, test.degrees_of_freedom, test.p_value
        );
        let _ = writeln!(out, "  {}", test.message);
    }
    for s in &b.sections {
        let _ = writeln!(
            out,
            "  {:<18} {:>4} hits, {:>6.1} expected, {} ({})",
            s.section.name(),
            s.observed,
            s.expected,
            s.percent_deviation,
            s.status
        );
    }
    let _ = writeln!(out, "  {}", b.interpretation);

    let cl = &report.clusters;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "--- Wheel arcs, size {} [{}] ---",
        cl.arc_size.get(),
        status_label(&cl.status)
    );
    let _ = writeln!(out, "{}", cl.message);
    for (label, zones) in [("Hot", &cl.hot_zones), ("Cold", &cl.cold_zones)] {
        for z in zones {
            let members: Vec<String> = z.members.iter().map(u8::to_string).collect();
            let _ = writeln!(
                out,
                "  {label:<5} center {:>2}: [{}] {} hits, {}",
                z.center,
                members.join(" "),
                z.observed,
                z.percent_deviation
            );
        }
    }

    let pr = &report.predictions;
    let _ = writeln!(out);
    let _ = writeln!(out, "--- Predictions ---");
    for line in &pr.summary {
        let _ = writeln!(out, "{line}");
    }
    for axis in Axis::ALL {
        for c in pr.for_axis(axis) {
            let _ = writeln!(
                out,
                "  {:<8} {:<18} {}",
                axis.to_string(),
                c.subject.to_string(),
                c.reason_text()
            );
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", pr.confidence_note);
    out
}

fn score_line(out: &mut String, label: &str, score: &AxisScore) {
    let _ = writeln!(
        out,
        "{label:<9} {:>5} / {:<5} hit rate {:>6}  baseline {:>6}",
        score.hits,
        score.predictions,
        percent(score.hit_rate),
        percent(score.baseline_rate)
    );
}

pub fn walk_forward_summary(result: &WalkForwardResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Walk-forward ===");
    let _ = writeln!(
        out,
        "Steps:    {} (warmup {})",
        result.steps.len(),
        result.warmup
    );
    score_line(&mut out, "Numbers", &result.numbers);
    score_line(&mut out, "Dozens", &result.dozens);
    score_line(&mut out, "Columns", &result.columns);
    out
}
