//! Wheel cluster analysis: hot and cold arcs of physically adjacent pockets.
//!
//! Every slot on the wheel centers one arc of `arc_size` contiguous pockets
//! (wrapping past 26 back to 0). Each arc's observed hits are compared to
//! `arc_size × total_spins / 37`; arcs beyond the cluster threshold in either
//! direction are reported, in physical slot order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::deviation::{DeviationRecord, PercentDeviation};
use crate::frequency::FrequencyTable;
use crate::status::StageStatus;
use crate::wheel::{ArcSize, WheelTopology, POCKETS};

/// One evaluated arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcZone {
    pub center: u8,
    /// Arc members in physical order.
    pub members: Vec<u8>,
    pub observed: u32,
    pub expected: f64,
    pub percent_deviation: PercentDeviation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterReport {
    pub status: StageStatus,
    pub message: String,
    pub arc_size: ArcSize,
    pub hot_zones: Vec<ArcZone>,
    pub cold_zones: Vec<ArcZone>,
}

impl ClusterReport {
    pub fn insufficient(required: usize, actual: usize, arc_size: ArcSize) -> Self {
        Self {
            status: StageStatus::Insufficient { required, actual },
            message: format!(
                "Insufficient data for wheel cluster analysis (minimum {required} spins required, \
                 got {actual})."
            ),
            arc_size,
            hot_zones: Vec::new(),
            cold_zones: Vec::new(),
        }
    }
}

/// Evaluate the arc centered on every slot, in slot order.
pub fn evaluate_arcs(
    frequencies: &FrequencyTable,
    wheel: &WheelTopology,
    arc_size: ArcSize,
) -> Vec<ArcZone> {
    let expected = arc_size.get() as f64 * frequencies.total_spins as f64 / POCKETS as f64;
    (0..POCKETS)
        .map(|slot| {
            let members = wheel.arc(slot, arc_size);
            let record = DeviationRecord::new(frequencies.hits_on(&members), expected);
            ArcZone {
                center: wheel.order()[slot].value(),
                members: members.iter().map(|m| m.value()).collect(),
                observed: record.actual,
                expected: record.expected,
                percent_deviation: record.percent_deviation,
            }
        })
        .collect()
}

pub fn analyze_clusters(
    frequencies: &FrequencyTable,
    wheel: &WheelTopology,
    config: &AnalysisConfig,
) -> ClusterReport {
    let arc_size = config.cluster.arc_size;
    let status = config.gates.cluster().classify(frequencies.total_spins);
    if let StageStatus::Insufficient { required, actual } = status {
        return ClusterReport::insufficient(required, actual, arc_size);
    }

    let threshold = config.thresholds.cluster;
    let mut hot_zones = Vec::new();
    let mut cold_zones = Vec::new();
    for zone in evaluate_arcs(frequencies, wheel, arc_size) {
        if zone.percent_deviation.is_above(threshold) {
            hot_zones.push(zone);
        } else if zone.percent_deviation.is_below(-threshold) {
            cold_zones.push(zone);
        }
    }
    debug!(
        arc_size = arc_size.get(),
        hot = hot_zones.len(),
        cold = cold_zones.len(),
        "evaluated wheel arcs"
    );

    let found = !hot_zones.is_empty() || !cold_zones.is_empty();
    let message = match status {
        StageStatus::LowConfidence { spins } => format!(
            "Wheel cluster analysis performed, but with only {spins} spins, identified hot/cold \
             zones may be due to random chance. Interpret with extreme caution."
        ),
        _ if found => "Wheel cluster analysis complete. Hot/cold zones identified.".to_string(),
        _ => "Wheel cluster analysis performed. No significant hot or cold wheel zones \
              identified with current settings."
            .to_string(),
    };

    ClusterReport {
        status,
        message,
        arc_size,
        hot_zones,
        cold_zones,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::calculate_frequencies;
    use crate::outcome::OutcomeSequence;
    use crate::wheel::{topology, WHEEL_ORDER};

    fn clusters_for(numbers: &[u8], config: &AnalysisConfig) -> ClusterReport {
        let seq = OutcomeSequence::from_numbers(numbers.iter().copied()).unwrap();
        analyze_clusters(&calculate_frequencies(&seq), topology(), config)
    }

    #[test]
    fn thirty_seven_evaluations() {
        let seq = OutcomeSequence::from_numbers(WHEEL_ORDER).unwrap();
        let zones = evaluate_arcs(&calculate_frequencies(&seq), topology(), ArcSize::default());
        assert_eq!(zones.len(), 37);
        assert_eq!(zones[0].center, 0);
        assert_eq!(zones[0].members, vec![3, 26, 0, 32, 15]);
        for zone in &zones {
            assert_eq!(zone.observed, 5);
            assert!((zone.expected - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn uniform_has_no_zones() {
        let numbers: Vec<u8> = WHEEL_ORDER.iter().chain(WHEEL_ORDER.iter()).copied().collect();
        for size in [3, 5, 7, 37] {
            let mut config = AnalysisConfig::default();
            config.cluster.arc_size = ArcSize::new(size).unwrap();
            let report = clusters_for(&numbers, &config);
            assert!(report.hot_zones.is_empty(), "arc size {size}");
            assert!(report.cold_zones.is_empty(), "arc size {size}");
            assert!(report.message.contains("No significant"));
        }
    }

    #[test]
    fn concentrated_zone_is_hot() {
        // Hit 0, 32, 15, 19, 4 ten times each, plus one lap of the wheel.
        let mut numbers: Vec<u8> = Vec::new();
        for _ in 0..10 {
            numbers.extend_from_slice(&[0, 32, 15, 19, 4]);
        }
        numbers.extend_from_slice(&WHEEL_ORDER);
        let report = clusters_for(&numbers, &AnalysisConfig::default());
        assert_eq!(report.status, StageStatus::Complete);
        let centers: Vec<u8> = report.hot_zones.iter().map(|z| z.center).collect();
        assert!(centers.contains(&15));
        assert!(!report.cold_zones.is_empty());
        // Physical slot order is preserved.
        let slots: Vec<usize> = report
            .hot_zones
            .iter()
            .map(|z| WHEEL_ORDER.iter().position(|&n| n == z.center).unwrap())
            .collect();
        let mut sorted = slots.clone();
        sorted.sort_unstable();
        assert_eq!(slots, sorted);
    }

    #[test]
    fn gated_below_minimum() {
        let report = clusters_for(&[1, 2], &AnalysisConfig::default());
        assert!(report.status.is_insufficient());
        assert!(report.hot_zones.is_empty());
        assert_eq!(report.arc_size.get(), 5);
    }
}
