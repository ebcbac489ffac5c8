//! End-to-end analysis pipeline.
//!
//! frequency → trend → bias, frequency → cluster, sequence → pattern, and all
//! of them → prediction. Each stage receives immutable outputs of the stages
//! before it; nothing is shared or mutated between calls.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::bias::{detect_biases, BiasReport};
use crate::cluster::{analyze_clusters, ClusterReport};
use crate::config::AnalysisConfig;
use crate::fingerprint::{AnalysisFingerprint, SequenceHash};
use crate::frequency::{calculate_frequencies, FrequencyTable};
use crate::outcome::OutcomeSequence;
use crate::pattern::{detect_patterns, PatternReport};
use crate::prediction::{generate_predictions, PredictionInputs, PredictionReport};
use crate::trend::{identify_trends, TrendReport};
use crate::wheel::topology;

/// Bumped whenever the serialized shape of `AnalysisReport` changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub schema_version: u32,
    pub fingerprint: AnalysisFingerprint,
    pub frequencies: FrequencyTable,
    pub trends: TrendReport,
    pub patterns: PatternReport,
    pub biases: BiasReport,
    pub clusters: ClusterReport,
    pub predictions: PredictionReport,
}

/// Run every stage over `sequence`.
///
/// An empty history skips all stage algorithms: each stage reports its
/// insufficient form and predictions carry the no-data note.
#[instrument(skip_all, fields(spins = sequence.len()))]
pub fn analyze(sequence: &OutcomeSequence, config: &AnalysisConfig) -> AnalysisReport {
    let fingerprint = AnalysisFingerprint {
        sequence_hash: SequenceHash::of(sequence),
        config_hash: config.config_hash(),
        total_spins: sequence.len(),
    };

    let frequencies = calculate_frequencies(sequence);
    let (trends, patterns, biases, clusters) = if sequence.is_empty() {
        let required = config.gates.min_spins;
        (
            TrendReport::insufficient(required, 0),
            PatternReport::insufficient(required, 0),
            BiasReport::insufficient(required, 0),
            ClusterReport::insufficient(required, 0, config.cluster.arc_size),
        )
    } else {
        let trends = identify_trends(&frequencies, config);
        let patterns = detect_patterns(sequence, config);
        let biases = detect_biases(&frequencies, &trends.number_deviations, config);
        let clusters = analyze_clusters(&frequencies, topology(), config);
        (trends, patterns, biases, clusters)
    };
    debug!(
        trend = ?trends.status,
        pattern = ?patterns.status,
        bias = ?biases.status,
        cluster = ?clusters.status,
        "stages complete"
    );

    let predictions = generate_predictions(
        &PredictionInputs {
            trends: &trends,
            patterns: &patterns,
            biases: &biases,
            clusters: &clusters,
        },
        sequence,
        config,
    );

    AnalysisReport {
        schema_version: SCHEMA_VERSION,
        fingerprint,
        frequencies,
        trends,
        patterns,
        biases,
        clusters,
        predictions,
    }
}
