//! SpinLab Core: roulette outcome statistics engine.
//!
//! Pure, synchronous analysis over an ordered spin history:
//! - Wheel topology (colors, dozens, columns, halves, parity, sections, physical order)
//! - Frequency aggregation per category axis
//! - Trend detection against fair-wheel expectations
//! - Order-sensitive streak detection
//! - Chi-squared and wheel-section bias detection
//! - Circular arc (cluster) analysis
//! - Ranked, justified predictions drawn from all of the above
//!
//! `analysis::analyze` runs the whole pipeline and fingerprints its inputs.

pub mod analysis;
pub mod bias;
pub mod cluster;
pub mod config;
pub mod deviation;
pub mod features;
pub mod fingerprint;
pub mod frequency;
pub mod outcome;
pub mod pattern;
pub mod prediction;
pub mod stats;
pub mod status;
pub mod synthetic;
pub mod trend;
pub mod wheel;

pub use analysis::{analyze, AnalysisReport, SCHEMA_VERSION};
pub use config::{AnalysisConfig, ConfigError};
pub use outcome::{Outcome, OutcomeError, OutcomeSequence};
pub use status::StageStatus;
pub use wheel::{topology, ArcSize, TopologyError, WheelTopology};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: every report and input type is Send + Sync, so
    /// histories and results can cross thread boundaries freely.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Inputs
        require_send::<Outcome>();
        require_sync::<Outcome>();
        require_send::<OutcomeSequence>();
        require_sync::<OutcomeSequence>();
        require_send::<AnalysisConfig>();
        require_sync::<AnalysisConfig>();
        require_send::<WheelTopology>();
        require_sync::<WheelTopology>();

        // Stage reports
        require_send::<frequency::FrequencyTable>();
        require_sync::<frequency::FrequencyTable>();
        require_send::<trend::TrendReport>();
        require_sync::<trend::TrendReport>();
        require_send::<pattern::PatternReport>();
        require_sync::<pattern::PatternReport>();
        require_send::<bias::BiasReport>();
        require_sync::<bias::BiasReport>();
        require_send::<cluster::ClusterReport>();
        require_sync::<cluster::ClusterReport>();
        require_send::<prediction::PredictionReport>();
        require_sync::<prediction::PredictionReport>();
        require_send::<AnalysisReport>();
        require_sync::<AnalysisReport>();

        // Errors
        require_send::<OutcomeError>();
        require_sync::<OutcomeError>();
        require_send::<ConfigError>();
        require_sync::<ConfigError>();
        require_send::<TopologyError>();
        require_sync::<TopologyError>();
    }

    /// The static wheel passes its own integrity checks.
    #[test]
    fn static_topology_is_valid() {
        assert!(WheelTopology::standard().is_ok());
        assert_eq!(topology().order().len(), wheel::POCKETS);
    }
}
