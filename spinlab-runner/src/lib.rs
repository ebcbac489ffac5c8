//! SpinLab Runner: the collaborators around the analysis core.
//!
//! This crate builds on `spinlab-core` to provide:
//! - Ingestion of free-text and CSV spin lists
//! - An append-only JSONL spin history
//! - Walk-forward evaluation of predictions over a recorded history
//! - JSON and CSV export of reports, feature windows and evaluations

pub mod export;
pub mod history;
pub mod ingest;
pub mod walk_forward;

pub use export::{
    export_number_table_csv, export_report_json, export_walk_forward_csv, export_windows_csv,
    import_report_json, load_artifacts, save_artifacts,
};
pub use history::{HistoryError, SpinHistory, SpinRecord};
pub use ingest::{load_file, parse_csv, parse_text, IngestError};
pub use walk_forward::{
    run_walk_forward, AxisScore, StepResult, WalkForwardConfig, WalkForwardError,
    WalkForwardResult,
};
