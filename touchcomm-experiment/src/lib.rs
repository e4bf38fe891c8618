pub mod collect;
pub mod config;
pub mod sequencer;

pub use collect::{
    CategoricalCollector, ChoiceProcedure, CollectorOutcome, ResponseCollector, VasCollector,
};
pub use config::{parse_resolution, ExperimentConfig, GoStopProfile, ResponseMode};
pub use sequencer::{Sequencer, SessionParts, Step};
