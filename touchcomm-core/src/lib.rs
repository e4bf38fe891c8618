pub mod response;
pub mod stimulus;
pub mod table;
pub mod trial;

pub use response::TrialResponse;
pub use stimulus::{StimulusDef, StimulusSet, STIMULUS_NAMES};
pub use table::{Language, TextTable, UiText};
pub use trial::{build_trial_sequence, Trial};
