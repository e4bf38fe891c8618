pub mod clock;

pub use clock::{Clock, Countdown, ExperimentClock, ManualClock};
