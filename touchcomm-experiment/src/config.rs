use anyhow::{anyhow, Result};
use std::path::PathBuf;
use touchcomm_core::Language;

/// Which response procedure runs after each stimulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ResponseMode {
    /// Categorical choice by pointer click.
    Buttons,
    /// Categorical choice by cycling keys, with a timeout.
    ButtonsKeyboard,
    /// Continuous pleasantness rating on a visual analogue scale.
    Vas,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Buttons => "buttons",
            ResponseMode::ButtonsKeyboard => "buttons-key",
            ResponseMode::Vas => "vas",
        }
    }
}

/// Everything a session needs that comes from outside the code: CLI
/// arguments plus defaults. Resolved once at startup and immutable after.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub experiment_name: String,
    pub participant_code: String,
    /// Repetitions of each stimulus; total trials is this times the
    /// stimulus count.
    pub trials_per_cue: usize,
    /// Hold each trial until the experimenter presses the start key.
    pub press_to_continue: bool,
    pub participant_screen: usize,
    pub experimenter_screen: usize,
    pub participant_resolution: (u32, u32),
    pub experimenter_resolution: (u32, u32),
    pub data_folder: PathBuf,
    /// Inter-stimulus interval in seconds, measured from the end of the
    /// previous touch.
    pub isi_secs: f64,
    pub response_mode: ResponseMode,
    /// Deadline of the keyboard selection procedure.
    pub selection_timeout_secs: f64,
    pub text_dir: PathBuf,
    pub sound_dir: PathBuf,
    pub font_path: PathBuf,
}

impl ExperimentConfig {
    /// File name stem shared by the three output files of one run.
    pub fn file_stem(&self, date_time: &str) -> String {
        format!(
            "{}_{}_P{}",
            self.experiment_name, date_time, self.participant_code
        )
    }

    /// Key/value rows of the `_info.csv` metadata file, one per
    /// configuration field.
    pub fn info_rows(&self, date_time: &str, language: Language) -> Vec<(String, String)> {
        let row = |k: &str, v: String| (k.to_string(), v);
        let resolution = |(w, h): (u32, u32)| format!("{},{}", w, h);
        vec![
            row("Experiment name", self.experiment_name.clone()),
            row("Participant Code", self.participant_code.clone()),
            row("Date and time", date_time.to_string()),
            row("Language", language.code().to_string()),
            row("Response mode", self.response_mode.as_str().to_string()),
            row("Trials per cue", self.trials_per_cue.to_string()),
            row("ISI (s)", format!("{}", self.isi_secs)),
            row("Press to continue", self.press_to_continue.to_string()),
            row("Participant screen", self.participant_screen.to_string()),
            row("Experimenter screen", self.experimenter_screen.to_string()),
            row(
                "Participant screen resolution",
                resolution(self.participant_resolution),
            ),
            row(
                "Experimenter screen resolution",
                resolution(self.experimenter_resolution),
            ),
            row(
                "Folder for saving data",
                self.data_folder.display().to_string(),
            ),
        ]
    }
}

/// Parses a `WIDTH,HEIGHT` resolution argument.
pub fn parse_resolution(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .split_once(',')
        .ok_or_else(|| anyhow!("resolution '{}' is not WIDTH,HEIGHT", s))?;
    let width = w.trim().parse::<u32>()?;
    let height = h.trim().parse::<u32>()?;
    if width == 0 || height == 0 {
        return Err(anyhow!("resolution '{}' has a zero dimension", s));
    }
    Ok((width, height))
}

/// Timing profile of the go/stop recording that paces each touch: a short
/// silent lead, a spoken 3-2-1 countdown, the touch window, and a trailing
/// "stop" utterance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoStopProfile {
    pub silent_lead: f64,
    pub countdown: f64,
    pub stimulus: f64,
    pub stop_tail: f64,
}

impl Default for GoStopProfile {
    fn default() -> Self {
        Self {
            silent_lead: 0.064,
            countdown: 3.0,
            stimulus: 10.0,
            stop_tail: 0.434,
        }
    }
}

impl GoStopProfile {
    /// Duration of the whole recording.
    pub fn total(&self) -> f64 {
        self.silent_lead + self.countdown + self.stimulus + self.stop_tail
    }
}
