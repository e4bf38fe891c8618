// Commandline argument parser for the touch communication session runner

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use touchcomm_experiment::config::{parse_resolution, ExperimentConfig, ResponseMode};

#[derive(Debug, Parser, Clone)]
#[clap(version, about = "Runs a touch communication session across two screens")]
pub struct SessionArgs {
    /// Experiment name, used as the prefix of the output file names
    #[arg(long = "name", default_value = "TC-comm")]
    pub experiment_name: String,

    /// Participant code
    #[arg(short = 'p', long = "participant", default_value = "test")]
    pub participant_code: String,

    /// Number of trials per cue
    #[arg(short = 't', long = "trials-per-cue", default_value_t = 10)]
    pub trials_per_cue: usize,

    /// Hold each trial until the experimenter presses space
    #[arg(long = "press-to-continue")]
    pub press_to_continue: bool,

    /// Monitor index of the participant window
    #[arg(long = "participant-screen", default_value_t = 1)]
    pub participant_screen: usize,

    /// Monitor index of the experimenter window
    #[arg(long = "experimenter-screen", default_value_t = 0)]
    pub experimenter_screen: usize,

    /// Participant window resolution as WIDTH,HEIGHT
    #[arg(long = "participant-resolution", default_value = "1920,1200")]
    pub participant_resolution: String,

    /// Experimenter window resolution as WIDTH,HEIGHT
    #[arg(long = "experimenter-resolution", default_value = "1280,720")]
    pub experimenter_resolution: String,

    /// Folder for saving data
    #[arg(short = 'd', long = "data-dir", default_value = "data")]
    pub data_dir: PathBuf,

    /// Inter-stimulus interval in seconds
    #[arg(long = "isi", default_value_t = 6.0)]
    pub isi: f64,

    /// Response procedure for the participant
    #[arg(short = 'r', long = "response", value_enum, default_value_t = ResponseArg::Buttons)]
    pub response: ResponseArg,

    /// Deadline of the keyboard selection procedure, in seconds
    #[arg(long = "selection-timeout", default_value_t = 20.0)]
    pub selection_timeout: f64,

    /// Directory holding the display text and cue label tables
    #[arg(long = "text-dir", default_value = "text")]
    pub text_dir: PathBuf,

    /// Directory holding the cue recordings and the duration table
    #[arg(long = "sound-dir", default_value = "sounds")]
    pub sound_dir: PathBuf,

    /// TrueType font used for all on-screen text
    #[arg(
        long = "font",
        default_value = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
    )]
    pub font: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResponseArg {
    /// Categorical choice by clicking a labelled button
    Buttons,
    /// Categorical choice with cycle-and-confirm keys
    ButtonsKey,
    /// Pleasantness rating on a visual analogue scale
    Vas,
}

impl SessionArgs {
    pub fn to_config(&self) -> Result<ExperimentConfig> {
        Ok(ExperimentConfig {
            experiment_name: self.experiment_name.clone(),
            participant_code: self.participant_code.clone(),
            trials_per_cue: self.trials_per_cue,
            press_to_continue: self.press_to_continue,
            participant_screen: self.participant_screen,
            experimenter_screen: self.experimenter_screen,
            participant_resolution: parse_resolution(&self.participant_resolution)?,
            experimenter_resolution: parse_resolution(&self.experimenter_resolution)?,
            data_folder: self.data_dir.clone(),
            isi_secs: self.isi,
            response_mode: match self.response {
                ResponseArg::Buttons => ResponseMode::Buttons,
                ResponseArg::ButtonsKey => ResponseMode::ButtonsKeyboard,
                ResponseArg::Vas => ResponseMode::Vas,
            },
            selection_timeout_secs: self.selection_timeout,
            text_dir: self.text_dir.clone(),
            sound_dir: self.sound_dir.clone(),
            font_path: self.font.clone(),
        })
    }
}
