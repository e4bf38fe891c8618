//! Session assembly. Everything that can fail does so here, before any
//! trial starts: table files are resolved against the full stimulus set,
//! the output files are created, and the sound bank is built.

#[cfg(feature = "playback")]
use anyhow::Context;
use anyhow::Result;
use std::collections::HashMap;
use touchcomm_audio::SoundBank;
use touchcomm_core::{build_trial_sequence, Language, StimulusSet, TextTable, UiText, STIMULUS_NAMES};
use touchcomm_data::RunFiles;
use touchcomm_experiment::{
    CategoricalCollector, ChoiceProcedure, ExperimentConfig, GoStopProfile, ResponseCollector,
    ResponseMode, Sequencer, SessionParts, VasCollector,
};
use touchcomm_surface::VasScale;
use touchcomm_timing::ExperimentClock;

#[cfg(feature = "playback")]
pub type Playback = touchcomm_audio::RodioPlayback;
#[cfg(not(feature = "playback"))]
pub type Playback = touchcomm_audio::TimedPlayback;

pub type Session = Sequencer<ExperimentClock, Playback>;

/// Builds a ready-to-start sequencer for the chosen language.
pub fn build(config: &ExperimentConfig, language: Language) -> Result<Session> {
    let display = TextTable::load(
        &config
            .text_dir
            .join(format!("display-text-{}.txt", language.code())),
    )?;
    let ui = UiText::from_table(&display)?;

    let receiver_cues = TextTable::load(
        &config
            .text_dir
            .join(format!("receiver-cues-{}.txt", language.code())),
    )?;
    let toucher_cues = TextTable::load(&config.text_dir.join("toucher-cues.txt"))?;
    let durations = TextTable::load(&config.sound_dir.join("durations.txt"))?;

    let stimuli = StimulusSet::from_tables(
        &STIMULUS_NAMES,
        &toucher_cues,
        &receiver_cues,
        &durations,
        &config.sound_dir,
    )?;

    let trials = build_trial_sequence(&stimuli.names(), config.trials_per_cue, &mut rand::rng());

    let date_time = chrono::Local::now()
        .format("%Y-%m-%d_%H-%M-%S")
        .to_string();
    let files = RunFiles::create(
        &config.data_folder,
        &config.file_stem(&date_time),
        &config.info_rows(&date_time, language),
    )?;
    log::info!(
        "writing session data to {}",
        files.data_path().display()
    );

    let go_stop = GoStopProfile::default();
    let mut bank = SoundBank::new();
    let mut cue_sounds = HashMap::new();
    for def in stimuli.iter() {
        let id = bank.add(&def.name, def.sound_path.clone(), def.sound_duration);
        cue_sounds.insert(def.name.clone(), id);
    }
    let go_stop_sound = bank.add(
        "go-stop",
        config.sound_dir.join("go-stop.wav"),
        go_stop.total(),
    );
    #[cfg(feature = "playback")]
    let audio = Playback::new(bank).context("setting up audio playback")?;
    #[cfg(not(feature = "playback"))]
    let audio = Playback::new(bank);

    let collector: Box<dyn ResponseCollector> = match config.response_mode {
        ResponseMode::Buttons => Box::new(CategoricalCollector::new(
            stimuli.clone(),
            ChoiceProcedure::Pointer,
        )?),
        ResponseMode::ButtonsKeyboard => Box::new(CategoricalCollector::new(
            stimuli.clone(),
            ChoiceProcedure::Keyboard {
                timeout: config.selection_timeout_secs,
            },
        )?),
        ResponseMode::Vas => Box::new(VasCollector::new(VasScale::new(
            ui.vas_question.clone(),
            ui.vas_min_label.clone(),
            ui.vas_max_label.clone(),
            ui.vas_accept_pre.clone(),
            ui.vas_accept.clone(),
        ))),
    };

    log::info!(
        "session ready: {} trials, {} response, language {}",
        trials.len(),
        config.response_mode.as_str(),
        language.code()
    );

    let parts = SessionParts {
        config: config.clone(),
        ui,
        stimuli,
        trials,
        files,
        cue_sounds,
        go_stop_sound,
        go_stop,
    };
    Ok(Sequencer::new(
        parts,
        ExperimentClock::new(),
        audio,
        collector,
    ))
}
