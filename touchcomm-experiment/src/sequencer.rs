//! Trial sequencing. One sequencer instance runs a whole session as a
//! state machine driven by input events and a per-frame `update` call:
//! wait for start, then for every trial pace the inter-stimulus interval,
//! play the audio cue, play the go/stop recording that brackets the touch,
//! and hand the participant window to the response collector. Aborting is
//! possible in every phase and always leaves the abort event as the last
//! log row.

use crate::collect::{CollectorOutcome, ResponseCollector};
use crate::config::{ExperimentConfig, GoStopProfile};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use touchcomm_audio::{AudioOutput, SoundId};
use touchcomm_core::{StimulusDef, StimulusSet, Trial, UiText};
use touchcomm_data::RunFiles;
use touchcomm_surface::{ButtonPanel, Key, PointerEvent, VasScale};
use touchcomm_timing::{Clock, Countdown};

/// What the caller should do after feeding the sequencer an event or a
/// frame: keep the loop running or tear the windows down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// Waiting for the start key; nothing is timestamped yet.
    Start,
    /// Cue shown to the toucher, holding for the continue key.
    WaitContinue,
    /// Counting down the inter-stimulus interval.
    IsiCountdown,
    /// Named cue recording is playing for the toucher.
    CueAudio,
    /// Go/stop recording is pacing the touch itself.
    GoStop,
    /// Response collector owns the participant window.
    Response,
    /// All trials done; lingering on the finished message.
    Finished { since: f64 },
    Done,
}

/// Everything assembled at startup that the sequencer takes ownership of.
pub struct SessionParts {
    pub config: ExperimentConfig,
    pub ui: UiText,
    pub stimuli: StimulusSet,
    pub trials: Vec<Trial>,
    pub files: RunFiles,
    pub cue_sounds: HashMap<String, SoundId>,
    pub go_stop_sound: SoundId,
    pub go_stop: GoStopProfile,
}

pub struct Sequencer<C: Clock, A: AudioOutput> {
    config: ExperimentConfig,
    ui: UiText,
    stimuli: StimulusSet,
    trials: Vec<Trial>,
    files: RunFiles,
    cue_sounds: HashMap<String, SoundId>,
    go_stop_sound: SoundId,
    go_stop: GoStopProfile,

    clock: C,
    audio: A,
    collector: Box<dyn ResponseCollector>,

    phase: Phase,
    /// Clock reading at the start key press; session time is measured from
    /// here so the start event is logged at exactly 0.
    origin: f64,
    countdown: Countdown,
    current: usize,
    current_cue: Option<StimulusDef>,
    start_log_needed: bool,
    stop_log_needed: bool,

    toucher_message: String,
    receiver_message: String,
    timer: Option<f64>,
}

impl<C: Clock, A: AudioOutput> Sequencer<C, A> {
    pub fn new(parts: SessionParts, clock: C, audio: A, collector: Box<dyn ResponseCollector>) -> Self {
        let toucher_message = parts.ui.start_message.clone();
        let receiver_message = parts.ui.wait_message.clone();
        Self {
            config: parts.config,
            ui: parts.ui,
            stimuli: parts.stimuli,
            trials: parts.trials,
            files: parts.files,
            cue_sounds: parts.cue_sounds,
            go_stop_sound: parts.go_stop_sound,
            go_stop: parts.go_stop,
            clock,
            audio,
            collector,
            phase: Phase::Start,
            origin: 0.0,
            countdown: Countdown::new(),
            current: 0,
            current_cue: None,
            start_log_needed: false,
            stop_log_needed: false,
            toucher_message,
            receiver_message,
            timer: None,
        }
    }

    /// Session time in seconds, 0 at the start key press.
    fn now(&self) -> f64 {
        self.clock.now() - self.origin
    }

    pub fn handle_key(&mut self, key: Key) -> Result<Step> {
        let now = self.now();
        match self.phase {
            Phase::Start => match key {
                Key::Start => {
                    self.origin = self.clock.now();
                    self.files.log_event(0.0, "experiment started")?;
                    self.countdown.reset(0.0, self.config.isi_secs);
                    self.begin_trial()?;
                    Ok(Step::Continue)
                }
                Key::Abort => self.abort(now),
                _ => Ok(Step::Continue),
            },
            Phase::WaitContinue => match key {
                Key::Start => {
                    let def = self.active_cue()?.clone();
                    self.toucher_message = def.toucher_text.clone();
                    let lead_in = self.cue_lead_in(&def);
                    self.countdown.reset(now, lead_in);
                    self.phase = Phase::IsiCountdown;
                    Ok(Step::Continue)
                }
                Key::Abort => self.abort(now),
                _ => Ok(Step::Continue),
            },
            Phase::IsiCountdown | Phase::CueAudio | Phase::GoStop => match key {
                Key::Abort => self.abort(now),
                _ => Ok(Step::Continue),
            },
            Phase::Response => {
                let outcome = self.collector.handle_key(key, now, &mut self.files)?;
                self.apply_outcome(outcome)
            }
            Phase::Finished { .. } | Phase::Done => Ok(Step::Continue),
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<Step> {
        if self.phase != Phase::Response {
            return Ok(Step::Continue);
        }
        let now = self.now();
        let outcome = self.collector.handle_pointer(event, now, &mut self.files)?;
        self.apply_outcome(outcome)
    }

    /// Advances time-driven transitions. Called once per frame.
    pub fn update(&mut self) -> Result<Step> {
        let now = self.now();
        match self.phase {
            Phase::Start | Phase::WaitContinue | Phase::Done => Ok(Step::Continue),
            Phase::IsiCountdown => {
                let remaining = self.countdown.remaining(now);
                self.timer = Some(remaining);
                let def = self.active_cue()?.clone();
                if remaining <= self.cue_lead_in(&def) {
                    let id = *self
                        .cue_sounds
                        .get(&def.name)
                        .ok_or_else(|| anyhow!("no sound loaded for '{}'", def.name))?;
                    self.audio.play(id)?;
                    self.files
                        .log_event(now, &format!("toucher cue {}", def.name))?;
                    self.toucher_message =
                        format!("{}.\n{}", def.toucher_text, self.ui.touch_message);
                    self.receiver_message = self.ui.fixation_message.clone();
                    self.phase = Phase::CueAudio;
                }
                Ok(Step::Continue)
            }
            Phase::CueAudio => {
                self.timer = Some(self.countdown.remaining(now));
                if !self.audio.is_busy() {
                    self.audio.play(self.go_stop_sound)?;
                    self.files
                        .log_event(now + self.go_stop.silent_lead, "countdown to touch")?;
                    self.start_log_needed = true;
                    self.stop_log_needed = true;
                    self.phase = Phase::GoStop;
                }
                Ok(Step::Continue)
            }
            Phase::GoStop => {
                let remaining = self.countdown.remaining(now);
                if remaining < 0.0 {
                    self.timer = None;
                    if self.start_log_needed {
                        self.files.log_event(now, "start touching")?;
                        self.start_log_needed = false;
                    }
                    if remaining < -self.go_stop.stimulus && self.stop_log_needed {
                        // the next inter-stimulus interval starts at touch
                        // offset, not at the response
                        self.countdown.reset(now, self.config.isi_secs);
                        self.files.log_event(now, "stop touching")?;
                        self.stop_log_needed = false;
                    }
                } else if self.stop_log_needed {
                    self.timer = Some(remaining);
                }
                if !self.audio.is_busy() {
                    self.toucher_message = self.ui.wait_message.clone();
                    self.receiver_message.clear();
                    self.timer = None;
                    let cue = self.trials[self.current].cue.clone();
                    self.collector.begin(&cue, now, &mut self.files)?;
                    self.phase = Phase::Response;
                }
                Ok(Step::Continue)
            }
            Phase::Response => {
                let outcome = self.collector.poll(now, &mut self.files)?;
                self.apply_outcome(outcome)
            }
            Phase::Finished { since } => {
                if now - since >= 2.0 {
                    self.files.close()?;
                    self.phase = Phase::Done;
                    Ok(Step::Exit)
                } else {
                    Ok(Step::Continue)
                }
            }
        }
    }

    fn cue_lead_in(&self, def: &StimulusDef) -> f64 {
        def.sound_duration + self.go_stop.silent_lead + self.go_stop.countdown
    }

    fn active_cue(&self) -> Result<&StimulusDef> {
        self.current_cue
            .as_ref()
            .ok_or_else(|| anyhow!("no trial is active"))
    }

    /// Sets up the next trial, or switches to the finished screen after the
    /// last one.
    fn begin_trial(&mut self) -> Result<()> {
        if self.current >= self.trials.len() {
            let now = self.now();
            self.toucher_message = self.ui.finished_message.clone();
            self.receiver_message = self.ui.finished_message.clone();
            self.timer = None;
            self.files.log_event(now, "experiment finished")?;
            log::info!("session finished after {} trials", self.trials.len());
            self.phase = Phase::Finished { since: now };
            return Ok(());
        }

        let cue = self.trials[self.current].cue.clone();
        let def = self
            .stimuli
            .get(&cue)
            .ok_or_else(|| anyhow!("trial cues unknown stimulus '{}'", cue))?
            .clone();
        self.receiver_message = self.ui.wait_message.clone();
        if self.config.press_to_continue {
            self.toucher_message = format!("{}\n{}", def.toucher_text, self.ui.continue_message);
            self.timer = None;
            self.phase = Phase::WaitContinue;
        } else {
            self.toucher_message = def.toucher_text.clone();
            self.phase = Phase::IsiCountdown;
        }
        self.current_cue = Some(def);
        Ok(())
    }

    fn apply_outcome(&mut self, outcome: Option<CollectorOutcome>) -> Result<Step> {
        match outcome {
            None => Ok(Step::Continue),
            Some(CollectorOutcome::Abort { time }) => self.abort(time),
            Some(CollectorOutcome::Response { response, .. }) => {
                let trial = &self.trials[self.current];
                self.files.write_trial(&[
                    trial.number.to_string(),
                    trial.cue.clone(),
                    response.data_field(),
                ])?;
                self.files.log_event(
                    self.now(),
                    &format!("{} of {} complete", trial.number, self.trials.len()),
                )?;
                self.current += 1;
                self.begin_trial()?;
                Ok(Step::Continue)
            }
        }
    }

    /// Stops any playing audio and ends the run; the abort event is the
    /// last row written to the log.
    fn abort(&mut self, time: f64) -> Result<Step> {
        log::warn!("aborting session at {:.3}s", time);
        self.audio.stop();
        self.files.log_abort(time)?;
        self.files.close()?;
        self.phase = Phase::Done;
        Ok(Step::Exit)
    }

    // view accessors for the renderer

    pub fn toucher_message(&self) -> &str {
        &self.toucher_message
    }

    pub fn receiver_message(&self) -> &str {
        &self.receiver_message
    }

    /// Ceiling-rounded countdown readout for the experimenter window, when
    /// one should be visible.
    pub fn timer_text(&self) -> Option<String> {
        self.timer.map(|t| format!("{}", t.ceil().max(0.0) as i64))
    }

    pub fn panel(&self) -> Option<&ButtonPanel> {
        self.collector.panel()
    }

    pub fn vas(&self) -> Option<&VasScale> {
        self.collector.vas()
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }
}
