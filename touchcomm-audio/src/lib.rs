//! Cue playback. The sequencer only ever asks three things of audio: start
//! a named sound, poll whether the channel is still busy, and stop it on
//! abort. `AudioOutput` is that seam; the duration-model backend satisfies
//! it from the published duration table alone, the `playback` feature adds
//! a rodio-backed implementation with real output.

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::time::Instant;

#[cfg(feature = "playback")]
mod rodio_backend;
#[cfg(feature = "playback")]
pub use rodio_backend::RodioPlayback;

/// Handle to one entry of the sound bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundId(pub(crate) usize);

#[derive(Debug, Clone)]
pub struct Sound {
    pub name: String,
    pub path: PathBuf,
    /// Known duration in seconds, from the duration table. Cue files are
    /// never probed at runtime.
    pub duration: f64,
}

/// The fixed set of recordings a session can play.
#[derive(Debug, Clone, Default)]
pub struct SoundBank {
    sounds: Vec<Sound>,
}

impl SoundBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, path: PathBuf, duration: f64) -> SoundId {
        self.sounds.push(Sound {
            name: name.to_string(),
            path,
            duration,
        });
        SoundId(self.sounds.len() - 1)
    }

    pub fn get(&self, id: SoundId) -> &Sound {
        &self.sounds[id.0]
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SoundId, &Sound)> {
        self.sounds.iter().enumerate().map(|(i, s)| (SoundId(i), s))
    }
}

/// Single playback channel, mirroring the one mixer channel the protocol
/// uses: starting a sound replaces whatever was playing.
pub trait AudioOutput {
    fn play(&mut self, id: SoundId) -> Result<()>;
    fn is_busy(&self) -> bool;
    fn stop(&mut self);
}

/// Models playback purely from the bank's known durations. The busy flag
/// clears when the duration elapses, so sequencer timing is identical to a
/// real channel as long as the duration table matches the recordings.
#[derive(Debug)]
pub struct TimedPlayback {
    bank: SoundBank,
    current: Option<(Instant, f64)>,
}

impl TimedPlayback {
    pub fn new(bank: SoundBank) -> Self {
        Self {
            bank,
            current: None,
        }
    }
}

impl AudioOutput for TimedPlayback {
    fn play(&mut self, id: SoundId) -> Result<()> {
        if id.0 >= self.bank.len() {
            return Err(anyhow!("unknown sound id {:?}", id));
        }
        let sound = self.bank.get(id);
        log::debug!("playing {} ({:.3}s, modelled)", sound.name, sound.duration);
        self.current = Some((Instant::now(), sound.duration));
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.current
            .map(|(started, duration)| started.elapsed().as_secs_f64() < duration)
            .unwrap_or(false)
    }

    fn stop(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> SoundBank {
        let mut bank = SoundBank::new();
        bank.add("long", PathBuf::from("long.wav"), 60.0);
        bank.add("instant", PathBuf::from("instant.wav"), 0.0);
        bank
    }

    #[test]
    fn busy_until_duration_elapses() {
        let bank = bank();
        let (long, _) = bank.iter().next().unwrap();
        let mut audio = TimedPlayback::new(bank);
        assert!(!audio.is_busy());
        audio.play(long).unwrap();
        assert!(audio.is_busy());
        audio.stop();
        assert!(!audio.is_busy());
    }

    #[test]
    fn zero_duration_sound_finishes_immediately() {
        let bank = bank();
        let instant = bank.iter().nth(1).unwrap().0;
        let mut audio = TimedPlayback::new(bank);
        audio.play(instant).unwrap();
        assert!(!audio.is_busy());
    }

    #[test]
    fn unknown_id_is_an_error() {
        let mut empty = TimedPlayback::new(SoundBank::new());
        let bank = bank();
        let (id, _) = bank.iter().next().unwrap();
        assert!(empty.play(id).is_err());
    }
}
