use crate::table::TextTable;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// The fixed cue set used by the touch-communication protocol.
pub const STIMULUS_NAMES: [&str; 6] = [
    "attention",
    "gratitude",
    "love",
    "sadness",
    "happiness",
    "calming",
];

/// One named cue with everything a trial needs to present it.
#[derive(Debug, Clone)]
pub struct StimulusDef {
    pub name: String,
    /// Instruction text shown to the person delivering touch.
    pub toucher_text: String,
    /// Label text shown on the receiver's choice button.
    pub receiver_text: String,
    pub sound_path: PathBuf,
    /// Duration of the cue recording, from the duration table. Cue files
    /// are never probed at runtime; a stale table causes timing drift, not
    /// a crash.
    pub sound_duration: f64,
}

#[derive(Debug, Clone)]
pub struct StimulusSet {
    defs: Vec<StimulusDef>,
    /// Receiver-facing label for the appended "none of the above" button.
    other_label: String,
}

impl StimulusSet {
    /// Resolves every stimulus name against the toucher, receiver and
    /// duration tables, failing loudly if any entry is missing.
    pub fn from_tables(
        names: &[&str],
        toucher: &TextTable,
        receiver: &TextTable,
        durations: &TextTable,
        sound_dir: &Path,
    ) -> Result<Self> {
        let mut defs = Vec::with_capacity(names.len());
        for &name in names {
            let duration: f64 = durations
                .get(name)?
                .parse()
                .with_context(|| format!("duration for '{}' is not a number", name))?;
            defs.push(StimulusDef {
                name: name.to_string(),
                toucher_text: toucher.get(name)?.to_string(),
                receiver_text: receiver.get(name)?.to_string(),
                sound_path: sound_dir.join(format!("{} - short.wav", name)),
                sound_duration: duration,
            });
        }
        Ok(Self {
            defs,
            other_label: receiver.get("other")?.to_string(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&StimulusDef> {
        self.defs.iter().find(|d| d.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.defs.iter().map(|d| d.name.clone()).collect()
    }

    pub fn receiver_text(&self, name: &str) -> Option<&str> {
        if name == "other" {
            Some(&self.other_label)
        } else {
            self.get(name).map(|d| d.receiver_text.as_str())
        }
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StimulusDef> {
        self.defs.iter()
    }
}
