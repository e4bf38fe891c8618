use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Languages the participant can choose on the start prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Language {
    Swedish,
    English,
}

impl Language {
    /// Short code used in table file names (`display-text-<code>.txt`).
    pub fn code(&self) -> &'static str {
        match self {
            Language::Swedish => "sv",
            Language::English => "en",
        }
    }

    /// Label shown on the language prompt button.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Language::Swedish => "svenska",
            Language::English => "english",
        }
    }

    pub fn all() -> [Language; 2] {
        [Language::Swedish, Language::English]
    }
}

/// One `key<TAB>value` mapping loaded from a static text table.
#[derive(Debug, Clone)]
pub struct TextTable {
    source: String,
    entries: HashMap<String, String>,
}

impl TextTable {
    /// Parses table text. Blank lines are skipped; a non-blank line without
    /// a tab separator is an error.
    pub fn parse(source: &str, text: &str) -> Result<Self> {
        let mut entries = HashMap::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once('\t')
                .ok_or_else(|| anyhow!("{}: line {} has no tab separator", source, lineno + 1))?;
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
        Ok(Self {
            source: source.to_string(),
            entries,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading text table {}", path.display()))?;
        Self::parse(&path.display().to_string(), &text)
    }

    /// Looks a key up, failing loudly when it is missing. Every stimulus
    /// name must have exactly one entry in each table.
    pub fn get(&self, key: &str) -> Result<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("{}: missing entry for '{}'", self.source, key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The per-language UI strings, resolved once at startup so a missing key
/// fails before the session begins.
#[derive(Debug, Clone)]
pub struct UiText {
    pub start_message: String,
    pub wait_message: String,
    pub continue_message: String,
    pub touch_message: String,
    pub fixation_message: String,
    pub finished_message: String,
    pub vas_question: String,
    pub vas_min_label: String,
    pub vas_max_label: String,
    pub vas_accept_pre: String,
    pub vas_accept: String,
}

impl UiText {
    pub fn from_table(table: &TextTable) -> Result<Self> {
        Ok(Self {
            start_message: table.get("startMessage")?.to_string(),
            wait_message: table.get("waitMessage")?.to_string(),
            continue_message: table.get("continueMessage")?.to_string(),
            touch_message: table.get("touchMessage")?.to_string(),
            fixation_message: table.get("fixationMessage")?.to_string(),
            finished_message: table.get("finishedMessage")?.to_string(),
            vas_question: table.get("VASquestion")?.to_string(),
            vas_min_label: table.get("VASminLabel")?.to_string(),
            vas_max_label: table.get("VASmaxLabel")?.to_string(),
            vas_accept_pre: table.get("VASacceptPre")?.to_string(),
            vas_accept: table.get("VASaccept")?.to_string(),
        })
    }
}
