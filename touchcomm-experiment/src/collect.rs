//! Response collection procedures. A collector owns the response surface
//! for the participant window, consumes input events between stimulus
//! offset and response, and reports a single outcome. The two categorical
//! procedures and the rating procedure share one trait so the sequencer
//! runs either without knowing which.

use anyhow::{anyhow, Result};
use rand::seq::SliceRandom;
use touchcomm_core::{StimulusSet, TrialResponse};
use touchcomm_data::RunFiles;
use touchcomm_surface::{
    ButtonPanel, Click, Key, KeySelection, PointerEvent, Selection, VasOutcome, VasScale,
};

#[derive(Debug, Clone, PartialEq)]
pub enum CollectorOutcome {
    Response { response: TrialResponse, time: f64 },
    Abort { time: f64 },
}

/// One response procedure. `begin` arms it for a trial; the event handlers
/// and `poll` are fed every frame until one of them yields an outcome.
pub trait ResponseCollector {
    fn begin(&mut self, cued: &str, now: f64, files: &mut RunFiles) -> Result<()>;
    fn handle_pointer(
        &mut self,
        event: PointerEvent,
        now: f64,
        files: &mut RunFiles,
    ) -> Result<Option<CollectorOutcome>>;
    fn handle_key(
        &mut self,
        key: Key,
        time: f64,
        files: &mut RunFiles,
    ) -> Result<Option<CollectorOutcome>>;
    /// Per-frame check for time-driven outcomes.
    fn poll(&mut self, now: f64, files: &mut RunFiles) -> Result<Option<CollectorOutcome>>;
    /// Surfaces for the renderer. At most one is ever visible.
    fn panel(&self) -> Option<&ButtonPanel>;
    fn vas(&self) -> Option<&VasScale>;
}

/// How the categorical choice is made.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChoiceProcedure {
    /// Click one of the labelled buttons.
    Pointer,
    /// Cycle the highlight with forward/backward keys and confirm, against
    /// a deadline.
    Keyboard { timeout: f64 },
}

/// Categorical choice over the stimulus labels plus a trailing "other"
/// button. Labels are reshuffled every trial; "other" keeps the last
/// position.
pub struct CategoricalCollector {
    stimuli: StimulusSet,
    procedure: ChoiceProcedure,
    panel: ButtonPanel,
    /// Stimulus names in this trial's button order.
    order: Vec<String>,
    cued: String,
    selection: Option<KeySelection>,
}

impl CategoricalCollector {
    pub fn new(stimuli: StimulusSet, procedure: ChoiceProcedure) -> Result<Self> {
        let n_buttons = stimuli.len() + 1;
        let panel = ButtonPanel::new(n_buttons, 2, 4)
            .ok_or_else(|| anyhow!("no button layout for {} buttons", n_buttons))?;
        Ok(Self {
            stimuli,
            procedure,
            panel,
            order: Vec::new(),
            cued: String::new(),
            selection: None,
        })
    }

    fn settle(
        &mut self,
        index: usize,
        time: f64,
        files: &mut RunFiles,
    ) -> Result<CollectorOutcome> {
        let chosen = self.order[index].clone();
        let correct = chosen == self.cued;
        files.log_event(
            time,
            &format!(
                "receiver responded {} - {}",
                chosen,
                if correct { "correct" } else { "incorrect" }
            ),
        )?;
        self.panel.hide();
        Ok(CollectorOutcome::Response {
            response: TrialResponse::Label { chosen, correct },
            time,
        })
    }

    fn settle_timeout(&mut self, time: f64, files: &mut RunFiles) -> Result<CollectorOutcome> {
        files.log_event(time, "receiver responded timeout - incorrect")?;
        self.panel.hide();
        self.selection = None;
        Ok(CollectorOutcome::Response {
            response: TrialResponse::Timeout,
            time,
        })
    }
}

impl ResponseCollector for CategoricalCollector {
    fn begin(&mut self, cued: &str, now: f64, files: &mut RunFiles) -> Result<()> {
        let mut order = self.stimuli.names();
        order.shuffle(&mut rand::rng());
        order.push("other".to_string());

        let labels = order
            .iter()
            .map(|name| {
                self.stimuli
                    .receiver_text(name)
                    .map(str::to_string)
                    .ok_or_else(|| anyhow!("no receiver label for '{}'", name))
            })
            .collect::<Result<Vec<String>>>()?;

        self.order = order;
        self.cued = cued.to_string();
        self.panel.show(labels);
        self.selection = match self.procedure {
            ChoiceProcedure::Pointer => None,
            ChoiceProcedure::Keyboard { timeout } => Some(KeySelection::new(now, timeout)),
        };
        files.log_event(now, "buttons presented")
    }

    fn handle_pointer(
        &mut self,
        event: PointerEvent,
        now: f64,
        files: &mut RunFiles,
    ) -> Result<Option<CollectorOutcome>> {
        if self.procedure != ChoiceProcedure::Pointer {
            return Ok(None);
        }
        match event {
            PointerEvent::Moved { x, y } => {
                self.panel.pointer_moved(x, y);
                Ok(None)
            }
            PointerEvent::Pressed { x, y } => match self.panel.click(x, y, now) {
                Some(Click { index, time }) => Ok(Some(self.settle(index, time, files)?)),
                None => Ok(None),
            },
        }
    }

    fn handle_key(
        &mut self,
        key: Key,
        time: f64,
        files: &mut RunFiles,
    ) -> Result<Option<CollectorOutcome>> {
        match self.procedure {
            ChoiceProcedure::Pointer => match key {
                Key::Abort => Ok(Some(CollectorOutcome::Abort { time })),
                _ => Ok(None),
            },
            ChoiceProcedure::Keyboard { .. } => {
                let Some(selection) = self.selection.as_mut() else {
                    return Ok(None);
                };
                match selection.handle_key(&mut self.panel, key, time) {
                    Some(Selection::Chosen { index, time }) => {
                        Ok(Some(self.settle(index, time, files)?))
                    }
                    Some(Selection::Aborted { time }) => {
                        Ok(Some(CollectorOutcome::Abort { time }))
                    }
                    Some(Selection::TimedOut { time }) => {
                        Ok(Some(self.settle_timeout(time, files)?))
                    }
                    None => Ok(None),
                }
            }
        }
    }

    fn poll(&mut self, now: f64, files: &mut RunFiles) -> Result<Option<CollectorOutcome>> {
        let Some(selection) = self.selection else {
            return Ok(None);
        };
        match selection.poll(now) {
            Some(Selection::TimedOut { time }) => Ok(Some(self.settle_timeout(time, files)?)),
            _ => Ok(None),
        }
    }

    fn panel(&self) -> Option<&ButtonPanel> {
        Some(&self.panel)
    }

    fn vas(&self) -> Option<&VasScale> {
        None
    }
}

/// Continuous pleasantness rating on a visual analogue scale with a
/// two-step accept gesture.
pub struct VasCollector {
    scale: VasScale,
}

impl VasCollector {
    pub fn new(scale: VasScale) -> Self {
        Self { scale }
    }
}

impl ResponseCollector for VasCollector {
    fn begin(&mut self, _cued: &str, now: f64, _files: &mut RunFiles) -> Result<()> {
        self.scale.reset(now);
        Ok(())
    }

    fn handle_pointer(
        &mut self,
        event: PointerEvent,
        now: f64,
        files: &mut RunFiles,
    ) -> Result<Option<CollectorOutcome>> {
        let PointerEvent::Pressed { x, y } = event else {
            return Ok(None);
        };
        match self.scale.press(x, y, now) {
            Some(VasOutcome::Accepted { value, time }) => {
                files.log_event(time, &format!("Pleasantness rating (-10,10) = {:.1}", value))?;
                self.scale.hide();
                Ok(Some(CollectorOutcome::Response {
                    response: TrialResponse::Rating(value),
                    time,
                }))
            }
            Some(VasOutcome::Aborted { time }) => Ok(Some(CollectorOutcome::Abort { time })),
            None => Ok(None),
        }
    }

    fn handle_key(
        &mut self,
        key: Key,
        time: f64,
        _files: &mut RunFiles,
    ) -> Result<Option<CollectorOutcome>> {
        match key {
            Key::Abort => Ok(Some(CollectorOutcome::Abort { time })),
            _ => Ok(None),
        }
    }

    fn poll(&mut self, _now: f64, _files: &mut RunFiles) -> Result<Option<CollectorOutcome>> {
        Ok(None)
    }

    fn panel(&self) -> Option<&ButtonPanel> {
        None
    }

    fn vas(&self) -> Option<&VasScale> {
        Some(&self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use touchcomm_core::{TextTable, STIMULUS_NAMES};
    use touchcomm_surface::vas;

    fn stimulus_set() -> StimulusSet {
        let mut toucher = String::new();
        let mut receiver = String::new();
        let mut durations = String::new();
        for name in STIMULUS_NAMES {
            toucher.push_str(&format!("{}\tcue {}\n", name, name));
            receiver.push_str(&format!("{}\tlabel {}\n", name, name));
            durations.push_str(&format!("{}\t1.5\n", name));
        }
        receiver.push_str("other\tsomething else\n");
        StimulusSet::from_tables(
            &STIMULUS_NAMES,
            &TextTable::parse("toucher", &toucher).unwrap(),
            &TextTable::parse("receiver", &receiver).unwrap(),
            &TextTable::parse("durations", &durations).unwrap(),
            std::path::Path::new("sounds"),
        )
        .unwrap()
    }

    fn run_files(dir: &tempfile::TempDir) -> RunFiles {
        RunFiles::create(dir.path(), "run", &[]).unwrap()
    }

    fn log_lines(files: &RunFiles) -> Vec<String> {
        std::fs::read_to_string(files.log_path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn pointer_click_reports_the_chosen_name_and_correctness() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = run_files(&dir);
        let mut collector =
            CategoricalCollector::new(stimulus_set(), ChoiceProcedure::Pointer).unwrap();

        collector.begin("love", 20.0, &mut files).unwrap();
        let panel = collector.panel().unwrap();
        assert!(panel.is_visible());
        assert_eq!(panel.len(), 7);

        // click whatever landed on button 0 and check the report matches it
        let (x, y) = panel.regions()[0].center;
        let expected = collector.order[0].clone();
        let outcome = collector
            .handle_pointer(PointerEvent::Pressed { x, y }, 22.5, &mut files)
            .unwrap()
            .unwrap();
        match outcome {
            CollectorOutcome::Response {
                response: TrialResponse::Label { chosen, correct },
                time,
            } => {
                assert_eq!(chosen, expected);
                assert_eq!(correct, chosen == "love");
                assert_eq!(time, 22.5);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(!collector.panel().unwrap().is_visible());

        let lines = log_lines(&files);
        assert!(lines[1].contains("buttons presented"));
        assert!(lines[2].contains(&format!("receiver responded {}", expected)));
    }

    #[test]
    fn other_button_is_always_last_and_never_correct() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = run_files(&dir);
        let mut collector =
            CategoricalCollector::new(stimulus_set(), ChoiceProcedure::Pointer).unwrap();
        collector.begin("love", 0.0, &mut files).unwrap();

        assert_eq!(collector.order.last().unwrap(), "other");
        assert_eq!(collector.panel().unwrap().labels()[6], "something else");

        let (x, y) = collector.panel().unwrap().regions()[6].center;
        let outcome = collector
            .handle_pointer(PointerEvent::Pressed { x, y }, 1.0, &mut files)
            .unwrap()
            .unwrap();
        match outcome {
            CollectorOutcome::Response {
                response: TrialResponse::Label { chosen, correct },
                ..
            } => {
                assert_eq!(chosen, "other");
                assert!(!correct);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn keyboard_selection_confirms_the_highlighted_button() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = run_files(&dir);
        let mut collector = CategoricalCollector::new(
            stimulus_set(),
            ChoiceProcedure::Keyboard { timeout: 20.0 },
        )
        .unwrap();
        collector.begin("love", 0.0, &mut files).unwrap();

        collector.handle_key(Key::Forward, 1.0, &mut files).unwrap();
        collector.handle_key(Key::Forward, 1.5, &mut files).unwrap();
        let expected = collector.order[0].clone();
        let outcome = collector
            .handle_key(Key::Backward, 2.0, &mut files)
            .unwrap();
        assert_eq!(outcome, None);
        let outcome = collector
            .handle_key(Key::Confirm, 2.5, &mut files)
            .unwrap()
            .unwrap();
        match outcome {
            CollectorOutcome::Response {
                response: TrialResponse::Label { chosen, .. },
                time,
            } => {
                assert_eq!(chosen, expected);
                assert_eq!(time, 2.5);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn keyboard_timeout_is_logged_and_explicit() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = run_files(&dir);
        let mut collector = CategoricalCollector::new(
            stimulus_set(),
            ChoiceProcedure::Keyboard { timeout: 20.0 },
        )
        .unwrap();
        collector.begin("love", 5.0, &mut files).unwrap();

        assert_eq!(collector.poll(24.9, &mut files).unwrap(), None);
        let outcome = collector.poll(25.0, &mut files).unwrap().unwrap();
        assert_eq!(
            outcome,
            CollectorOutcome::Response {
                response: TrialResponse::Timeout,
                time: 25.0,
            }
        );
        let lines = log_lines(&files);
        assert!(lines
            .last()
            .unwrap()
            .contains("receiver responded timeout - incorrect"));
    }

    #[test]
    fn keyboard_ignores_pointer_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = run_files(&dir);
        let mut collector = CategoricalCollector::new(
            stimulus_set(),
            ChoiceProcedure::Keyboard { timeout: 20.0 },
        )
        .unwrap();
        collector.begin("love", 0.0, &mut files).unwrap();

        let (x, y) = collector.panel().unwrap().regions()[0].center;
        let outcome = collector
            .handle_pointer(PointerEvent::Pressed { x, y }, 1.0, &mut files)
            .unwrap();
        assert_eq!(outcome, None);
    }

    #[test]
    fn abort_key_yields_abort_not_a_response() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = run_files(&dir);
        let mut collector =
            CategoricalCollector::new(stimulus_set(), ChoiceProcedure::Pointer).unwrap();
        collector.begin("love", 0.0, &mut files).unwrap();

        let outcome = collector.handle_key(Key::Abort, 3.0, &mut files).unwrap();
        assert_eq!(outcome, Some(CollectorOutcome::Abort { time: 3.0 }));
    }

    fn vas_collector() -> VasCollector {
        VasCollector::new(VasScale::new(
            "How pleasant was that?".to_string(),
            "unpleasant".to_string(),
            "pleasant".to_string(),
            "click the line".to_string(),
            "accept?".to_string(),
        ))
    }

    #[test]
    fn rating_is_committed_only_by_the_accept_press() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = run_files(&dir);
        let mut collector = vas_collector();
        collector.begin("love", 30.0, &mut files).unwrap();
        assert!(collector.vas().unwrap().is_visible());

        // marker press alone settles nothing
        let x = vas::LINE_X0 + 0.75 * (vas::LINE_X1 - vas::LINE_X0);
        let outcome = collector
            .handle_pointer(
                PointerEvent::Pressed { x, y: vas::LINE_Y },
                31.0,
                &mut files,
            )
            .unwrap();
        assert_eq!(outcome, None);

        let outcome = collector
            .handle_pointer(
                PointerEvent::Pressed {
                    x: vas::ACCEPT_CENTER.0,
                    y: vas::ACCEPT_CENTER.1,
                },
                32.0,
                &mut files,
            )
            .unwrap()
            .unwrap();
        match outcome {
            CollectorOutcome::Response {
                response: TrialResponse::Rating(value),
                time,
            } => {
                assert!((value - 5.0).abs() < 1e-4);
                assert_eq!(time, 32.0);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(!collector.vas().unwrap().is_visible());
        let lines = log_lines(&files);
        assert!(lines
            .last()
            .unwrap()
            .contains("Pleasantness rating (-10,10) = 5.0"));
    }

    #[test]
    fn vas_abort_writes_no_rating() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = run_files(&dir);
        let mut collector = vas_collector();
        collector.begin("love", 0.0, &mut files).unwrap();

        let outcome = collector.handle_key(Key::Abort, 4.0, &mut files).unwrap();
        assert_eq!(outcome, Some(CollectorOutcome::Abort { time: 4.0 }));
        // nothing rating-shaped reached the log
        assert!(!log_lines(&files).iter().any(|l| l.contains("rating")));
    }
}
