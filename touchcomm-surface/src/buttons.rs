use crate::input::Key;
use crate::layout::button_layout;

/// Normalized button size, matching the original interface proportions.
pub const BUTTON_WIDTH: f32 = 0.3;
pub const BUTTON_HEIGHT: f32 = 0.1;

/// A press that landed on a button. Aborts never come through the pointer;
/// they arrive as `Key::Abort` and are handled by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Click {
    pub index: usize,
    pub time: f64,
}

/// Outcome of the keyboard selection procedure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    Chosen { index: usize, time: f64 },
    TimedOut { time: f64 },
    Aborted { time: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonRegion {
    pub center: (f32, f32),
    pub width: f32,
    pub height: f32,
}

impl ButtonRegion {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        (x - self.center.0).abs() <= self.width / 2.0
            && (y - self.center.1).abs() <= self.height / 2.0
    }
}

/// A grid of clickable regions with hover highlighting and an optional
/// keyboard-driven highlight. `selected` stays `None` until the first
/// forward/backward key arrives; wrap arithmetic must stay total in that
/// pre-selection state.
#[derive(Debug, Clone)]
pub struct ButtonPanel {
    regions: Vec<ButtonRegion>,
    labels: Vec<String>,
    visible: bool,
    hovered: Option<usize>,
    selected: Option<usize>,
}

impl ButtonPanel {
    pub fn new(n_buttons: usize, n_cols: usize, n_rows: usize) -> Option<Self> {
        let regions = button_layout(n_buttons, n_cols, n_rows)?
            .into_iter()
            .map(|center| ButtonRegion {
                center,
                width: BUTTON_WIDTH,
                height: BUTTON_HEIGHT,
            })
            .collect();
        Some(Self {
            regions,
            labels: vec![String::new(); n_buttons],
            visible: false,
            hovered: None,
            selected: None,
        })
    }

    /// Makes the panel visible with fresh labels and resets all
    /// click-tracking state.
    pub fn show(&mut self, labels: Vec<String>) {
        assert_eq!(labels.len(), self.regions.len());
        self.labels = labels;
        self.visible = true;
        self.hovered = None;
        self.selected = None;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.hovered = None;
        self.selected = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[ButtonRegion] {
        &self.regions
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Highlighted by hover or keyboard selection.
    pub fn is_highlighted(&self, index: usize) -> bool {
        self.hovered == Some(index) || self.selected == Some(index)
    }

    /// Pointer hover sampling; updates the highlight only.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if !self.visible {
            return;
        }
        self.hovered = self.hit(x, y);
    }

    /// A press lands a choice when it falls inside a region.
    pub fn click(&mut self, x: f32, y: f32, time: f64) -> Option<Click> {
        if !self.visible {
            return None;
        }
        self.hit(x, y).map(|index| Click { index, time })
    }

    fn hit(&self, x: f32, y: f32) -> Option<usize> {
        self.regions.iter().position(|r| r.contains(x, y))
    }

    /// Moves the keyboard highlight forward, entering at index 0 from the
    /// pre-selection state.
    pub fn advance_selection(&mut self) -> usize {
        let next = match self.selected {
            None => 0,
            Some(i) => (i + 1) % self.regions.len(),
        };
        self.selected = Some(next);
        next
    }

    /// Moves the keyboard highlight backward, wrapping to the last index
    /// from the pre-selection state.
    pub fn retreat_selection(&mut self) -> usize {
        let n = self.regions.len();
        let next = match self.selected {
            None => n - 1,
            Some(i) => (i + n - 1) % n,
        };
        self.selected = Some(next);
        next
    }

    /// The current keyboard highlight, if one was ever made.
    pub fn confirm_selection(&self) -> Option<usize> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

/// The keyboard selection procedure: cycle with forward/backward, accept
/// with confirm, abort with escape, and give up when the deadline passes.
#[derive(Debug, Clone, Copy)]
pub struct KeySelection {
    deadline: f64,
}

impl KeySelection {
    pub fn new(now: f64, timeout: f64) -> Self {
        Self {
            deadline: now + timeout,
        }
    }

    pub fn handle_key(&mut self, panel: &mut ButtonPanel, key: Key, time: f64) -> Option<Selection> {
        match key {
            Key::Forward => {
                panel.advance_selection();
                None
            }
            Key::Backward => {
                panel.retreat_selection();
                None
            }
            Key::Confirm => {
                let index = panel.confirm_selection()?;
                panel.clear_selection();
                Some(Selection::Chosen { index, time })
            }
            Key::Abort => Some(Selection::Aborted { time }),
            Key::Start => None,
        }
    }

    /// Checked once per frame; yields the explicit timed-out outcome once
    /// the deadline passes.
    pub fn poll(&self, now: f64) -> Option<Selection> {
        if now >= self.deadline {
            Some(Selection::TimedOut { time: now })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown_panel(n: usize) -> ButtonPanel {
        let mut panel = ButtonPanel::new(n, 2, 4).unwrap();
        panel.show((0..n).map(|i| format!("button {}", i)).collect());
        panel
    }

    #[test]
    fn click_inside_region_returns_its_index() {
        let mut panel = shown_panel(7);
        let start = 10.0;
        for k in 0..panel.len() {
            let (x, y) = panel.regions()[k].center;
            let outcome = panel.click(x, y, start + k as f64);
            match outcome {
                Some(Click { index, time }) => {
                    assert_eq!(index, k);
                    assert!(time >= start);
                }
                None => panic!("expected click on {}", k),
            }
        }
    }

    #[test]
    fn click_outside_all_regions_is_ignored() {
        let mut panel = shown_panel(7);
        assert_eq!(panel.click(0.01, 0.01, 1.0), None);
    }

    #[test]
    fn hidden_panel_ignores_input() {
        let mut panel = shown_panel(6);
        panel.hide();
        let (x, y) = panel.regions()[0].center;
        assert_eq!(panel.click(x, y, 1.0), None);
        panel.pointer_moved(x, y);
        assert!(!panel.is_highlighted(0));
    }

    #[test]
    fn hover_highlights_the_region_under_the_pointer() {
        let mut panel = shown_panel(6);
        let (x, y) = panel.regions()[3].center;
        panel.pointer_moved(x, y);
        assert!(panel.is_highlighted(3));
        panel.pointer_moved(0.0, 0.0);
        assert!(!panel.is_highlighted(3));
    }

    #[test]
    fn show_resets_selection_state() {
        let mut panel = shown_panel(6);
        panel.advance_selection();
        panel.show(vec![String::new(); 6]);
        assert_eq!(panel.confirm_selection(), None);
    }

    #[test]
    fn preselection_wraps_without_panicking() {
        let mut panel = shown_panel(7);
        // backward from the pre-selection state wraps to the last button
        assert_eq!(panel.retreat_selection(), 6);
        panel.clear_selection();
        // forward from the pre-selection state enters at the first button
        assert_eq!(panel.advance_selection(), 0);
    }

    #[test]
    fn confirm_without_selection_is_a_no_op() {
        let mut panel = shown_panel(7);
        let mut selection = KeySelection::new(0.0, 20.0);
        assert_eq!(selection.handle_key(&mut panel, Key::Confirm, 1.0), None);
    }

    #[test]
    fn cycle_and_confirm() {
        let mut panel = shown_panel(7);
        let mut selection = KeySelection::new(0.0, 20.0);
        selection.handle_key(&mut panel, Key::Forward, 1.0);
        selection.handle_key(&mut panel, Key::Forward, 1.5);
        selection.handle_key(&mut panel, Key::Backward, 2.0);
        let outcome = selection.handle_key(&mut panel, Key::Confirm, 2.5);
        assert_eq!(outcome, Some(Selection::Chosen { index: 0, time: 2.5 }));
    }

    #[test]
    fn timeout_with_no_keys_is_explicit() {
        let selection = KeySelection::new(0.0, 20.0);
        assert_eq!(selection.poll(19.9), None);
        assert_eq!(selection.poll(20.0), Some(Selection::TimedOut { time: 20.0 }));
    }

    #[test]
    fn abort_key_cancels() {
        let mut panel = shown_panel(7);
        let mut selection = KeySelection::new(0.0, 20.0);
        let outcome = selection.handle_key(&mut panel, Key::Abort, 3.0);
        assert_eq!(outcome, Some(Selection::Aborted { time: 3.0 }));
    }
}
