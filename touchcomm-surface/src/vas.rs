/// Scale bounds of the pleasantness rating.
pub const VAS_MIN: f32 = -10.0;
pub const VAS_MAX: f32 = 10.0;

/// Geometry of the control in normalized window coordinates.
pub const LINE_X0: f32 = 0.15;
pub const LINE_X1: f32 = 0.85;
pub const LINE_Y: f32 = 0.5;
/// Vertical tolerance for a press to count as landing on the line.
pub const LINE_HIT_HALF_HEIGHT: f32 = 0.06;
pub const ACCEPT_CENTER: (f32, f32) = (0.5, 0.75);
pub const ACCEPT_HALF_WIDTH: f32 = 0.08;
pub const ACCEPT_HALF_HEIGHT: f32 = 0.04;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VasOutcome {
    Accepted { value: f32, time: f64 },
    Aborted { time: f64 },
}

/// Continuous rating control with a two-step accept gesture: a press on
/// the line positions the marker, a press on the accept box (offered only
/// once a marker exists) commits the rating. Internal state is reset
/// before and after every use so ratings are never sticky across trials.
#[derive(Debug, Clone)]
pub struct VasScale {
    pub question: String,
    pub min_label: String,
    pub max_label: String,
    pub accept_pre_text: String,
    pub accept_text: String,
    visible: bool,
    /// Marker position along the line, 0..1. `None` until the first press.
    marker: Option<f32>,
    started_at: f64,
}

impl VasScale {
    pub fn new(
        question: String,
        min_label: String,
        max_label: String,
        accept_pre_text: String,
        accept_text: String,
    ) -> Self {
        Self {
            question,
            min_label,
            max_label,
            accept_pre_text,
            accept_text,
            visible: false,
            marker: None,
            started_at: 0.0,
        }
    }

    /// Clears the marker and shows the scale; `now` anchors the response
    /// latency.
    pub fn reset(&mut self, now: f64) {
        self.marker = None;
        self.visible = true;
        self.started_at = now;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.marker = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn marker(&self) -> Option<f32> {
        self.marker
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    /// The rating the current marker would commit, quantized to 0.1.
    pub fn value(&self) -> Option<f32> {
        self.marker.map(|m| {
            let raw = VAS_MIN + m * (VAS_MAX - VAS_MIN);
            (raw * 10.0).round() / 10.0
        })
    }

    /// Samples one press. A press on the line moves the marker; a press on
    /// the accept box commits once a marker exists; anything else is
    /// ignored.
    pub fn press(&mut self, x: f32, y: f32, time: f64) -> Option<VasOutcome> {
        if !self.visible {
            return None;
        }
        if (y - LINE_Y).abs() <= LINE_HIT_HALF_HEIGHT && (LINE_X0..=LINE_X1).contains(&x) {
            self.marker = Some((x - LINE_X0) / (LINE_X1 - LINE_X0));
            return None;
        }
        if self.marker.is_some()
            && (x - ACCEPT_CENTER.0).abs() <= ACCEPT_HALF_WIDTH
            && (y - ACCEPT_CENTER.1).abs() <= ACCEPT_HALF_HEIGHT
        {
            let value = self.value().expect("marker checked above");
            return Some(VasOutcome::Accepted { value, time });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> VasScale {
        let mut scale = VasScale::new(
            "How pleasant was the last stimulus on your skin?".to_string(),
            "unpleasant".to_string(),
            "pleasant".to_string(),
            "click line".to_string(),
            "accept?".to_string(),
        );
        scale.reset(0.0);
        scale
    }

    #[test]
    fn press_on_line_positions_the_marker() {
        let mut scale = scale();
        assert_eq!(scale.marker(), None);
        scale.press(LINE_X0, LINE_Y, 1.0);
        assert_eq!(scale.value(), Some(VAS_MIN));
        scale.press(LINE_X1, LINE_Y, 1.5);
        assert_eq!(scale.value(), Some(VAS_MAX));
        scale.press((LINE_X0 + LINE_X1) / 2.0, LINE_Y, 2.0);
        assert_eq!(scale.value(), Some(0.0));
    }

    #[test]
    fn accept_before_any_marker_is_ignored() {
        let mut scale = scale();
        let outcome = scale.press(ACCEPT_CENTER.0, ACCEPT_CENTER.1, 1.0);
        assert_eq!(outcome, None);
    }

    #[test]
    fn two_step_accept_commits_the_quantized_value() {
        let mut scale = scale();
        // 30% along the line: -10 + 0.3 * 20 = -4.0
        let x = LINE_X0 + 0.3 * (LINE_X1 - LINE_X0);
        scale.press(x, LINE_Y, 1.0);
        let outcome = scale.press(ACCEPT_CENTER.0, ACCEPT_CENTER.1, 2.0);
        match outcome {
            Some(VasOutcome::Accepted { value, time }) => {
                assert!((value - -4.0).abs() < 1e-4);
                assert_eq!(time, 2.0);
                // quantized to one decimal
                assert_eq!(value, (value * 10.0).round() / 10.0);
            }
            other => panic!("expected accept, got {:?}", other),
        }
    }

    #[test]
    fn reset_clears_a_previous_rating() {
        let mut scale = scale();
        scale.press(LINE_X1, LINE_Y, 1.0);
        assert!(scale.value().is_some());
        scale.reset(5.0);
        assert_eq!(scale.marker(), None);
        assert_eq!(scale.started_at(), 5.0);
        assert_eq!(scale.press(ACCEPT_CENTER.0, ACCEPT_CENTER.1, 6.0), None);
    }

    #[test]
    fn presses_off_the_control_do_nothing() {
        let mut scale = scale();
        assert_eq!(scale.press(0.05, 0.05, 1.0), None);
        assert_eq!(scale.marker(), None);
    }

    #[test]
    fn hidden_scale_ignores_presses() {
        let mut scale = scale();
        scale.hide();
        assert_eq!(scale.press(LINE_X0, LINE_Y, 1.0), None);
    }
}
