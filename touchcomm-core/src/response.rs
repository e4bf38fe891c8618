/// The observed outcome of one trial, as written to the results file.
///
/// Aborts are not a response: the abort path terminates the run before any
/// data row is written, so there is no variant for them here.
#[derive(Debug, Clone, PartialEq)]
pub enum TrialResponse {
    /// A categorical button choice, annotated with whether it matched the
    /// cued stimulus.
    Label { chosen: String, correct: bool },
    /// The keyboard selection deadline passed with nothing confirmed.
    Timeout,
    /// A VAS pleasantness rating in -10..10, quantized to 0.1.
    Rating(f32),
}

impl TrialResponse {
    /// The `response` field of the `_data.csv` row.
    pub fn data_field(&self) -> String {
        match self {
            TrialResponse::Label { chosen, .. } => chosen.clone(),
            TrialResponse::Timeout => "timeout".to_string(),
            TrialResponse::Rating(value) => format!("{:.1}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_fields() {
        let label = TrialResponse::Label {
            chosen: "love".to_string(),
            correct: true,
        };
        assert_eq!(label.data_field(), "love");
        assert_eq!(TrialResponse::Timeout.data_field(), "timeout");
        assert_eq!(TrialResponse::Rating(-3.2).data_field(), "-3.2");
        assert_eq!(TrialResponse::Rating(10.0).data_field(), "10.0");
    }
}
