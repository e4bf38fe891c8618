use rand::seq::SliceRandom;
use rand::Rng;

/// One (stimulus, repetition) draw. Generated once at setup, consumed
/// exactly once by the main loop, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    /// 1-based trial number as written to `_data.csv`.
    pub number: usize,
    /// Name of the cued stimulus.
    pub cue: String,
}

/// Builds the presentation sequence: the cross product of the stimulus set
/// and the repeat count, shuffled within each repetition block.
pub fn build_trial_sequence<R: Rng + ?Sized>(
    names: &[String],
    repeats: usize,
    rng: &mut R,
) -> Vec<Trial> {
    let mut trials = Vec::with_capacity(names.len() * repeats);
    for _ in 0..repeats {
        let mut block: Vec<&String> = names.iter().collect();
        block.shuffle(rng);
        for cue in block {
            trials.push(Trial {
                number: trials.len() + 1,
                cue: cue.clone(),
            });
        }
    }
    trials
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn names() -> Vec<String> {
        [
            "attention",
            "gratitude",
            "love",
            "sadness",
            "happiness",
            "calming",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn six_stimuli_twice_gives_twelve_trials() {
        let mut rng = rand::rng();
        let trials = build_trial_sequence(&names(), 2, &mut rng);
        assert_eq!(trials.len(), 12);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for trial in &trials {
            *counts.entry(trial.cue.as_str()).or_default() += 1;
        }
        for name in names() {
            assert_eq!(counts[name.as_str()], 2, "{} not cued twice", name);
        }
    }

    #[test]
    fn numbering_is_one_based_and_sequential() {
        let mut rng = rand::rng();
        let trials = build_trial_sequence(&names(), 3, &mut rng);
        for (i, trial) in trials.iter().enumerate() {
            assert_eq!(trial.number, i + 1);
        }
    }

    #[test]
    fn each_block_contains_every_stimulus() {
        let mut rng = rand::rng();
        let names = names();
        let trials = build_trial_sequence(&names, 4, &mut rng);
        for block in trials.chunks(names.len()) {
            let mut seen: Vec<&str> = block.iter().map(|t| t.cue.as_str()).collect();
            seen.sort_unstable();
            let mut expected: Vec<&str> = names.iter().map(String::as_str).collect();
            expected.sort_unstable();
            assert_eq!(seen, expected);
        }
    }

    #[test]
    fn zero_repeats_is_empty() {
        let mut rng = rand::rng();
        assert!(build_trial_sequence(&names(), 0, &mut rng).is_empty());
    }
}
