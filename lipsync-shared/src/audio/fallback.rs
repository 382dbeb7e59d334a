// SPDX-License-Identifier: GPL-3.0-only
use crate::models::features::CoarseBands;
use crate::models::history::HistoryBuffer;
use crate::models::viseme::Viseme;
use crate::utils::random::RandomSource;

/// Share of the coarse energy a band needs to dominate the guess.
const DOMINANT_RATIO: f64 = 0.4;

/// After a vowel, rolls above this pick a consonant.
const CONSONANT_AFTER_VOWEL_ROLL: f64 = 0.7;

/// Otherwise, rolls above this pick a vowel.
const VOWEL_AFTER_CONSONANT_ROLL: f64 = 0.3;

/// Picks a label for frames the scorer could not settle.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSelector;

impl FallbackSelector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    pub fn select(
        &self,
        bands: CoarseBands,
        history: &HistoryBuffer,
        rng: &mut dyn RandomSource,
    ) -> Viseme {
        let total = bands.very_low + bands.low + bands.mid + bands.high;
        if total == 0.0 {
            return Viseme::Silence;
        }

        let choice = if bands.very_low / total > DOMINANT_RATIO {
            pick_pair(rng, Viseme::U, Viseme::O)
        } else if bands.high / total > DOMINANT_RATIO {
            pick_pair(rng, Viseme::I, Viseme::Ch)
        } else if bands.mid / total > DOMINANT_RATIO {
            pick_pair(rng, Viseme::E, Viseme::A)
        } else if bands.low / total > DOMINANT_RATIO {
            pick_pair(rng, Viseme::A, Viseme::M)
        } else {
            Self::varied(history.last_viseme(), rng)
        };

        log::debug!("Fallback selected '{choice}' (coarse total {total:.1})");
        choice
    }

    /// History-biased guess: mostly vowels, with an occasional consonant
    /// after a vowel.
    fn varied(last: Viseme, rng: &mut dyn RandomSource) -> Viseme {
        let roll = rng.next_unit();
        let pick_consonant = if last.is_vowel() {
            roll > CONSONANT_AFTER_VOWEL_ROLL
        } else {
            roll <= VOWEL_AFTER_CONSONANT_ROLL
        };

        if pick_consonant {
            Viseme::CONSONANTS[rng.next_index(Viseme::CONSONANTS.len())]
        } else {
            Viseme::VOWELS[rng.next_index(Viseme::VOWELS.len())]
        }
    }
}

fn pick_pair(rng: &mut dyn RandomSource, first: Viseme, second: Viseme) -> Viseme {
    if rng.next_unit() > 0.5 { first } else { second }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::history::PhonemeEvent;
    use crate::utils::random::SeededRandom;
    use crate::utils::random::testing::ScriptedRandom;

    fn bands(very_low: f64, low: f64, mid: f64, high: f64) -> CoarseBands {
        CoarseBands {
            very_low,
            low,
            mid,
            high,
        }
    }

    fn history_ending_with(viseme: Viseme) -> HistoryBuffer {
        let mut history = HistoryBuffer::default();
        history.push(PhonemeEvent {
            viseme,
            duration: 0.1,
            timestamp: 0.0,
        });
        history
    }

    #[test]
    fn test_zero_energy_is_silence() {
        let mut rng = SeededRandom::new(1);
        let choice = FallbackSelector::new().select(
            bands(0.0, 0.0, 0.0, 0.0),
            &HistoryBuffer::default(),
            &mut rng,
        );
        assert_eq!(choice, Viseme::Silence);
    }

    #[test]
    fn test_dominant_bands_pick_from_pairs() {
        let selector = FallbackSelector::new();
        let history = HistoryBuffer::default();
        let mut high_roll = ScriptedRandom::new(&[0.9]);
        let mut low_roll = ScriptedRandom::new(&[0.1]);

        let dark = bands(50.0, 10.0, 10.0, 10.0);
        assert_eq!(selector.select(dark, &history, &mut high_roll), Viseme::U);
        assert_eq!(selector.select(dark, &history, &mut low_roll), Viseme::O);

        let bright = bands(10.0, 10.0, 10.0, 50.0);
        assert_eq!(selector.select(bright, &history, &mut high_roll), Viseme::I);
        assert_eq!(selector.select(bright, &history, &mut low_roll), Viseme::Ch);

        let middle = bands(10.0, 10.0, 50.0, 10.0);
        assert_eq!(selector.select(middle, &history, &mut high_roll), Viseme::E);
        assert_eq!(selector.select(middle, &history, &mut low_roll), Viseme::A);

        let low = bands(10.0, 50.0, 10.0, 10.0);
        assert_eq!(selector.select(low, &history, &mut high_roll), Viseme::A);
        assert_eq!(selector.select(low, &history, &mut low_roll), Viseme::M);
    }

    #[test]
    fn test_very_low_checked_before_high() {
        let mut rng = ScriptedRandom::new(&[0.9]);
        // Very-low and high both dominate; very-low is checked first.
        let choice = FallbackSelector::new().select(
            bands(41.0, 0.0, 0.0, 59.0),
            &HistoryBuffer::default(),
            &mut rng,
        );
        assert_eq!(choice, Viseme::U);
    }

    #[test]
    fn test_balanced_bands_use_history() {
        let selector = FallbackSelector::new();
        let balanced = bands(25.0, 25.0, 25.0, 25.0);

        // After a vowel: roll 0.8 > 0.7 -> consonant, index roll 0.0 -> m
        let mut rng = ScriptedRandom::new(&[0.8, 0.0]);
        assert_eq!(
            selector.select(balanced, &history_ending_with(Viseme::A), &mut rng),
            Viseme::M
        );

        // After a vowel: roll 0.5 -> vowel, index roll 0.99 -> u
        let mut rng = ScriptedRandom::new(&[0.5, 0.99]);
        assert_eq!(
            selector.select(balanced, &history_ending_with(Viseme::E), &mut rng),
            Viseme::U
        );

        // After a consonant: roll 0.5 > 0.3 -> vowel, index roll 0.2 -> e
        let mut rng = ScriptedRandom::new(&[0.5, 0.2]);
        assert_eq!(
            selector.select(balanced, &history_ending_with(Viseme::R), &mut rng),
            Viseme::E
        );

        // Empty history counts as silence: roll 0.1 -> consonant, index 0.6 -> r
        let mut rng = ScriptedRandom::new(&[0.1, 0.6]);
        assert_eq!(
            selector.select(balanced, &HistoryBuffer::default(), &mut rng),
            Viseme::R
        );
    }

    #[test]
    fn test_seeded_sequences_repeat() {
        let selector = FallbackSelector::new();
        let inputs = [
            bands(25.0, 25.0, 25.0, 25.0),
            bands(60.0, 10.0, 10.0, 10.0),
            bands(10.0, 10.0, 10.0, 60.0),
            bands(20.0, 30.0, 30.0, 20.0),
        ];
        let history = history_ending_with(Viseme::O);

        let run = |seed| {
            let mut rng = SeededRandom::new(seed);
            (0..50)
                .map(|i| selector.select(inputs[i % inputs.len()], &history, &mut rng))
                .collect::<Vec<_>>()
        };

        assert_eq!(run(1234), run(1234));
    }

    #[test]
    fn test_history_bias_prefers_vowels_after_consonants() {
        let selector = FallbackSelector::new();
        let balanced = bands(25.0, 25.0, 25.0, 25.0);
        let history = history_ending_with(Viseme::M);
        let mut rng = SeededRandom::new(99);

        let vowels = (0..2000)
            .filter(|_| selector.select(balanced, &history, &mut rng).is_vowel())
            .count();
        // Expect ~70% vowels.
        assert!((1200..1600).contains(&vowels), "got {vowels} vowels");
    }
}
