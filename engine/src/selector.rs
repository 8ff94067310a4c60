use mosaic_vecstore::Match;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How a trigger picks among the `k` nearest windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// Uniform over the candidates.
    #[default]
    Random,
    /// Candidates in distance order; the nth trigger of a cycle takes the
    /// nth closest, wrapping around.
    Nearest,
}

/// Picks playback candidates from a search result.
#[derive(Debug)]
pub struct Selector {
    policy: Selection,
    rng: StdRng,
}

impl Selector {
    /// Seeded selectors are reproducible; `None` seeds from entropy.
    pub fn new(policy: Selection, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(policy, rng)
    }

    pub fn with_rng(policy: Selection, rng: StdRng) -> Self {
        Self { policy, rng }
    }

    pub fn policy(&self) -> Selection {
        self.policy
    }

    /// Returns the window id for the `nth` trigger of a cycle, or `None`
    /// when there are no candidates.
    pub fn pick(&mut self, matches: &[Match], nth: usize) -> Option<usize> {
        if matches.is_empty() {
            return None;
        }
        let i = match self.policy {
            Selection::Random => self.rng.gen_range(0..matches.len()),
            Selection::Nearest => nth % matches.len(),
        };
        Some(matches[i].id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(ids: &[usize]) -> Vec<Match> {
        ids.iter()
            .enumerate()
            .map(|(i, &id)| Match {
                id,
                distance: i as f32,
            })
            .collect()
    }

    #[test]
    fn test_empty() {
        let mut s = Selector::new(Selection::Random, Some(1));
        assert_eq!(s.pick(&[], 0), None);
    }

    #[test]
    fn test_nearest_wraps() {
        let mut s = Selector::new(Selection::Nearest, None);
        let m = matches(&[7, 3, 9]);
        let picks: Vec<_> = (0..5).map(|n| s.pick(&m, n).unwrap()).collect();
        assert_eq!(picks, vec![7, 3, 9, 7, 3]);
    }

    #[test]
    fn test_random_stays_in_candidates() {
        let mut s = Selector::new(Selection::Random, Some(42));
        let m = matches(&[10, 20, 30]);
        let mut seen = [false; 3];
        for n in 0..200 {
            let id = s.pick(&m, n).unwrap();
            let pos = m.iter().position(|c| c.id == id).unwrap();
            seen[pos] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_random_seeded_is_reproducible() {
        let m = matches(&[0, 1, 2, 3, 4, 5, 6, 7]);
        let mut a = Selector::new(Selection::Random, Some(9));
        let mut b = Selector::new(Selection::Random, Some(9));
        for n in 0..32 {
            assert_eq!(a.pick(&m, n), b.pick(&m, n));
        }
    }

    #[test]
    fn test_selection_serde() {
        let s: Selection = serde_json::from_str("\"nearest\"").unwrap();
        assert_eq!(s, Selection::Nearest);
        assert_eq!(serde_json::to_string(&Selection::Random).unwrap(), "\"random\"");
    }
}
