use std::fmt::Write as _;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

/// Half-open range of scenario indices an environment may play:
/// `[start, start + size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawScenarioWindow", into = "RawScenarioWindow")]
pub struct ScenarioWindow {
    start: u64,
    size: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawScenarioWindow {
    start: u64,
    size: u64,
}

impl TryFrom<RawScenarioWindow> for ScenarioWindow {
    type Error = EmptyWindowError;

    fn try_from(raw: RawScenarioWindow) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.size)
    }
}

impl From<ScenarioWindow> for RawScenarioWindow {
    fn from(window: ScenarioWindow) -> Self {
        Self {
            start: window.start,
            size: window.size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("scenario window starting at {start} is empty or overflows")]
pub struct EmptyWindowError {
    pub start: u64,
}

impl ScenarioWindow {
    pub fn new(start: u64, size: u64) -> Result<Self, EmptyWindowError> {
        if size == 0 || start.checked_add(size).is_none() {
            return Err(EmptyWindowError { start });
        }
        Ok(Self { start, size })
    }

    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Exclusive upper bound.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.start + self.size
    }

    #[must_use]
    pub const fn contains(&self, seed: u64) -> bool {
        self.start <= seed && seed < self.end()
    }
}

/// A selected scenario index lies outside the configured window.
///
/// This is a caller misconfiguration (typically a forced seed outside the
/// window) and is not recoverable.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("seed {seed} is out of range [{start}, {end})")]
pub struct SeedOutOfRangeError {
    pub seed: u64,
    pub start: u64,
    pub end: u64,
}

/// Seed of the selector's random generator.
///
/// A 128-bit value serialized as a 32-character hex string. The same seed yields
/// the same sequence of randomly drawn scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorSeed([u8; 16]);

impl SelectorSeed {
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }
}

impl Serialize for SelectorSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for SelectorSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl std::str::FromStr for SelectorSeed {
    type Err = String;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            ));
        }
        let num = u128::from_str_radix(hex_str, 16)
            .map_err(|e| format!("invalid hex: {hex_str} ({e})"))?;
        Ok(Self::from_u128(num))
    }
}

impl Distribution<SelectorSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SelectorSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        SelectorSeed(seed)
    }
}

/// Chooses which recorded scenario the next episode plays.
///
/// # Selection Rules
///
/// 1. A forced seed is used as is.
/// 2. In sequential mode the first episode plays the window start, each later
///    episode plays the next index, wrapping back to the window start.
/// 3. Otherwise an index is drawn uniformly from the window.
///
/// Whatever the rule, the result must lie in the window; otherwise selection fails
/// with [`SeedOutOfRangeError`].
///
/// # Example
///
/// ```
/// use roadreplay_scenario::{ScenarioSelector, ScenarioWindow, SelectorSeed};
///
/// let window = ScenarioWindow::new(5, 3).unwrap();
/// let mut selector = ScenarioSelector::with_seed(window, true, SelectorSeed::from_u128(0));
///
/// assert_eq!(selector.select(None, None), Ok(5));
/// assert_eq!(selector.select(None, Some(7)), Ok(5));
/// assert!(selector.select(Some(8), None).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioSelector {
    rng: Pcg32,
    window: ScenarioWindow,
    sequential: bool,
}

impl ScenarioSelector {
    /// Creates a selector whose random draws are seeded from the thread RNG.
    #[must_use]
    pub fn new(window: ScenarioWindow, sequential: bool) -> Self {
        Self::with_seed(window, sequential, rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for reproducible draws.
    #[must_use]
    pub fn with_seed(window: ScenarioWindow, sequential: bool, seed: SelectorSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            window,
            sequential,
        }
    }

    /// Selects the scenario index of the next episode.
    ///
    /// # Arguments
    ///
    /// * `force_seed` - Index requested by the caller, bypassing the selection rules
    /// * `current_seed` - Index of the episode that just ended, if any
    pub fn select(
        &mut self,
        force_seed: Option<u64>,
        current_seed: Option<u64>,
    ) -> Result<u64, SeedOutOfRangeError> {
        let window = self.window;
        let seed = if let Some(seed) = force_seed {
            seed
        } else if self.sequential {
            match current_seed {
                None => window.start(),
                Some(current) => current
                    .checked_add(1)
                    .filter(|next| *next < window.end())
                    .unwrap_or(window.start()),
            }
        } else {
            self.rng.random_range(window.start()..window.end())
        };

        if !window.contains(seed) {
            return Err(SeedOutOfRangeError {
                seed,
                start: window.start(),
                end: window.end(),
            });
        }
        debug!(seed, ?force_seed, ?current_seed, "scenario selected");
        Ok(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(start: u64, size: u64, sequential: bool) -> ScenarioSelector {
        let window = ScenarioWindow::new(start, size).unwrap();
        ScenarioSelector::with_seed(window, sequential, SelectorSeed::from_u128(0x1234))
    }

    #[test]
    fn test_window_rejects_empty() {
        assert_eq!(
            ScenarioWindow::new(3, 0),
            Err(EmptyWindowError { start: 3 })
        );
        assert!(ScenarioWindow::new(u64::MAX, 2).is_err());
        let window = ScenarioWindow::new(5, 3).unwrap();
        assert_eq!(window.end(), 8);
        assert!(window.contains(5) && window.contains(7));
        assert!(!window.contains(4) && !window.contains(8));
    }

    #[test]
    fn test_sequential_wraps_around() {
        let mut selector = selector(5, 3, true);
        let mut current = None;
        let mut seen = vec![];
        for _ in 0..7 {
            let seed = selector.select(None, current).unwrap();
            seen.push(seed);
            current = Some(seed);
        }
        assert_eq!(seen, [5, 6, 7, 5, 6, 7, 5]);
    }

    #[test]
    fn test_sequential_from_last_in_window() {
        let mut selector = selector(5, 3, true);
        assert_eq!(selector.select(None, Some(7)), Ok(5));
    }

    #[test]
    fn test_random_stays_in_window() {
        let mut selector = selector(10, 4, false);
        for _ in 0..200 {
            let seed = selector.select(None, Some(12)).unwrap();
            assert!((10..14).contains(&seed));
        }
    }

    #[test]
    fn test_random_is_reproducible() {
        let mut a = selector(0, 100, false);
        let mut b = selector(0, 100, false);
        for _ in 0..20 {
            assert_eq!(a.select(None, None), b.select(None, None));
        }
    }

    #[test]
    fn test_forced_seed_is_validated() {
        let mut selector = selector(5, 3, false);
        assert_eq!(selector.select(Some(6), None), Ok(6));
        let err = selector.select(Some(8), None).unwrap_err();
        assert_eq!(
            err,
            SeedOutOfRangeError {
                seed: 8,
                start: 5,
                end: 8
            }
        );
        assert_eq!(err.to_string(), "seed 8 is out of range [5, 8)");
    }

    #[test]
    fn test_sequential_from_seed_below_window_fails() {
        let mut selector = selector(5, 3, true);
        assert!(selector.select(None, Some(1)).is_err());
    }

    #[test]
    fn test_selector_seed_serde() {
        let seed = SelectorSeed::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, "\"0123456789abcdeffedcba9876543210\"");
        let parsed: SelectorSeed = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, seed);

        let result: Result<SelectorSeed, _> = serde_json::from_str("\"abc\"");
        assert!(result.unwrap_err().to_string().contains("invalid hex"));
    }
}
