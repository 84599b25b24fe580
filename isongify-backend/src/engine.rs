//! Stateful query pipeline over the song catalogue
//!
//! Queries are meant to be issued in sequence:
//! 1. [`QueryEngine::query_range`] picks a danceability range
//! 2. [`QueryEngine::set_energetic_threshold`] narrows it by minimum energy
//! 3. [`QueryEngine::query_top_k`] reports the fastest songs left
//!
//! Range bounds and threshold carry over between calls. The threshold set in
//! step 2 also filters every later range query.
//!
//! Not internally synchronised; share it behind a single `Mutex` if needed.

use crate::collection::OrderedCollection;
use crate::error::{Error, Result};
use crate::song::Song;
use isongify_common::config::{TomlConfig, DEFAULT_TOP_K};
use tracing::debug;

/// Range established by the most recent `query_range`
#[derive(Debug, Clone, Default, PartialEq)]
enum RangeState {
    /// No range query has run yet
    #[default]
    Unset,
    /// `matches` are range-filtered but not threshold-filtered, so a new
    /// threshold can be applied to the same range
    Established {
        low: i32,
        high: i32,
        matches: Vec<Song>,
    },
}

/// Catalogue plus the state carried between queries
#[derive(Debug, Clone)]
pub struct QueryEngine {
    songs: OrderedCollection<Song>,
    range: RangeState,
    threshold: i32,
    top_k: usize,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEngine {
    /// Empty engine, no threshold, top-5
    pub fn new() -> Self {
        Self::with_collection(OrderedCollection::new())
    }

    /// Engine over an existing collection
    pub fn with_collection(songs: OrderedCollection<Song>) -> Self {
        Self {
            songs,
            range: RangeState::Unset,
            threshold: i32::MIN,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Engine using the configured top-K size
    pub fn from_config(config: &TomlConfig) -> Self {
        Self::new().with_top_k(config.top_k)
    }

    /// Change how many songs `query_top_k` reports
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Add one song to the catalogue
    ///
    /// Arrival order has no observable effect beyond the relative order of
    /// songs with equal danceability.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidEntry`] if the song has no title; nothing is inserted.
    pub fn ingest(&mut self, song: Song) -> Result<()> {
        if song.title().trim().is_empty() {
            return Err(Error::InvalidEntry(format!(
                "song without a title (danceability {})",
                song.danceability()
            )));
        }
        self.songs.insert(song);
        Ok(())
    }

    /// Number of songs in the catalogue
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Read-only view of the catalogue
    pub fn songs(&self) -> &OrderedCollection<Song> {
        &self.songs
    }

    /// Most recent range, if any
    pub fn range(&self) -> Option<(i32, i32)> {
        match self.range {
            RangeState::Unset => None,
            RangeState::Established { low, high, .. } => Some((low, high)),
        }
    }

    /// Energy threshold applied to range queries (`i32::MIN` = none)
    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Drop every song and forget range and threshold
    pub fn reset(&mut self) {
        self.songs.clear();
        self.range = RangeState::Unset;
        self.threshold = i32::MIN;
    }

    /// Titles of songs with danceability in `[low, high]`, in danceability order
    ///
    /// Only songs meeting the current energy threshold are listed. The range
    /// and its unfiltered matches are remembered for the other queries.
    /// `low > high` matches nothing.
    pub fn query_range(&mut self, low: i32, high: i32) -> Vec<String> {
        let matches: Vec<Song> = self.in_range(low, high).cloned().collect();

        let titles: Vec<String> = matches
            .iter()
            .filter(|song| song.energy() >= self.threshold)
            .map(|song| song.title().to_string())
            .collect();

        debug!(
            low,
            high,
            threshold = self.threshold,
            in_range = matches.len(),
            returned = titles.len(),
            "Range query"
        );

        self.range = RangeState::Established { low, high, matches };
        titles
    }

    /// Narrow the last range to songs with energy >= `min_energy`
    ///
    /// Before any range query this returns nothing and leaves the threshold
    /// untouched. Otherwise the threshold is stored and applies to later
    /// range and top-K queries too.
    pub fn set_energetic_threshold(&mut self, min_energy: i32) -> Vec<String> {
        let RangeState::Established { matches, .. } = &self.range else {
            debug!(min_energy, "Threshold ignored: no range established");
            return Vec::new();
        };

        let titles: Vec<String> = matches
            .iter()
            .filter(|song| song.energy() >= min_energy)
            .map(|song| song.title().to_string())
            .collect();

        debug!(
            min_energy,
            in_range = matches.len(),
            returned = titles.len(),
            "Energy threshold set"
        );

        self.threshold = min_energy;
        titles
    }

    /// Fastest songs of the current range and threshold
    ///
    /// Rescans the catalogue, keeps the `top_k` highest BPM values and
    /// renders them as `"<bpm>: <title>"` in ascending BPM order. Songs with
    /// equal BPM keep danceability order (stable sort).
    ///
    /// # Errors
    ///
    /// [`Error::NoRangeEstablished`] if `query_range` was never called.
    pub fn query_top_k(&self) -> Result<Vec<String>> {
        let (low, high) = self.range().ok_or(Error::NoRangeEstablished)?;

        let mut ranked: Vec<&Song> = self
            .in_range(low, high)
            .filter(|song| song.energy() >= self.threshold)
            .collect();
        ranked.sort_by_key(|song| song.bpm());

        let first = ranked.len().saturating_sub(self.top_k);
        let fastest: Vec<String> = ranked[first..]
            .iter()
            .map(|song| format!("{}: {}", song.bpm(), song.title()))
            .collect();

        debug!(
            low,
            high,
            threshold = self.threshold,
            candidates = ranked.len(),
            returned = fastest.len(),
            "Top-K query"
        );

        Ok(fastest)
    }

    fn in_range(&self, low: i32, high: i32) -> impl Iterator<Item = &Song> + '_ {
        self.songs
            .iter_from(&low)
            .take_while(move |song| song.danceability() <= high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(title: &str, danceability: i32, energy: i32, bpm: i32) -> Song {
        Song::new(title)
            .with_danceability(danceability)
            .with_energy(energy)
            .with_bpm(bpm)
    }

    fn abc_engine() -> QueryEngine {
        let mut engine = QueryEngine::new();
        engine.ingest(song("C", 20, 90, 90)).unwrap();
        engine.ingest(song("A", 10, 80, 120)).unwrap();
        engine.ingest(song("B", 15, 40, 200)).unwrap();
        engine
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut engine = abc_engine();

        assert_eq!(engine.query_range(10, 20), vec!["A", "B", "C"]);
        assert_eq!(engine.set_energetic_threshold(50), vec!["A", "C"]);
        assert_eq!(engine.query_top_k().unwrap(), vec!["90: C", "120: A"]);
    }

    #[test]
    fn test_top_k_before_range_fails() {
        let engine = abc_engine();
        assert!(matches!(
            engine.query_top_k(),
            Err(Error::NoRangeEstablished)
        ));
    }

    #[test]
    fn test_threshold_before_range_is_noop() {
        let mut engine = abc_engine();

        assert!(engine.set_energetic_threshold(85).is_empty());
        assert_eq!(engine.threshold(), i32::MIN);
        assert_eq!(engine.range(), None);

        // A later range query is not filtered by the ignored threshold
        assert_eq!(engine.query_range(0, 100), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_range_applies_stored_threshold() {
        let mut engine = abc_engine();
        engine.query_range(0, 100);
        engine.set_energetic_threshold(85);

        assert_eq!(engine.query_range(10, 15), Vec::<String>::new());
        assert_eq!(engine.query_range(10, 20), vec!["C"]);
    }

    #[test]
    fn test_threshold_narrows_unfiltered_range() {
        let mut engine = abc_engine();
        engine.query_range(10, 20);
        assert_eq!(engine.set_energetic_threshold(85), vec!["C"]);

        // Loosening again works on the same stored range
        assert_eq!(engine.set_energetic_threshold(0), vec!["A", "B", "C"]);
        assert_eq!(engine.threshold(), 0);
    }

    #[test]
    fn test_range_is_idempotent() {
        let mut engine = abc_engine();
        engine.query_range(0, 100);
        engine.set_energetic_threshold(50);

        let first = engine.query_range(12, 30);
        let second = engine.query_range(12, 30);
        assert_eq!(first, second);
        assert_eq!(first, vec!["C"]);
    }

    #[test]
    fn test_threshold_monotonic() {
        let mut engine = QueryEngine::new();
        for i in 0..50 {
            engine
                .ingest(song(&format!("song-{i}"), i % 10, (i * 37) % 100, 60 + i))
                .unwrap();
        }
        engine.query_range(2, 7);

        let mut previous = usize::MAX;
        for threshold in (0..=100).step_by(5) {
            let size = engine.set_energetic_threshold(threshold).len();
            assert!(size <= previous, "threshold {} grew result", threshold);
            previous = size;
        }
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let mut engine = abc_engine();
        assert!(engine.query_range(20, 10).is_empty());
        assert_eq!(engine.range(), Some((20, 10)));
        assert!(engine.query_top_k().unwrap().is_empty());
    }

    #[test]
    fn test_empty_established_range_is_not_unset() {
        let mut engine = abc_engine();
        assert!(engine.query_range(50, 60).is_empty());

        // Established but empty: threshold is recorded, top-K succeeds
        assert!(engine.set_energetic_threshold(70).is_empty());
        assert_eq!(engine.threshold(), 70);
        assert_eq!(engine.query_top_k().unwrap(), Vec::<String>::new());

        assert_eq!(engine.query_range(0, 100), vec!["A", "C"]);
    }

    #[test]
    fn test_top_k_limits_and_sorts() {
        let mut engine = QueryEngine::new().with_top_k(3);
        for (i, bpm) in [150, 90, 200, 120, 175, 60].into_iter().enumerate() {
            engine.ingest(song(&format!("s{i}"), i as i32, 50, bpm)).unwrap();
        }
        engine.query_range(0, 10);

        let top = engine.query_top_k().unwrap();
        assert_eq!(top, vec!["150: s0", "175: s4", "200: s2"]);
    }

    #[test]
    fn test_top_k_fewer_than_k() {
        let mut engine = abc_engine();
        engine.query_range(10, 15);
        assert_eq!(engine.query_top_k().unwrap(), vec!["120: A", "200: B"]);
    }

    #[test]
    fn test_top_k_zero() {
        let mut engine = abc_engine().with_top_k(0);
        engine.query_range(0, 100);
        assert!(engine.query_top_k().unwrap().is_empty());
    }

    #[test]
    fn test_top_k_ties_keep_danceability_order() {
        let mut engine = QueryEngine::new().with_top_k(2);
        engine.ingest(song("late", 30, 50, 190)).unwrap();
        engine.ingest(song("early", 10, 50, 190)).unwrap();
        engine.ingest(song("slow", 20, 50, 80)).unwrap();
        engine.query_range(0, 100);

        assert_eq!(
            engine.query_top_k().unwrap(),
            vec!["190: early", "190: late"]
        );
    }

    #[test]
    fn test_ingest_rejects_untitled_song() {
        let mut engine = abc_engine();
        let result = engine.ingest(song("   ", 12, 50, 100));

        assert!(matches!(result, Err(Error::InvalidEntry(_))));
        assert_eq!(engine.len(), 3);
        assert!(!engine.songs().contains(&12));
    }

    #[test]
    fn test_reset_clears_catalogue_and_state() {
        let mut engine = abc_engine();
        engine.query_range(0, 100);
        engine.set_energetic_threshold(50);

        engine.reset();

        assert!(engine.is_empty());
        assert_eq!(engine.range(), None);
        assert_eq!(engine.threshold(), i32::MIN);
        assert!(matches!(
            engine.query_top_k(),
            Err(Error::NoRangeEstablished)
        ));
    }

    #[test]
    fn test_from_config_uses_top_k() {
        let config = TomlConfig {
            top_k: 2,
            ..TomlConfig::default()
        };
        let engine = QueryEngine::from_config(&config);
        assert_eq!(engine.top_k(), 2);
        assert_eq!(QueryEngine::new().top_k(), 5);
    }
}
