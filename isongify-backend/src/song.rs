//! Song catalogue entry

use crate::collection::Keyed;
use serde::Serialize;

/// One catalogue row
///
/// Immutable once built: fields are private and the `with_*` builders
/// consume the value. For collection ordering a song is keyed by
/// danceability alone, so two songs with equal danceability tie but stay
/// distinct elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Song {
    title: String,
    artist: String,
    genre: String,
    year: i32,
    bpm: i32,
    energy: i32,
    danceability: i32,
    loudness: i32,
    liveness: i32,
}

impl Song {
    /// New song with every numeric attribute zeroed
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: String::new(),
            genre: String::new(),
            year: 0,
            bpm: 0,
            energy: 0,
            danceability: 0,
            loudness: 0,
            liveness: 0,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn with_bpm(mut self, bpm: i32) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn with_energy(mut self, energy: i32) -> Self {
        self.energy = energy;
        self
    }

    pub fn with_danceability(mut self, danceability: i32) -> Self {
        self.danceability = danceability;
        self
    }

    pub fn with_loudness(mut self, loudness: i32) -> Self {
        self.loudness = loudness;
        self
    }

    pub fn with_liveness(mut self, liveness: i32) -> Self {
        self.liveness = liveness;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Genres as listed in the catalogue
    pub fn genre(&self) -> &str {
        &self.genre
    }

    /// Billboard year
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Tempo in beats per minute (ranks the top-K query)
    pub fn bpm(&self) -> i32 {
        self.bpm
    }

    /// Energy rating (threshold filter)
    pub fn energy(&self) -> i32 {
        self.energy
    }

    /// Danceability rating (collection order)
    pub fn danceability(&self) -> i32 {
        self.danceability
    }

    /// Loudness in dB
    pub fn loudness(&self) -> i32 {
        self.loudness
    }

    pub fn liveness(&self) -> i32 {
        self.liveness
    }
}

impl Keyed for Song {
    type Key = i32;

    fn key(&self) -> i32 {
        self.danceability
    }
}
