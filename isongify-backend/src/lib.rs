//! # iSongify Backend
//!
//! Song catalogue held in a red-black tree ordered by danceability, plus the
//! stateful query pipeline a front end drives:
//! - range of danceability → titles
//! - narrow that range by minimum energy
//! - fastest songs (by BPM) of the narrowed range

pub mod collection;
pub mod engine;
pub mod error;
pub mod loader;
pub mod song;

pub use collection::{Keyed, OrderedCollection};
pub use engine::QueryEngine;
pub use error::{Error, Result};
pub use song::Song;
