//! Catalogue loading from CSV
//!
//! Rows are `title,artist,genre,year,bpm,energy,danceability,loudness,liveness`
//! after a single header line. Commas inside double quotes do not split a
//! field, and the quote characters themselves are kept as part of the field.
//!
//! Every failure on the way in (missing file, read error, undecodable row,
//! rejected entry) surfaces as [`Error::InputUnavailable`]; the detailed
//! cause is logged.

use crate::engine::QueryEngine;
use crate::error::{Error, Result};
use crate::song::Song;
use isongify_common::config::{default_config_path, resolve_data_file, TomlConfig};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Number of columns a row must provide
pub const FIELD_COUNT: usize = 9;

/// Why a single row could not become a [`Song`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("field '{field}' is not an integer: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Split a row on commas that are not inside double quotes
pub fn split_row(row: &str) -> Vec<&str> {
    let mut fields = Vec::with_capacity(FIELD_COUNT);
    let mut quoted = false;
    let mut start = 0;

    for (i, ch) in row.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                fields.push(&row[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&row[start..]);
    fields
}

fn parse_int(field: &'static str, value: &str) -> std::result::Result<i32, DecodeError> {
    value
        .trim()
        .parse()
        .map_err(|_| DecodeError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

impl Song {
    /// Decode one CSV row; columns past the ninth are ignored
    pub fn from_row(row: &str) -> std::result::Result<Self, DecodeError> {
        let fields = split_row(row);
        if fields.len() < FIELD_COUNT {
            return Err(DecodeError::FieldCount {
                expected: FIELD_COUNT,
                found: fields.len(),
            });
        }

        Ok(Song::new(fields[0])
            .with_artist(fields[1])
            .with_genre(fields[2])
            .with_year(parse_int("year", fields[3])?)
            .with_bpm(parse_int("bpm", fields[4])?)
            .with_energy(parse_int("energy", fields[5])?)
            .with_danceability(parse_int("danceability", fields[6])?)
            .with_loudness(parse_int("loudness", fields[7])?)
            .with_liveness(parse_int("liveness", fields[8])?))
    }
}

impl FromStr for Song {
    type Err = DecodeError;

    fn from_str(row: &str) -> std::result::Result<Self, DecodeError> {
        Song::from_row(row)
    }
}

fn unavailable(reason: String) -> Error {
    warn!("{}", reason);
    Error::InputUnavailable(reason)
}

/// Ingest every row after the header; returns how many songs were added
///
/// Blank lines are skipped. Songs ingested before a failing row stay in
/// the engine.
pub fn load_from_reader<R: BufRead>(engine: &mut QueryEngine, reader: R) -> Result<usize> {
    let mut lines = reader.lines();

    match lines.next() {
        Some(Ok(_header)) => {}
        Some(Err(e)) => return Err(unavailable(format!("Failed to read header: {}", e))),
        None => return Err(unavailable("Catalogue is empty (no header line)".to_string())),
    }

    let mut loaded = 0;
    for (index, line) in lines.enumerate() {
        // Header is line 1
        let line_no = index + 2;
        let row = line.map_err(|e| unavailable(format!("Failed to read line {}: {}", line_no, e)))?;
        if row.trim().is_empty() {
            continue;
        }

        let song = Song::from_row(&row)
            .map_err(|e| unavailable(format!("Line {}: {}", line_no, e)))?;
        engine
            .ingest(song)
            .map_err(|e| unavailable(format!("Line {}: {}", line_no, e)))?;
        loaded += 1;
    }

    Ok(loaded)
}

/// Open a catalogue file and ingest it
pub fn load_file(engine: &mut QueryEngine, path: &Path) -> Result<usize> {
    let file = File::open(path)
        .map_err(|e| unavailable(format!("Cannot open {}: {}", path.display(), e)))?;

    let loaded = load_from_reader(engine, BufReader::new(file))?;
    info!("Loaded {} songs from {}", loaded, path.display());
    Ok(loaded)
}

/// Build an engine from configuration and load its catalogue
///
/// `config_path` defaults to the platform config file; a missing config
/// file means defaults. `data_file` overrides every configured catalogue
/// location.
pub fn bootstrap(config_path: Option<&Path>, data_file: Option<&Path>) -> Result<QueryEngine> {
    let config = match config_path {
        Some(path) => TomlConfig::load_or_default(path)?,
        None => TomlConfig::load_or_default(&default_config_path()?)?,
    };

    let catalogue = resolve_data_file(data_file, Some(&config));
    let mut engine = QueryEngine::from_config(&config);
    load_file(&mut engine, &catalogue)?;
    Ok(engine)
}
