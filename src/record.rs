//! JSON-lines dumps of finished games for replay or inspection.
//!
//! One [`GameRecord`] per line. This is a convenience for driving programs,
//! not a stable archive format.

use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::engine::Tile;
use crate::game::{GameState, HistoryEntry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub game_index: u64,
    pub policy: String,
    pub moves: u64,
    pub highest_tile: Tile,
    pub tile_sum: u64,
    pub start_unix_s: u64,
    pub elapsed_s: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub meta: Meta,
    pub history: Vec<HistoryEntry>,
}

impl GameRecord {
    pub fn from_game(game_index: u64, policy: &str, state: &GameState, start_unix_s: u64, elapsed_s: f32) -> Self {
        GameRecord {
            meta: Meta {
                game_index,
                policy: policy.to_string(),
                moves: state.moves_played() as u64,
                highest_tile: state.highest_tile(),
                tile_sum: state.board().tile_sum(),
                start_unix_s,
                elapsed_s,
            },
            history: state.history().to_vec(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RecordError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error on line {line}: {source}")]
    Json { line: usize, source: serde_json::Error },
    #[error("record {index} has an empty history")]
    EmptyHistory { index: usize },
}

/// Append one record as a single JSON line.
pub fn write_record<W: Write>(out: &mut W, record: &GameRecord) -> Result<(), RecordError> {
    serde_json::to_writer(&mut *out, record).map_err(io::Error::from)?;
    out.write_all(b"\n")?;
    Ok(())
}

pub fn write_records_to_path<P: AsRef<Path>>(path: P, records: &[GameRecord]) -> Result<(), RecordError> {
    let mut f = BufWriter::new(fs::File::create(path)?);
    for r in records {
        write_record(&mut f, r)?;
    }
    f.flush()?;
    Ok(())
}

/// Parse JSON lines, skipping blank ones. Every record must start with a `"start"` entry.
pub fn read_records<R: BufRead>(input: R) -> Result<Vec<GameRecord>, RecordError> {
    let mut out = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let rec: GameRecord =
            serde_json::from_str(&line).map_err(|source| RecordError::Json { line: idx + 1, source })?;
        if rec.history.is_empty() {
            return Err(RecordError::EmptyHistory { index: out.len() });
        }
        out.push(rec);
    }
    Ok(out)
}

pub fn read_records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<GameRecord>, RecordError> {
    read_records(BufReader::new(fs::File::open(path)?))
}

/// Rebuild the final game of a record so play can continue from it.
///
/// The deck is not recorded, so the resumed game draws from a fresh one.
pub fn resume_last<R: rand::Rng + ?Sized>(record: &GameRecord, rng: &mut R) -> Result<GameState, RecordError> {
    let last = record
        .history
        .last()
        .ok_or(RecordError::EmptyHistory { index: record.meta.game_index as usize })?;
    let deck = crate::deck::TileDeck::new(rng);
    Ok(GameState::resume(last.board.clone(), deck, last.next_tile, rng))
}

pub fn now_unix_seconds() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}
