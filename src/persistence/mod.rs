use crate::position_validation;
use crate::{Position, Timeline, TimelineMetadata};
use polars::prelude::PolarsError;
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    DataFrame(PolarsError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::DataFrame(err) => write!(f, "dataframe conversion error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<PolarsError> for PersistenceError {
    fn from(value: PolarsError) -> Self {
        Self::DataFrame(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait TimelineStore {
    fn save_timeline(&self, timeline: &Timeline) -> PersistenceResult<()>;
    fn load_timeline(&self) -> PersistenceResult<Option<Timeline>>;
}

pub fn validate_positions(positions: &[Position]) -> PersistenceResult<()> {
    position_validation::validate_position_collection(positions)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub fn validate_timeline(timeline: &Timeline) -> PersistenceResult<()> {
    timeline
        .metadata()
        .validate()
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    validate_positions(&timeline.positions()?)
}

/// Rebuilds a timeline from loaded parts after validating them.
pub(crate) fn assemble_timeline(
    metadata: TimelineMetadata,
    positions: Vec<Position>,
) -> PersistenceResult<Timeline> {
    metadata
        .validate()
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    validate_positions(&positions)?;
    let mut timeline = Timeline::new_with_metadata(metadata);
    for position in positions {
        timeline.upsert_position(position)?;
    }
    Ok(timeline)
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_timeline_from_csv, load_timeline_from_json, save_timeline_to_csv, save_timeline_to_json,
};
