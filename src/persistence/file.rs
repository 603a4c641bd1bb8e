use super::{PersistenceError, PersistenceResult};
use crate::position::{Position, Span, SpanKind};
use crate::{Timeline, TimelineMetadata};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::info;

#[derive(Serialize, Deserialize)]
struct TimelineSnapshot {
    metadata: TimelineMetadata,
    positions: Vec<Position>,
}

impl TimelineSnapshot {
    fn from_timeline(timeline: &Timeline) -> PersistenceResult<Self> {
        super::validate_timeline(timeline)?;
        Ok(Self {
            metadata: timeline.metadata().clone(),
            positions: timeline.positions()?,
        })
    }

    fn into_timeline(self) -> PersistenceResult<Timeline> {
        super::assemble_timeline(self.metadata, self.positions)
    }
}

pub fn save_timeline_to_json<P: AsRef<Path>>(
    timeline: &Timeline,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = TimelineSnapshot::from_timeline(timeline)?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    info!(
        path = %path.as_ref().display(),
        count = snapshot.positions.len(),
        "saved timeline to json"
    );
    Ok(())
}

pub fn load_timeline_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Timeline> {
    let file = File::open(path.as_ref())?;
    let snapshot: TimelineSnapshot = serde_json::from_reader(file)?;
    let timeline = snapshot.into_timeline()?;
    info!(
        path = %path.as_ref().display(),
        count = timeline.len(),
        "loaded timeline from json"
    );
    Ok(timeline)
}

#[derive(Default, Serialize, Deserialize)]
struct PositionCsvRecord {
    id: i32,
    color: String,
    kind: String,
    from: String,
    to: String,
    position: String,
    duration: String,
    #[serde(default)]
    metadata_json: String,
}

impl From<&Position> for PositionCsvRecord {
    fn from(position: &Position) -> Self {
        let mut record = PositionCsvRecord {
            id: position.id,
            color: position.color.clone(),
            kind: position.kind().as_str().to_string(),
            ..Default::default()
        };
        match &position.span {
            Span::Range { from, to } => {
                record.from = format_instant(*from);
                record.to = format_instant(*to);
            }
            Span::Offset {
                position: offset,
                duration,
            } => {
                record.position = offset.to_string();
                record.duration = duration.to_string();
            }
        }
        record
    }
}

impl PositionCsvRecord {
    fn metadata_row(timeline: &Timeline) -> PersistenceResult<Self> {
        Ok(PositionCsvRecord {
            metadata_json: serde_json::to_string(timeline.metadata())?,
            ..Default::default()
        })
    }

    fn is_metadata_row(&self) -> bool {
        !self.metadata_json.trim().is_empty()
    }

    fn into_position(self) -> PersistenceResult<Position> {
        if self.is_metadata_row() {
            return Err(PersistenceError::InvalidData(
                "metadata row cannot be converted to position".into(),
            ));
        }
        let kind = SpanKind::parse(&self.kind).ok_or_else(|| {
            PersistenceError::InvalidData(format!(
                "position {} has invalid kind '{}'",
                self.id, self.kind
            ))
        })?;
        let span = match kind {
            SpanKind::Range => Span::Range {
                from: require(parse_instant(&self.from)?, self.id, "from")?,
                to: require(parse_instant(&self.to)?, self.id, "to")?,
            },
            SpanKind::Offset => Span::Offset {
                position: require(parse_f64(&self.position)?, self.id, "position")?,
                duration: require(parse_f64(&self.duration)?, self.id, "duration")?,
            },
        };
        Ok(Position::new(self.id, self.color, span))
    }
}

pub fn save_timeline_to_csv<P: AsRef<Path>>(timeline: &Timeline, path: P) -> PersistenceResult<()> {
    super::validate_timeline(timeline)?;
    let file = File::create(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(PositionCsvRecord::metadata_row(timeline)?)?;
    let positions = timeline.positions()?;
    for position in &positions {
        writer.serialize(PositionCsvRecord::from(position))?;
    }
    writer.flush()?;
    info!(
        path = %path.as_ref().display(),
        count = positions.len(),
        "saved timeline to csv"
    );
    Ok(())
}

pub fn load_timeline_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Timeline> {
    let file = File::open(path.as_ref())?;
    let mut reader = csv::Reader::from_reader(file);
    let mut positions = Vec::new();
    let mut metadata: Option<TimelineMetadata> = None;
    for record in reader.deserialize::<PositionCsvRecord>() {
        let record = record?;
        if record.is_metadata_row() {
            if metadata.is_some() {
                return Err(PersistenceError::InvalidData(
                    "CSV file contained multiple metadata rows".into(),
                ));
            }
            metadata = Some(serde_json::from_str(&record.metadata_json).map_err(|err| {
                PersistenceError::InvalidData(format!("invalid metadata json: {err}"))
            })?);
            continue;
        }
        positions.push(record.into_position()?);
    }

    if positions.is_empty() && metadata.is_none() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no rows".into(),
        ));
    }

    let timeline = super::assemble_timeline(metadata.unwrap_or_default(), positions)?;
    info!(
        path = %path.as_ref().display(),
        count = timeline.len(),
        "loaded timeline from csv"
    );
    Ok(timeline)
}

fn require<T>(value: Option<T>, id: i32, field: &str) -> PersistenceResult<T> {
    value.ok_or_else(|| {
        PersistenceError::InvalidData(format!("position {id} is missing '{field}'"))
    })
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_instant(input: &str) -> PersistenceResult<Option<DateTime<Utc>>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(input.trim())
        .map(|ts| Some(ts.with_timezone(&Utc)))
        .map_err(|e| PersistenceError::InvalidData(format!("invalid timestamp '{input}': {e}")))
}

fn parse_f64(input: &str) -> PersistenceResult<Option<f64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid number '{input}': {e}")))
}
