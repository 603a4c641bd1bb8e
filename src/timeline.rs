use crate::metadata::{TimelineMetadata, TimelineMetadataError};
use crate::position::{Position, Span};
use crate::position_validation::{self, PositionValidationError};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSummary {
    pub position_count: usize,
    pub range_count: usize,
    pub offset_count: usize,
    pub earliest_from: Option<DateTime<Utc>>,
    pub latest_to: Option<DateTime<Utc>>,
    pub max_offset_end: Option<f64>,
}

impl TimelineSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("positions={}", self.position_count));
        parts.push(format!("ranges={}", self.range_count));
        parts.push(format!("offsets={}", self.offset_count));
        if let Some(from) = self.earliest_from {
            parts.push(format!("earliest={}", from.to_rfc3339()));
        }
        if let Some(to) = self.latest_to {
            parts.push(format!("latest={}", to.to_rfc3339()));
        }
        if let Some(end) = self.max_offset_end {
            parts.push(format!("max_end={}", end));
        }
        parts.join(", ")
    }
}

/// Id-keyed collection of positions in insertion order.
///
/// Rows live in a polars frame, so range instants are kept at millisecond
/// resolution once a position is stored.
#[derive(Debug, Clone)]
pub struct Timeline {
    df: DataFrame,
    metadata: TimelineMetadata,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self::new_with_metadata(TimelineMetadata::default())
    }

    pub fn new_with_metadata(metadata: TimelineMetadata) -> Self {
        Self {
            df: DataFrame::empty_with_schema(&Self::default_schema()),
            metadata,
        }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn metadata(&self) -> &TimelineMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn set_metadata(&mut self, metadata: TimelineMetadata) -> Result<(), TimelineMetadataError> {
        metadata.validate()?;
        self.metadata = metadata;
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), TimelineMetadataError> {
        self.update_metadata_with(|metadata| metadata.name = name.into())
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.metadata.description = description.into();
    }

    pub fn set_default_color(
        &mut self,
        color: impl Into<String>,
    ) -> Result<(), TimelineMetadataError> {
        self.update_metadata_with(|metadata| metadata.default_color = color.into())
    }

    fn update_metadata_with<F>(&mut self, mutator: F) -> Result<(), TimelineMetadataError>
    where
        F: FnOnce(&mut TimelineMetadata),
    {
        let mut metadata = self.metadata.clone();
        mutator(&mut metadata);
        self.set_metadata(metadata)
    }

    pub fn positions(&self) -> Result<Vec<Position>, PolarsError> {
        let mut positions = Vec::with_capacity(self.df.height());
        for idx in 0..self.df.height() {
            positions.push(Position::from_dataframe_row(&self.df, idx)?);
        }
        Ok(positions)
    }

    pub fn find_position(&self, position_id: i32) -> Result<Option<Position>, PolarsError> {
        match self.row_of(position_id)? {
            Some(idx) => Ok(Some(Position::from_dataframe_row(&self.df, idx)?)),
            None => Ok(None),
        }
    }

    pub fn contains(&self, position_id: i32) -> Result<bool, PolarsError> {
        Ok(self.row_of(position_id)?.is_some())
    }

    pub fn next_id(&self) -> Result<i32, PolarsError> {
        if self.df.height() == 0 {
            return Ok(1);
        }
        let max = self.df.column("id")?.i32()?.into_iter().flatten().max();
        match max {
            Some(m) => m.checked_add(1).ok_or_else(|| {
                PolarsError::ComputeError("position id space exhausted".into())
            }),
            None => Ok(1),
        }
    }

    /// Inserts a position, or replaces the row with the same id in place.
    pub fn upsert_position(&mut self, position: Position) -> Result<(), PolarsError> {
        position_validation::validate_position(&position).map_err(Self::validation_error)?;

        if self.row_of(position.id)?.is_some() {
            let mut positions = self.positions()?;
            for existing in positions.iter_mut() {
                if existing.id == position.id {
                    *existing = position.clone();
                }
            }
            self.rebuild(positions)?;
            debug!(position_id = position.id, "replaced position");
            return Ok(());
        }

        let new_row = position.to_dataframe_row()?;
        self.df = self.df.vstack(&new_row)?;
        debug!(position_id = position.id, kind = %position.kind(), "inserted position");
        Ok(())
    }

    pub fn delete_position(&mut self, position_id: i32) -> Result<bool, PolarsError> {
        if self.row_of(position_id)?.is_none() {
            return Ok(false);
        }
        let mut positions = self.positions()?;
        positions.retain(|position| position.id != position_id);
        self.rebuild(positions)?;
        debug!(position_id, "deleted position");
        Ok(true)
    }

    pub fn set_color(&mut self, position_id: i32, color: &str) -> Result<(), PolarsError> {
        let mut position = self.find_position(position_id)?.ok_or_else(|| {
            PolarsError::ComputeError(format!("position {position_id} not found").into())
        })?;
        position.color = color.to_string();
        position_validation::validate_position(&position).map_err(Self::validation_error)?;
        self.update_string_column("color", position_id, color)?;
        debug!(position_id, color, "recolored position");
        Ok(())
    }

    pub fn summary(&self) -> Result<TimelineSummary, PolarsError> {
        let mut summary = TimelineSummary {
            position_count: self.df.height(),
            range_count: 0,
            offset_count: 0,
            earliest_from: None,
            latest_to: None,
            max_offset_end: None,
        };
        for position in self.positions()? {
            match position.span {
                Span::Range { from, to } => {
                    summary.range_count += 1;
                    summary.earliest_from = Some(match summary.earliest_from {
                        Some(current) if current <= from => current,
                        _ => from,
                    });
                    summary.latest_to = Some(match summary.latest_to {
                        Some(current) if current >= to => current,
                        _ => to,
                    });
                }
                Span::Offset { position, duration } => {
                    summary.offset_count += 1;
                    let end = position + duration;
                    summary.max_offset_end = Some(match summary.max_offset_end {
                        Some(current) if current >= end => current,
                        _ => end,
                    });
                }
            }
        }
        Ok(summary)
    }

    pub(crate) fn default_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("id".into(), DataType::Int32),
            Field::new("color".into(), DataType::String),
            Field::new("kind".into(), DataType::String),
            Field::new("from_ms".into(), DataType::Int64),
            Field::new("to_ms".into(), DataType::Int64),
            Field::new("position".into(), DataType::Float64),
            Field::new("duration".into(), DataType::Float64),
        ])
    }

    fn row_of(&self, position_id: i32) -> Result<Option<usize>, PolarsError> {
        if self.df.height() == 0 {
            return Ok(None);
        }
        let ids = self.df.column("id")?.i32()?;
        Ok(ids.into_iter().position(|id| id == Some(position_id)))
    }

    fn rebuild(&mut self, positions: Vec<Position>) -> Result<(), PolarsError> {
        let mut df = DataFrame::empty_with_schema(&Self::default_schema());
        for position in &positions {
            df = df.vstack(&position.to_dataframe_row()?)?;
        }
        self.df = df;
        Ok(())
    }

    fn update_string_column(
        &mut self,
        column_name: &str,
        position_id: i32,
        new_value: &str,
    ) -> Result<(), PolarsError> {
        self.df = self
            .df
            .clone()
            .lazy()
            .with_column(
                when(col("id").eq(lit(position_id)))
                    .then(lit(new_value.to_string()))
                    .otherwise(col(column_name))
                    .alias(column_name),
            )
            .collect()?;
        Ok(())
    }

    fn validation_error(err: PositionValidationError) -> PolarsError {
        PolarsError::ComputeError(err.to_string().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_contains_expected_columns() {
        let schema = Timeline::default_schema();
        let expected = vec![
            "id", "color", "kind", "from_ms", "to_ms", "position", "duration",
        ];
        for name in expected {
            assert!(schema.contains(name.into()), "missing column {name}");
        }
    }

    #[test]
    fn upsert_inserts_and_replaces_in_place() {
        let mut timeline = Timeline::new();
        timeline
            .upsert_position(Position::offset(1, "red", 0.0, 2.0))
            .unwrap();
        timeline
            .upsert_position(Position::offset(2, "green", 2.0, 2.0))
            .unwrap();
        timeline
            .upsert_position(Position::offset(1, "blue", 4.0, 1.0))
            .unwrap();

        assert_eq!(timeline.len(), 2);
        let df = timeline.dataframe();
        let color = df.column("color").unwrap().str().unwrap().get(0).unwrap();
        let position = df
            .column("position")
            .unwrap()
            .f64()
            .unwrap()
            .get(0)
            .unwrap();
        assert_eq!(color, "blue");
        assert_eq!(position, 4.0);
    }

    #[test]
    fn set_color_updates_only_target_row() {
        let mut timeline = Timeline::new();
        timeline
            .upsert_position(Position::offset(1, "red", 0.0, 1.0))
            .unwrap();
        timeline
            .upsert_position(Position::offset(2, "red", 1.0, 1.0))
            .unwrap();
        timeline.set_color(2, "orange").unwrap();

        let colors: Vec<String> = timeline
            .positions()
            .unwrap()
            .into_iter()
            .map(|p| p.color)
            .collect();
        assert_eq!(colors, vec!["red".to_string(), "orange".to_string()]);
        assert!(timeline.set_color(2, " ").is_err());
        assert!(timeline.set_color(9, "red").is_err());
    }
}
