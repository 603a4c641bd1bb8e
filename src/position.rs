use chrono::{DateTime, Duration, Utc};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two interval shapes a [`Span`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Range,
    Offset,
}

impl SpanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanKind::Range => "range",
            SpanKind::Offset => "offset",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "range" => Some(SpanKind::Range),
            "offset" => Some(SpanKind::Offset),
            _ => None,
        }
    }
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounds of a position: either a pair of instants or an offset along an axis.
///
/// Range ends are read as half-open `[from, to)`. Nothing here checks
/// `from <= to` or `duration >= 0`; see [`crate::position_validation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Span {
    Range {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    Offset {
        position: f64,
        duration: f64,
    },
}

impl Span {
    pub fn kind(&self) -> SpanKind {
        match self {
            Span::Range { .. } => SpanKind::Range,
            Span::Offset { .. } => SpanKind::Offset,
        }
    }

    /// `to - from` for a range span. Negative when the range is inverted.
    pub fn length(&self) -> Option<Duration> {
        match self {
            Span::Range { from, to } => Some(*to - *from),
            Span::Offset { .. } => None,
        }
    }

    /// `position + duration` for an offset span.
    pub fn end_offset(&self) -> Option<f64> {
        match self {
            Span::Offset { position, duration } => Some(position + duration),
            Span::Range { .. } => None,
        }
    }
}

/// One colored interval on a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: i32,
    pub color: String,
    #[serde(flatten)]
    pub span: Span,
}

impl Position {
    /// Builds a position from its parts, copying each field as given.
    pub fn new(id: i32, color: impl Into<String>, span: Span) -> Self {
        Self {
            id,
            color: color.into(),
            span,
        }
    }

    pub fn range(
        id: i32,
        color: impl Into<String>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Self {
        Self::new(id, color, Span::Range { from, to })
    }

    pub fn offset(id: i32, color: impl Into<String>, position: f64, duration: f64) -> Self {
        Self::new(id, color, Span::Offset { position, duration })
    }

    pub fn kind(&self) -> SpanKind {
        self.span.kind()
    }

    pub fn from(&self) -> Option<DateTime<Utc>> {
        match self.span {
            Span::Range { from, .. } => Some(from),
            Span::Offset { .. } => None,
        }
    }

    pub fn to(&self) -> Option<DateTime<Utc>> {
        match self.span {
            Span::Range { to, .. } => Some(to),
            Span::Offset { .. } => None,
        }
    }

    pub fn position(&self) -> Option<f64> {
        match self.span {
            Span::Offset { position, .. } => Some(position),
            Span::Range { .. } => None,
        }
    }

    pub fn duration(&self) -> Option<f64> {
        match self.span {
            Span::Offset { duration, .. } => Some(duration),
            Span::Range { .. } => None,
        }
    }

    /// Single-row frame matching the timeline schema. Range instants are
    /// stored as epoch milliseconds.
    pub fn to_dataframe_row(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(7);

        let id_data: [i32; 1] = [self.id];
        columns.push(Series::new(PlSmallStr::from_static("id"), id_data).into_column());

        let color_data: [&str; 1] = [self.color.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("color"), color_data).into_column());

        let kind_data: [&str; 1] = [self.kind().as_str()];
        columns.push(Series::new(PlSmallStr::from_static("kind"), kind_data).into_column());

        let from_ms: [Option<i64>; 1] = [self.from().map(|ts| ts.timestamp_millis())];
        columns.push(Series::new(PlSmallStr::from_static("from_ms"), from_ms).into_column());

        let to_ms: [Option<i64>; 1] = [self.to().map(|ts| ts.timestamp_millis())];
        columns.push(Series::new(PlSmallStr::from_static("to_ms"), to_ms).into_column());

        let position: [Option<f64>; 1] = [self.position()];
        columns.push(Series::new(PlSmallStr::from_static("position"), position).into_column());

        let duration: [Option<f64>; 1] = [self.duration()];
        columns.push(Series::new(PlSmallStr::from_static("duration"), duration).into_column());

        DataFrame::new(columns)
    }

    pub fn from_dataframe_row(df: &DataFrame, row_idx: usize) -> PolarsResult<Self> {
        let id = df.column("id")?.i32()?.get(row_idx).ok_or_else(|| {
            PolarsError::ComputeError("position row missing id".into())
        })?;

        let color = df
            .column("color")?
            .str()?
            .get(row_idx)
            .ok_or_else(|| {
                PolarsError::ComputeError(format!("position {id} missing color").into())
            })?
            .to_string();

        let kind_raw = df.column("kind")?.str()?.get(row_idx).ok_or_else(|| {
            PolarsError::ComputeError(format!("position {id} missing kind").into())
        })?;
        let kind = SpanKind::parse(kind_raw).ok_or_else(|| {
            PolarsError::ComputeError(
                format!("position {id} has unknown kind '{kind_raw}'").into(),
            )
        })?;

        let span = match kind {
            SpanKind::Range => Span::Range {
                from: Self::instant_from_column(df, "from_ms", row_idx, id)?,
                to: Self::instant_from_column(df, "to_ms", row_idx, id)?,
            },
            SpanKind::Offset => Span::Offset {
                position: Self::number_from_column(df, "position", row_idx, id)?,
                duration: Self::number_from_column(df, "duration", row_idx, id)?,
            },
        };

        Ok(Self { id, color, span })
    }

    fn instant_from_column(
        df: &DataFrame,
        column: &str,
        row_idx: usize,
        id: i32,
    ) -> PolarsResult<DateTime<Utc>> {
        let millis = df.column(column)?.i64()?.get(row_idx).ok_or_else(|| {
            PolarsError::ComputeError(format!("range position {id} missing {column}").into())
        })?;
        DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            PolarsError::ComputeError(
                format!("position {id} has out-of-range {column} {millis}").into(),
            )
        })
    }

    fn number_from_column(
        df: &DataFrame,
        column: &str,
        row_idx: usize,
        id: i32,
    ) -> PolarsResult<f64> {
        df.column(column)?.f64()?.get(row_idx).ok_or_else(|| {
            PolarsError::ComputeError(format!("offset position {id} missing {column}").into())
        })
    }
}
