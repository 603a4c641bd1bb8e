pub mod direction;
#[cfg(feature = "http_api")]
pub mod http_api;
#[cfg(any(feature = "cli_api", feature = "http_api"))]
pub mod logging;
pub mod metadata;
pub mod persistence;
pub mod position;
pub mod position_validation;
pub mod timeline;

pub use direction::{Direction, InvalidDirection};
pub use metadata::{TimelineMetadata, TimelineMetadataError};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteTimelineStore;
pub use persistence::{
    PersistenceError, TimelineStore, load_timeline_from_csv, load_timeline_from_json,
    save_timeline_to_csv, save_timeline_to_json, validate_positions, validate_timeline,
};
pub use position::{Position, Span, SpanKind};
pub use position_validation::{PositionValidationError, validate_position};
pub use timeline::{Timeline, TimelineSummary};
