use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineMetadata {
    pub name: String,
    pub description: String,
    /// Color handed to positions created without an explicit one.
    pub default_color: String,
}

impl Default for TimelineMetadata {
    fn default() -> Self {
        Self {
            name: "New Timeline".to_string(),
            description: "No description".to_string(),
            default_color: "#1f77b4".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineMetadataError {
    BlankName,
    BlankDefaultColor,
}

impl fmt::Display for TimelineMetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineMetadataError::BlankName => write!(f, "timeline name must not be blank"),
            TimelineMetadataError::BlankDefaultColor => {
                write!(f, "timeline default color must not be blank")
            }
        }
    }
}

impl std::error::Error for TimelineMetadataError {}

impl TimelineMetadata {
    pub fn validate(&self) -> Result<(), TimelineMetadataError> {
        if self.name.trim().is_empty() {
            return Err(TimelineMetadataError::BlankName);
        }
        if self.default_color.trim().is_empty() {
            return Err(TimelineMetadataError::BlankDefaultColor);
        }
        Ok(())
    }
}
