use crate::position::{Position, Span};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone)]
pub struct PositionValidationError {
    message: String,
}

impl PositionValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for PositionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PositionValidationError {}

/// Checks the invariants a position is expected to hold. Construction never
/// runs this; collections and loaders do.
pub fn validate_position(position: &Position) -> Result<(), PositionValidationError> {
    if position.color.trim().is_empty() {
        return Err(PositionValidationError::new(format!(
            "position {} requires a non-empty color",
            position.id
        )));
    }

    match &position.span {
        Span::Range { from, to } => {
            if to < from {
                return Err(PositionValidationError::new(format!(
                    "position {} ends ({}) before it starts ({})",
                    position.id,
                    to.to_rfc3339(),
                    from.to_rfc3339()
                )));
            }
        }
        Span::Offset { position: offset, duration } => {
            if !offset.is_finite() {
                return Err(PositionValidationError::new(format!(
                    "position {} has non-finite offset {}",
                    position.id, offset
                )));
            }
            if !duration.is_finite() || *duration < 0.0 {
                return Err(PositionValidationError::new(format!(
                    "position {} has invalid duration {} (must be finite and >= 0)",
                    position.id, duration
                )));
            }
        }
    }

    Ok(())
}

pub fn validate_position_collection(positions: &[Position]) -> Result<(), PositionValidationError> {
    let mut seen_ids = HashSet::with_capacity(positions.len());
    for position in positions {
        if !seen_ids.insert(position.id) {
            return Err(PositionValidationError::new(format!(
                "duplicate position id {}",
                position.id
            )));
        }
        validate_position(position)?;
    }
    Ok(())
}
