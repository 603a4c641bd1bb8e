use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Horizontal orientation on a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Direction {
    Left = 1,
    Right = 2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidDirection {
    Code(u8),
    Name(String),
}

impl fmt::Display for InvalidDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidDirection::Code(code) => {
                write!(f, "invalid direction code {code} (expected 1 or 2)")
            }
            InvalidDirection::Name(name) => {
                write!(f, "invalid direction '{name}' (expected left or right)")
            }
        }
    }
}

impl std::error::Error for InvalidDirection {}

impl Direction {
    pub fn variants() -> [Direction; 2] {
        [Direction::Left, Direction::Right]
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Direction> for u8 {
    fn from(value: Direction) -> Self {
        value.value()
    }
}

impl TryFrom<u8> for Direction {
    type Error = InvalidDirection;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Direction::Left),
            2 => Ok(Direction::Right),
            other => Err(InvalidDirection::Code(other)),
        }
    }
}

impl FromStr for Direction {
    type Err = InvalidDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(InvalidDirection::Name(s.to_string())),
        }
    }
}
