use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two seating classes of the bus, each with its own fixed seat range
/// and its own unit price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeatCategory {
    #[serde(rename = "leito")]
    Leito,
    #[serde(rename = "semi-leito")]
    SemiLeito,
}

impl SeatCategory {
    /// Seats are numbered 1..=seat_count on the fixed layout diagram.
    pub const fn seat_count(&self) -> i32 {
        match self {
            SeatCategory::Leito => 12,
            SeatCategory::SemiLeito => 44,
        }
    }

    /// Whether a seat number exists on this category's diagram.
    pub fn contains(&self, seat_number: i32) -> bool {
        seat_number >= 1 && seat_number <= self.seat_count()
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SeatCategory::Leito => "leito",
            SeatCategory::SemiLeito => "semi-leito",
        }
    }
}

impl fmt::Display for SeatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeatCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leito" => Ok(SeatCategory::Leito),
            "semi-leito" => Ok(SeatCategory::SemiLeito),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown seat category: {0}")]
pub struct UnknownCategory(pub String);
