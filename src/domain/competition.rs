//! Competition level classification for market listings.

use serde::{Deserialize, Serialize};

/// Ordered competition levels, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompetitionLevel {
    Excellent,
    Good,
    Normal,
    Bad,
    VeryBad,
}

impl CompetitionLevel {
    pub const ALL: [CompetitionLevel; 5] = [
        CompetitionLevel::Excellent,
        CompetitionLevel::Good,
        CompetitionLevel::Normal,
        CompetitionLevel::Bad,
        CompetitionLevel::VeryBad,
    ];

    /// Classifies a competition score.
    ///
    /// Thresholds are inclusive upper bounds, so a score sitting exactly on a
    /// boundary belongs to the better level. Scores above 4.5, and NaN, are
    /// `VeryBad`.
    pub fn from_score(score: f64) -> Self {
        if score <= 1.5 {
            CompetitionLevel::Excellent
        } else if score <= 2.5 {
            CompetitionLevel::Good
        } else if score <= 3.5 {
            CompetitionLevel::Normal
        } else if score <= 4.5 {
            CompetitionLevel::Bad
        } else {
            CompetitionLevel::VeryBad
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompetitionLevel::Excellent => "Excellent",
            CompetitionLevel::Good => "Good",
            CompetitionLevel::Normal => "Normal",
            CompetitionLevel::Bad => "Bad",
            CompetitionLevel::VeryBad => "Very bad",
        }
    }

    /// Display style identifier used by the dashboard badges.
    pub fn style(&self) -> &'static str {
        match self {
            CompetitionLevel::Excellent => "blue",
            CompetitionLevel::Good => "green",
            CompetitionLevel::Normal => "gray",
            CompetitionLevel::Bad => "orange",
            CompetitionLevel::VeryBad => "red",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionLevel::Excellent => "EXCELLENT",
            CompetitionLevel::Good => "GOOD",
            CompetitionLevel::Normal => "NORMAL",
            CompetitionLevel::Bad => "BAD",
            CompetitionLevel::VeryBad => "VERY_BAD",
        }
    }
}

impl std::fmt::Display for CompetitionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
