use std::fmt;

use serde::{Serialize, Serializer};

/// Placement outcome reached by a student in one company's pipeline.
///
/// Variants are declared least progressed first; `Ord` follows that order and
/// charts use it for both legend sequence and colour assignment. `Unknown`
/// sorts last and is never part of [`PlacementStatus::ORDERED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlacementStatus {
    NotEligible,
    FailedFirstRound,
    FailedGroupDiscussion,
    FailedTechnical,
    FailedHr,
    Shortlisted,
    Placed,
    Unknown,
}

impl PlacementStatus {
    /// The catalog in display order, excluding the `Unknown` sentinel.
    pub const ORDERED: [PlacementStatus; 7] = [
        PlacementStatus::NotEligible,
        PlacementStatus::FailedFirstRound,
        PlacementStatus::FailedGroupDiscussion,
        PlacementStatus::FailedTechnical,
        PlacementStatus::FailedHr,
        PlacementStatus::Shortlisted,
        PlacementStatus::Placed,
    ];

    /// Maps a raw outcome code; anything unrecognised (or absent) is `Unknown`.
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => PlacementStatus::NotEligible,
            Some(1) => PlacementStatus::FailedFirstRound,
            Some(2) => PlacementStatus::FailedGroupDiscussion,
            Some(3) => PlacementStatus::FailedTechnical,
            Some(4) => PlacementStatus::FailedHr,
            Some(9) => PlacementStatus::Shortlisted,
            Some(10) => PlacementStatus::Placed,
            _ => PlacementStatus::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlacementStatus::NotEligible => "Not Eligible",
            PlacementStatus::FailedFirstRound => "Unable to Clear 1st Round",
            PlacementStatus::FailedGroupDiscussion => "Unable to Clear GD",
            PlacementStatus::FailedTechnical => "Unable to Clear Technicals",
            PlacementStatus::FailedHr => "Unable to Clear HR",
            PlacementStatus::Shortlisted => "Shortlisted",
            PlacementStatus::Placed => "Placed",
            PlacementStatus::Unknown => "Unknown",
        }
    }

    /// Position in the display order; `Unknown` has none.
    pub fn ordinal(self) -> Option<usize> {
        Self::ORDERED.iter().position(|status| *status == self)
    }

    pub fn is_known(self) -> bool {
        self != PlacementStatus::Unknown
    }

    /// Placed or shortlisted, the two outcomes counted as progressed.
    pub fn is_progressed(self) -> bool {
        matches!(self, PlacementStatus::Placed | PlacementStatus::Shortlisted)
    }
}

impl fmt::Display for PlacementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for PlacementStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
