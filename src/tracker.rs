use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DoseStatus {
    #[default]
    TakeNow,
    Taken,
    Missed,
}

impl DoseStatus {
    /// Next status in the tap cycle: Take Now -> Taken -> Missed -> Take Now.
    pub fn next(self) -> DoseStatus {
        match self {
            DoseStatus::TakeNow => DoseStatus::Taken,
            DoseStatus::Taken => DoseStatus::Missed,
            DoseStatus::Missed => DoseStatus::TakeNow,
        }
    }
}

impl fmt::Display for DoseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoseStatus::TakeNow => write!(f, "Take Now"),
            DoseStatus::Taken => write!(f, "Taken"),
            DoseStatus::Missed => write!(f, "Missed"),
        }
    }
}

/// Acknowledgement state of each dose, keyed by dose id.
///
/// Statuses only change through [`DoseStatusTracker::advance`]; nothing here
/// looks at the clock, so an overdue dose stays "Take Now" until someone
/// marks it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct DoseStatusTracker {
    statuses: BTreeMap<String, DoseStatus>,
}

impl DoseStatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of `dose_id`; doses never touched are `TakeNow`.
    pub fn status(&self, dose_id: &str) -> DoseStatus {
        self.statuses.get(dose_id).copied().unwrap_or_default()
    }

    /// Move `dose_id` one step along the cycle and return its new status.
    pub fn advance(&mut self, dose_id: &str) -> DoseStatus {
        let next = self.status(dose_id).next();
        if next == DoseStatus::TakeNow {
            // absent and TakeNow are the same state
            self.statuses.remove(dose_id);
        } else {
            self.statuses.insert(dose_id.to_string(), next);
        }
        next
    }

    /// Number of doses with a recorded (non-default) status.
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

/// Calendar marker for one day's doses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySummary {
    /// Nothing scheduled.
    NoDoses,
    /// Scheduled, nothing marked yet.
    Pending,
    AllTaken,
    /// Some taken, some missed or unmarked.
    SomeSkipped,
    /// Nothing taken, at least one marked missed.
    Missed,
}

impl DaySummary {
    pub fn marker(self) -> char {
        match self {
            DaySummary::NoDoses | DaySummary::Pending => ' ',
            DaySummary::AllTaken => '+',
            DaySummary::SomeSkipped => '~',
            DaySummary::Missed => '!',
        }
    }
}

pub fn summarize_day(statuses: &[DoseStatus]) -> DaySummary {
    if statuses.is_empty() {
        return DaySummary::NoDoses;
    }

    let taken = statuses.iter().filter(|s| **s == DoseStatus::Taken).count();
    let missed = statuses.iter().filter(|s| **s == DoseStatus::Missed).count();

    if taken == statuses.len() {
        DaySummary::AllTaken
    } else if taken > 0 {
        DaySummary::SomeSkipped
    } else if missed > 0 {
        DaySummary::Missed
    } else {
        DaySummary::Pending
    }
}
