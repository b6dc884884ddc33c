use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::medication::Medication;

/// Days before expiry at which a medication counts as expiring.
pub const EXPIRY_WARNING_DAYS: i64 = 7;

/// Safety window of a medication relative to its labelled expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "days", rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    /// Expires within the warning window; 0 means it expires today.
    ExpiringInDays(u32),
    Safe,
}

impl ExpiryStatus {
    /// Higher is more urgent.
    pub fn urgency(&self) -> u32 {
        match *self {
            ExpiryStatus::Safe => 0,
            ExpiryStatus::ExpiringInDays(days) => {
                1 + (EXPIRY_WARNING_DAYS as u32).saturating_sub(days)
            }
            ExpiryStatus::Expired => 2 + EXPIRY_WARNING_DAYS as u32,
        }
    }
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryStatus::Expired => write!(f, "Expired"),
            ExpiryStatus::ExpiringInDays(0) => write!(f, "Expires today"),
            ExpiryStatus::ExpiringInDays(1) => write!(f, "Expiring in 1 day"),
            ExpiryStatus::ExpiringInDays(days) => write!(f, "Expiring in {} days", days),
            ExpiryStatus::Safe => write!(f, "Safe"),
        }
    }
}

/// Classify an expiry date against `today`.
///
/// Whole calendar days are compared, so a medication expiring today is still
/// `ExpiringInDays(0)` and only becomes `Expired` the day after.
pub fn classify(expiry: NaiveDate, today: NaiveDate) -> ExpiryStatus {
    let days = (expiry - today).num_days();
    if days < 0 {
        ExpiryStatus::Expired
    } else if days <= EXPIRY_WARNING_DAYS {
        ExpiryStatus::ExpiringInDays(days as u32)
    } else {
        ExpiryStatus::Safe
    }
}

/// Same as [`classify`], for timestamps. Time of day is dropped first.
pub fn classify_at(expiry: NaiveDateTime, now: NaiveDateTime) -> ExpiryStatus {
    classify(expiry.date(), now.date())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExpiryFilter {
    #[default]
    All,
    #[value(alias = "expiring")]
    Soon,
    Expired,
}

impl ExpiryFilter {
    pub fn matches(&self, status: ExpiryStatus) -> bool {
        match self {
            ExpiryFilter::All => true,
            ExpiryFilter::Soon => matches!(status, ExpiryStatus::ExpiringInDays(_)),
            ExpiryFilter::Expired => status == ExpiryStatus::Expired,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExpiryEntry<'a> {
    pub medication: &'a Medication,
    pub expiry_date: NaiveDate,
    pub status: ExpiryStatus,
}

/// Classify every medication that has an expiry date, keep those matching
/// `filter`, soonest expiry first.
pub fn expiry_report<'a>(
    medications: &'a [Medication],
    today: NaiveDate,
    filter: ExpiryFilter,
) -> Vec<ExpiryEntry<'a>> {
    let mut entries: Vec<ExpiryEntry<'a>> = medications
        .iter()
        .filter_map(|medication| {
            let expiry_date = medication.expiry_date?;
            Some(ExpiryEntry {
                medication,
                expiry_date,
                status: classify(expiry_date, today),
            })
        })
        .filter(|entry| filter.matches(entry.status))
        .collect();

    entries.sort_by(|a, b| {
        a.expiry_date
            .cmp(&b.expiry_date)
            .then_with(|| a.medication.name.cmp(&b.medication.name))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medication::MedicationProvider;
    use crate::sample::SampleMedications;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 7).unwrap()
    }

    #[test]
    fn test_classify_boundaries() {
        let today = today();
        assert_eq!(classify(today, today), ExpiryStatus::ExpiringInDays(0));
        assert_eq!(
            classify(today - Duration::days(1), today),
            ExpiryStatus::Expired
        );
        assert_eq!(
            classify(today + Duration::days(7), today),
            ExpiryStatus::ExpiringInDays(7)
        );
        assert_eq!(classify(today + Duration::days(8), today), ExpiryStatus::Safe);
    }

    #[test]
    fn test_classify_ignores_time_of_day() {
        let expiry = today().and_hms_opt(0, 0, 1).unwrap();
        let late_evening = today().and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(
            classify_at(expiry, late_evening),
            ExpiryStatus::ExpiringInDays(0)
        );

        let next_morning = (today() + Duration::days(1)).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(classify_at(expiry, next_morning), ExpiryStatus::Expired);
    }

    #[test]
    fn test_classify_across_year_boundary() {
        let new_years_eve = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
        assert_eq!(classify(expiry, new_years_eve), ExpiryStatus::ExpiringInDays(3));
    }

    #[test]
    fn test_earlier_today_never_increases_urgency() {
        let expiry = today();
        let mut previous = classify(expiry, expiry + Duration::days(30)).urgency();
        for days_back in (-29..=30).rev() {
            let current = classify(expiry, expiry + Duration::days(days_back)).urgency();
            assert!(
                current <= previous,
                "urgency rose moving today back to offset {}",
                days_back
            );
            previous = current;
        }
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ExpiryStatus::Expired.to_string(), "Expired");
        assert_eq!(ExpiryStatus::ExpiringInDays(0).to_string(), "Expires today");
        assert_eq!(ExpiryStatus::ExpiringInDays(1).to_string(), "Expiring in 1 day");
        assert_eq!(ExpiryStatus::ExpiringInDays(7).to_string(), "Expiring in 7 days");
        assert_eq!(ExpiryStatus::Safe.to_string(), "Safe");
    }

    #[test]
    fn test_filter() {
        assert!(ExpiryFilter::All.matches(ExpiryStatus::Safe));
        assert!(ExpiryFilter::Soon.matches(ExpiryStatus::ExpiringInDays(0)));
        assert!(!ExpiryFilter::Soon.matches(ExpiryStatus::Expired));
        assert!(ExpiryFilter::Expired.matches(ExpiryStatus::Expired));
        assert!(!ExpiryFilter::Expired.matches(ExpiryStatus::ExpiringInDays(3)));
    }

    #[test]
    fn test_expiry_report_sorted_and_filtered() {
        let meds = SampleMedications::new(today()).list_medications();

        let all = expiry_report(&meds, today(), ExpiryFilter::All);
        assert!(!all.is_empty());
        for pair in all.windows(2) {
            assert!(pair[0].expiry_date <= pair[1].expiry_date);
        }

        let expired = expiry_report(&meds, today(), ExpiryFilter::Expired);
        assert!(!expired.is_empty());
        assert!(expired.iter().all(|e| e.status == ExpiryStatus::Expired));

        let soon = expiry_report(&meds, today(), ExpiryFilter::Soon);
        assert!(!soon.is_empty());
        assert!(soon
            .iter()
            .all(|e| matches!(e.status, ExpiryStatus::ExpiringInDays(_))));
    }
}
