use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::error::ValidationError;
use crate::medication::Medication;

const DOSE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// One scheduled administration of a medication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoseInstance {
    /// "{medication_id}@{YYYY-MM-DDTHH:MM}"
    pub id: String,
    pub medication_id: String,
    pub scheduled: NaiveDateTime,
}

impl DoseInstance {
    pub fn new(medication_id: &str, scheduled: NaiveDateTime) -> Self {
        DoseInstance {
            id: format!("{}@{}", medication_id, scheduled.format(DOSE_TIME_FORMAT)),
            medication_id: medication_id.to_string(),
            scheduled,
        }
    }
}

/// Split a dose id back into medication id and scheduled time.
pub fn parse_dose_id(dose_id: &str) -> Option<(&str, NaiveDateTime)> {
    let (medication_id, when) = dose_id.rsplit_once('@')?;
    if medication_id.is_empty() {
        return None;
    }
    let scheduled = NaiveDateTime::parse_from_str(when, DOSE_TIME_FORMAT).ok()?;
    Some((medication_id, scheduled))
}

/// Doses of `medication` falling on `date`.
///
/// Reminders repeat every `interval_hours` from `first_reminder` on the start
/// date, for as long as the course lasts (the whole of the end date included).
pub fn doses_on(
    medication: &Medication,
    date: NaiveDate,
) -> Result<Vec<DoseInstance>, ValidationError> {
    if !medication.is_active_on(date) {
        return Ok(Vec::new());
    }

    let step = i64::from(medication.interval_hours()?) * 60;
    let anchor = medication.start_date.and_time(medication.first_reminder);
    let day_start = date.and_time(NaiveTime::default());
    // None on the last representable day
    let day_end = date.succ_opt().map(|next| next.and_time(NaiveTime::default()));

    // first repetition at or after midnight
    let mut k = if anchor >= day_start {
        0
    } else {
        let elapsed = (day_start - anchor).num_minutes();
        elapsed.div_euclid(step) + i64::from(elapsed.rem_euclid(step) != 0)
    };

    let mut doses = Vec::new();
    // repetitions past chrono's range end the expansion
    while let Some(scheduled) = repetition(anchor, step, k) {
        if day_end.is_some_and(|end| scheduled >= end) {
            break;
        }
        doses.push(DoseInstance::new(&medication.id, scheduled));
        k += 1;
    }
    Ok(doses)
}

fn repetition(anchor: NaiveDateTime, step_minutes: i64, k: i64) -> Option<NaiveDateTime> {
    let offset = Duration::try_minutes(k.checked_mul(step_minutes)?)?;
    anchor.checked_add_signed(offset)
}

/// Doses of all `medications` over `days` days from `from`, in time order.
pub fn doses_between(
    medications: &[Medication],
    from: NaiveDate,
    days: u32,
) -> Result<Vec<DoseInstance>, ValidationError> {
    let mut doses = Vec::new();
    for offset in 0..days {
        let date = from
            .checked_add_days(Days::new(u64::from(offset)))
            .ok_or(ValidationError::DateOutOfRange { from, days })?;
        for medication in medications {
            doses.extend(doses_on(medication, date)?);
        }
    }
    doses.sort_by(|a, b| {
        a.scheduled
            .cmp(&b.scheduled)
            .then_with(|| a.medication_id.cmp(&b.medication_id))
    });
    Ok(doses)
}

/// Look up a dose id against the medications it claims to belong to.
///
/// Returns `None` when the medication does not exist or has no dose at that
/// time.
pub fn find_dose(
    medications: &[Medication],
    dose_id: &str,
) -> Result<Option<DoseInstance>, ValidationError> {
    let Some((medication_id, scheduled)) = parse_dose_id(dose_id) else {
        return Ok(None);
    };
    let Some(medication) = medications.iter().find(|m| m.id == medication_id) else {
        return Ok(None);
    };

    Ok(doses_on(medication, scheduled.date())?
        .into_iter()
        .find(|dose| dose.scheduled == scheduled))
}
