use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::interval::{resolve, Frequency, IntervalUnit};
use crate::time::parse_time;

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DosageUnit {
    #[default]
    Mg,
    Ml,
    G,
    Tablet,
    Capsule,
}

impl DosageUnit {
    pub fn label(self) -> &'static str {
        match self {
            DosageUnit::Mg => "mg",
            DosageUnit::Ml => "ml",
            DosageUnit::G => "g",
            DosageUnit::Tablet => "tablet",
            DosageUnit::Capsule => "capsule",
        }
    }

    fn is_countable(self) -> bool {
        matches!(self, DosageUnit::Tablet | DosageUnit::Capsule)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Dosage {
    pub amount: f64,
    pub unit: DosageUnit,
}

impl fmt::Display for Dosage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.unit.is_countable() && self.amount != 1.0 {
            "s"
        } else {
            ""
        };
        write!(f, "{} {}{}", self.amount, self.unit.label(), plural)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Medication {
    pub id: String,
    pub name: String,
    pub dosage: Dosage,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Time of day of the first reminder on `start_date`.
    pub first_reminder: NaiveTime,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Medication {
    /// Hours between reminders.
    pub fn interval_hours(&self) -> Result<u32, ValidationError> {
        resolve(&self.frequency)
    }

    /// True if `date` falls inside the course of treatment.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Raw input of the add-medication form.
///
/// Nothing is checked until [`MedicationForm::submit`], which either returns a
/// complete [`Medication`] or the first field that is wrong.
#[derive(Debug, Clone, Default)]
pub struct MedicationForm {
    pub name: String,
    pub dosage_amount: String,
    pub dosage_unit: DosageUnit,
    /// Selected frequency: a preset label, "Custom", or "every N hours|days".
    pub frequency: String,
    /// Only read when `frequency` is "Custom".
    pub custom_interval: Option<String>,
    pub custom_interval_unit: IntervalUnit,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reminder_time: String,
    pub expiry_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl MedicationForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.submit(String::new()).map(|_| ())
    }

    /// Whether the submit button would be enabled.
    pub fn is_submittable(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn submit(&self, id: String) -> Result<Medication, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("medication name"));
        }

        let amount = parse_dosage_amount(&self.dosage_amount)?;

        let frequency = Frequency::from_selection(
            &self.frequency,
            self.custom_interval.as_deref(),
            self.custom_interval_unit,
        )?;

        let start_date = self
            .start_date
            .ok_or(ValidationError::MissingField("start date"))?;
        let end_date = self
            .end_date
            .ok_or(ValidationError::MissingField("end date"))?;
        if end_date < start_date {
            return Err(ValidationError::EndBeforeStart {
                start: start_date,
                end: end_date,
            });
        }

        if self.reminder_time.trim().is_empty() {
            return Err(ValidationError::MissingField("reminder time"));
        }
        let first_reminder = parse_time(&self.reminder_time)
            .ok_or_else(|| ValidationError::InvalidTime(self.reminder_time.trim().to_string()))?;

        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(str::to_string);

        Ok(Medication {
            id,
            name: name.to_string(),
            dosage: Dosage {
                amount,
                unit: self.dosage_unit,
            },
            frequency,
            start_date,
            end_date,
            first_reminder,
            expiry_date: self.expiry_date,
            notes,
        })
    }
}

fn parse_dosage_amount(value: &str) -> Result<f64, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("dosage"));
    }

    let amount: f64 = trimmed.parse().map_err(|_| ValidationError::NotANumber {
        field: "dosage",
        value: trimmed.to_string(),
    })?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::NotPositive {
            field: "dosage",
            value: trimmed.to_string(),
        });
    }

    Ok(amount)
}

/// Single source of medications for every view.
pub trait MedicationProvider {
    fn list_medications(&self) -> Vec<Medication>;

    fn find_medication(&self, id: &str) -> Option<Medication> {
        self.list_medications().into_iter().find(|m| m.id == id)
    }
}
