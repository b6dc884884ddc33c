use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    #[default]
    Hours,
    Days,
}

impl IntervalUnit {
    /// Number of hours one unit spans.
    pub fn hours(self) -> u32 {
        match self {
            IntervalUnit::Hours => 1,
            IntervalUnit::Days => 24,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IntervalUnit::Hours => "hours",
            IntervalUnit::Days => "days",
        }
    }
}

/// How often a medication repeats.
///
/// The presets are the choices offered by the add-medication form; anything
/// else is a `Custom` interval of a whole number of hours or days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frequency {
    OnceADay,
    TwiceADay,
    ThriceADay,
    #[serde(rename = "every_6_hours")]
    Every6Hours,
    #[serde(rename = "every_8_hours")]
    Every8Hours,
    Custom { every: u32, unit: IntervalUnit },
}

impl Frequency {
    pub const PRESETS: [Frequency; 5] = [
        Frequency::OnceADay,
        Frequency::TwiceADay,
        Frequency::ThriceADay,
        Frequency::Every6Hours,
        Frequency::Every8Hours,
    ];

    /// Builds a frequency the way the add-medication form does: a selected
    /// choice, plus the custom value and unit when the choice is "Custom".
    ///
    /// The custom fields are ignored for any other choice.
    pub fn from_selection(
        choice: &str,
        custom_value: Option<&str>,
        custom_unit: IntervalUnit,
    ) -> Result<Frequency, ValidationError> {
        if choice.trim().eq_ignore_ascii_case("custom") {
            let value = custom_value.ok_or(ValidationError::MissingField("custom interval"))?;
            let frequency = Frequency::Custom {
                every: parse_custom_interval(value)?,
                unit: custom_unit,
            };
            resolve(&frequency)?;
            return Ok(frequency);
        }

        choice.parse()
    }

    /// Display label. A custom 6 or 8 hour interval renders like the matching
    /// preset and parses back as that preset; both resolve to the same hours.
    pub fn label(&self) -> String {
        match self {
            Frequency::OnceADay => "Once a day".to_string(),
            Frequency::TwiceADay => "Twice a day".to_string(),
            Frequency::ThriceADay => "Thrice a day".to_string(),
            Frequency::Every6Hours => "Every 6 hours".to_string(),
            Frequency::Every8Hours => "Every 8 hours".to_string(),
            Frequency::Custom { every, unit } => format!("Every {} {}", every, unit.label()),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Parse a frequency phrase.
///
/// Supported formats:
/// - the preset labels: "Once a day", "Twice a day", "Thrice a day",
///   "Every 6 hours", "Every 8 hours" (case-insensitive)
/// - "daily", "twice daily", "three times a day" and similar aliases
/// - "every X hours" / "every X days" -> `Custom`
///
/// Anything else is rejected rather than guessed.
impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();

        match lower.as_str() {
            "" => return Err(ValidationError::MissingField("frequency")),
            "once a day" | "once daily" | "daily" | "every day" => return Ok(Frequency::OnceADay),
            "twice a day" | "twice daily" => return Ok(Frequency::TwiceADay),
            "thrice a day" | "three times a day" | "three times daily" => {
                return Ok(Frequency::ThriceADay)
            }
            "every 6 hours" => return Ok(Frequency::Every6Hours),
            "every 8 hours" => return Ok(Frequency::Every8Hours),
            "custom" => return Err(ValidationError::MissingField("custom interval")),
            _ => {}
        }

        let parts: Vec<&str> = lower.split_whitespace().collect();
        if let ["every", value, unit] = parts.as_slice() {
            let unit = if unit.starts_with("hour") {
                IntervalUnit::Hours
            } else if unit.starts_with("day") {
                IntervalUnit::Days
            } else {
                return Err(ValidationError::UnknownFrequency(s.trim().to_string()));
            };
            let frequency = Frequency::Custom {
                every: parse_custom_interval(value)?,
                unit,
            };
            resolve(&frequency)?;
            return Ok(frequency);
        }

        Err(ValidationError::UnknownFrequency(s.trim().to_string()))
    }
}

/// Parse the custom interval field. Zero, negative and non-numeric input are
/// validation failures.
pub fn parse_custom_interval(value: &str) -> Result<u32, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("custom interval"));
    }

    let parsed: i64 = trimmed.parse().map_err(|_| ValidationError::NotANumber {
        field: "custom interval",
        value: trimmed.to_string(),
    })?;

    if parsed <= 0 {
        return Err(ValidationError::NotPositive {
            field: "custom interval",
            value: parsed.to_string(),
        });
    }

    u32::try_from(parsed).map_err(|_| ValidationError::IntervalTooLarge(trimmed.to_string()))
}

/// Resolve a frequency to the number of hours between reminders.
pub fn resolve(frequency: &Frequency) -> Result<u32, ValidationError> {
    match *frequency {
        Frequency::OnceADay => Ok(24),
        Frequency::TwiceADay => Ok(12),
        Frequency::ThriceADay => Ok(8),
        Frequency::Every6Hours => Ok(6),
        Frequency::Every8Hours => Ok(8),
        Frequency::Custom { every: 0, .. } => Err(ValidationError::NotPositive {
            field: "custom interval",
            value: "0".to_string(),
        }),
        Frequency::Custom { every, unit } => every
            .checked_mul(unit.hours())
            .ok_or_else(|| ValidationError::IntervalTooLarge(format!("{} {}", every, unit.label()))),
    }
}
