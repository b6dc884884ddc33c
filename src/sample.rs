use chrono::{Duration, NaiveDate, NaiveTime};

use crate::interval::Frequency;
use crate::medication::{Dosage, DosageUnit, Medication, MedicationProvider};

/// Demo medications, dated relative to `today` so that every expiry class and
/// a running course are always present.
pub struct SampleMedications {
    today: NaiveDate,
}

impl SampleMedications {
    pub fn new(today: NaiveDate) -> Self {
        SampleMedications { today }
    }

    fn entry(
        &self,
        id: &str,
        name: &str,
        dosage: (f64, DosageUnit),
        frequency: Frequency,
        reminder: (u32, u32),
        expires_in_days: i64,
    ) -> Medication {
        Medication {
            id: id.to_string(),
            name: name.to_string(),
            dosage: Dosage {
                amount: dosage.0,
                unit: dosage.1,
            },
            frequency,
            start_date: self.today - Duration::days(7),
            end_date: self.today + Duration::days(30),
            first_reminder: NaiveTime::from_hms_opt(reminder.0, reminder.1, 0)
                .unwrap_or_default(),
            expiry_date: Some(self.today + Duration::days(expires_in_days)),
            notes: None,
        }
    }
}

impl MedicationProvider for SampleMedications {
    fn list_medications(&self) -> Vec<Medication> {
        vec![
            self.entry(
                "1",
                "Metformin",
                (500.0, DosageUnit::Mg),
                Frequency::TwiceADay,
                (8, 0),
                99,
            ),
            self.entry(
                "2",
                "Amlodipine",
                (10.0, DosageUnit::Mg),
                Frequency::OnceADay,
                (12, 0),
                45,
            ),
            self.entry(
                "3",
                "Atorvastatin",
                (20.0, DosageUnit::Mg),
                Frequency::OnceADay,
                (20, 0),
                0,
            ),
            self.entry(
                "4",
                "Lisinopril",
                (20.0, DosageUnit::Mg),
                Frequency::OnceADay,
                (7, 30),
                5,
            ),
            self.entry(
                "5",
                "Aspirin",
                (81.0, DosageUnit::Mg),
                Frequency::OnceADay,
                (9, 0),
                -30,
            ),
            self.entry(
                "6",
                "Vitamin D3",
                (1.0, DosageUnit::Capsule),
                Frequency::OnceADay,
                (9, 0),
                120,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_ids_unique_and_active() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 25).unwrap();
        let meds = SampleMedications::new(today).list_medications();

        let ids: HashSet<&str> = meds.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), meds.len());
        assert!(meds.iter().all(|m| m.is_active_on(today)));
        assert!(meds.iter().all(|m| m.interval_hours().is_ok()));
    }

    #[test]
    fn test_find_medication() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 25).unwrap();
        let provider = SampleMedications::new(today);
        assert_eq!(
            provider.find_medication("4").map(|m| m.name),
            Some("Lisinopril".to_string())
        );
        assert!(provider.find_medication("42").is_none());
    }
}
