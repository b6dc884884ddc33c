use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use crate::calendar::MonthCursor;
use crate::expiry::{expiry_report, ExpiryFilter, ExpiryStatus};
use crate::medication::{Medication, MedicationForm, MedicationProvider};
use crate::schedule::{doses_between, doses_on, find_dose, DoseInstance};
use crate::store::{MedicationStore, UserRole};
use crate::time::display_time;
use crate::tracker::{summarize_day, DoseStatus, DoseStatusTracker};

pub fn show_role(store: &MedicationStore) {
    match store.role() {
        Some(UserRole::Personal) => println!("Role: self (managing your own medications)"),
        Some(UserRole::Caregiver) => {
            println!("Role: caregiver (managing medications for someone else)")
        }
        None => {
            println!("No role selected yet.");
            println!("  Choose one with: mediminder role self|caregiver");
        }
    }
    println!("  Data file: {}", store.path().display());
}

pub fn set_role(store: &mut MedicationStore, role: UserRole) -> Result<()> {
    store.set_role(role);
    store.save().context("failed to save role")?;
    println!("Role set to {}", role);
    Ok(())
}

pub fn add_medication(store: &mut MedicationStore, form: &MedicationForm) -> Result<()> {
    let medication = store.add_medication(form)?.clone();
    store.save().context("failed to save medication")?;

    let hours = medication.interval_hours()?;
    println!("Added medication: {} (id {})", medication.name, medication.id);
    println!("  Dose:      {}", medication.dosage);
    println!("  Frequency: {} (every {} hours)", medication.frequency, hours);
    println!(
        "  Course:    {} to {}, first reminder {}",
        medication.start_date,
        medication.end_date,
        display_time(medication.first_reminder)
    );
    Ok(())
}

pub fn list_medications(medications: &[Medication], today: NaiveDate) {
    if medications.is_empty() {
        println!("No medications found.");
        println!("  Add one with: mediminder add <NAME> --dose <N> --freq <FREQ> --time <TIME>");
        return;
    }

    println!("\nMedications:");
    println!("{}", "=".repeat(60));

    for med in medications {
        let state = if med.is_active_on(today) {
            "active"
        } else if today < med.start_date {
            "not started"
        } else {
            "finished"
        };

        println!("\n{} [{}] ({})", med.name, med.id, state);
        println!("  Dose:      {}", med.dosage);
        println!("  Frequency: {}", med.frequency);
        println!("  Reminder:  {}", display_time(med.first_reminder));
        println!("  Course:    {} to {}", med.start_date, med.end_date);
        if let Some(expiry) = med.expiry_date {
            println!("  Expires:   {}", expiry);
        }
        if let Some(notes) = &med.notes {
            println!("  Notes:     {}", notes);
        }
    }
    println!();
}

fn print_dose(dose: &DoseInstance, medications: &[Medication], tracker: &DoseStatusTracker) {
    let Some(med) = medications.iter().find(|m| m.id == dose.medication_id) else {
        return;
    };
    println!(
        "  {:>8}  {:<16} {:<12} [{}]  {}",
        display_time(dose.scheduled.time()),
        med.name,
        med.dosage.to_string(),
        tracker.status(&dose.id),
        dose.id
    );
}

pub fn show_day(
    medications: &[Medication],
    tracker: &DoseStatusTracker,
    date: NaiveDate,
) -> Result<()> {
    let doses = doses_between(medications, date, 1)?;
    if doses.is_empty() {
        println!("No doses scheduled for {}.", date.format("%B %-d, %Y"));
        return Ok(());
    }

    println!("\nMedications for {}:", date.format("%A, %B %-d, %Y"));
    println!("{}", "=".repeat(60));
    for dose in &doses {
        print_dose(dose, medications, tracker);
    }
    println!();
    Ok(())
}

pub fn show_schedule(
    medications: &[Medication],
    tracker: &DoseStatusTracker,
    from: NaiveDate,
    days: u32,
) -> Result<()> {
    let doses = doses_between(medications, from, days)?;
    if doses.is_empty() {
        println!("No upcoming doses in the next {} day(s).", days);
        return Ok(());
    }

    println!("\nUpcoming Schedule:");
    println!("{}", "=".repeat(60));

    let mut current_day = None;
    for dose in &doses {
        let day = dose.scheduled.date();
        if current_day != Some(day) {
            println!("\n{}", day.format("%B %-d, %Y"));
            current_day = Some(day);
        }
        print_dose(dose, medications, tracker);
    }
    println!();
    Ok(())
}

/// Advances one of the store's own doses and saves the new status.
pub fn take_dose(store: &mut MedicationStore, dose_id: &str) -> Result<()> {
    let medications = store.list_medications();
    let Some(dose) = find_dose(&medications, dose_id)? else {
        bail!(
            "dose '{}' not found; dose ids are listed by `mediminder today`",
            dose_id
        );
    };

    let status = store.tracker_mut().advance(&dose.id);
    store.save().context("failed to save dose status")?;

    let name = medications
        .iter()
        .find(|m| m.id == dose.medication_id)
        .map(|m| m.name.as_str())
        .unwrap_or("medication");
    println!(
        "{} at {}: {}",
        name,
        dose.scheduled.format("%Y-%m-%d %H:%M"),
        status
    );
    if status == DoseStatus::TakeNow {
        println!("  (run take again to mark it taken)");
    }
    Ok(())
}

pub fn show_calendar(
    medications: &[Medication],
    tracker: &DoseStatusTracker,
    cursor: MonthCursor,
) -> Result<()> {
    let grid = cursor.grid();

    // the render closure cannot fail, so bad intervals are rejected here
    for medication in medications {
        medication.interval_hours()?;
    }

    let rendered = grid.render_with(|cell| {
        let statuses: Vec<DoseStatus> = medications
            .iter()
            .filter_map(|m| doses_on(m, cell.date).ok())
            .flatten()
            .map(|dose| tracker.status(&dose.id))
            .collect();
        summarize_day(&statuses).marker()
    });

    println!();
    print!("{}", rendered);
    println!("\n  + all taken   ~ some skipped   ! missed");
    Ok(())
}

pub fn show_expiry(medications: &[Medication], today: NaiveDate, filter: ExpiryFilter) {
    let entries = expiry_report(medications, today, filter);
    if entries.is_empty() {
        match filter {
            ExpiryFilter::All => println!("No medications with an expiry date."),
            ExpiryFilter::Soon => println!("No medications expiring soon."),
            ExpiryFilter::Expired => println!("No expired medications."),
        }
        return;
    }

    println!("\nMedication Expiry Monitor:");
    println!("{}", "=".repeat(60));
    for entry in entries {
        let label = if entry.status == ExpiryStatus::Expired {
            "Expired:"
        } else {
            "Expires:"
        };
        println!(
            "\n{} ({})\n  {} {}\n  Status: {}",
            entry.medication.name,
            entry.medication.dosage,
            label,
            entry.expiry_date.format("%b %-d, %Y"),
            entry.status
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleMedications;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 25).unwrap()
    }

    fn store_with_one_medication(dir: &tempfile::TempDir) -> MedicationStore {
        let mut store = MedicationStore::open(dir.path().join("data.json")).unwrap();
        let form = MedicationForm {
            name: "Own".to_string(),
            dosage_amount: "5".to_string(),
            frequency: "Once a day".to_string(),
            start_date: Some(day()),
            end_date: Some(day()),
            reminder_time: "21:00".to_string(),
            ..Default::default()
        };
        store.add_medication(&form).unwrap();
        store
    }

    #[test]
    fn test_take_dose_saves_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_with_one_medication(&dir);

        take_dose(&mut store, "1@2025-08-25T21:00").unwrap();

        let reopened = MedicationStore::open(store.path()).unwrap();
        assert_eq!(
            reopened.tracker().status("1@2025-08-25T21:00"),
            DoseStatus::Taken
        );
    }

    #[test]
    fn test_take_dose_ignores_sample_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_with_one_medication(&dir);

        // a dose that only the sample medication "1" has
        let sample = SampleMedications::new(day()).list_medications();
        let sample_dose = doses_on(&sample[0], day())
            .unwrap()
            .into_iter()
            .find(|dose| dose.scheduled.time() != store.list_medications()[0].first_reminder)
            .unwrap();
        assert_eq!(sample_dose.medication_id, "1");

        assert!(take_dose(&mut store, &sample_dose.id).is_err());
        assert!(store.tracker().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_take_dose_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_with_one_medication(&dir);
        assert!(take_dose(&mut store, "7@2025-08-25T21:00").is_err());
        assert!(take_dose(&mut store, "not-a-dose").is_err());
        assert!(store.tracker().is_empty());
    }
}
