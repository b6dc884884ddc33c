use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use mediminder::calendar::MonthCursor;
use mediminder::commands;
use mediminder::expiry::ExpiryFilter;
use mediminder::interval::IntervalUnit;
use mediminder::medication::{DosageUnit, MedicationForm, MedicationProvider};
use mediminder::sample::SampleMedications;
use mediminder::store::{default_data_file, MedicationStore, UserRole};
use mediminder::tracker::DoseStatusTracker;

#[derive(Parser)]
#[command(name = "mediminder")]
#[command(
    about = "CLI-first medication schedule, dose tracking and expiry monitor",
    long_about = "Keep track of medication courses: today's doses and their status, an upcoming schedule, a monthly adherence calendar and an expiry monitor. Everything is saved as JSON in your home directory."
)]
#[command(version)]
struct Cli {
    /// Data file (default: ~/.mediminder.json)
    #[arg(long, global = true, env = "MEDIMINDER_DATA")]
    data_file: Option<PathBuf>,
    /// Use the built-in sample medications instead of the data file
    #[arg(long, global = true)]
    sample: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or set who the medications are managed for
    Role {
        /// "self" or "caregiver"; omit to show the current role
        #[arg(value_enum)]
        role: Option<UserRole>,
    },
    /// Add a new medication
    #[command(visible_alias = "a")]
    Add {
        /// Name of the medication
        name: String,
        /// Dosage amount (e.g. "500", "2.5")
        #[arg(short, long)]
        dose: String,
        /// Dosage unit
        #[arg(short, long, value_enum, default_value_t = DosageUnit::Mg)]
        unit: DosageUnit,
        /// "Once a day", "Twice a day", "Thrice a day", "Every 6 hours",
        /// "Every 8 hours", "every N hours|days" or "Custom"
        #[arg(short, long)]
        freq: String,
        /// Custom interval, used with --freq Custom
        #[arg(long, allow_hyphen_values = true)]
        every: Option<String>,
        /// Unit of the custom interval
        #[arg(long, value_enum, default_value_t = IntervalUnit::Hours)]
        every_unit: IntervalUnit,
        /// First day of the course (default: today)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day of the course (default: the start date)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// First reminder time (e.g. "8:00", "8:00 AM", "morning")
        #[arg(short, long)]
        time: String,
        /// Expiry date printed on the package
        #[arg(long)]
        expires: Option<NaiveDate>,
        /// Optional notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List all medications
    #[command(visible_aliases = ["l", "ls"])]
    List,
    /// Doses for one day with their status
    #[command(visible_alias = "home")]
    Today {
        /// Day to show (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Upcoming doses
    #[command(visible_alias = "s")]
    Schedule {
        /// First day (default: today)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Number of days to show (1-366)
        #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=366))]
        days: u32,
    },
    /// Advance a dose: Take Now -> Taken -> Missed -> Take Now
    #[command(visible_alias = "t")]
    Take {
        /// Dose id as shown by `today` or `schedule`
        dose_id: String,
    },
    /// Month calendar with adherence marks
    #[command(visible_alias = "c")]
    Calendar {
        /// Year to show (default: current year)
        #[arg(long, requires = "month", value_parser = clap::value_parser!(i32).range(1..=9999))]
        year: Option<i32>,
        /// Month to show, 1-12 (default: current month)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Months to move from the chosen month (e.g. -1 for the previous one)
        #[arg(
            long,
            default_value_t = 0,
            allow_hyphen_values = true,
            value_parser = clap::value_parser!(i32).range(-1200..=1200)
        )]
        offset: i32,
    },
    /// Expiry monitor
    #[command(visible_alias = "x")]
    Expiry {
        #[arg(short, long, value_enum, default_value_t)]
        filter: ExpiryFilter,
        /// Compare against this day instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let data_file = cli.data_file.unwrap_or_else(default_data_file);
    let today = Local::now().date_naive();

    let mut store = MedicationStore::open(&data_file)?;
    let sample = SampleMedications::new(today);
    let medications = if cli.sample {
        sample.list_medications()
    } else {
        store.list_medications()
    };
    // sample doses are never tracked, so their statuses start fresh
    let sample_tracker = DoseStatusTracker::new();
    let tracker = if cli.sample {
        &sample_tracker
    } else {
        store.tracker()
    };

    match cli.command {
        Commands::Role { role } => match role {
            Some(role) => commands::set_role(&mut store, role)?,
            None => commands::show_role(&store),
        },
        Commands::Add {
            name,
            dose,
            unit,
            freq,
            every,
            every_unit,
            start,
            end,
            time,
            expires,
            notes,
        } => {
            let start_date = start.unwrap_or(today);
            let form = MedicationForm {
                name,
                dosage_amount: dose,
                dosage_unit: unit,
                frequency: freq,
                custom_interval: every,
                custom_interval_unit: every_unit,
                start_date: Some(start_date),
                end_date: Some(end.unwrap_or(start_date)),
                reminder_time: time,
                expiry_date: expires,
                notes,
            };
            commands::add_medication(&mut store, &form)?;
        }
        Commands::List => commands::list_medications(&medications, today),
        Commands::Today { date } => {
            commands::show_day(&medications, tracker, date.unwrap_or(today))?
        }
        Commands::Schedule { from, days } => {
            commands::show_schedule(&medications, tracker, from.unwrap_or(today), days)?
        }
        Commands::Take { dose_id } => {
            if cli.sample {
                bail!("sample doses cannot be marked; run take without --sample");
            }
            commands::take_dose(&mut store, &dose_id)?
        }
        Commands::Calendar {
            year,
            month,
            offset,
        } => {
            let base = MonthCursor::from_date(today);
            let cursor = match month {
                Some(month) => MonthCursor::new(year.unwrap_or(base.year), month),
                None => base,
            };
            commands::show_calendar(&medications, tracker, cursor.offset(offset))?;
        }
        Commands::Expiry { filter, today: on } => {
            commands::show_expiry(&medications, on.unwrap_or(today), filter)
        }
    }

    Ok(())
}
