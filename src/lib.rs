//! Medication schedule and status engine.
//!
//! - [`calendar`]: 42-cell month grids and month navigation
//! - [`expiry`]: expiry status of a medication relative to today
//! - [`interval`]: frequency selections resolved to hours between reminders
//! - [`tracker`]: per-dose Take Now / Taken / Missed state
//!
//! [`medication`], [`schedule`] and [`store`] hold the data model, dose
//! expansion and the local JSON store the `mediminder` binary works on.

pub mod calendar;
pub mod commands;
pub mod error;
pub mod expiry;
pub mod interval;
pub mod medication;
pub mod sample;
pub mod schedule;
pub mod store;
pub mod time;
pub mod tracker;
