use std::fmt;

use chrono::{Datelike, Duration, Month, NaiveDate};
use serde::Serialize;

/// Every grid is six full weeks.
pub const GRID_CELLS: usize = 42;

const WEEKDAY_HEADER: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthRelation {
    Previous,
    Current,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub relation: MonthRelation,
}

impl CalendarCell {
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn is_current_month(&self) -> bool {
        self.relation == MonthRelation::Current
    }

    /// Display key, e.g. "2025-7-1". Not zero-padded, so it neither sorts nor
    /// compares reliably; use [`CalendarCell::iso_key`] for lookups.
    pub fn date_key(&self) -> String {
        format!(
            "{}-{}-{}",
            self.date.year(),
            self.date.month(),
            self.date.day()
        )
    }

    /// Canonical "YYYY-MM-DD" key.
    pub fn iso_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// A month laid out as six Sunday-first weeks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<CalendarCell>,
}

impl MonthGrid {
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }

    pub fn current_month_cells(&self) -> impl Iterator<Item = &CalendarCell> {
        self.cells.iter().filter(|cell| cell.is_current_month())
    }

    pub fn count(&self, relation: MonthRelation) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.relation == relation)
            .count()
    }

    pub fn title(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }

    /// Render the grid, putting `mark(cell)` after each current-month day.
    /// Days of the neighbouring months are dimmed with a leading dot.
    pub fn render_with<F>(&self, mut mark: F) -> String
    where
        F: FnMut(&CalendarCell) -> char,
    {
        let mut out = String::new();
        out.push_str(&format!("{:^28}\n", self.title()));
        for name in WEEKDAY_HEADER {
            out.push_str(&format!(" {} ", name));
        }
        out.push('\n');

        for week in self.weeks() {
            for cell in week {
                if cell.is_current_month() {
                    out.push_str(&format!(" {:>2}{}", cell.day(), mark(cell)));
                } else {
                    out.push_str(&format!(".{:>2} ", cell.day()));
                }
            }
            // trailing padding is noise in a terminal
            let trimmed = out.trim_end_matches(' ').len();
            out.truncate(trimmed);
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for MonthGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with(|_| ' '))
    }
}

/// Position in the month navigation. Months are 1-12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl MonthCursor {
    /// Panics if `month` is outside 1-12.
    pub fn new(year: i32, month: u32) -> Self {
        assert!(
            (1..=12).contains(&month),
            "month must be in 1..=12, got {}",
            month
        );
        MonthCursor { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        MonthCursor {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        self.offset(1)
    }

    pub fn prev(self) -> Self {
        self.offset(-1)
    }

    /// Move by `months`, wrapping the year in either direction.
    pub fn offset(self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        MonthCursor {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn grid(self) -> MonthGrid {
        build_month_grid(self.year, self.month)
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(date) => date,
        None => panic!("invalid calendar month {}-{}", year, month),
    }
}

/// Number of days in `month` (1-12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let start = first_of_month(year, month);
    let next = MonthCursor::new(year, month).next();
    (first_of_month(next.year, next.month) - start).num_days() as u32
}

/// Weekday of the 1st, counted from Sunday = 0.
pub fn first_weekday(year: i32, month: u32) -> u32 {
    first_of_month(year, month).weekday().num_days_from_sunday()
}

/// Build the 42-cell grid for `month` (1-12) of `year`.
///
/// The grid opens with the tail of the previous month so that the 1st lands
/// under its weekday, then every day of the month, then as many days of the
/// next month as it takes to fill six weeks. Neighbouring months carry their
/// own year, so December of the prior year leads a January grid.
///
/// # Panics
/// On a month outside 1-12 or a year chrono cannot represent. Both are
/// caller bugs.
pub fn build_month_grid(year: i32, month: u32) -> MonthGrid {
    let cursor = MonthCursor::new(year, month);
    let first = first_of_month(cursor.year, cursor.month);
    let leading = i64::from(first.weekday().num_days_from_sunday());
    let grid_start = first - Duration::days(leading);

    let cells = (0..GRID_CELLS as i64)
        .map(|offset| {
            let date = grid_start + Duration::days(offset);
            let relation = match MonthCursor::from_date(date).cmp(&cursor) {
                std::cmp::Ordering::Less => MonthRelation::Previous,
                std::cmp::Ordering::Equal => MonthRelation::Current,
                std::cmp::Ordering::Greater => MonthRelation::Next,
            };
            CalendarCell { date, relation }
        })
        .collect();

    MonthGrid { year, month, cells }
}

pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2025, 1), 31);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn test_first_weekday() {
        // 1 Feb 2025 was a Saturday, 1 Jun 2025 a Sunday
        assert_eq!(first_weekday(2025, 2), 6);
        assert_eq!(first_weekday(2025, 6), 0);
        assert_eq!(first_weekday(2025, 7), 2);
    }

    #[test]
    fn test_february_2025() {
        let grid = build_month_grid(2025, 2);
        assert_eq!(grid.cells.len(), GRID_CELLS);
        assert_eq!(grid.count(MonthRelation::Previous), 6);
        assert_eq!(grid.count(MonthRelation::Current), 28);
        assert_eq!(grid.count(MonthRelation::Next), 8);

        // Sun 26 Jan .. Fri 31 Jan lead the grid
        assert_eq!(grid.cells[0].date, date(2025, 1, 26));
        assert_eq!(grid.cells[5].date, date(2025, 1, 31));
        assert_eq!(grid.cells[6].date, date(2025, 2, 1));
        assert_eq!(grid.cells[41].date, date(2025, 3, 8));
    }

    #[test]
    fn test_every_month_has_42_cells() {
        for year in [1999, 2000, 2023, 2024, 2025, 2100] {
            for month in 1..=12 {
                let grid = build_month_grid(year, month);
                let days = days_in_month(year, month) as usize;

                assert_eq!(grid.cells.len(), GRID_CELLS, "{}-{}", year, month);
                assert_eq!(grid.count(MonthRelation::Current), days);
                assert_eq!(
                    grid.count(MonthRelation::Previous) + grid.count(MonthRelation::Next),
                    GRID_CELLS - days
                );
                assert_eq!(
                    grid.count(MonthRelation::Previous),
                    first_weekday(year, month) as usize
                );

                let current: Vec<u32> = grid.current_month_cells().map(|c| c.day()).collect();
                let expected: Vec<u32> = (1..=days as u32).collect();
                assert_eq!(current, expected, "{}-{}", year, month);
            }
        }
    }

    #[test]
    fn test_cells_are_consecutive_and_keys_unique() {
        let grid = build_month_grid(2025, 7);
        for pair in grid.cells.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }

        let mut keys: Vec<String> = grid.cells.iter().map(|c| c.iso_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), GRID_CELLS);
    }

    #[test]
    fn test_year_rollover_keys() {
        let january = build_month_grid(2026, 1);
        let first = january.cells[0];
        assert_eq!(first.relation, MonthRelation::Previous);
        assert_eq!(first.date_key(), "2025-12-28");

        let december = build_month_grid(2025, 12);
        let last = december.cells[GRID_CELLS - 1];
        assert_eq!(last.relation, MonthRelation::Next);
        assert_eq!(last.date_key(), "2026-1-10");
        assert_eq!(last.iso_key(), "2026-01-10");
    }

    #[test]
    fn test_month_starting_on_sunday_has_no_previous_cells() {
        // June 2025 starts on a Sunday: 0 previous, 30 current, 12 next
        let grid = build_month_grid(2025, 6);
        assert_eq!(grid.count(MonthRelation::Previous), 0);
        assert_eq!(grid.count(MonthRelation::Next), 12);
        assert_eq!(grid.cells[0].date_key(), "2025-6-1");
    }

    #[test]
    #[should_panic(expected = "month must be in 1..=12")]
    fn test_invalid_month_panics() {
        build_month_grid(2025, 13);
    }

    #[test]
    #[should_panic]
    fn test_zero_month_panics() {
        build_month_grid(2025, 0);
    }

    #[test]
    fn test_cursor_navigation_wraps_year() {
        let january = MonthCursor::new(2025, 1);
        assert_eq!(january.prev(), MonthCursor::new(2024, 12));
        assert_eq!(january.next(), MonthCursor::new(2025, 2));
        assert_eq!(MonthCursor::new(2025, 12).next(), MonthCursor::new(2026, 1));
        assert_eq!(january.offset(-13), MonthCursor::new(2023, 12));
        assert_eq!(january.offset(24), MonthCursor::new(2027, 1));
        assert_eq!(
            MonthCursor::from_date(date(2025, 7, 15)),
            MonthCursor::new(2025, 7)
        );
    }

    #[test]
    fn test_render() {
        let rendered = build_month_grid(2025, 2).to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0].trim(), "February 2025");
        assert!(lines[1].starts_with(" Su "));
        assert!(lines[2].starts_with(".26 "));
        assert!(lines[2].ends_with(" 1"));
        assert!(lines[7].ends_with(". 8"));
    }

    #[test]
    fn test_render_with_marks() {
        let grid = build_month_grid(2025, 2);
        let rendered = grid.render_with(|cell| if cell.day() == 14 { '*' } else { ' ' });
        assert!(rendered.contains("14*"));
    }
}
