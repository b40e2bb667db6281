use chrono::{Datelike, NaiveDate};

use crate::calendar::MONTH_NAMES;

/// Six full weeks, regardless of month length.
pub const GRID_CELLS: usize = 42;
pub const DAYS_PER_WEEK: usize = 7;

/// Month currently displayed by a calendar, independent of any selection.
///
/// `month` is zero-based (0 = January). Construction normalizes overflow with
/// carry, so `ViewCursor::new(2025, -1)` is December 2024 and
/// `ViewCursor::new(2025, 13)` is February 2026. Months past either end of the
/// range chrono can represent saturate at January of the first year or
/// December of the last.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct ViewCursor {
    year: i32,
    month: u32,
}

impl ViewCursor {
    pub fn new(year: i32, month: i64) -> Self {
        let first = i64::from(min_year()) * 12;
        let last = i64::from(max_year()) * 12 + 11;
        let total = (i64::from(year) * 12)
            .saturating_add(month)
            .clamp(first, last);
        Self {
            year: total.div_euclid(12) as i32,
            month: total.rem_euclid(12) as u32,
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn shifted(self, delta_months: i64) -> Self {
        Self::new(self.year, i64::from(self.month) + delta_months)
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn date_of(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, day)
    }

    /// Header text, e.g. "March 2025".
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month as usize], self.year)
    }

    /// Weekday of the first of the month, 0 = Sunday.
    pub fn first_weekday(&self) -> u32 {
        self.date_of(1)
            .map(|date| date.weekday().num_days_from_sunday())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CellOrigin {
    Previous,
    Current,
    Next,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GridCell {
    pub day: u32,
    pub origin: CellOrigin,
}

impl GridCell {
    pub fn is_current(&self) -> bool {
        self.origin == CellOrigin::Current
    }

    /// Full date of the cell relative to the cursor that produced it.
    pub fn date(&self, cursor: ViewCursor) -> Option<NaiveDate> {
        let owner = match self.origin {
            CellOrigin::Previous => cursor.shifted(-1),
            CellOrigin::Current => cursor,
            CellOrigin::Next => cursor.shifted(1),
        };
        if self.origin != CellOrigin::Current && owner == cursor {
            return None;
        }
        owner.date_of(self.day)
    }

    /// Month step taken when an adjacent-month cell is activated.
    ///
    /// Decided on the day number alone: above 15 goes back a month, anything
    /// else goes forward. Current-month cells do not navigate.
    pub fn adjacent_step(&self) -> Option<i64> {
        match self.origin {
            CellOrigin::Current => None,
            CellOrigin::Previous | CellOrigin::Next => Some(if self.day > 15 { -1 } else { 1 }),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CalendarGrid {
    cursor: ViewCursor,
    cells: Vec<GridCell>,
}

impl CalendarGrid {
    pub fn cursor(&self) -> ViewCursor {
        self.cursor
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(DAYS_PER_WEEK)
    }
}

/// Builds the 42-cell month view for `year` and zero-based `month`.
pub fn compute_grid(year: i32, month: u32) -> CalendarGrid {
    grid_for(ViewCursor::new(year, i64::from(month)))
}

pub fn grid_for(cursor: ViewCursor) -> CalendarGrid {
    let mut cells = Vec::with_capacity(GRID_CELLS);

    let leading = cursor.first_weekday();
    let previous_len = cursor.shifted(-1).days_in_month();
    for offset in (0..leading).rev() {
        cells.push(GridCell {
            day: previous_len - offset,
            origin: CellOrigin::Previous,
        });
    }

    for day in 1..=cursor.days_in_month() {
        cells.push(GridCell {
            day,
            origin: CellOrigin::Current,
        });
    }

    let mut next_day = 1;
    while cells.len() < GRID_CELLS {
        cells.push(GridCell {
            day: next_day,
            origin: CellOrigin::Next,
        });
        next_day += 1;
    }

    CalendarGrid { cursor, cells }
}

/// Length of a month found by asking the calendar which day numbers exist.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|day| NaiveDate::from_ymd_opt(year, month + 1, *day).is_some())
        .unwrap_or(28)
}

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

fn min_year() -> i32 {
    NaiveDate::MIN.year()
}

fn max_year() -> i32 {
    NaiveDate::MAX.year()
}
