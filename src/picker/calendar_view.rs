use chrono::NaiveDate;

use crate::calendar::grid::{CalendarGrid, GridCell, ViewCursor, grid_for};

/// Month/year sub-dialog. Holds the year being browsed until a month is picked.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MonthYearChooser {
    year: i32,
    month: u32,
}

impl MonthYearChooser {
    pub fn open_at(cursor: ViewCursor) -> Self {
        Self {
            year: cursor.year(),
            month: cursor.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month highlighted in the chooser (the cursor's month when it opened).
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn previous_year(&mut self) {
        self.year = self.year.saturating_sub(1);
    }

    pub fn next_year(&mut self) {
        self.year = self.year.saturating_add(1);
    }

    /// Typed year entry. Anything numeric is taken as-is (the cursor clamps it
    /// later); text that is not a number leaves the year unchanged.
    pub fn type_year(&mut self, text: &str) {
        if let Ok(year) = text.trim().parse::<i64>() {
            self.year = year.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        }
    }

    pub fn commit(self, month: u32) -> ViewCursor {
        ViewCursor::new(self.year, i64::from(month))
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CalendarState {
    Closed,
    OpenCalendar,
    OpenMonthYearChooser(MonthYearChooser),
}

/// Cursor plus open/closed state shared by the date and range pickers.
#[derive(Debug, Clone)]
pub struct CalendarView {
    cursor: ViewCursor,
    state: CalendarState,
}

impl CalendarView {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            cursor: ViewCursor::from_date(today),
            state: CalendarState::Closed,
        }
    }

    pub fn cursor(&self) -> ViewCursor {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: ViewCursor) {
        self.cursor = cursor;
    }

    pub fn state(&self) -> CalendarState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != CalendarState::Closed
    }

    pub fn chooser(&self) -> Option<&MonthYearChooser> {
        match &self.state {
            CalendarState::OpenMonthYearChooser(chooser) => Some(chooser),
            _ => None,
        }
    }

    pub fn chooser_mut(&mut self) -> Option<&mut MonthYearChooser> {
        match &mut self.state {
            CalendarState::OpenMonthYearChooser(chooser) => Some(chooser),
            _ => None,
        }
    }

    pub fn grid(&self) -> CalendarGrid {
        grid_for(self.cursor)
    }

    pub fn open(&mut self) {
        if self.state == CalendarState::Closed {
            self.state = CalendarState::OpenCalendar;
        }
    }

    pub fn close(&mut self) {
        self.state = CalendarState::Closed;
    }

    pub fn navigate(&mut self, delta_months: i64) {
        self.cursor = self.cursor.shifted(delta_months);
    }

    pub fn open_chooser(&mut self) {
        if self.state == CalendarState::OpenCalendar {
            self.state = CalendarState::OpenMonthYearChooser(MonthYearChooser::open_at(self.cursor));
        }
    }

    pub fn close_chooser(&mut self) {
        if self.chooser().is_some() {
            self.state = CalendarState::OpenCalendar;
        }
    }

    /// Commits the chooser's year with `month` and returns to the calendar.
    pub fn choose_month(&mut self, month: u32) {
        if let Some(chooser) = self.chooser() {
            self.cursor = chooser.commit(month);
            self.state = CalendarState::OpenCalendar;
        }
    }

    /// Escape backs out one level. Returns true when the whole picker closed.
    pub fn escape(&mut self) -> bool {
        match self.state {
            CalendarState::OpenMonthYearChooser(_) => {
                self.state = CalendarState::OpenCalendar;
                false
            }
            CalendarState::OpenCalendar => {
                self.state = CalendarState::Closed;
                true
            }
            CalendarState::Closed => false,
        }
    }

    /// Adjacent-month cells move the cursor instead of selecting.
    /// Returns the date to select for current-month cells.
    pub fn activate(&mut self, cell: GridCell) -> Option<NaiveDate> {
        match cell.adjacent_step() {
            Some(step) => {
                self.navigate(step);
                None
            }
            None => self.cursor.date_of(cell.day),
        }
    }
}

/// Highlight flags the renderer paints on a day cell. Only current-month
/// cells carry marks besides `muted`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct DayMarks {
    pub muted: bool,
    pub today: bool,
    pub selected: bool,
    pub in_range: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DayCell {
    pub cell: GridCell,
    pub marks: DayMarks,
}

/// Projects the current grid into marked cells using `mark` for current-month days.
pub fn project_cells(
    view: &CalendarView,
    mut mark: impl FnMut(NaiveDate) -> DayMarks,
) -> Vec<DayCell> {
    let cursor = view.cursor();
    view.grid()
        .cells()
        .iter()
        .map(|cell| {
            let marks = match cell.is_current().then(|| cursor.date_of(cell.day)).flatten() {
                Some(date) => mark(date),
                None => DayMarks {
                    muted: true,
                    ..DayMarks::default()
                },
            };
            DayCell { cell: *cell, marks }
        })
        .collect()
}
