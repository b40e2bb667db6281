use chrono::NaiveDate;
use tracing::debug;

use crate::calendar::format::{DatePattern, format_date, parse_date};
use crate::calendar::grid::{CalendarGrid, GridCell, ViewCursor};
use crate::picker::calendar_view::{CalendarState, CalendarView, DayCell, DayMarks, project_cells};
use crate::picker::{GlobalEvent, Outbox, PickerEffect};
use crate::placement::{DATE_PICKER, DropdownPlacement, Rect, Viewport, place};

pub const DEFAULT_DATE_PLACEHOLDER: &str = "Select date...";

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DatePickerOptions {
    pub format: DatePattern,
    pub placeholder: String,
}

impl Default for DatePickerOptions {
    fn default() -> Self {
        Self {
            format: DatePattern::Long,
            placeholder: DEFAULT_DATE_PLACEHOLDER.to_string(),
        }
    }
}

/// Dropdown calendar bound to one input, selecting a single date.
#[derive(Debug)]
pub struct SingleDatePicker {
    input_id: String,
    options: DatePickerOptions,
    view: CalendarView,
    selected: Option<NaiveDate>,
    anchor: Rect,
    viewport: Viewport,
    placement: Option<DropdownPlacement>,
    outbox: Outbox,
}

impl SingleDatePicker {
    pub fn new(
        input_id: impl Into<String>,
        options: DatePickerOptions,
        today: NaiveDate,
        anchor: Rect,
        viewport: Viewport,
    ) -> Self {
        Self {
            input_id: input_id.into(),
            options,
            view: CalendarView::new(today),
            selected: None,
            anchor,
            viewport,
            placement: None,
            outbox: Outbox::default(),
        }
    }

    /// Adopts a date already present in the bound input, if it reads back
    /// under the configured pattern.
    pub fn with_initial_value(mut self, text: &str) -> Self {
        if let Some(date) = parse_date(text, self.options.format) {
            self.selected = Some(date);
            self.view.set_cursor(ViewCursor::from_date(date));
        }
        self
    }

    pub fn input_id(&self) -> &str {
        &self.input_id
    }

    pub fn options(&self) -> &DatePickerOptions {
        &self.options
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn cursor(&self) -> ViewCursor {
        self.view.cursor()
    }

    pub fn state(&self) -> CalendarState {
        self.view.state()
    }

    pub fn view(&self) -> &CalendarView {
        &self.view
    }

    pub fn is_open(&self) -> bool {
        self.view.is_open()
    }

    pub fn placement(&self) -> Option<DropdownPlacement> {
        self.placement.filter(|_| self.is_open())
    }

    pub fn grid(&self) -> CalendarGrid {
        self.view.grid()
    }

    /// Text of the bound input for the current selection.
    pub fn value_text(&self) -> String {
        self.selected
            .map(|date| format_date(date, self.options.format))
            .unwrap_or_default()
    }

    pub fn day_cells(&self, today: NaiveDate) -> Vec<DayCell> {
        project_cells(&self.view, |date| DayMarks {
            today: date == today,
            selected: self.selected == Some(date),
            ..DayMarks::default()
        })
    }

    pub fn toggle(&mut self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn open(&mut self) {
        self.view.open();
        self.reposition();
        debug!(input = %self.input_id, "date picker opened");
    }

    pub fn close(&mut self) {
        self.view.close();
    }

    pub fn previous_month(&mut self) {
        self.view.navigate(-1);
    }

    pub fn next_month(&mut self) {
        self.view.navigate(1);
    }

    /// Selects a current-month day and closes; adjacent-month cells only navigate.
    pub fn activate_cell(&mut self, cell: GridCell) {
        if let Some(date) = self.view.activate(cell) {
            self.select(date);
            self.close();
        }
    }

    pub fn today(&mut self, today: NaiveDate) {
        self.view.set_cursor(ViewCursor::from_date(today));
        self.select(today);
        self.close();
    }

    /// Drops the selection and blanks the input; the dropdown stays open.
    pub fn clear(&mut self) {
        self.selected = None;
        self.outbox.blank();
    }

    pub fn open_month_year(&mut self) {
        self.view.open_chooser();
    }

    pub fn close_month_year(&mut self) {
        self.view.close_chooser();
    }

    pub fn chooser_previous_year(&mut self) {
        if let Some(chooser) = self.view.chooser_mut() {
            chooser.previous_year();
        }
    }

    pub fn chooser_next_year(&mut self) {
        if let Some(chooser) = self.view.chooser_mut() {
            chooser.next_year();
        }
    }

    pub fn chooser_type_year(&mut self, text: &str) {
        if let Some(chooser) = self.view.chooser_mut() {
            chooser.type_year(text);
        }
    }

    pub fn choose_month(&mut self, month: u32) {
        self.view.choose_month(month);
    }

    pub fn handle_global(&mut self, event: &GlobalEvent) {
        if !self.is_open() {
            if let GlobalEvent::Resize(viewport) = event {
                self.viewport = *viewport;
            }
            return;
        }
        match event {
            GlobalEvent::Click(target) if target.is_outside(&self.input_id) => self.close(),
            GlobalEvent::Click(_) => {}
            GlobalEvent::Escape => {
                self.view.escape();
            }
            GlobalEvent::WindowBlur => self.close(),
            GlobalEvent::Resize(viewport) => {
                self.viewport = *viewport;
                self.reposition();
            }
            GlobalEvent::Scroll => self.reposition(),
        }
    }

    pub fn set_anchor(&mut self, anchor: Rect) {
        self.anchor = anchor;
    }

    pub fn drain_effects(&mut self) -> Vec<PickerEffect> {
        self.outbox.drain()
    }

    fn select(&mut self, date: NaiveDate) {
        self.selected = Some(date);
        self.outbox.commit(format_date(date, self.options.format));
    }

    fn reposition(&mut self) {
        self.placement = Some(place(self.anchor, self.viewport, &DATE_PICKER));
    }
}
