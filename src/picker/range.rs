use chrono::NaiveDate;
use tracing::debug;

use crate::calendar::format::{DatePattern, format_date};
use crate::calendar::grid::{GridCell, ViewCursor};
use crate::error::PickerError;
use crate::picker::calendar_view::{CalendarState, CalendarView, DayCell, DayMarks, project_cells};
use crate::picker::{ClickTarget, GlobalEvent, Outbox, PickerEffect};
use crate::placement::{DropdownPlacement, RANGE_MODAL, Rect, Viewport, place};
use crate::timers::{PULSE_DURATION, TimerKind};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum RangeEdge {
    #[default]
    From,
    To,
}

/// Once both ends are set, `from <= to`. `to` is never set while `from` is empty.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct DateRange {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl DateRange {
    pub fn from(&self) -> Option<NaiveDate> {
        self.from
    }

    pub fn to(&self) -> Option<NaiveDate> {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= date && date <= to,
            _ => false,
        }
    }

    pub fn is_edge(&self, date: NaiveDate) -> bool {
        self.from == Some(date) || self.to == Some(date)
    }

    fn start_at(&mut self, date: NaiveDate) {
        self.from = Some(date);
        self.to = None;
    }

    /// Sets the far end. An end before the start collapses the range onto it.
    fn end_at(&mut self, date: NaiveDate) -> Result<(), PickerError> {
        let from = self.from.ok_or(PickerError::InvalidRangeSelection)?;
        self.to = Some(date);
        if date < from {
            self.from = Some(date);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RangePickerOptions {
    pub format: DatePattern,
}

impl Default for RangePickerOptions {
    fn default() -> Self {
        Self {
            format: DatePattern::DayMonthYearDash,
        }
    }
}

/// Modal calendar that edits a from/to pair and commits it as one string.
#[derive(Debug)]
pub struct DateRangePicker {
    input_id: String,
    options: RangePickerOptions,
    view: CalendarView,
    range: DateRange,
    active: RangeEdge,
    to_pulsing: bool,
    anchor: Rect,
    viewport: Viewport,
    placement: Option<DropdownPlacement>,
    outbox: Outbox,
}

impl DateRangePicker {
    pub fn new(
        input_id: impl Into<String>,
        options: RangePickerOptions,
        today: NaiveDate,
        anchor: Rect,
        viewport: Viewport,
    ) -> Self {
        Self {
            input_id: input_id.into(),
            options,
            view: CalendarView::new(today),
            range: DateRange::default(),
            active: RangeEdge::From,
            to_pulsing: false,
            anchor,
            viewport,
            placement: None,
            outbox: Outbox::default(),
        }
    }

    pub fn input_id(&self) -> &str {
        &self.input_id
    }

    pub fn options(&self) -> &RangePickerOptions {
        &self.options
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn active_edge(&self) -> RangeEdge {
        self.active
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

    /// True while the "to" button shows its attention pulse.
    pub fn is_to_pulsing(&self) -> bool {
        self.to_pulsing
    }

    pub fn placement(&self) -> Option<DropdownPlacement> {
        self.placement.filter(|_| self.is_open())
    }

    pub fn from_text(&self) -> String {
        self.format(self.range.from)
    }

    pub fn to_text(&self) -> String {
        self.format(self.range.to)
    }

    /// The string "Apply" writes: "from - to", "from", or empty.
    pub fn value_text(&self) -> String {
        match (self.range.from, self.range.to) {
            (Some(from), Some(to)) => format!(
                "{} - {}",
                format_date(from, self.options.format),
                format_date(to, self.options.format)
            ),
            (Some(from), None) => format_date(from, self.options.format),
            (None, _) => String::new(),
        }
    }

    pub fn day_cells(&self, today: NaiveDate) -> Vec<DayCell> {
        project_cells(&self.view, |date| DayMarks {
            today: date == today,
            selected: self.range.is_edge(date),
            in_range: self.range.contains(date),
            ..DayMarks::default()
        })
    }

    /// Opening always starts on the "from" edge, defaulting it to today.
    pub fn open(&mut self, today: NaiveDate) {
        self.view.open();
        self.active = RangeEdge::From;
        if self.range.from.is_none() {
            self.range.from = Some(today);
        }
        self.reposition();
        debug!(input = %self.input_id, "range picker opened");
    }

    pub fn close(&mut self) {
        self.view.close();
        self.active = RangeEdge::From;
    }

    pub fn activate_from(&mut self) {
        self.active = RangeEdge::From;
    }

    /// Switching to the "to" edge needs a start date. Without one the request
    /// is refused with a warning and a pulse on the "to" button.
    pub fn activate_to(&mut self) -> Result<(), PickerError> {
        if self.range.from.is_none() {
            return Err(self.reject());
        }
        self.active = RangeEdge::To;
        Ok(())
    }

    pub fn previous_month(&mut self) {
        self.view.navigate(-1);
    }

    pub fn next_month(&mut self) {
        self.view.navigate(1);
    }

    pub fn activate_cell(&mut self, cell: GridCell) -> Result<(), PickerError> {
        match self.view.activate(cell) {
            Some(date) => self.select(date),
            None => Ok(()),
        }
    }

    pub fn select(&mut self, date: NaiveDate) -> Result<(), PickerError> {
        match self.active {
            RangeEdge::From => {
                self.range.start_at(date);
                self.active = RangeEdge::To;
                Ok(())
            }
            RangeEdge::To => self.range.end_at(date).map_err(|_| self.reject()),
        }
    }

    /// "Today" sets whichever edge is active.
    pub fn today(&mut self, today: NaiveDate) {
        match self.active {
            RangeEdge::From => self.range.start_at(today),
            RangeEdge::To => {
                if self.range.from.is_none() {
                    self.range.from = Some(today);
                }
                let _ = self.range.end_at(today);
            }
        }
    }

    pub fn clear(&mut self) {
        self.range = DateRange::default();
        self.active = RangeEdge::From;
    }

    pub fn apply(&mut self) {
        self.outbox.commit(self.value_text());
        self.close();
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

    /// The modal only reacts to its own backdrop, Escape and viewport changes.
    pub fn handle_global(&mut self, event: &GlobalEvent) {
        match event {
            GlobalEvent::Resize(viewport) => {
                self.viewport = *viewport;
                if self.is_open() {
                    self.reposition();
                }
            }
            _ if !self.is_open() => {}
            GlobalEvent::Click(ClickTarget::Backdrop(id)) if *id == self.input_id => self.close(),
            GlobalEvent::Escape => {
                if self.view.escape() {
                    self.active = RangeEdge::From;
                }
            }
            GlobalEvent::Click(_) | GlobalEvent::WindowBlur | GlobalEvent::Scroll => {}
        }
    }

    pub fn on_timer(&mut self, kind: TimerKind) {
        if kind == TimerKind::PulseEnd {
            self.to_pulsing = false;
        }
    }

    pub fn set_anchor(&mut self, anchor: Rect) {
        self.anchor = anchor;
    }

    pub fn drain_effects(&mut self) -> Vec<PickerEffect> {
        self.outbox.drain()
    }

    fn reject(&mut self) -> PickerError {
        let error = PickerError::InvalidRangeSelection;
        self.outbox.warn(error.to_string());
        self.outbox.schedule(TimerKind::PulseEnd, PULSE_DURATION);
        self.to_pulsing = true;
        error
    }

    fn format(&self, date: Option<NaiveDate>) -> String {
        date.map(|date| format_date(date, self.options.format))
            .unwrap_or_default()
    }

    fn reposition(&mut self) {
        self.placement = Some(place(self.anchor, self.viewport, &RANGE_MODAL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::grid::CellOrigin;
    use crate::placement::Side;

    const DESKTOP: Viewport = Viewport {
        width: 1280.0,
        height: 800.0,
    };

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn picker() -> DateRangePicker {
        DateRangePicker::new(
            "report-range",
            RangePickerOptions::default(),
            date(2025, 10, 1),
            Rect::new(40.0, 60.0, 280.0, 40.0),
            DESKTOP,
        )
    }

    #[test]
    fn opening_defaults_from_to_today_and_activates_from() {
        let mut picker = picker();
        picker.open(date(2025, 10, 1));
        assert_eq!(picker.range().from(), Some(date(2025, 10, 1)));
        assert_eq!(picker.active_edge(), RangeEdge::From);
        assert_eq!(picker.placement().map(|p| p.side), Some(Side::Centered));
    }

    #[test]
    fn to_edge_is_refused_without_a_start_date() {
        let mut picker = picker();
        picker.open(date(2025, 10, 1));
        picker.clear();

        let refused = picker.activate_to();
        assert_eq!(refused, Err(PickerError::InvalidRangeSelection));
        assert_eq!(picker.active_edge(), RangeEdge::From);
        assert_eq!(picker.range(), DateRange::default());
        assert!(picker.is_to_pulsing());
        assert_eq!(
            picker.drain_effects(),
            vec![
                PickerEffect::Warning("Please select a \"From Date\" first!".to_string()),
                PickerEffect::Schedule {
                    kind: TimerKind::PulseEnd,
                    after: PULSE_DURATION,
                },
            ]
        );

        picker.on_timer(TimerKind::PulseEnd);
        assert!(!picker.is_to_pulsing());
    }

    #[test]
    fn earlier_to_collapses_the_range() {
        let mut picker = picker();
        picker.open(date(2025, 10, 1));
        picker.select(date(2025, 10, 10)).expect("from");
        assert_eq!(picker.active_edge(), RangeEdge::To);
        picker.select(date(2025, 10, 5)).expect("to");
        assert_eq!(picker.range().from(), Some(date(2025, 10, 5)));
        assert_eq!(picker.range().to(), Some(date(2025, 10, 5)));
    }

    #[test]
    fn ordering_holds_after_any_selection_sequence() {
        let days = [14, 3, 27, 3, 9, 30, 1, 18, 18, 2, 25, 7];
        let mut picker = picker();
        picker.open(date(2025, 10, 1));
        for (step, day) in days.iter().enumerate() {
            if step % 5 == 4 {
                picker.activate_from();
            }
            if step % 7 == 6 {
                let _ = picker.activate_to();
            }
            picker.select(date(2025, 10, *day)).expect("select");
            let range = picker.range();
            if let Some(to) = range.to() {
                let from = range.from().expect("to implies from");
                assert!(from <= to, "step {step}: {from} > {to}");
            }
        }
    }

    #[test]
    fn selecting_a_new_start_resets_the_end() {
        let mut picker = picker();
        picker.open(date(2025, 10, 1));
        picker.select(date(2025, 10, 3)).expect("from");
        picker.select(date(2025, 10, 9)).expect("to");
        picker.activate_from();
        picker.select(date(2025, 10, 20)).expect("from again");
        assert_eq!(picker.range().to(), None);
        assert_eq!(picker.active_edge(), RangeEdge::To);
    }

    #[test]
    fn apply_writes_the_joined_range_and_closes() {
        let mut picker = picker();
        picker.open(date(2025, 10, 1));
        picker
            .activate_cell(GridCell {
                day: 3,
                origin: CellOrigin::Current,
            })
            .expect("from");
        picker
            .activate_cell(GridCell {
                day: 12,
                origin: CellOrigin::Current,
            })
            .expect("to");
        picker.apply();
        assert!(!picker.is_open());
        assert_eq!(
            picker.drain_effects(),
            vec![PickerEffect::SetValue {
                value: "03-10-2025 - 12-10-2025".to_string(),
                notify: true,
            }]
        );
    }

    #[test]
    fn apply_after_clear_writes_an_empty_value() {
        let mut picker = picker();
        picker.open(date(2025, 10, 1));
        assert_eq!(picker.value_text(), "01-10-2025");
        picker.clear();
        picker.apply();
        assert_eq!(
            picker.drain_effects(),
            vec![PickerEffect::SetValue {
                value: String::new(),
                notify: true,
            }]
        );
    }

    #[test]
    fn today_follows_the_active_edge() {
        let today = date(2025, 10, 8);
        let mut picker = picker();
        picker.open(date(2025, 10, 1));
        picker.select(date(2025, 10, 20)).expect("from");
        picker.today(today);
        assert_eq!(picker.range().from(), Some(today));
        assert_eq!(picker.range().to(), Some(today));

        picker.activate_from();
        picker.today(today);
        assert_eq!(picker.range().to(), None);
    }

    #[test]
    fn only_the_backdrop_or_escape_dismisses_the_modal() {
        let mut picker = picker();
        picker.open(date(2025, 10, 1));
        picker.handle_global(&GlobalEvent::Click(ClickTarget::Elsewhere));
        picker.handle_global(&GlobalEvent::WindowBlur);
        assert!(picker.is_open());

        picker.open_month_year();
        picker.handle_global(&GlobalEvent::Escape);
        assert_eq!(picker.state(), CalendarState::OpenCalendar);

        picker.handle_global(&GlobalEvent::Click(ClickTarget::Backdrop("report-range".into())));
        assert!(!picker.is_open());
    }

    #[test]
    fn projection_marks_edges_and_span() {
        let mut picker = picker();
        picker.open(date(2025, 10, 1));
        picker.select(date(2025, 10, 6)).expect("from");
        picker.select(date(2025, 10, 9)).expect("to");
        let cells = picker.day_cells(date(2025, 10, 1));
        let marks = |day: u32| {
            cells
                .iter()
                .find(|cell| cell.cell.is_current() && cell.cell.day == day)
                .map(|cell| cell.marks)
                .expect("day in grid")
        };
        assert!(marks(6).selected && marks(6).in_range);
        assert!(marks(7).in_range && !marks(7).selected);
        assert!(!marks(10).in_range);
        assert!(marks(1).today);
    }
}
