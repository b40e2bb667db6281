pub mod calendar_view;
pub mod clock;
pub mod range;
pub mod single;
pub mod time_list;
pub mod time_value;

use std::fmt;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::placement::{
    CLOCK_PICKER, DATE_PICKER, DropdownPlacement, PlacementProfile, RANGE_MODAL, Rect,
    TIME_PICKER, Viewport,
};
use crate::timers::TimerKind;

use clock::ClockTimePicker;
use range::DateRangePicker;
use single::SingleDatePicker;
use time_list::TimePicker;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum PickerKind {
    Date,
    DateRange,
    Time,
    Clock,
}

impl PickerKind {
    pub fn label(self) -> &'static str {
        match self {
            PickerKind::Date => "date picker",
            PickerKind::DateRange => "date range picker",
            PickerKind::Time => "time picker",
            PickerKind::Clock => "watch time picker",
        }
    }

    pub fn placement_profile(self) -> &'static PlacementProfile {
        match self {
            PickerKind::Date => &DATE_PICKER,
            PickerKind::DateRange => &RANGE_MODAL,
            PickerKind::Time => &TIME_PICKER,
            PickerKind::Clock => &CLOCK_PICKER,
        }
    }
}

impl fmt::Display for PickerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Side effects a picker asks its host to perform. Pickers never touch the
/// page directly; the registry drains and applies these after every event.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerEffect {
    /// Write into the bound input. `notify` fires a change notification.
    SetValue { value: String, notify: bool },
    Warning(String),
    Schedule { kind: TimerKind, after: Duration },
}

#[derive(Debug, Default)]
pub(crate) struct Outbox {
    effects: Vec<PickerEffect>,
}

impl Outbox {
    pub(crate) fn commit(&mut self, value: impl Into<String>) {
        self.effects.push(PickerEffect::SetValue {
            value: value.into(),
            notify: true,
        });
    }

    pub(crate) fn blank(&mut self) {
        self.effects.push(PickerEffect::SetValue {
            value: String::new(),
            notify: false,
        });
    }

    pub(crate) fn warn(&mut self, text: impl Into<String>) {
        self.effects.push(PickerEffect::Warning(text.into()));
    }

    pub(crate) fn schedule(&mut self, kind: TimerKind, after: Duration) {
        self.effects.push(PickerEffect::Schedule { kind, after });
    }

    pub(crate) fn drain(&mut self) -> Vec<PickerEffect> {
        std::mem::take(&mut self.effects)
    }
}

/// What a pointer press landed on, as far as pickers care.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ClickTarget {
    /// The bound input (or one of the range picker's trigger buttons).
    Trigger(String),
    /// Inside a picker's own dropdown or modal card.
    Panel(String),
    /// The dimmed area around a picker's modal card.
    Backdrop(String),
    Elsewhere,
}

impl ClickTarget {
    /// Presses on a picker's own trigger or panel never count as outside.
    pub fn is_outside(&self, picker: &str) -> bool {
        match self {
            ClickTarget::Trigger(id) | ClickTarget::Panel(id) => id != picker,
            ClickTarget::Backdrop(_) | ClickTarget::Elsewhere => true,
        }
    }
}

/// Page-level events broadcast to every registered picker.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalEvent {
    Click(ClickTarget),
    Escape,
    WindowBlur,
    Resize(Viewport),
    /// Anchors have already been refreshed by the time this arrives.
    Scroll,
}

/// Everything the registry can hold, dispatched by variant.
#[derive(Debug)]
pub enum PickerWidget {
    Date(SingleDatePicker),
    Range(DateRangePicker),
    Time(TimePicker),
    Clock(ClockTimePicker),
}

impl PickerWidget {
    pub fn kind(&self) -> PickerKind {
        match self {
            PickerWidget::Date(_) => PickerKind::Date,
            PickerWidget::Range(_) => PickerKind::DateRange,
            PickerWidget::Time(_) => PickerKind::Time,
            PickerWidget::Clock(_) => PickerKind::Clock,
        }
    }

    pub fn input_id(&self) -> &str {
        match self {
            PickerWidget::Date(picker) => picker.input_id(),
            PickerWidget::Range(picker) => picker.input_id(),
            PickerWidget::Time(picker) => picker.input_id(),
            PickerWidget::Clock(picker) => picker.input_id(),
        }
    }

    pub fn is_open(&self) -> bool {
        match self {
            PickerWidget::Date(picker) => picker.is_open(),
            PickerWidget::Range(picker) => picker.is_open(),
            PickerWidget::Time(picker) => picker.is_open(),
            PickerWidget::Clock(picker) => picker.is_open(),
        }
    }

    /// Trigger activation: open if closed, close if open.
    pub fn toggle(&mut self, now: NaiveDateTime) {
        match self {
            PickerWidget::Date(picker) => picker.toggle(),
            PickerWidget::Range(picker) => {
                if picker.is_open() {
                    picker.close();
                } else {
                    picker.open(now.date());
                }
            }
            PickerWidget::Time(picker) => picker.toggle(),
            PickerWidget::Clock(picker) => picker.toggle(),
        }
    }

    pub fn close(&mut self) {
        match self {
            PickerWidget::Date(picker) => picker.close(),
            PickerWidget::Range(picker) => picker.close(),
            PickerWidget::Time(picker) => picker.close(),
            PickerWidget::Clock(picker) => picker.close(),
        }
    }

    pub fn handle_global(&mut self, event: &GlobalEvent) {
        match self {
            PickerWidget::Date(picker) => picker.handle_global(event),
            PickerWidget::Range(picker) => picker.handle_global(event),
            PickerWidget::Time(picker) => picker.handle_global(event),
            PickerWidget::Clock(picker) => picker.handle_global(event),
        }
    }

    pub fn on_timer(&mut self, kind: TimerKind) {
        match self {
            PickerWidget::Range(picker) => picker.on_timer(kind),
            PickerWidget::Time(picker) => picker.on_timer(kind),
            PickerWidget::Clock(picker) => picker.on_timer(kind),
            PickerWidget::Date(_) => {}
        }
    }

    pub fn set_anchor(&mut self, anchor: Rect) {
        match self {
            PickerWidget::Date(picker) => picker.set_anchor(anchor),
            PickerWidget::Range(picker) => picker.set_anchor(anchor),
            PickerWidget::Time(picker) => picker.set_anchor(anchor),
            PickerWidget::Clock(picker) => picker.set_anchor(anchor),
        }
    }

    pub fn placement(&self) -> Option<DropdownPlacement> {
        match self {
            PickerWidget::Date(picker) => picker.placement(),
            PickerWidget::Range(picker) => picker.placement(),
            PickerWidget::Time(picker) => picker.placement(),
            PickerWidget::Clock(picker) => picker.placement(),
        }
    }

    pub fn drain_effects(&mut self) -> Vec<PickerEffect> {
        match self {
            PickerWidget::Date(picker) => picker.drain_effects(),
            PickerWidget::Range(picker) => picker.drain_effects(),
            PickerWidget::Time(picker) => picker.drain_effects(),
            PickerWidget::Clock(picker) => picker.drain_effects(),
        }
    }
}
