use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::calendar::format::DatePattern;
use crate::error::PickerError;
use crate::page::{Element, Page};
use crate::picker::clock::ClockTimePicker;
use crate::picker::range::{DateRangePicker, RangePickerOptions};
use crate::picker::single::{DEFAULT_DATE_PLACEHOLDER, DatePickerOptions, SingleDatePicker};
use crate::picker::time_list::{MinuteStep, TimePicker, TimePickerOptions};
use crate::picker::{GlobalEvent, PickerEffect, PickerKind, PickerWidget};
use crate::timers::{Notifications, TimerKey, TimerQueue, WARNING_TTL};

pub const DATE_MARKER: &str = "data-date-picker";
pub const DATE_CLASS: &str = "date-picker";
pub const RANGE_MARKER: &str = "data-date-range";
pub const TIME_MARKER: &str = "data-time-picker";
pub const CLOCK_MARKER: &str = "data-time-picker-watch";

/// Picker kind an element asks for, if any. An element carrying several
/// markers gets the most specific one.
pub fn marker_kind(element: &Element) -> Option<PickerKind> {
    if element.has_marker(RANGE_MARKER) {
        Some(PickerKind::DateRange)
    } else if element.has_marker(CLOCK_MARKER) {
        Some(PickerKind::Clock)
    } else if element.has_marker(TIME_MARKER) {
        Some(PickerKind::Time)
    } else if element.has_marker(DATE_MARKER) || element.has_marker(DATE_CLASS) {
        Some(PickerKind::Date)
    } else {
        None
    }
}

/// Builds a picker bound to element `id`, reading its options from the
/// element's data attributes.
pub fn build_picker(
    kind: PickerKind,
    id: &str,
    page: &Page,
    today: NaiveDate,
) -> Result<PickerWidget, PickerError> {
    let element = page.element(id).ok_or_else(|| PickerError::MissingElement {
        kind: kind.label(),
        id: id.to_string(),
    })?;
    let anchor = page.anchor(id).unwrap_or(element.rect);
    let viewport = page.viewport();

    let widget = match kind {
        PickerKind::Date => PickerWidget::Date(
            SingleDatePicker::new(
                id,
                DatePickerOptions {
                    format: date_pattern(element, id, DatePattern::default()),
                    placeholder: element
                        .attribute("placeholder")
                        .unwrap_or(DEFAULT_DATE_PLACEHOLDER)
                        .to_string(),
                },
                today,
                anchor,
                viewport,
            )
            .with_initial_value(&element.value),
        ),
        PickerKind::DateRange => PickerWidget::Range(DateRangePicker::new(
            id,
            RangePickerOptions {
                format: date_pattern(element, id, RangePickerOptions::default().format),
            },
            today,
            anchor,
            viewport,
        )),
        PickerKind::Time => {
            let mut options = TimePickerOptions {
                step: MinuteStep::from_config(element.attribute("data-time-step")),
                ..TimePickerOptions::default()
            };
            if let Some(format) = element.attribute("data-time-format") {
                options.format = format.to_string();
            }
            if let Some(placeholder) = element.attribute("placeholder") {
                options.placeholder = placeholder.to_string();
            }
            PickerWidget::Time(TimePicker::new(id, options, anchor, viewport))
        }
        PickerKind::Clock => PickerWidget::Clock(ClockTimePicker::new(id, anchor, viewport)),
    };
    Ok(widget)
}

/// Reads `data-date-format`. Unknown names log a warning and fall back to `Long`.
fn date_pattern(element: &Element, id: &str, default: DatePattern) -> DatePattern {
    let Some(name) = element.attribute("data-date-format") else {
        return default;
    };
    DatePattern::parse_name(name).unwrap_or_else(|| {
        warn!(input = id, format = name, "unknown date format, using long");
        DatePattern::Long
    })
}

#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub registered: Vec<(String, PickerKind)>,
    pub skipped: Vec<PickerError>,
}

/// Owns every live picker and applies what they ask of the page.
///
/// At most one picker is open at a time: whenever an action opens a picker,
/// every other one is closed.
#[derive(Debug, Default)]
pub struct PickerRegistry {
    pickers: Vec<PickerWidget>,
    timers: TimerQueue,
    notices: Notifications,
}

impl PickerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, widget: PickerWidget) -> Result<(), PickerError> {
        let id = widget.input_id().to_string();
        if self.get(&id).is_some() {
            return Err(PickerError::DuplicatePicker(id));
        }
        info!(input = %id, kind = %widget.kind(), "picker registered");
        self.pickers.push(widget);
        Ok(())
    }

    pub fn deregister(&mut self, id: &str) -> Option<PickerWidget> {
        let index = self.index_of(id)?;
        self.timers.cancel_picker(id);
        info!(input = id, "picker removed");
        Some(self.pickers.remove(index))
    }

    /// Constructs and registers one picker. Failures are logged and returned;
    /// nothing else is affected.
    pub fn init(
        &mut self,
        kind: PickerKind,
        id: &str,
        page: &Page,
        today: NaiveDate,
    ) -> Result<(), PickerError> {
        let result = build_picker(kind, id, page, today).and_then(|widget| self.register(widget));
        if let Err(err) = &result {
            warn!(input = id, "{err}");
        }
        result
    }

    /// Registers a picker for every marked element, in document order.
    pub fn discover(&mut self, page: &Page, today: NaiveDate) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();
        for element in page.elements() {
            let Some(kind) = marker_kind(element) else {
                continue;
            };
            let Some(id) = element.id.as_deref() else {
                let err = PickerError::MissingIdentifier {
                    kind: kind.label(),
                    label: element.describe(),
                };
                warn!("{err}");
                report.skipped.push(err);
                continue;
            };
            if self.get(id).is_some() {
                debug!(input = id, "already registered, skipping");
                continue;
            }
            match self.init(kind, id, page, today) {
                Ok(()) => report.registered.push((id.to_string(), kind)),
                Err(err) => report.skipped.push(err),
            }
        }
        report
    }

    pub fn get(&self, id: &str) -> Option<&PickerWidget> {
        self.pickers.iter().find(|picker| picker.input_id() == id)
    }

    pub fn pickers(&self) -> &[PickerWidget] {
        &self.pickers
    }

    pub fn len(&self) -> usize {
        self.pickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pickers.is_empty()
    }

    pub fn open_picker(&self) -> Option<&PickerWidget> {
        self.pickers.iter().find(|picker| picker.is_open())
    }

    pub fn notices(&self) -> &Notifications {
        &self.notices
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn close_all_except(&mut self, id: &str) {
        for picker in &mut self.pickers {
            if picker.input_id() != id && picker.is_open() {
                debug!(input = picker.input_id(), "closed by another picker");
                picker.close();
            }
        }
    }

    pub fn close_all(&mut self) {
        for picker in &mut self.pickers {
            picker.close();
        }
    }

    /// Trigger activation on the element bound to `id`.
    pub fn activate_trigger(
        &mut self,
        id: &str,
        page: &mut Page,
        clock: NaiveDateTime,
        now: Instant,
    ) -> bool {
        self.act(id, page, now, |picker| picker.toggle(clock)).is_some()
    }

    /// Runs `action` against one picker, then enforces the single-open rule
    /// and applies whatever the picker emitted.
    pub fn act<R>(
        &mut self,
        id: &str,
        page: &mut Page,
        now: Instant,
        action: impl FnOnce(&mut PickerWidget) -> R,
    ) -> Option<R> {
        let index = self.index_of(id)?;
        if let Some(anchor) = page.anchor(id) {
            self.pickers[index].set_anchor(anchor);
        }
        let was_open = self.pickers[index].is_open();
        let result = action(&mut self.pickers[index]);
        if !was_open && self.pickers[index].is_open() {
            self.close_all_except(id);
        }
        self.flush(index, page, now);
        Some(result)
    }

    pub fn broadcast(&mut self, event: &GlobalEvent, page: &mut Page, now: Instant) {
        match event {
            GlobalEvent::Resize(viewport) => page.set_viewport(*viewport),
            GlobalEvent::Scroll => self.sync_anchors(page),
            _ => {}
        }
        for index in 0..self.pickers.len() {
            self.pickers[index].handle_global(event);
            self.flush(index, page, now);
        }
    }

    pub fn scroll_to(&mut self, page: &mut Page, scroll_y: f32, now: Instant) {
        page.scroll_to(scroll_y);
        self.broadcast(&GlobalEvent::Scroll, page, now);
    }

    /// Fires due timers and expires stale notices.
    pub fn tick(&mut self, page: &mut Page, now: Instant) {
        for key in self.timers.take_due(now) {
            let Some(index) = self.index_of(&key.picker) else {
                continue;
            };
            debug!(picker = %key.picker, kind = ?key.kind, "timer fired");
            self.pickers[index].on_timer(key.kind);
            self.flush(index, page, now);
        }
        self.notices.prune(now);
    }

    /// Earliest moment `tick` has something to do.
    pub fn next_wakeup(&self) -> Option<Instant> {
        match (self.timers.next_deadline(), self.notices.next_expiry()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn sync_anchors(&mut self, page: &Page) {
        for picker in &mut self.pickers {
            if let Some(anchor) = page.anchor(picker.input_id()) {
                picker.set_anchor(anchor);
            }
        }
    }

    fn flush(&mut self, index: usize, page: &mut Page, now: Instant) {
        let effects = self.pickers[index].drain_effects();
        if effects.is_empty() {
            return;
        }
        let id = self.pickers[index].input_id().to_string();
        for effect in effects {
            match effect {
                PickerEffect::SetValue { value, notify } => {
                    if let Err(err) = page.set_value(&id, &value, notify) {
                        warn!(input = %id, "{err}");
                    }
                }
                PickerEffect::Warning(text) => {
                    warn!(input = %id, "{text}");
                    self.notices.push(text, now, WARNING_TTL);
                }
                PickerEffect::Schedule { kind, after } => {
                    self.timers.schedule(TimerKey::new(id.clone(), kind), now + after);
                }
            }
        }
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.pickers.iter().position(|picker| picker.input_id() == id)
    }
}
