use chrono::NaiveTime;
use tracing::debug;

use crate::picker::time_value::{Period, TimeValue, round_to_step};
use crate::picker::{GlobalEvent, Outbox, PickerEffect};
use crate::placement::{CLOCK_PICKER, DropdownPlacement, Rect, Viewport, place};
use crate::timers::{RESIZE_CLOSE_DELAY, TimerKind};

const NOW_STEP: u32 = 5;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum DialMode {
    #[default]
    Hours,
    Minutes,
}

impl DialMode {
    fn degrees_per_value(self) -> f32 {
        match self {
            DialMode::Hours => 30.0,
            DialMode::Minutes => 6.0,
        }
    }
}

/// Clickable area of the dial. Presses are measured from its center; only
/// the annulus between the dead zone and the rim selects anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialGeometry {
    pub width: f32,
    pub height: f32,
}

impl Default for DialGeometry {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 140.0,
        }
    }
}

impl DialGeometry {
    pub const DEAD_ZONE: f32 = 20.0;
    pub const RIM: f32 = 10.0;

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn radius(&self) -> f32 {
        self.width / 2.0
    }

    /// Radius of the painted face. Fits the shorter side of the area, so it
    /// can be smaller than the clickable radius.
    pub fn face_radius(&self) -> f32 {
        self.width.min(self.height) / 2.0 - Self::RIM
    }

    /// Value under a point given relative to the area's top-left corner.
    pub fn value_at(&self, x: f32, y: f32, mode: DialMode) -> Option<u8> {
        let (cx, cy) = self.center();
        let (dx, dy) = (x - cx, y - cy);
        let distance = dx.hypot(dy);
        if distance < Self::DEAD_ZONE || distance > self.radius() - Self::RIM {
            return None;
        }
        Some(angle_to_value(dx, dy, mode))
    }
}

/// Maps an offset from the dial center to an hour (1..=12) or minute (0..=59).
/// Twelve o'clock is angle zero, increasing clockwise.
pub fn angle_to_value(dx: f32, dy: f32, mode: DialMode) -> u8 {
    let angle = dy.atan2(dx).to_degrees();
    let clockwise = (angle + 90.0 + 360.0) % 360.0;
    let slot = (clockwise / mode.degrees_per_value()).round() as u32;
    match mode {
        DialMode::Hours => match slot % 12 {
            0 => 12,
            hour => hour as u8,
        },
        DialMode::Minutes => (slot % 60) as u8,
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ClockPickerState {
    #[default]
    Closed,
    Open,
}

/// Dial-style time picker: hands driven by rotation, hover previews.
#[derive(Debug)]
pub struct ClockTimePicker {
    input_id: String,
    value: TimeValue,
    mode: DialMode,
    preview: Option<u8>,
    geometry: DialGeometry,
    state: ClockPickerState,
    anchor: Rect,
    viewport: Viewport,
    placement: Option<DropdownPlacement>,
    outbox: Outbox,
}

impl ClockTimePicker {
    pub fn new(input_id: impl Into<String>, anchor: Rect, viewport: Viewport) -> Self {
        Self {
            input_id: input_id.into(),
            value: TimeValue::default(),
            mode: DialMode::Hours,
            preview: None,
            geometry: DialGeometry::default(),
            state: ClockPickerState::Closed,
            anchor,
            viewport,
            placement: None,
            outbox: Outbox::default(),
        }
    }

    pub fn input_id(&self) -> &str {
        &self.input_id
    }

    pub fn value(&self) -> TimeValue {
        self.value
    }

    pub fn mode(&self) -> DialMode {
        self.mode
    }

    /// Value under the pointer while hovering the dial.
    pub fn preview(&self) -> Option<u8> {
        self.preview
    }

    pub fn geometry(&self) -> DialGeometry {
        self.geometry
    }

    pub fn state(&self) -> ClockPickerState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ClockPickerState::Open
    }

    pub fn placement(&self) -> Option<DropdownPlacement> {
        self.placement.filter(|_| self.is_open())
    }

    /// Readout, showing the hovered value in place of the live one.
    pub fn display_text(&self) -> String {
        let shown = match (self.preview, self.mode) {
            (Some(hour), DialMode::Hours) => self.value.with_hour12(hour),
            (Some(minute), DialMode::Minutes) => self.value.with_minute(minute),
            (None, _) => self.value,
        };
        shown.compact_label()
    }

    pub fn hour_hand_degrees(&self) -> f32 {
        f32::from(self.value.hour12() % 12) * 30.0 - 90.0
    }

    pub fn minute_hand_degrees(&self) -> f32 {
        f32::from(self.value.minute()) * 6.0 - 90.0
    }

    pub fn toggle(&mut self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn open(&mut self) {
        self.state = ClockPickerState::Open;
        self.placement = Some(place(self.anchor, self.viewport, &CLOCK_PICKER));
        debug!(input = %self.input_id, "watch time picker opened");
    }

    pub fn close(&mut self) {
        self.state = ClockPickerState::Closed;
        self.preview = None;
    }

    pub fn set_mode(&mut self, mode: DialMode) {
        self.mode = mode;
    }

    /// Press on the dial. Dead-zone and off-dial presses are ignored.
    pub fn click(&mut self, x: f32, y: f32) {
        match (self.geometry.value_at(x, y, self.mode), self.mode) {
            (Some(hour), DialMode::Hours) => self.value = self.value.with_hour12(hour),
            (Some(minute), DialMode::Minutes) => self.value = self.value.with_minute(minute),
            (None, _) => {}
        }
    }

    pub fn hover(&mut self, x: f32, y: f32) {
        self.preview = self.geometry.value_at(x, y, self.mode);
    }

    pub fn leave(&mut self) {
        self.preview = None;
    }

    pub fn select_period(&mut self, period: Period) {
        self.value = self.value.with_period(period);
    }

    /// Current time rounded to five minutes, applied straight away.
    pub fn now(&mut self, now: NaiveTime) {
        self.value = TimeValue::from_naive_time(round_to_step(now, NOW_STEP));
        self.apply();
    }

    pub fn clear(&mut self) {
        self.value = TimeValue::default();
    }

    pub fn apply(&mut self) {
        self.outbox.commit(self.value.compact_label());
        self.close();
    }

    pub fn handle_global(&mut self, event: &GlobalEvent) {
        if let GlobalEvent::Resize(viewport) = event {
            self.viewport = *viewport;
        }
        if !self.is_open() {
            return;
        }
        match event {
            GlobalEvent::Click(target) if target.is_outside(&self.input_id) => self.close(),
            GlobalEvent::Escape => self.close(),
            GlobalEvent::Resize(_) => self
                .outbox
                .schedule(TimerKind::CloseOnResize, RESIZE_CLOSE_DELAY),
            GlobalEvent::Click(_) | GlobalEvent::WindowBlur | GlobalEvent::Scroll => {}
        }
    }

    pub fn on_timer(&mut self, kind: TimerKind) {
        if kind == TimerKind::CloseOnResize && self.is_open() {
            self.close();
        }
    }

    pub fn set_anchor(&mut self, anchor: Rect) {
        self.anchor = anchor;
    }

    pub fn drain_effects(&mut self) -> Vec<PickerEffect> {
        self.outbox.drain()
    }
}
