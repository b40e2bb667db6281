use chrono::NaiveTime;
use tracing::debug;

use crate::picker::time_value::{Period, TimeValue, round_to_step};
use crate::picker::{GlobalEvent, Outbox, PickerEffect};
use crate::placement::{DropdownPlacement, Rect, TIME_PICKER, Viewport, place};
use crate::timers::{RESIZE_CLOSE_DELAY, TimerKind};

pub const DEFAULT_TIME_PLACEHOLDER: &str = "Select time...";
const DEFAULT_STEP: u32 = 15;

/// Minute granularity of the list picker, 1..=60.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MinuteStep(u32);

impl Default for MinuteStep {
    fn default() -> Self {
        Self(DEFAULT_STEP)
    }
}

impl MinuteStep {
    pub fn new(minutes: u32) -> Self {
        match minutes {
            0 => Self::default(),
            minutes => Self(minutes.min(60)),
        }
    }

    /// Reads a `data-time-step` style value. Zero or unparsable means 15.
    pub fn from_config(raw: Option<&str>) -> Self {
        raw.and_then(|raw| raw.trim().parse::<u32>().ok())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    /// Minute buttons offered by the dropdown.
    pub fn options(self) -> Vec<u8> {
        (0..60).step_by(self.0 as usize).map(|m| m as u8).collect()
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TimePickerOptions {
    /// Only the 12-hour face is rendered; other values are kept for reporting.
    pub format: String,
    pub step: MinuteStep,
    pub placeholder: String,
}

impl Default for TimePickerOptions {
    fn default() -> Self {
        Self {
            format: "12".to_string(),
            step: MinuteStep::default(),
            placeholder: DEFAULT_TIME_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum TimePickerState {
    #[default]
    Closed,
    Open,
}

/// Button-grid hour/minute/period selector bound to one input.
#[derive(Debug)]
pub struct TimePicker {
    input_id: String,
    options: TimePickerOptions,
    value: TimeValue,
    state: TimePickerState,
    anchor: Rect,
    viewport: Viewport,
    placement: Option<DropdownPlacement>,
    outbox: Outbox,
}

impl TimePicker {
    pub fn new(
        input_id: impl Into<String>,
        options: TimePickerOptions,
        anchor: Rect,
        viewport: Viewport,
    ) -> Self {
        Self {
            input_id: input_id.into(),
            options,
            value: TimeValue::default(),
            state: TimePickerState::Closed,
            anchor,
            viewport,
            placement: None,
            outbox: Outbox::default(),
        }
    }

    pub fn input_id(&self) -> &str {
        &self.input_id
    }

    pub fn options(&self) -> &TimePickerOptions {
        &self.options
    }

    pub fn value(&self) -> TimeValue {
        self.value
    }

    pub fn state(&self) -> TimePickerState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == TimePickerState::Open
    }

    pub fn placement(&self) -> Option<DropdownPlacement> {
        self.placement.filter(|_| self.is_open())
    }

    /// Readout at the top of the dropdown, "hh:mm AM".
    pub fn display_text(&self) -> String {
        self.value.padded_label()
    }

    pub fn hour_options(&self) -> impl Iterator<Item = u8> {
        1..=12
    }

    pub fn minute_options(&self) -> Vec<u8> {
        self.options.step.options()
    }

    pub fn toggle(&mut self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn open(&mut self) {
        self.state = TimePickerState::Open;
        self.reposition();
        debug!(input = %self.input_id, "time picker opened");
    }

    pub fn close(&mut self) {
        self.state = TimePickerState::Closed;
    }

    pub fn select_hour(&mut self, hour12: u8) {
        self.value = self.value.with_hour12(hour12);
    }

    pub fn select_minute(&mut self, minute: u8) {
        self.value = self.value.with_minute(minute);
    }

    pub fn select_period(&mut self, period: Period) {
        self.value = self.value.with_period(period);
    }

    /// Jumps to the current time rounded to the step. Leaves the dropdown open.
    pub fn now(&mut self, now: NaiveTime) {
        let rounded = round_to_step(now, self.options.step.minutes());
        self.value = TimeValue::from_naive_time(rounded);
    }

    /// Back to 12:00 PM with a blank input; the dropdown stays open.
    pub fn clear(&mut self) {
        self.value = TimeValue::default();
        self.outbox.blank();
    }

    pub fn apply(&mut self) {
        let committed = TimeValue::from_naive_time(self.value.to_naive_time());
        self.outbox.commit(committed.padded_label());
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
            GlobalEvent::Scroll => self.reposition(),
            GlobalEvent::Click(_) | GlobalEvent::WindowBlur => {}
        }
    }

    /// The resize debounce only closes a dropdown that is still open.
    pub fn on_timer(&mut self, kind: TimerKind) {
        if kind == TimerKind::CloseOnResize && self.is_open() {
            debug!(input = %self.input_id, "closing time picker after resize");
            self.close();
        }
    }

    pub fn set_anchor(&mut self, anchor: Rect) {
        self.anchor = anchor;
    }

    pub fn drain_effects(&mut self) -> Vec<PickerEffect> {
        self.outbox.drain()
    }

    fn reposition(&mut self) {
        self.placement = Some(place(self.anchor, self.viewport, &TIME_PICKER));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::ClickTarget;
    use crate::placement::{Offset, Side};

    const DESKTOP: Viewport = Viewport {
        width: 1280.0,
        height: 800.0,
    };

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
    }

    fn picker(step: u32) -> TimePicker {
        TimePicker::new(
            "meeting-time",
            TimePickerOptions {
                step: MinuteStep::new(step),
                ..TimePickerOptions::default()
            },
            Rect::new(200.0, 100.0, 240.0, 40.0),
            DESKTOP,
        )
    }

    #[test]
    fn step_config_falls_back_to_fifteen() {
        assert_eq!(MinuteStep::from_config(Some("30")).minutes(), 30);
        assert_eq!(MinuteStep::from_config(Some("0")).minutes(), 15);
        assert_eq!(MinuteStep::from_config(Some("abc")).minutes(), 15);
        assert_eq!(MinuteStep::from_config(None).minutes(), 15);
        assert_eq!(MinuteStep::from_config(Some("90")).minutes(), 60);
        assert_eq!(MinuteStep::new(15).options(), vec![0, 15, 30, 45]);
        assert_eq!(MinuteStep::new(60).options(), vec![0]);
    }

    #[test]
    fn apply_writes_padded_twelve_hour_text() {
        let mut picker = picker(15);
        picker.open();
        picker.select_hour(9);
        picker.select_minute(45);
        picker.select_period(Period::Am);
        picker.select_hour(9);
        picker.apply();
        assert!(!picker.is_open());
        assert_eq!(
            picker.drain_effects(),
            vec![PickerEffect::SetValue {
                value: "09:45 AM".to_string(),
                notify: true,
            }]
        );
    }

    #[test]
    fn midnight_and_noon_survive_apply() {
        let mut picker = picker(15);
        picker.open();
        picker.select_hour(12);
        picker.select_period(Period::Am);
        assert_eq!(picker.value().hour24(), 0);
        picker.apply();
        assert_eq!(
            picker.drain_effects(),
            vec![PickerEffect::SetValue {
                value: "12:00 AM".to_string(),
                notify: true,
            }]
        );
    }

    #[test]
    fn now_rounds_and_stays_open() {
        let mut picker = picker(15);
        picker.open();
        picker.now(hm(13, 53));
        assert!(picker.is_open());
        assert_eq!(picker.display_text(), "02:00 PM");

        picker.now(hm(0, 7));
        assert_eq!(picker.display_text(), "12:00 AM");
        assert!(picker.drain_effects().is_empty());
    }

    #[test]
    fn clear_resets_and_blanks_without_closing() {
        let mut picker = picker(30);
        picker.open();
        picker.select_hour(4);
        picker.clear();
        assert!(picker.is_open());
        assert_eq!(picker.value(), TimeValue::default());
        assert_eq!(
            picker.drain_effects(),
            vec![PickerEffect::SetValue {
                value: String::new(),
                notify: false,
            }]
        );
    }

    #[test]
    fn resize_schedules_a_close_that_rechecks_state() {
        let mut picker = picker(15);
        picker.open();
        picker.handle_global(&GlobalEvent::Resize(Viewport {
            width: 900.0,
            height: 700.0,
        }));
        assert!(picker.is_open());
        assert_eq!(
            picker.drain_effects(),
            vec![PickerEffect::Schedule {
                kind: TimerKind::CloseOnResize,
                after: RESIZE_CLOSE_DELAY,
            }]
        );
        picker.on_timer(TimerKind::CloseOnResize);
        assert!(!picker.is_open());

        // Closed pickers schedule nothing and ignore stale timers.
        picker.handle_global(&GlobalEvent::Resize(DESKTOP));
        assert!(picker.drain_effects().is_empty());
        picker.on_timer(TimerKind::CloseOnResize);
        assert!(!picker.is_open());
    }

    #[test]
    fn scroll_repositions_against_the_new_anchor() {
        let mut picker = picker(15);
        picker.open();
        assert_eq!(picker.placement().map(|p| p.top), Some(Offset::Px(144.0)));
        picker.set_anchor(Rect::new(200.0, 700.0, 240.0, 40.0));
        picker.handle_global(&GlobalEvent::Scroll);
        assert_eq!(picker.placement().map(|p| p.side), Some(Side::Above));
    }

    #[test]
    fn escape_and_outside_clicks_close() {
        let mut picker = picker(15);
        picker.open();
        picker.handle_global(&GlobalEvent::Click(ClickTarget::Panel("meeting-time".into())));
        picker.handle_global(&GlobalEvent::WindowBlur);
        assert!(picker.is_open());
        picker.handle_global(&GlobalEvent::Escape);
        assert!(!picker.is_open());
        picker.open();
        picker.handle_global(&GlobalEvent::Click(ClickTarget::Trigger("other".into())));
        assert!(!picker.is_open());
    }
}
