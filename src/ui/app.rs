use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::NaiveDateTime;
use eframe::egui::{
    self, Align, Align2, Color32, FontId, Layout, RichText, Sense, Stroke, TopBottomPanel, Ui,
    vec2,
};
use tracing::info;

use crate::calendar::grid::GridCell;
use crate::calendar::{MONTH_SHORT_NAMES, WEEKDAY_LABELS};
use crate::page::Page;
use crate::picker::calendar_view::{CalendarView, DayCell};
use crate::picker::clock::{ClockTimePicker, DialGeometry, DialMode};
use crate::picker::range::{DateRangePicker, RangeEdge};
use crate::picker::single::SingleDatePicker;
use crate::picker::time_list::TimePicker;
use crate::picker::time_value::Period;
use crate::picker::{ClickTarget, GlobalEvent, PickerWidget};
use crate::placement::Viewport;
use crate::registry::PickerRegistry;
use crate::time_source::SelectedTimeSource;

const ACCENT: Color32 = Color32::from_rgb(43, 148, 178);
const RANGE_FILL: Color32 = Color32::from_rgb(26, 62, 82);
const MUTED: Color32 = Color32::from_rgb(110, 128, 150);
const LABEL: Color32 = Color32::from_rgb(169, 188, 209);
const FIELD_BG: Color32 = Color32::from_rgb(16, 24, 38);
const WARNING_BG: Color32 = Color32::from_rgb(176, 48, 56);
const HIGHLIGHT: Color32 = Color32::from_rgb(255, 214, 117);
const HEADER_HEIGHT: f32 = 64.0;
const FOOTER_HEIGHT: f32 = 30.0;

pub fn run_gui(page: Page, selected: SelectedTimeSource) -> Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("dashpick - {}", page.title()))
            .with_inner_size([1100.0, 820.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };

    let app = DashpickApp::new(page, selected);

    eframe::run_native(
        "dashpick",
        native_options,
        Box::new(move |cc| {
            configure_theme(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to launch dashpick GUI: {err}"))?;

    Ok(())
}

fn configure_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.override_text_color = Some(Color32::from_rgb(226, 234, 246));
    visuals.panel_fill = Color32::from_rgb(8, 16, 26);
    visuals.window_fill = Color32::from_rgb(12, 20, 32);
    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(10, 18, 30);
    visuals.widgets.inactive.bg_fill = FIELD_BG;
    visuals.widgets.hovered.bg_fill = Color32::from_rgb(26, 42, 62);
    visuals.widgets.active.bg_fill = Color32::from_rgb(34, 60, 88);
    visuals.selection.bg_fill = ACCENT;
    visuals.hyperlink_color = Color32::from_rgb(95, 220, 208);
    ctx.set_visuals(visuals);
}

type RunAction = Box<dyn FnOnce(&mut PickerWidget, NaiveDateTime)>;

/// A widget interaction recorded while drawing, applied once the frame is laid out.
struct PickerAction {
    picker: String,
    run: RunAction,
}

impl PickerAction {
    fn date(id: &str, f: impl FnOnce(&mut SingleDatePicker, NaiveDateTime) + 'static) -> Self {
        Self {
            picker: id.to_string(),
            run: Box::new(move |picker, clock| {
                if let PickerWidget::Date(date) = picker {
                    f(date, clock);
                }
            }),
        }
    }

    fn range(id: &str, f: impl FnOnce(&mut DateRangePicker, NaiveDateTime) + 'static) -> Self {
        Self {
            picker: id.to_string(),
            run: Box::new(move |picker, clock| {
                if let PickerWidget::Range(range) = picker {
                    f(range, clock);
                }
            }),
        }
    }

    fn time(id: &str, f: impl FnOnce(&mut TimePicker, NaiveDateTime) + 'static) -> Self {
        Self {
            picker: id.to_string(),
            run: Box::new(move |picker, clock| {
                if let PickerWidget::Time(time) = picker {
                    f(time, clock);
                }
            }),
        }
    }

    fn clock(id: &str, f: impl FnOnce(&mut ClockTimePicker, NaiveDateTime) + 'static) -> Self {
        Self {
            picker: id.to_string(),
            run: Box::new(move |picker, clock| {
                if let PickerWidget::Clock(dial) = picker {
                    f(dial, clock);
                }
            }),
        }
    }
}

/// Calendar interactions shared by the date and range pickers.
#[derive(Debug, Clone)]
enum CalendarInput {
    PreviousMonth,
    NextMonth,
    OpenChooser,
    Cell(GridCell),
    ChooserBack,
    ChooserPreviousYear,
    ChooserNextYear,
    ChooserYear(String),
    ChooserMonth(u32),
}

fn apply_to_single(picker: &mut SingleDatePicker, input: CalendarInput) {
    match input {
        CalendarInput::PreviousMonth => picker.previous_month(),
        CalendarInput::NextMonth => picker.next_month(),
        CalendarInput::OpenChooser => picker.open_month_year(),
        CalendarInput::Cell(cell) => picker.activate_cell(cell),
        CalendarInput::ChooserBack => picker.close_month_year(),
        CalendarInput::ChooserPreviousYear => picker.chooser_previous_year(),
        CalendarInput::ChooserNextYear => picker.chooser_next_year(),
        CalendarInput::ChooserYear(text) => picker.chooser_type_year(&text),
        CalendarInput::ChooserMonth(month) => picker.choose_month(month),
    }
}

fn apply_to_range(picker: &mut DateRangePicker, input: CalendarInput) {
    match input {
        CalendarInput::PreviousMonth => picker.previous_month(),
        CalendarInput::NextMonth => picker.next_month(),
        CalendarInput::OpenChooser => picker.open_month_year(),
        // A refused selection has already been turned into a notice.
        CalendarInput::Cell(cell) => {
            let _ = picker.activate_cell(cell);
        }
        CalendarInput::ChooserBack => picker.close_month_year(),
        CalendarInput::ChooserPreviousYear => picker.chooser_previous_year(),
        CalendarInput::ChooserNextYear => picker.chooser_next_year(),
        CalendarInput::ChooserYear(text) => picker.chooser_type_year(&text),
        CalendarInput::ChooserMonth(month) => picker.choose_month(month),
    }
}

#[derive(Default)]
struct FrameInput {
    triggered: Option<String>,
    actions: Vec<PickerAction>,
    fields: Vec<(String, egui::Rect)>,
    panel: Option<(String, egui::Rect)>,
    modal: Option<String>,
}

impl FrameInput {
    /// Classifies a click by what it landed on. The open panel wins, then the
    /// modal backdrop, then input fields.
    fn click_target(&self, pos: egui::Pos2) -> ClickTarget {
        if let Some((id, rect)) = &self.panel
            && rect.contains(pos)
        {
            return ClickTarget::Panel(id.clone());
        }
        if let Some(id) = &self.modal {
            return ClickTarget::Backdrop(id.clone());
        }
        self.fields
            .iter()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(id, _)| ClickTarget::Trigger(id.clone()))
            .unwrap_or(ClickTarget::Elsewhere)
    }
}

struct DashpickApp {
    page: Page,
    registry: PickerRegistry,
    time: SelectedTimeSource,
    canvas_origin: egui::Pos2,
    was_focused: Option<bool>,
    status_message: Option<(String, Instant)>,
}

impl DashpickApp {
    fn new(page: Page, time: SelectedTimeSource) -> Self {
        let mut registry = PickerRegistry::new();
        let report = registry.discover(&page, time.source.today());
        info!(
            pickers = report.registered.len(),
            skipped = report.skipped.len(),
            "page ready"
        );
        let mut app = Self {
            page,
            registry,
            time,
            canvas_origin: egui::Pos2::ZERO,
            was_focused: None,
            status_message: None,
        };
        if !report.skipped.is_empty() {
            app.set_status(
                format!("Skipped {} element(s) without an id.", report.skipped.len()),
                Duration::from_secs(6),
            );
        }
        app
    }

    fn set_status(&mut self, text: impl Into<String>, ttl: Duration) {
        self.status_message = Some((text.into(), Instant::now() + ttl));
    }

    fn handle_window_events(&mut self, ctx: &egui::Context, now: Instant) {
        if let Some(resize) = resize_event(self.page.viewport(), ctx.screen_rect()) {
            self.registry.broadcast(&resize, &mut self.page, now);
        }
        let (escape, focused, scroll) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Escape),
                i.viewport().focused,
                i.raw_scroll_delta.y,
            )
        });
        if escape {
            self.registry
                .broadcast(&GlobalEvent::Escape, &mut self.page, now);
        }
        if self.was_focused == Some(true) && focused == Some(false) {
            self.registry
                .broadcast(&GlobalEvent::WindowBlur, &mut self.page, now);
        }
        self.was_focused = focused;
        if scroll != 0.0 {
            let target = self.page.scroll_y() - scroll;
            self.registry.scroll_to(&mut self.page, target, now);
        }
    }

    fn show_header(&self, ui: &mut Ui, clock: NaiveDateTime) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(self.page.title())
                    .size(24.0)
                    .color(Color32::from_rgb(96, 228, 206))
                    .strong(),
            );
            ui.separator();
            ui.label(
                RichText::new(clock.format("%A, %B %-d %Y  %H:%M").to_string())
                    .size(16.0)
                    .color(LABEL),
            );
            ui.separator();
            ui.label(
                RichText::new(format!("Clock: {}", self.time.label))
                    .color(Color32::from_rgb(102, 211, 171))
                    .strong(),
            );
            if let Some(open) = self.registry.open_picker() {
                ui.separator();
                ui.label(
                    RichText::new(format!("Open: {} ({})", open.input_id(), open.kind()))
                        .color(HIGHLIGHT),
                );
            }
        });
        ui.horizontal(|ui| {
            if let Some((msg, _)) = &self.status_message {
                ui.label(
                    RichText::new(msg)
                        .color(Color32::from_rgb(255, 183, 95))
                        .strong(),
                );
            } else if self.registry.is_empty() {
                ui.label(RichText::new("No pickers on this page.").color(MUTED));
            }
        });
    }

    fn show_change_log(&self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Changes:").color(LABEL).strong());
            let changes = self.page.changes();
            if changes.is_empty() {
                ui.label(RichText::new("none yet").color(MUTED));
            }
            for change in changes.iter().rev().take(4) {
                ui.separator();
                ui.label(
                    RichText::new(format!("{} = \"{}\"", change.element, change.value))
                        .color(Color32::from_rgb(111, 228, 134)),
                );
            }
        });
    }

    fn show_page(&mut self, ui: &mut Ui, frame: &mut FrameInput) {
        let origin = ui.max_rect().min;
        self.canvas_origin = origin;
        let scroll = self.page.scroll_y();

        for element in self.page.elements() {
            let rect = egui::Rect::from_min_size(
                origin + vec2(element.rect.left, element.rect.top - scroll),
                vec2(element.rect.width.max(120.0), element.rect.height.max(28.0)),
            );
            ui.painter().text(
                rect.left_top() - vec2(0.0, 4.0),
                Align2::LEFT_BOTTOM,
                element.describe(),
                FontId::proportional(13.0),
                LABEL,
            );

            let picker = element.id.as_deref().and_then(|id| self.registry.get(id));
            let (text, color) = if element.value.is_empty() {
                (picker.map(placeholder_for).unwrap_or_default(), MUTED)
            } else {
                (element.value.clone(), Color32::WHITE)
            };
            let button = egui::Button::new(RichText::new(text).color(color))
                .fill(FIELD_BG)
                .stroke(Stroke::new(1.0, MUTED));
            let response = ui.put(rect, button);

            let (Some(id), Some(_)) = (element.id.as_deref(), picker) else {
                continue;
            };
            frame.fields.push((id.to_string(), rect));
            if response.clicked() {
                frame.triggered = Some(id.to_string());
            }
        }
    }

    fn show_open_picker(&self, ctx: &egui::Context, frame: &mut FrameInput) {
        let Some(picker) = self.registry.open_picker() else {
            return;
        };
        let Some(placement) = picker.placement() else {
            return;
        };
        let id = picker.input_id().to_string();
        let viewport = self.page.viewport();
        let height = picker.kind().placement_profile().estimated_height;
        let (left, top) = placement.origin(viewport, height);
        let today = self.time.source.today();

        if let PickerWidget::Range(_) = picker {
            egui::Area::new(egui::Id::new(("picker-backdrop", &id)))
                .order(egui::Order::Middle)
                .fixed_pos(self.canvas_origin)
                .show(ctx, |ui| {
                    let (rect, _) = ui.allocate_exact_size(
                        vec2(viewport.width, viewport.height),
                        Sense::click(),
                    );
                    ui.painter()
                        .rect_filled(rect, 0.0, Color32::from_black_alpha(160));
                });
            frame.modal = Some(id.clone());
        }

        let actions = &mut frame.actions;
        let area = egui::Area::new(egui::Id::new(("picker-panel", &id)))
            .order(egui::Order::Foreground)
            .fixed_pos(self.canvas_origin + vec2(left, top))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width((placement.width - 16.0).max(200.0));
                    match picker {
                        PickerWidget::Date(date) => show_single(ui, date, today, actions),
                        PickerWidget::Range(range) => show_range(ui, range, today, actions),
                        PickerWidget::Time(time) => show_time_list(ui, time, actions),
                        PickerWidget::Clock(dial) => show_clock(ui, dial, actions),
                    }
                });
            });
        frame.panel = Some((id, area.response.rect));
    }

    fn show_notices(&self, ctx: &egui::Context) {
        let notices = self.registry.notices().active();
        if notices.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("notices"))
            .order(egui::Order::Tooltip)
            .anchor(Align2::RIGHT_TOP, vec2(-16.0, 16.0))
            .show(ctx, |ui| {
                for notice in notices {
                    egui::Frame::NONE
                        .fill(WARNING_BG)
                        .corner_radius(6.0)
                        .inner_margin(egui::Margin::symmetric(12, 8))
                        .show(ui, |ui| {
                            ui.label(RichText::new(&notice.text).color(Color32::WHITE).strong());
                        });
                }
            });
    }

    /// Broadcasts this frame's click before running widget actions, so a
    /// trigger press closes other pickers without closing its own.
    fn apply_frame(
        &mut self,
        ctx: &egui::Context,
        frame: FrameInput,
        clock: NaiveDateTime,
        now: Instant,
    ) {
        let clicked_at = ctx.input(|i| {
            if i.pointer.any_click() {
                i.pointer.interact_pos()
            } else {
                None
            }
        });
        if let Some(pos) = clicked_at {
            let target = frame.click_target(pos);
            self.registry
                .broadcast(&GlobalEvent::Click(target), &mut self.page, now);
        }
        if let Some(id) = &frame.triggered {
            self.registry
                .activate_trigger(id, &mut self.page, clock, now);
        }
        for action in frame.actions {
            let run = action.run;
            self.registry
                .act(&action.picker, &mut self.page, now, |picker| run(picker, clock));
        }
    }
}

impl eframe::App for DashpickApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        if let Some((_, expires_at)) = &self.status_message
            && now >= *expires_at
        {
            self.status_message = None;
        }

        self.registry.tick(&mut self.page, now);
        self.handle_window_events(ctx, now);
        let clock = self.time.source.now();
        let mut frame = FrameInput::default();

        TopBottomPanel::top("header")
            .resizable(false)
            .exact_height(HEADER_HEIGHT)
            .show(ctx, |ui| self.show_header(ui, clock));

        TopBottomPanel::bottom("footer")
            .resizable(false)
            .exact_height(FOOTER_HEIGHT)
            .show(ctx, |ui| self.show_change_log(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.show_page(ui, &mut frame));

        self.show_open_picker(ctx, &mut frame);
        self.show_notices(ctx);
        self.apply_frame(ctx, frame, clock, now);

        if let Some(wake) = self.registry.next_wakeup() {
            ctx.request_repaint_after(wake.saturating_duration_since(Instant::now()));
        }
    }
}

/// Page viewport for a window: the screen less the fixed header and footer
/// bands. Panel contents never change it.
fn canvas_viewport(screen: egui::Rect) -> Viewport {
    Viewport {
        width: screen.width(),
        height: (screen.height() - HEADER_HEIGHT - FOOTER_HEIGHT).max(1.0),
    }
}

fn resize_event(current: Viewport, screen: egui::Rect) -> Option<GlobalEvent> {
    let viewport = canvas_viewport(screen);
    (viewport != current).then_some(GlobalEvent::Resize(viewport))
}

fn placeholder_for(picker: &PickerWidget) -> String {
    match picker {
        PickerWidget::Date(date) => date.options().placeholder.clone(),
        PickerWidget::Range(_) => "Select date range...".to_string(),
        PickerWidget::Time(time) => time.options().placeholder.clone(),
        PickerWidget::Clock(_) => "Select time...".to_string(),
    }
}

fn show_single(
    ui: &mut Ui,
    picker: &SingleDatePicker,
    today: chrono::NaiveDate,
    actions: &mut Vec<PickerAction>,
) {
    let id = picker.input_id();
    if let Some(input) = show_calendar(ui, id, picker.view(), &picker.day_cells(today)) {
        actions.push(PickerAction::date(id, move |date, _| {
            apply_to_single(date, input)
        }));
    }
    if picker.view().chooser().is_some() {
        return;
    }
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Today").clicked() {
            actions.push(PickerAction::date(id, |date, clock| date.today(clock.date())));
        }
        if ui.button("Clear").clicked() {
            actions.push(PickerAction::date(id, |date, _| date.clear()));
        }
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui.button("Close").clicked() {
                actions.push(PickerAction::date(id, |date, _| date.close()));
            }
        });
    });
}

fn show_range(
    ui: &mut Ui,
    picker: &DateRangePicker,
    today: chrono::NaiveDate,
    actions: &mut Vec<PickerAction>,
) {
    let id = picker.input_id();
    ui.horizontal(|ui| {
        ui.label(RichText::new("Select date range").size(18.0).strong());
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui.button("x").clicked() {
                actions.push(PickerAction::range(id, |range, _| range.close()));
            }
        });
    });
    ui.horizontal(|ui| {
        let from = egui::Button::new(format!("From: {}", or_dash(picker.from_text())))
            .selected(picker.active_edge() == RangeEdge::From);
        if ui.add(from).clicked() {
            actions.push(PickerAction::range(id, |range, _| range.activate_from()));
        }
        let mut to = egui::Button::new(format!("To: {}", or_dash(picker.to_text())))
            .selected(picker.active_edge() == RangeEdge::To);
        if picker.is_to_pulsing() {
            to = to.fill(WARNING_BG);
        } else if picker.range().from().is_none() {
            to = to.fill(Color32::from_rgb(40, 46, 56));
        }
        if ui.add(to).clicked() {
            actions.push(PickerAction::range(id, |range, _| {
                // A refusal is reported through the picker's own warning.
                let _ = range.activate_to();
            }));
        }
    });
    ui.separator();
    if let Some(input) = show_calendar(ui, id, picker.view(), &picker.day_cells(today)) {
        actions.push(PickerAction::range(id, move |range, _| {
            apply_to_range(range, input)
        }));
    }
    if picker.view().chooser().is_some() {
        return;
    }
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Today").clicked() {
            actions.push(PickerAction::range(id, |range, clock| range.today(clock.date())));
        }
        if ui.button("Clear").clicked() {
            actions.push(PickerAction::range(id, |range, _| range.clear()));
        }
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui.button("Apply").clicked() {
                actions.push(PickerAction::range(id, |range, _| range.apply()));
            }
        });
    });
}

fn or_dash(text: String) -> String {
    if text.is_empty() { "-".to_string() } else { text }
}

fn show_calendar(
    ui: &mut Ui,
    salt: &str,
    view: &CalendarView,
    cells: &[DayCell],
) -> Option<CalendarInput> {
    let mut input = None;

    if let Some(chooser) = view.chooser() {
        ui.horizontal(|ui| {
            if ui.button("<").clicked() {
                input = Some(CalendarInput::ChooserPreviousYear);
            }
            let mut year = chooser.year();
            if ui.add(egui::DragValue::new(&mut year).speed(0.2)).changed() {
                input = Some(CalendarInput::ChooserYear(year.to_string()));
            }
            if ui.button(">").clicked() {
                input = Some(CalendarInput::ChooserNextYear);
            }
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button("Back").clicked() {
                    input = Some(CalendarInput::ChooserBack);
                }
            });
        });
        egui::Grid::new(("months", salt))
            .num_columns(4)
            .spacing(vec2(6.0, 6.0))
            .show(ui, |ui| {
                for (index, name) in MONTH_SHORT_NAMES.iter().enumerate() {
                    let month = index as u32;
                    let button = egui::Button::new(*name)
                        .selected(month == chooser.month())
                        .min_size(vec2(56.0, 28.0));
                    if ui.add(button).clicked() {
                        input = Some(CalendarInput::ChooserMonth(month));
                    }
                    if index % 4 == 3 {
                        ui.end_row();
                    }
                }
            });
        return input;
    }

    ui.horizontal(|ui| {
        if ui.button("<").clicked() {
            input = Some(CalendarInput::PreviousMonth);
        }
        let label = RichText::new(view.cursor().label()).strong();
        if ui.add(egui::Button::new(label).frame(false)).clicked() {
            input = Some(CalendarInput::OpenChooser);
        }
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui.button(">").clicked() {
                input = Some(CalendarInput::NextMonth);
            }
        });
    });

    egui::Grid::new(("days", salt))
        .num_columns(7)
        .spacing(vec2(4.0, 4.0))
        .show(ui, |ui| {
            for label in WEEKDAY_LABELS {
                ui.label(RichText::new(label).color(MUTED).small());
            }
            ui.end_row();
            for week in cells.chunks(7) {
                for day in week {
                    if ui.add(day_button(day)).clicked() {
                        input = Some(CalendarInput::Cell(day.cell));
                    }
                }
                ui.end_row();
            }
        });
    input
}

fn day_button(day: &DayCell) -> egui::Button<'static> {
    let marks = day.marks;
    let mut text = RichText::new(day.cell.day.to_string());
    if marks.muted {
        text = text.color(MUTED);
    }
    if marks.today || marks.selected {
        text = text.strong();
    }
    let fill = if marks.selected {
        ACCENT
    } else if marks.in_range {
        RANGE_FILL
    } else {
        Color32::TRANSPARENT
    };
    let stroke = if marks.today {
        Stroke::new(1.0, HIGHLIGHT)
    } else {
        Stroke::NONE
    };
    egui::Button::new(text)
        .fill(fill)
        .stroke(stroke)
        .min_size(vec2(32.0, 28.0))
}

fn show_time_list(ui: &mut Ui, picker: &TimePicker, actions: &mut Vec<PickerAction>) {
    let id = picker.input_id();
    let value = picker.value();
    ui.vertical_centered(|ui| {
        ui.label(RichText::new(picker.display_text()).size(22.0).strong());
    });

    ui.label(RichText::new("Hour").color(LABEL));
    egui::Grid::new(("hours", id)).num_columns(6).show(ui, |ui| {
        for hour in picker.hour_options() {
            let button = egui::Button::new(format!("{hour:02}")).selected(value.hour12() == hour);
            if ui.add(button).clicked() {
                actions.push(PickerAction::time(id, move |time, _| time.select_hour(hour)));
            }
            if hour % 6 == 0 {
                ui.end_row();
            }
        }
    });

    ui.label(RichText::new("Minute").color(LABEL));
    egui::Grid::new(("minutes", id)).num_columns(6).show(ui, |ui| {
        for (index, minute) in picker.minute_options().into_iter().enumerate() {
            let button =
                egui::Button::new(format!("{minute:02}")).selected(value.minute() == minute);
            if ui.add(button).clicked() {
                actions.push(PickerAction::time(id, move |time, _| time.select_minute(minute)));
            }
            if index % 6 == 5 {
                ui.end_row();
            }
        }
    });

    ui.horizontal(|ui| {
        for period in [Period::Am, Period::Pm] {
            if ui
                .add(egui::Button::new(period.label()).selected(value.period() == period))
                .clicked()
            {
                actions.push(PickerAction::time(id, move |time, _| time.select_period(period)));
            }
        }
    });

    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Now").clicked() {
            actions.push(PickerAction::time(id, |time, clock| time.now(clock.time())));
        }
        if ui.button("Clear").clicked() {
            actions.push(PickerAction::time(id, |time, _| time.clear()));
        }
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui.button("Apply").clicked() {
                actions.push(PickerAction::time(id, |time, _| time.apply()));
            }
        });
    });
}

fn show_clock(ui: &mut Ui, picker: &ClockTimePicker, actions: &mut Vec<PickerAction>) {
    let id = picker.input_id();
    ui.vertical_centered(|ui| {
        ui.label(RichText::new(picker.display_text()).size(20.0).strong());
        ui.horizontal(|ui| {
            for (mode, label) in [(DialMode::Hours, "Hours"), (DialMode::Minutes, "Minutes")] {
                if ui.selectable_label(picker.mode() == mode, label).clicked() {
                    actions.push(PickerAction::clock(id, move |dial, _| dial.set_mode(mode)));
                }
            }
        });
    });

    let geometry = picker.geometry();
    let (rect, response) =
        ui.allocate_exact_size(vec2(geometry.width, geometry.height), Sense::click());
    paint_dial(ui, rect, picker);

    if let Some(pos) = response.hover_pos() {
        let rel = pos - rect.min;
        actions.push(PickerAction::clock(id, move |dial, _| dial.hover(rel.x, rel.y)));
    } else if picker.preview().is_some() {
        actions.push(PickerAction::clock(id, |dial, _| dial.leave()));
    }
    if response.clicked()
        && let Some(pos) = response.interact_pointer_pos()
    {
        let rel = pos - rect.min;
        actions.push(PickerAction::clock(id, move |dial, _| dial.click(rel.x, rel.y)));
    }

    ui.horizontal(|ui| {
        for period in [Period::Am, Period::Pm] {
            if ui
                .selectable_label(picker.value().period() == period, period.label())
                .clicked()
            {
                actions.push(PickerAction::clock(id, move |dial, _| dial.select_period(period)));
            }
        }
        ui.separator();
        if ui.button("Now").clicked() {
            actions.push(PickerAction::clock(id, |dial, clock| dial.now(clock.time())));
        }
        if ui.button("Clear").clicked() {
            actions.push(PickerAction::clock(id, |dial, _| dial.clear()));
        }
        if ui.button("Apply").clicked() {
            actions.push(PickerAction::clock(id, |dial, _| dial.apply()));
        }
    });
}

fn paint_dial(ui: &Ui, rect: egui::Rect, picker: &ClockTimePicker) {
    let geometry = picker.geometry();
    let (cx, cy) = geometry.center();
    let center = rect.min + vec2(cx, cy);
    let face = geometry.face_radius();
    let painter = ui.painter_at(rect);
    let direction = |degrees: f32| {
        let radians = degrees.to_radians();
        vec2(radians.cos(), radians.sin())
    };

    painter.circle_stroke(center, face, Stroke::new(2.0, MUTED));
    painter.circle_filled(center, DialGeometry::DEAD_ZONE / 4.0, LABEL);
    for slot in 1..=12u32 {
        let label = match picker.mode() {
            DialMode::Hours => slot.to_string(),
            DialMode::Minutes => format!("{:02}", (slot % 12) * 5),
        };
        painter.text(
            center + direction(slot as f32 * 30.0 - 90.0) * (face - 14.0),
            Align2::CENTER_CENTER,
            label,
            FontId::proportional(12.0),
            LABEL,
        );
    }
    painter.line_segment(
        [
            center,
            center + direction(picker.hour_hand_degrees()) * face * 0.5,
        ],
        Stroke::new(4.0, Color32::WHITE),
    );
    painter.line_segment(
        [
            center,
            center + direction(picker.minute_hand_degrees()) * face * 0.8,
        ],
        Stroke::new(2.0, ACCENT),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{DEMO_PAGE, parse_page_text};
    use crate::time_source::select_time_source;

    fn window(width: f32, height: f32) -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::ZERO, vec2(width, height))
    }

    #[test]
    fn viewport_is_the_window_less_fixed_bands() {
        assert_eq!(
            canvas_viewport(window(600.0, 800.0)),
            Viewport {
                width: 600.0,
                height: 800.0 - HEADER_HEIGHT - FOOTER_HEIGHT,
            }
        );
        assert_eq!(canvas_viewport(window(360.0, 40.0)).height, 1.0);
    }

    #[test]
    fn opening_a_time_picker_in_a_steady_window_keeps_it_open() {
        let screen = window(600.0, 800.0);
        let mut page = parse_page_text(DEMO_PAGE).expect("demo page");
        page.set_viewport(canvas_viewport(screen));
        let selected = select_time_source(Some("2025-03-02T10:00")).expect("pinned");
        let mut registry = PickerRegistry::new();
        registry.discover(&page, selected.source.today());

        let start = Instant::now();
        assert!(registry.activate_trigger("meeting-time", &mut page, selected.source.now(), start));
        assert_eq!(resize_event(page.viewport(), screen), None);
        registry.tick(&mut page, start + Duration::from_millis(250));
        assert_eq!(
            registry.open_picker().map(PickerWidget::input_id),
            Some("meeting-time")
        );

        let resize = resize_event(page.viewport(), window(900.0, 800.0)).expect("window resized");
        registry.broadcast(&resize, &mut page, start);
        registry.tick(&mut page, start + Duration::from_millis(250));
        assert!(registry.open_picker().is_none());
    }
}
