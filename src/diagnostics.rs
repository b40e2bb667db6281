use std::fmt::Write as _;

use anyhow::{Result, bail};

use crate::calendar::WEEKDAY_LABELS;
use crate::calendar::grid::{CellOrigin, ViewCursor, compute_grid, is_leap_year};
use crate::page::Page;
use crate::picker::PickerWidget;
use crate::placement::{Side, place};
use crate::registry::PickerRegistry;
use crate::time_source::SelectedTimeSource;

/// Parses `YYYY-MM` into a calendar cursor.
pub fn parse_month(input: &str) -> Result<ViewCursor> {
    let Some((year, month)) = input.trim().split_once('-') else {
        bail!("invalid month '{input}', expected YYYY-MM");
    };
    let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<i64>()) else {
        bail!("invalid month '{input}', expected YYYY-MM");
    };
    if !(1..=12).contains(&month) {
        bail!("month must be between 01 and 12, got {month}");
    }
    Ok(ViewCursor::new(year, month - 1))
}

pub fn run_diagnostics(
    page: &Page,
    selected: &SelectedTimeSource,
    month: Option<ViewCursor>,
) -> Result<()> {
    print!("{}", render_report(page, selected, month)?);
    Ok(())
}

pub fn render_report(
    page: &Page,
    selected: &SelectedTimeSource,
    month: Option<ViewCursor>,
) -> Result<String> {
    let now = selected.source.now();
    let today = now.date();
    let mut registry = PickerRegistry::new();
    let report = registry.discover(page, today);
    let viewport = page.viewport();

    let mut out = String::new();
    writeln!(out, "dashpick diagnostics")?;
    writeln!(out, "Page: {} ({} elements)", page.title(), page.elements().len())?;
    writeln!(out, "Viewport: {}x{}", viewport.width, viewport.height)?;
    writeln!(
        out,
        "Time source: {} ({})",
        selected.label,
        now.format("%Y-%m-%d %H:%M")
    )?;

    writeln!(out, "Pickers: {}", registry.len())?;
    if registry.is_empty() {
        writeln!(out, "  no marked elements on this page")?;
    }
    for picker in registry.pickers() {
        let id = picker.input_id();
        let kind = picker.kind();
        let anchor = page.anchor(id).unwrap_or_default();
        let profile = kind.placement_profile();
        let placement = place(anchor, viewport, profile);
        let (left, top) = placement.origin(viewport, profile.estimated_height);
        let side = match placement.side {
            Side::Below => "below",
            Side::Above => "above",
            Side::Centered => "centered",
        };
        writeln!(
            out,
            "  {id:<20} {:<18} {:<28} opens {side} at ({left:.0}, {top:.0}) width {:.0}",
            kind.label(),
            options_summary(picker),
            placement.width
        )?;
    }

    if !report.skipped.is_empty() {
        let noun = if report.skipped.len() == 1 {
            "element"
        } else {
            "elements"
        };
        writeln!(out, "Skipped {} {noun}", report.skipped.len())?;
        for err in &report.skipped {
            writeln!(out, "  {err}")?;
        }
    }

    if let Some(cursor) = month {
        let leap = if is_leap_year(cursor.year()) {
            ", leap year"
        } else {
            ""
        };
        writeln!(
            out,
            "Calendar: {} ({} days{leap})",
            cursor.label(),
            cursor.days_in_month()
        )?;
        write_grid(&mut out, cursor, today)?;
    }
    Ok(out)
}

fn options_summary(picker: &PickerWidget) -> String {
    match picker {
        PickerWidget::Date(date) => format!("format {}", date.options().format),
        PickerWidget::Range(range) => format!("format {}", range.options().format),
        PickerWidget::Time(time) => format!(
            "step {} min, format {}",
            time.options().step.minutes(),
            time.options().format
        ),
        PickerWidget::Clock(_) => "dial".to_string(),
    }
}

/// Adjacent-month days in parentheses, today in brackets.
fn write_grid(out: &mut String, cursor: ViewCursor, today: chrono::NaiveDate) -> Result<()> {
    for label in WEEKDAY_LABELS {
        write!(out, " {label:>4}")?;
    }
    writeln!(out)?;
    let grid = compute_grid(cursor.year(), cursor.month());
    for week in grid.weeks() {
        for cell in week {
            let text = match cell.origin {
                CellOrigin::Current if cell.date(cursor) == Some(today) => {
                    format!("[{}]", cell.day)
                }
                CellOrigin::Current => cell.day.to_string(),
                CellOrigin::Previous | CellOrigin::Next => format!("({})", cell.day),
            };
            write!(out, " {text:>4}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{DEMO_PAGE, parse_page_text};
    use crate::time_source::select_time_source;

    #[test]
    fn parses_month_arguments() {
        assert_eq!(parse_month("2024-02").expect("valid"), ViewCursor::new(2024, 1));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("February").is_err());
    }

    #[test]
    fn report_lists_pickers_and_grid() {
        let page = parse_page_text(DEMO_PAGE).expect("demo page");
        let selected = select_time_source(Some("2024-02-14T08:00:00")).expect("pinned");
        let report =
            render_report(&page, &selected, Some(ViewCursor::new(2024, 1))).expect("report");

        assert!(report.contains("Pickers: 5"));
        assert!(report.contains("due-date"));
        assert!(report.contains("format dd-mm-yyyy"));
        assert!(report.contains("step 15 min"));
        assert!(report.contains("Calendar: February 2024 (29 days, leap year)"));
        assert!(report.contains("[14]"));
        assert!(report.contains("29"));
        assert!(report.contains("(28)"));
        // The reminder field sits low on the page and flips its dial upward.
        let reminder = report
            .lines()
            .find(|line| line.contains("alarm-time"))
            .expect("alarm-time line");
        assert!(reminder.contains("opens above"));
        assert!(!report.contains("Skipped"));
    }

    #[test]
    fn empty_page_and_common_year() {
        let page = parse_page_text(r#"{ "version": 1, "title": "Blank" }"#).expect("blank page");
        let selected = select_time_source(Some("2023-02-01")).expect("pinned");
        let report =
            render_report(&page, &selected, Some(ViewCursor::new(2023, 1))).expect("report");
        assert!(report.contains("Pickers: 0"));
        assert!(report.contains("no marked elements"));
        assert!(report.contains("Calendar: February 2023 (28 days)"));
    }
}
