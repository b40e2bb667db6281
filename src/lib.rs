//! Calendar date, date range and time pickers bound to the input fields of a
//! described page. The binary drives these from an eframe window or prints a
//! headless diagnostics report.

pub mod calendar;
pub mod diagnostics;
pub mod error;
pub mod page;
pub mod picker;
pub mod placement;
pub mod registry;
pub mod time_source;
pub mod timers;
pub mod ui;
