use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Where "Today" and "Now" come from.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    fn time_of_day(&self) -> NaiveTime {
        self.now().time()
    }
}

pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Frozen clock, for reproducible sessions and reports.
pub struct PinnedTimeSource {
    pinned: NaiveDateTime,
}

impl PinnedTimeSource {
    pub fn new(pinned: NaiveDateTime) -> Self {
        Self { pinned }
    }
}

impl TimeSource for PinnedTimeSource {
    fn now(&self) -> NaiveDateTime {
        self.pinned
    }
}

pub struct SelectedTimeSource {
    pub source: Box<dyn TimeSource>,
    pub label: &'static str,
}

pub fn select_time_source(pinned: Option<&str>) -> Result<SelectedTimeSource> {
    match pinned {
        Some(raw) => Ok(SelectedTimeSource {
            source: Box::new(PinnedTimeSource::new(parse_local_datetime(raw)?)),
            label: "PINNED",
        }),
        None => Ok(SelectedTimeSource {
            source: Box::new(SystemTimeSource),
            label: "SYSTEM_LOCAL",
        }),
    }
}

/// ISO local datetime, with or without seconds, or a bare date (midnight).
pub fn parse_local_datetime(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN))
        })
        .with_context(|| format!("invalid datetime '{input}', expected ISO local datetime"))
}
