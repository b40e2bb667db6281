use std::fmt;

use chrono::{NaiveTime, Timelike};

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum Period {
    Am,
    #[default]
    Pm,
}

impl Period {
    pub fn label(self) -> &'static str {
        match self {
            Period::Am => "AM",
            Period::Pm => "PM",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Wall-clock time as the pickers hold it: 12-hour face plus period.
///
/// Defaults to 12:00 PM, the value a cleared picker shows.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct TimeValue {
    hour12: u8,
    minute: u8,
    period: Period,
}

impl Default for TimeValue {
    fn default() -> Self {
        Self {
            hour12: 12,
            minute: 0,
            period: Period::Pm,
        }
    }
}

impl TimeValue {
    /// Out-of-range faces are folded back onto the dial: hour 0 reads as 12,
    /// hour 13 as 1, minute 75 as 15.
    pub fn new(hour12: u8, minute: u8, period: Period) -> Self {
        let hour12 = match hour12 % 12 {
            0 => 12,
            hour => hour,
        };
        Self {
            hour12,
            minute: minute % 60,
            period,
        }
    }

    /// 0 -> 12 AM, 1..=11 -> AM, 12 -> 12 PM, 13..=23 -> h-12 PM.
    pub fn from_naive_time(time: NaiveTime) -> Self {
        let (is_pm, hour12) = time.hour12();
        Self {
            hour12: hour12 as u8,
            minute: time.minute() as u8,
            period: if is_pm { Period::Pm } else { Period::Am },
        }
    }

    pub fn from_hour24(hour: u32, minute: u32) -> Self {
        let total = (hour * 60 + minute) % MINUTES_PER_DAY;
        match NaiveTime::from_hms_opt(total / 60, total % 60, 0) {
            Some(time) => Self::from_naive_time(time),
            None => Self::default(),
        }
    }

    pub fn hour12(&self) -> u8 {
        self.hour12
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn hour24(&self) -> u32 {
        let base = u32::from(self.hour12 % 12);
        match self.period {
            Period::Am => base,
            Period::Pm => base + 12,
        }
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour24(), u32::from(self.minute), 0).unwrap_or(NaiveTime::MIN)
    }

    pub fn with_hour12(self, hour12: u8) -> Self {
        Self::new(hour12, self.minute, self.period)
    }

    pub fn with_minute(self, minute: u8) -> Self {
        Self::new(self.hour12, minute, self.period)
    }

    pub fn with_period(self, period: Period) -> Self {
        Self { period, ..self }
    }

    /// "09:05 PM", the list picker's field format.
    pub fn padded_label(&self) -> String {
        format!("{:02}:{:02} {}", self.hour12, self.minute, self.period)
    }

    /// "9:05 PM", the dial picker's field format.
    pub fn compact_label(&self) -> String {
        format!("{}:{:02} {}", self.hour12, self.minute, self.period)
    }
}

/// Rounds to the nearest multiple of `step` minutes, halves rounding up.
/// Reaching the top of the hour carries into the next hour (and past
/// midnight back to 00:00).
pub fn round_to_step(time: NaiveTime, step: u32) -> NaiveTime {
    let step = step.clamp(1, 60);
    let minute = time.minute();
    let rounded = (minute * 2 + step) / (2 * step) * step;
    let total = (time.hour() * 60 + rounded) % MINUTES_PER_DAY;
    NaiveTime::from_hms_opt(total / 60, total % 60, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
    }

    #[test]
    fn boundary_hours_convert_both_ways() {
        let cases = [
            (0, 12, Period::Am),
            (12, 12, Period::Pm),
            (13, 1, Period::Pm),
            (23, 11, Period::Pm),
            (1, 1, Period::Am),
            (11, 11, Period::Am),
        ];
        for (hour24, hour12, period) in cases {
            let value = TimeValue::from_hour24(hour24, 30);
            assert_eq!((value.hour12(), value.period()), (hour12, period), "{hour24}");
            assert_eq!(TimeValue::new(hour12, 30, period).hour24(), hour24);
        }
    }

    #[test]
    fn every_hour_round_trips() {
        for hour in 0..24 {
            let value = TimeValue::from_naive_time(hm(hour, 7));
            assert_eq!(value.to_naive_time(), hm(hour, 7));
        }
    }

    #[test]
    fn labels_match_field_formats() {
        let value = TimeValue::new(9, 5, Period::Pm);
        assert_eq!(value.padded_label(), "09:05 PM");
        assert_eq!(value.compact_label(), "9:05 PM");
        assert_eq!(TimeValue::default().padded_label(), "12:00 PM");
    }

    #[test]
    fn faces_are_folded_onto_the_dial() {
        assert_eq!(TimeValue::new(0, 75, Period::Am), TimeValue::new(12, 15, Period::Am));
        assert_eq!(TimeValue::new(13, 0, Period::Am).hour12(), 1);
    }

    #[test]
    fn rounding_to_step_carries_into_the_hour() {
        assert_eq!(round_to_step(hm(9, 7), 15), hm(9, 0));
        assert_eq!(round_to_step(hm(9, 8), 15), hm(9, 15));
        assert_eq!(round_to_step(hm(9, 53), 15), hm(10, 0));
        assert_eq!(round_to_step(hm(23, 58), 30), hm(0, 0));
        assert_eq!(round_to_step(hm(14, 42), 5), hm(14, 40));
        assert_eq!(round_to_step(hm(14, 29), 60), hm(14, 0));
        assert_eq!(round_to_step(hm(14, 30), 60), hm(15, 0));
    }
}
