use std::fmt;

use chrono::NaiveDate;

/// Closed set of display patterns a date picker can write into its input.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum DatePattern {
    /// "January 5, 2025"
    #[default]
    Long,
    /// "Jan 5, 2025"
    Short,
    /// en-US numeric, "1/5/2025"
    Numeric,
    DayMonthYearDash,
    MonthDayYearDash,
    YearMonthDayDash,
    DayMonthYearSlash,
    MonthDayYearSlash,
}

impl DatePattern {
    pub const ALL: [DatePattern; 8] = [
        DatePattern::Long,
        DatePattern::Short,
        DatePattern::Numeric,
        DatePattern::DayMonthYearDash,
        DatePattern::MonthDayYearDash,
        DatePattern::YearMonthDayDash,
        DatePattern::DayMonthYearSlash,
        DatePattern::MonthDayYearSlash,
    ];

    /// Exact lookup of a configured pattern name.
    pub fn parse_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|pattern| pattern.name() == name)
    }

    /// Resolves a configured pattern name. Unknown names fall back to `Long`.
    pub fn from_name(name: &str) -> Self {
        Self::parse_name(name).unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            DatePattern::Long => "long",
            DatePattern::Short => "short",
            DatePattern::Numeric => "numeric",
            DatePattern::DayMonthYearDash => "dd-mm-yyyy",
            DatePattern::MonthDayYearDash => "mm-dd-yyyy",
            DatePattern::YearMonthDayDash => "yyyy-mm-dd",
            DatePattern::DayMonthYearSlash => "dd/mm/yyyy",
            DatePattern::MonthDayYearSlash => "mm/dd/yyyy",
        }
    }

    fn strftime(self) -> &'static str {
        match self {
            DatePattern::Long => "%B %-d, %Y",
            DatePattern::Short => "%b %-d, %Y",
            DatePattern::Numeric => "%-m/%-d/%Y",
            DatePattern::DayMonthYearDash => "%d-%m-%Y",
            DatePattern::MonthDayYearDash => "%m-%d-%Y",
            DatePattern::YearMonthDayDash => "%Y-%m-%d",
            DatePattern::DayMonthYearSlash => "%d/%m/%Y",
            DatePattern::MonthDayYearSlash => "%m/%d/%Y",
        }
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn format_date(date: NaiveDate, pattern: DatePattern) -> String {
    date.format(pattern.strftime()).to_string()
}

/// Inverse of [`format_date`] for the same pattern.
pub fn parse_date(text: &str, pattern: DatePattern) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), pattern.strftime()).ok()
}
