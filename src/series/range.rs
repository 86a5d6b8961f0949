//! Built-in calendar series shapes.

use std::fmt;
use std::str::FromStr;

use crate::SeriesError;

const YEAR_START: &str = "date_trunc('year', now())";
const YEAR_END: &str = "date_trunc('year', now()) + INTERVAL '1 year - 1 day'";

/// A calendar series that a query can be joined against.
///
/// Each variant supplies the building blocks of a `generate_series` call:
/// the first and last instant, the step between rows, the alias given to
/// each generated row, and the condition used when the caller does not
/// override it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesRange {
    /// One row per day of the current year.
    DaysOfYear,
    /// One row per month of the current year.
    MonthsOfYear,
}

impl SeriesRange {
    /// Every built-in range, in declaration order.
    pub const ALL: [SeriesRange; 2] = [SeriesRange::DaysOfYear, SeriesRange::MonthsOfYear];

    /// First instant of the series.
    pub fn start_expr(&self) -> &'static str {
        match self {
            SeriesRange::DaysOfYear | SeriesRange::MonthsOfYear => YEAR_START,
        }
    }

    /// Last instant of the series.
    pub fn end_expr(&self) -> &'static str {
        match self {
            SeriesRange::DaysOfYear | SeriesRange::MonthsOfYear => YEAR_END,
        }
    }

    /// Increment between generated rows.
    pub fn step_interval(&self) -> &'static str {
        match self {
            SeriesRange::DaysOfYear => "INTERVAL '1 day'",
            SeriesRange::MonthsOfYear => "INTERVAL '1 month'",
        }
    }

    /// Column alias of each generated row. Doubles as the `date_trunc`
    /// precision and the ordering key.
    pub fn step_label(&self) -> &'static str {
        match self {
            SeriesRange::DaysOfYear => "day",
            SeriesRange::MonthsOfYear => "month",
        }
    }

    /// `ON` predicate used when the caller does not override it.
    pub fn default_join_condition(&self) -> &'static str {
        match self {
            SeriesRange::DaysOfYear => "day = date_trunc('day', created_at)",
            SeriesRange::MonthsOfYear => "month = date_trunc('month', created_at)",
        }
    }
}

impl fmt::Display for SeriesRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.step_label())
    }
}

impl FromStr for SeriesRange {
    type Err = SeriesError;

    /// Looks a range up by name.
    ///
    /// ```ignore
    /// let range: SeriesRange = "months".parse()?;
    /// assert_eq!(range, SeriesRange::MonthsOfYear);
    /// ```
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_lowercase().as_str() {
            "day" | "days" | "days_year" => Ok(SeriesRange::DaysOfYear),
            "month" | "months" | "months_year" => Ok(SeriesRange::MonthsOfYear),
            _ => Err(SeriesError::UnknownRange(name.to_string())),
        }
    }
}
