//! Turns partial dates such as "Wednesday, 8 October" into calendar dates.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, ParseError as ChronoParseError};

/// Days a parsed date may lie in the past before it is read as next year's.
pub const DEFAULT_ROLLOVER_GRACE_DAYS: i64 = 7;

const DATE_FORMAT: &str = "%d %B %Y";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Reasons a partial date could not be resolved.
pub enum ResolveError {
    /// Nothing left to parse after stripping the weekday.
    #[error("empty date text")]
    Empty,
    /// Day or month did not parse for the chosen year.
    #[error("unparseable date {raw:?}: {source}")]
    Malformed {
        /// Text that was handed to the parser.
        raw: String,
        /// Underlying chrono failure.
        source: ChronoParseError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Year inference policy for dates published without a year.
pub struct DateResolver {
    grace: Duration,
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::new(Duration::days(DEFAULT_ROLLOVER_GRACE_DAYS))
    }
}

impl DateResolver {
    /// Create a resolver with a custom rollover grace window.
    #[must_use]
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }

    /// Grace window applied before rolling a date into next year.
    #[must_use]
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Resolve `raw` against the year of `reference_now`.
    ///
    /// A leading `"<weekday>,"` is dropped. Dates more than the grace window
    /// before `reference_now` (compared by calendar day) are moved to the
    /// following year.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the day or month cannot be parsed, or the
    /// day does not exist in the resolved year.
    pub fn resolve(&self, raw: &str, reference_now: NaiveDateTime) -> Result<NaiveDate, ResolveError> {
        let day_month = strip_weekday(raw);
        if day_month.is_empty() {
            return Err(ResolveError::Empty);
        }

        let year = reference_now.year();
        let parsed = parse_in_year(day_month, year)?;

        let earliest_kept = reference_now.date() - self.grace;
        if parsed < earliest_kept {
            return parse_in_year(day_month, year + 1);
        }

        Ok(parsed)
    }
}

/// Resolve with the default seven day grace window.
///
/// # Errors
///
/// See [`DateResolver::resolve`].
pub fn resolve(raw: &str, reference_now: NaiveDateTime) -> Result<NaiveDate, ResolveError> {
    DateResolver::default().resolve(raw, reference_now)
}

fn strip_weekday(raw: &str) -> &str {
    raw.split_once(',')
        .map_or(raw, |(_weekday, rest)| rest)
        .trim()
}

fn parse_in_year(day_month: &str, year: i32) -> Result<NaiveDate, ResolveError> {
    let text = format!("{day_month} {year}");
    NaiveDate::parse_from_str(&text, DATE_FORMAT)
        .map_err(|source| ResolveError::Malformed { raw: text, source })
}
