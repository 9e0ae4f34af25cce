//! Date handling for the Things database and tool parameters.
//!
//! Things stores calendar dates (`startDate`, `deadline`) as packed integers
//! `year << 16 | month << 12 | day << 7`, and timestamps (`creationDate`,
//! `stopDate`) as Unix seconds in a REAL column.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid period '{0}': expected a number followed by d, w, m, or y (e.g. '7d')")]
    InvalidPeriod(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Encode a calendar date in the Things packed format.
pub fn pack_date(date: NaiveDate) -> i64 {
    (i64::from(date.year()) << 16) | (i64::from(date.month()) << 12) | (i64::from(date.day()) << 7)
}

/// Decode a Things packed date. Returns `None` for zero or out-of-range values.
pub fn unpack_date(packed: i64) -> Option<NaiveDate> {
    if packed <= 0 {
        return None;
    }
    let year = (packed >> 16) as i32;
    let month = ((packed >> 12) & 0xF) as u32;
    let day = ((packed >> 7) & 0x1F) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Decode a Unix timestamp (seconds, possibly fractional) to a UTC date-time.
pub fn timestamp_to_datetime(seconds: f64) -> Option<NaiveDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.trunc() as i64;
    let nanos = ((seconds - seconds.trunc()) * 1e9) as u32;
    DateTime::from_timestamp(whole, nanos).map(|dt| dt.naive_utc())
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DateError::InvalidDate(value.to_string()))
}

/// Days from `today` to `date` (negative when `date` is in the past).
pub fn days_from_today(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// Parse a relative period such as `3d`, `2w`, `1m`, `1y`.
///
/// Months count as 30 days and years as 365. Periods reaching back past the
/// representable calendar are rejected.
pub fn parse_period(period: &str) -> Result<Duration, DateError> {
    let trimmed = period.trim();
    let invalid = || DateError::InvalidPeriod(period.to_string());

    let unit = trimmed.chars().last().ok_or_else(invalid)?;
    let amount: i64 = trimmed[..trimmed.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| invalid())?;
    if amount < 0 {
        return Err(invalid());
    }

    let factor = match unit.to_ascii_lowercase() {
        'd' => 1,
        'w' => 7,
        'm' => 30,
        'y' => 365,
        _ => return Err(invalid()),
    };
    let duration = amount
        .checked_mul(factor)
        .and_then(Duration::try_days)
        .ok_or_else(invalid)?;
    Utc::now().checked_sub_signed(duration).ok_or_else(invalid)?;
    Ok(duration)
}

/// `now - period`, or an error when that falls outside the calendar.
pub fn period_start(now: DateTime<Utc>, period: Duration) -> Result<DateTime<Utc>, DateError> {
    now.checked_sub_signed(period)
        .ok_or_else(|| DateError::InvalidPeriod(format!("{}d", period.num_days())))
}

/// Comparison operator of a [`DateFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl DateOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            DateOp::Eq => "=",
            DateOp::Lt => "<",
            DateOp::Le => "<=",
            DateOp::Gt => ">",
            DateOp::Ge => ">=",
        }
    }

    pub fn matches(&self, value: NaiveDate, bound: NaiveDate) -> bool {
        match self {
            DateOp::Eq => value == bound,
            DateOp::Lt => value < bound,
            DateOp::Le => value <= bound,
            DateOp::Gt => value > bound,
            DateOp::Ge => value >= bound,
        }
    }
}

/// A date comparison such as `>=2026-01-01`; a bare date means equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFilter {
    pub op: DateOp,
    pub date: NaiveDate,
}

impl DateFilter {
    pub fn parse(expr: &str) -> Result<Self, DateError> {
        let expr = expr.trim();
        let (op, rest) = if let Some(rest) = expr.strip_prefix(">=") {
            (DateOp::Ge, rest)
        } else if let Some(rest) = expr.strip_prefix("<=") {
            (DateOp::Le, rest)
        } else if let Some(rest) = expr.strip_prefix('>') {
            (DateOp::Gt, rest)
        } else if let Some(rest) = expr.strip_prefix('<') {
            (DateOp::Lt, rest)
        } else if let Some(rest) = expr.strip_prefix('=') {
            (DateOp::Eq, rest)
        } else {
            (DateOp::Eq, expr)
        };
        Ok(Self {
            op,
            date: parse_date(rest)?,
        })
    }

    pub fn matches(&self, value: NaiveDate) -> bool {
        self.op.matches(value, self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_packed_date_matches_things_encoding() {
        // 2026-02-16 as stored by Things 3
        let packed = (2026 << 16) | (2 << 12) | (16 << 7);
        assert_eq!(pack_date(date(2026, 2, 16)), packed);
        assert_eq!(unpack_date(packed), Some(date(2026, 2, 16)));
    }

    #[test]
    fn test_unpack_rejects_garbage() {
        assert_eq!(unpack_date(0), None);
        assert_eq!(unpack_date(-5), None);
        // month 15 does not exist
        assert_eq!(unpack_date((2026 << 16) | (15 << 12) | (1 << 7)), None);
    }

    #[test]
    fn test_timestamp_to_datetime() {
        let dt = timestamp_to_datetime(1_771_234_200.0).unwrap();
        assert_eq!(dt.date(), date(2026, 2, 16));
        assert!(timestamp_to_datetime(f64::NAN).is_none());
    }

    #[test]
    fn test_parse_period_units() {
        assert_eq!(parse_period("3d").unwrap(), Duration::days(3));
        assert_eq!(parse_period("2w").unwrap(), Duration::days(14));
        assert_eq!(parse_period("1m").unwrap(), Duration::days(30));
        assert_eq!(parse_period("1y").unwrap(), Duration::days(365));
    }

    #[test]
    fn test_parse_period_rejects_bad_input() {
        assert!(parse_period("").is_err());
        assert!(parse_period("d").is_err());
        assert!(parse_period("7x").is_err());
        assert!(parse_period("-1d").is_err());
        assert!(parse_period("7日").is_err());
    }

    #[test]
    fn test_parse_period_rejects_overflow() {
        assert_eq!(
            parse_period("1000000y"),
            Err(DateError::InvalidPeriod("1000000y".into()))
        );
        assert_eq!(
            parse_period("99999999999999999d"),
            Err(DateError::InvalidPeriod("99999999999999999d".into()))
        );
        assert!(parse_period("9223372036854775807w").is_err());
        assert!(parse_period("100y").is_ok());
    }

    #[test]
    fn test_period_start_checks_range() {
        let now = Utc::now();
        assert_eq!(period_start(now, Duration::days(2)).unwrap(), now - Duration::days(2));
        assert!(period_start(now, Duration::MAX).is_err());
    }

    #[test]
    fn test_date_filter_operators() {
        let f = DateFilter::parse(">=2026-01-01").unwrap();
        assert_eq!(f.op, DateOp::Ge);
        assert!(f.matches(date(2026, 1, 1)));
        assert!(!f.matches(date(2025, 12, 31)));

        let f = DateFilter::parse("2026-03-01").unwrap();
        assert_eq!(f.op, DateOp::Eq);

        let f = DateFilter::parse("<2026-03-01").unwrap();
        assert!(f.matches(date(2026, 2, 28)));

        assert!(DateFilter::parse(">=tomorrow").is_err());
    }

    #[test]
    fn test_days_from_today() {
        let today = date(2026, 2, 16);
        assert_eq!(days_from_today(date(2026, 2, 20), today), 4);
        assert_eq!(days_from_today(today, today), 0);
        assert_eq!(days_from_today(date(2026, 2, 15), today), -1);
    }
}
