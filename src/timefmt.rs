/// Timestamp normalization for listening events.
///
/// Event timestamps arrive as UTC text in the `"DD Mon YYYY, HH:MM"` shape.
/// Every time-bucketed query shifts them into local civil time with a single
/// offset captured once per run (see [`LocalOffset`]).
use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, Utc};
use std::fmt;

/// Text format of event timestamps and date-range bounds.
pub const TIMESTAMP_FORMAT: &str = "%d %b %Y, %H:%M";

/// Month abbreviations used for day labels, independent of any locale.
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// An event instant expressed in the run's local offset.
pub type LocalInstant = DateTime<FixedOffset>;

/// The fixed UTC offset used to place events on local days and hours.
///
/// The offset is applied uniformly to every timestamp, whatever its date, so
/// historical daylight-saving changes are not reflected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalOffset(FixedOffset);

impl LocalOffset {
    /// Captures the system's current UTC offset.
    pub fn system() -> Self {
        Self(Local::now().offset().fix())
    }

    pub fn utc() -> Self {
        Self(Utc.fix())
    }

    /// Offset east of UTC in seconds, or `None` when out of range (±24h).
    pub fn from_seconds(seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(seconds).map(Self)
    }

    /// Parse an offset such as `+02:00`, `-0530`, `+9` or `UTC`.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("utc") || text == "Z" {
            return Ok(Self::utc());
        }

        let (sign, rest) = match text.chars().next() {
            Some('+') => (1, &text[1..]),
            Some('-') => (-1, &text[1..]),
            _ => return Err(anyhow!("Invalid UTC offset '{}': expected +HH:MM or -HH:MM", text)),
        };

        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) => (h, m),
            None if rest.len() == 4 && rest.is_char_boundary(2) => rest.split_at(2),
            None => (rest, "0"),
        };

        let hours: i32 = hours
            .parse()
            .map_err(|_| anyhow!("Invalid hours in UTC offset '{}'", text))?;
        let minutes: i32 = minutes
            .parse()
            .map_err(|_| anyhow!("Invalid minutes in UTC offset '{}'", text))?;
        if !(0..24).contains(&hours) {
            return Err(anyhow!("UTC offset out of range: '{}'", text));
        }
        if !(0..60).contains(&minutes) {
            return Err(anyhow!("Invalid minutes in UTC offset '{}'", text));
        }

        Self::from_seconds(sign * (hours * 3600 + minutes * 60))
            .ok_or_else(|| anyhow!("UTC offset out of range: '{}'", text))
    }

    pub fn fixed(&self) -> FixedOffset {
        self.0
    }

    /// Unix timestamp (seconds) of local midnight at the start of `date`.
    pub fn midnight_epoch(&self, date: NaiveDate) -> i64 {
        date.and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp() - i64::from(self.0.local_minus_utc()))
            .unwrap_or_default()
    }
}

impl fmt::Display for LocalOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse an event timestamp as UTC. Empty or malformed text yields `None`.
pub fn parse_utc(text: &str) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse an event timestamp and shift it into the run's local offset.
pub fn to_local(text: &str, offset: LocalOffset) -> Option<LocalInstant> {
    parse_utc(text).map(|utc| utc.with_timezone(&offset.fixed()))
}

/// Local calendar day of an event timestamp.
pub fn local_day(text: &str, offset: LocalOffset) -> Option<NaiveDate> {
    to_local(text, offset).map(|local| local.date_naive())
}

/// Format a date as `"DD Mon YYYY"`.
pub fn day_label<D: Datelike>(date: &D) -> String {
    format!(
        "{:02} {} {:04}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Inverse of [`day_label`].
pub fn parse_day_label(label: &str) -> Option<NaiveDate> {
    let mut parts = label.split_whitespace();
    let day: u32 = parts.next()?.parse().ok()?;
    let month_name = parts.next()?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let month = MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(month_name))?;
    NaiveDate::from_ymd_opt(year, month as u32 + 1, day)
}

/// Serde adapter storing a `NaiveDate` as its day label.
pub mod serde_day {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::day_label(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let label = String::deserialize(deserializer)?;
        super::parse_day_label(&label)
            .ok_or_else(|| D::Error::custom(format!("invalid day label: {}", label)))
    }
}
