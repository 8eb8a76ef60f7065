/// Window parsing for coarse filtering of the listening history
///
/// Parses window strings (e.g., '2025', '2025-03', '2025-W12', '2025-03-15',
/// '15/03/2025', '2025-03-15..', 'life') into local date boundaries, then
/// filters events on their raw Unix timestamp.
use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate};

use crate::event::Event;
use crate::timefmt::LocalOffset;

/// Shape of a parsed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Year,
    Month,
    Week,
    Day,
    /// Open-ended: from a date onwards
    Since,
    Life,
}

/// A parsed window with inclusive local date bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Window key as provided by the user
    pub key: String,
    pub kind: WindowKind,
    /// First local day (inclusive); `None` for life
    pub from: Option<NaiveDate>,
    /// Last local day (inclusive); `None` when open-ended
    pub to: Option<NaiveDate>,
}

impl Window {
    pub fn life() -> Self {
        Window {
            key: "life".to_string(),
            kind: WindowKind::Life,
            from: None,
            to: None,
        }
    }

    /// Parse a window string
    ///
    /// Supported formats:
    /// - "2025" → entire year 2025
    /// - "2025-03" → March 2025
    /// - "2025-W12" → ISO week 12 of 2025
    /// - "2025-03-15" → specific day
    /// - "15/03/2025" or "2025-03-15.." → from that day onwards
    /// - "life" → everything
    pub fn parse(window: &str) -> Result<Self> {
        let window = window.trim();
        let bounded = |kind, from: NaiveDate, to: NaiveDate| Window {
            key: window.to_string(),
            kind,
            from: Some(from),
            to: Some(to),
        };

        if window.eq_ignore_ascii_case("life") {
            return Ok(Self::life());
        }

        if let Some(start) = window.strip_suffix("..") {
            let from = NaiveDate::parse_from_str(start, "%Y-%m-%d")
                .map_err(|_| anyhow!("Invalid start date in window: '{}'", window))?;
            return Ok(Window {
                key: window.to_string(),
                kind: WindowKind::Since,
                from: Some(from),
                to: None,
            });
        }

        if let Ok(from) = NaiveDate::parse_from_str(window, "%d/%m/%Y") {
            return Ok(Window {
                key: window.to_string(),
                kind: WindowKind::Since,
                from: Some(from),
                to: None,
            });
        }

        if let Ok(year) = window.parse::<i32>() {
            if (1970..=2099).contains(&year) {
                let from = NaiveDate::from_ymd_opt(year, 1, 1)
                    .ok_or_else(|| anyhow!("Invalid year: {}", year))?;
                let to = NaiveDate::from_ymd_opt(year, 12, 31)
                    .ok_or_else(|| anyhow!("Invalid year: {}", year))?;
                return Ok(bounded(WindowKind::Year, from, to));
            }
        }

        if let Some((year_str, month_str)) = window.split_once('-') {
            if let (Ok(year), Ok(month)) = (year_str.parse::<i32>(), month_str.parse::<u32>()) {
                if (1970..=2099).contains(&year) && (1..=12).contains(&month) {
                    let from = NaiveDate::from_ymd_opt(year, month, 1)
                        .ok_or_else(|| anyhow!("Invalid month: {}-{:02}", year, month))?;
                    let next_month = if month == 12 {
                        NaiveDate::from_ymd_opt(year + 1, 1, 1)
                    } else {
                        NaiveDate::from_ymd_opt(year, month + 1, 1)
                    };
                    let to = next_month
                        .and_then(|d| d.pred_opt())
                        .ok_or_else(|| anyhow!("Invalid month: {}-{:02}", year, month))?;
                    return Ok(bounded(WindowKind::Month, from, to));
                }
            }
        }

        if let Some((year_str, week_str)) = window.split_once("-W") {
            if let (Ok(year), Ok(week)) = (year_str.parse::<i32>(), week_str.parse::<u32>()) {
                if (1970..=2099).contains(&year) && (1..=53).contains(&week) {
                    let from = NaiveDate::from_isoywd_opt(year, week, chrono::Weekday::Mon)
                        .ok_or_else(|| anyhow!("Invalid week for year: {}-W{:02}", year, week))?;
                    let to = from + Duration::days(6);
                    return Ok(bounded(WindowKind::Week, from, to));
                }
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(window, "%Y-%m-%d") {
            return Ok(bounded(WindowKind::Day, date, date));
        }

        Err(anyhow!(
            "Invalid window format: '{}'. Expected: '2025', '2025-03', '2025-W12', '2025-03-15', '15/03/2025', '2025-03-15..', or 'life'",
            window
        ))
    }

    /// Human-readable description, e.g. "the year 2025".
    pub fn phrase(&self) -> String {
        match self.kind {
            WindowKind::Year => format!("the year {}", self.key),
            WindowKind::Month => format!("the month {}", self.key),
            WindowKind::Week => format!("the week {}", self.key),
            WindowKind::Day => format!("the day {}", self.key),
            WindowKind::Since => match self.from {
                Some(from) => format!("everything since {}", from.format("%Y-%m-%d")),
                None => "everything".to_string(),
            },
            WindowKind::Life => "your whole listening history".to_string(),
        }
    }

    /// Unix timestamp range in seconds, `[start, end]` inclusive.
    pub fn to_epoch_range(&self, offset: LocalOffset) -> (Option<i64>, Option<i64>) {
        let start = self.from.map(|from| offset.midnight_epoch(from));
        let end = self
            .to
            .and_then(|to| to.succ_opt())
            .map(|next| offset.midnight_epoch(next) - 1);
        (start, end)
    }

    /// Keep the events whose raw epoch falls inside the window.
    ///
    /// Events with a missing or non-numeric epoch are dropped unless the
    /// window is `life`.
    pub fn retain(&self, events: Vec<Event>, offset: LocalOffset) -> Vec<Event> {
        if self.kind == WindowKind::Life {
            return events;
        }

        let (start, end) = self.to_epoch_range(offset);
        let before = events.len();
        let kept: Vec<Event> = events
            .into_iter()
            .filter(|event| match event.raw_epoch.trim().parse::<i64>() {
                Ok(ts) => start.map_or(true, |s| ts >= s) && end.map_or(true, |e| ts <= e),
                Err(_) => false,
            })
            .collect();

        tracing::info!(
            window = %self.key,
            kept = kept.len(),
            dropped = before - kept.len(),
            "Applied window filter"
        );
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event_at(epoch: &str) -> Event {
        Event {
            raw_epoch: epoch.to_string(),
            ..Event::new("A", "B", "C", "")
        }
    }

    #[test]
    fn test_parse_year() {
        let ws = Window::parse("2025").unwrap();
        assert_eq!(ws.key, "2025");
        assert_eq!(ws.kind, WindowKind::Year);
        assert_eq!(ws.from, Some(date(2025, 1, 1)));
        assert_eq!(ws.to, Some(date(2025, 12, 31)));
    }

    #[test]
    fn test_parse_month() {
        let ws = Window::parse("2024-02").unwrap();
        assert_eq!(ws.kind, WindowKind::Month);
        assert_eq!(ws.from, Some(date(2024, 2, 1)));
        assert_eq!(ws.to, Some(date(2024, 2, 29)));

        let ws = Window::parse("2025-12").unwrap();
        assert_eq!(ws.to, Some(date(2025, 12, 31)));
    }

    #[test]
    fn test_parse_week() {
        let ws = Window::parse("2025-W12").unwrap();
        assert_eq!(ws.kind, WindowKind::Week);
        assert_eq!(ws.from, Some(date(2025, 3, 17)));
        assert_eq!(ws.to, Some(date(2025, 3, 23)));
    }

    #[test]
    fn test_parse_day_and_since() {
        let ws = Window::parse("2025-03-15").unwrap();
        assert_eq!(ws.kind, WindowKind::Day);
        assert_eq!(ws.from, ws.to);

        let ws = Window::parse("15/03/2025").unwrap();
        assert_eq!(ws.kind, WindowKind::Since);
        assert_eq!(ws.from, Some(date(2025, 3, 15)));
        assert_eq!(ws.to, None);

        let ws = Window::parse("2025-03-15..").unwrap();
        assert_eq!(ws.kind, WindowKind::Since);
        assert_eq!(ws.from, Some(date(2025, 3, 15)));
        assert_eq!(ws.to, None);
    }

    #[test]
    fn test_parse_life() {
        let ws = Window::parse("life").unwrap();
        assert_eq!(ws, Window::life());
        assert_eq!(ws.to_epoch_range(LocalOffset::utc()), (None, None));
    }

    #[test]
    fn test_invalid_window() {
        assert!(Window::parse("invalid").is_err());
        assert!(Window::parse("2025-W99").is_err());
        assert!(Window::parse("2025-13").is_err());
        assert!(Window::parse("2025-02-30").is_err());
        assert!(Window::parse("32/01/2025").is_err());
        assert!(Window::parse("yesterday..").is_err());
    }

    #[test]
    fn test_epoch_range_respects_offset() {
        let ws = Window::parse("2026-02-01").unwrap();
        assert_eq!(
            ws.to_epoch_range(LocalOffset::utc()),
            (Some(1_769_904_000), Some(1_769_990_399))
        );

        let plus_two = LocalOffset::parse("+02:00").unwrap();
        assert_eq!(
            ws.to_epoch_range(plus_two),
            (Some(1_769_904_000 - 7200), Some(1_769_990_399 - 7200))
        );
    }

    #[test]
    fn test_retain() {
        let events = vec![
            event_at("1769903999"),
            event_at("1769904000"),
            event_at(""),
            event_at("soon"),
            event_at("1769990399"),
            event_at("1769990400"),
        ];

        let day = Window::parse("2026-02-01").unwrap();
        let kept = day.retain(events.clone(), LocalOffset::utc());
        let epochs: Vec<&str> = kept.iter().map(|e| e.raw_epoch.as_str()).collect();
        assert_eq!(epochs, vec!["1769904000", "1769990399"]);

        let since = Window::parse("01/02/2026").unwrap();
        assert_eq!(since.retain(events.clone(), LocalOffset::utc()).len(), 3);

        assert_eq!(Window::life().retain(events, LocalOffset::utc()).len(), 6);
    }
}
