use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;

/// Tooltip format handed to the time axis (moment.js syntax).
pub const TOOLTIP_FORMAT: &str = "ll HH:mm";

const DEFAULT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

const HOUR_MS: i64 = 3_600_000;

/// Turns backend label strings into epoch milliseconds.
///
/// RFC 3339 timestamps carrying an offset are always accepted. Naive
/// timestamps are tried against `formats` in order and read as UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampParser {
    formats: Vec<String>,
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self::with_formats(DEFAULT_FORMATS)
    }
}

impl TimestampParser {
    #[must_use]
    pub fn with_formats<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            formats: formats.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn parse(&self, raw: &str) -> Option<i64> {
        let raw = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.timestamp_millis());
        }

        self.formats.iter().find_map(|fmt| {
            NaiveDateTime::parse_from_str(raw, fmt)
                .ok()
                .map(|dt| dt.and_utc().timestamp_millis())
        })
    }
}

/// Tick unit for the time axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Hour,
    Day,
    Week,
}

impl TimeUnit {
    /// Pick the unit from the span covered by `labels`: under a day ticks by
    /// hour, under six days by day, anything longer by week.
    #[must_use]
    pub fn for_span(labels: &[i64]) -> Self {
        let (Some(min), Some(max)) = (labels.iter().min(), labels.iter().max()) else {
            return Self::Hour;
        };

        let span = max - min;
        if span >= 144 * HOUR_MS {
            Self::Week
        } else if span >= 24 * HOUR_MS {
            Self::Day
        } else {
            Self::Hour
        }
    }
}
