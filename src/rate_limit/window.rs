use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};

/// A calendar day `[start, end)` in the limiter's configured offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn containing(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let midnight = now
            .with_timezone(&offset)
            .date_naive()
            .and_time(NaiveTime::MIN);
        // a fixed offset maps every local time to exactly one instant
        let start = offset
            .from_local_datetime(&midnight)
            .single()
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or(now);

        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    #[cfg(test)]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}
