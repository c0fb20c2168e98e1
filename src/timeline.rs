//! Recording-relative timestamp resolution.
//!
//! Source files express time two ways: a wall-clock reading (`H:MM:SS`,
//! possibly on a 12-hour clock with no meridiem) or the index of a 30-second
//! scoring epoch. Both are resolved onto one timeline anchored at a fixed
//! date, so only the time of day and elapsed time since the recording start
//! carry meaning.
//!
//! The start time and half-day correction are fixed by the first valid
//! timestamp of the primary log and carried in a [`RecordingClock`] for the
//! rest of that recording.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::event::{collapse_whitespace, EPOCH_SECONDS, WALL_CLOCK_RE};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Offset added to wall-clock readings of a recording logged on a 12-hour clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalfDayCorrection(Duration);

impl HalfDayCorrection {
    pub const NONE: HalfDayCorrection = HalfDayCorrection(Duration::zero());

    /// Derive the correction from the first reading of a recording.
    ///
    /// Readings past noon can only come from a 24-hour clock. Anything else
    /// is taken as an evening reading on a 12-hour clock.
    pub fn from_first(first: NaiveDateTime) -> Self {
        if first.hour() > 12 {
            Self::NONE
        } else {
            HalfDayCorrection(Duration::hours(12))
        }
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }

    pub fn is_applied(self) -> bool {
        self.0 != Duration::zero()
    }
}

/// Start time and correction of one recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordingClock {
    pub start: NaiveDateTime,
    pub correction: HalfDayCorrection,
}

impl RecordingClock {
    /// Build the clock from the first uncorrected reading of the primary log.
    pub fn from_first_reading(first: NaiveDateTime) -> Self {
        let correction = HalfDayCorrection::from_first(first);
        Self {
            start: first + correction.as_duration(),
            correction,
        }
    }

    /// Absolute time of the start of a 1-based scoring epoch, `None` when
    /// the epoch lies outside the representable range.
    pub fn epoch_time(&self, epoch: i64) -> Option<NaiveDateTime> {
        epoch_offset(self.start, epoch)
    }

    /// Resolve a raw token with this clock's start and correction.
    pub fn resolve(&self, raw: &str) -> Option<NaiveDateTime> {
        resolve_timestamp(raw, Some(self.start), self.correction)
    }

    /// Seconds since the recording start, wrapped across midnight.
    pub fn elapsed_seconds(&self, t: NaiveDateTime) -> i64 {
        elapsed_seconds(self.start, t)
    }
}

fn anchor_date() -> NaiveDate {
    NaiveDate::default()
}

/// Parse a leading `H:MM:SS` reading onto the anchor date.
pub fn parse_wall_clock(token: &str) -> Option<NaiveDateTime> {
    let caps = WALL_CLOCK_RE.captures(token)?;
    let hour = caps[1].parse().ok()?;
    let min = caps[2].parse().ok()?;
    let sec = caps[3].parse().ok()?;
    let time = NaiveTime::from_hms_opt(hour, min, sec)?;
    Some(anchor_date().and_time(time))
}

fn parse_epoch(token: &str) -> Option<i64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Resolve a raw timestamp column.
///
/// A wall-clock reading in the first token wins and gets `correction`
/// added. Otherwise, when `start` is known, an epoch index in the first or
/// second token is converted relative to it. The epoch path is not
/// corrected again since `start` already is. More than two tokens, or no
/// usable token, yields `None`.
pub fn resolve_timestamp(
    raw: &str,
    start: Option<NaiveDateTime>,
    correction: HalfDayCorrection,
) -> Option<NaiveDateTime> {
    let collapsed = collapse_whitespace(raw);
    let tokens: Vec<&str> = collapsed.split(' ').filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() || tokens.len() > 2 {
        return None;
    }

    if let Some(t) = parse_wall_clock(tokens[0]) {
        return Some(t + correction.as_duration());
    }

    let start = start?;
    let epoch = parse_epoch(tokens[0]).or_else(|| tokens.get(1).and_then(|t| parse_epoch(t)))?;
    epoch_offset(start, epoch)
}

/// `start + (epoch - 1) * 30s` with every step checked.
fn epoch_offset(start: NaiveDateTime, epoch: i64) -> Option<NaiveDateTime> {
    let secs = epoch.checked_sub(1)?.checked_mul(EPOCH_SECONDS)?;
    start.checked_add_signed(Duration::try_seconds(secs)?)
}

/// Seconds from `start` to `t`, wrapping negative deltas forward by whole
/// days (recordings may cross local midnight).
pub fn elapsed_seconds(start: NaiveDateTime, t: NaiveDateTime) -> i64 {
    let delta = (t - start).num_seconds();
    if delta < 0 {
        delta.rem_euclid(SECONDS_PER_DAY)
    } else {
        delta
    }
}

/// Render a resolved time as `HH:MM:SS.00`.
pub fn format_timestamp(t: NaiveDateTime) -> String {
    t.format("%H:%M:%S.00").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        anchor_date().and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_wall_clock_parsing() {
        assert_eq!(parse_wall_clock("9:05:07"), Some(at(9, 5, 7)));
        assert_eq!(parse_wall_clock("22:00:00"), Some(at(22, 0, 0)));
        assert_eq!(parse_wall_clock("25:00:00"), None);
        assert_eq!(parse_wall_clock("abc"), None);
    }

    #[test]
    fn test_correction_from_first_reading() {
        assert_eq!(HalfDayCorrection::from_first(at(22, 0, 0)), HalfDayCorrection::NONE);
        assert!(HalfDayCorrection::from_first(at(10, 0, 0)).is_applied());
        // Exactly noon is still ambiguous.
        assert!(HalfDayCorrection::from_first(at(12, 30, 0)).is_applied());
    }

    #[test]
    fn test_clock_start_is_corrected() {
        let clock = RecordingClock::from_first_reading(at(10, 15, 0));
        assert_eq!(format_timestamp(clock.start), "22:15:00.00");

        let clock = RecordingClock::from_first_reading(at(21, 0, 0));
        assert_eq!(clock.start, at(21, 0, 0));
    }

    #[test]
    fn test_epoch_offsets() {
        let clock = RecordingClock::from_first_reading(at(22, 0, 0));
        assert_eq!(clock.epoch_time(1), Some(clock.start));
        assert_eq!(clock.epoch_time(3), Some(clock.start + Duration::seconds(60)));
        assert_eq!(clock.resolve("1"), Some(clock.start));
        assert_eq!(clock.resolve("3"), Some(at(22, 1, 0)));
    }

    #[test]
    fn test_wall_clock_wins_over_epoch() {
        let clock = RecordingClock::from_first_reading(at(10, 0, 0));
        // Corrected by 12 hours, epoch ignored.
        assert_eq!(clock.resolve("10:30:00 400"), Some(at(22, 30, 0)));
    }

    #[test]
    fn test_epoch_in_second_token() {
        let start = at(22, 0, 0);
        assert_eq!(
            resolve_timestamp("-- 5", Some(start), HalfDayCorrection::NONE),
            Some(at(22, 2, 0))
        );
    }

    #[test]
    fn test_unresolvable_tokens() {
        let start = Some(at(22, 0, 0));
        assert_eq!(resolve_timestamp("", start, HalfDayCorrection::NONE), None);
        assert_eq!(resolve_timestamp("a b c", start, HalfDayCorrection::NONE), None);
        assert_eq!(resolve_timestamp("start", start, HalfDayCorrection::NONE), None);
        // Epoch indices need a known start.
        assert_eq!(resolve_timestamp("12", None, HalfDayCorrection::NONE), None);
    }

    #[test]
    fn test_elapsed_wraps_midnight() {
        let start = at(22, 0, 0);
        assert_eq!(elapsed_seconds(start, at(23, 0, 0)), 3600);
        assert_eq!(elapsed_seconds(start, at(1, 0, 0)), 3 * 3600);
        assert_eq!(elapsed_seconds(start, start), 0);
    }

    #[test]
    fn test_elapsed_across_anchor_day() {
        // 10 pm start on a 12-hour clock, reading past midnight lands on the next day.
        let clock = RecordingClock::from_first_reading(at(10, 0, 0));
        let later = clock.start + Duration::hours(3);
        assert_eq!(clock.elapsed_seconds(later), 3 * 3600);
        assert_eq!(format_timestamp(later), "01:00:00.00");
    }

    #[test]
    fn test_oversized_epoch_is_unresolvable() {
        let clock = RecordingClock::from_first_reading(at(22, 0, 0));
        assert_eq!(clock.epoch_time(99_999_999_999_999), None);
        assert_eq!(clock.epoch_time(i64::MAX), None);
        assert_eq!(clock.epoch_time(i64::MIN), None);
        assert_eq!(clock.resolve("99999999999999"), None);
        assert_eq!(clock.resolve("-- 99999999999999"), None);
    }
}
