//! Schedule Parser
//!
//! Turns a per-weekday textual service-hours definition into typed time
//! ranges, e.g. `"mon: 19:00-23:00; fri: 12:30-15:00|19:00-23:30"`.
//!
//! Parsing is tolerant: a malformed chunk never blocks the whole day. Bad
//! chunks are skipped and reported under the `config` log target so the
//! degradation stays visible.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A half-open service range within one day: `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether `t` falls inside the range (start inclusive, end exclusive)
    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t < self.end
    }

    /// Enumerate bookable slot start times at `interval_min` minute steps
    ///
    /// The range end itself is never a slot: a 19:00-23:00 range with a
    /// 15-minute interval yields 19:00 through 22:45.
    pub fn slot_times(&self, interval_min: u32) -> Vec<NaiveTime> {
        let mut slots = Vec::new();
        if interval_min == 0 {
            return slots;
        }
        let step = Duration::minutes(interval_min as i64);
        let mut t = self.start;
        while t < self.end {
            slots.push(t);
            let (next, rolled) = t.overflowing_add_signed(step);
            if rolled != 0 || next <= t {
                break;
            }
            t = next;
        }
        slots
    }
}

/// Parsed weekly service hours, indexed by weekday (Monday = 0)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekSchedule {
    days: [Vec<TimeRange>; 7],
}

impl WeekSchedule {
    /// Parse a weekly definition such as
    /// `"mon: 19:00-23:00; fri: 12:30-15:00|19:00-23:30"`.
    ///
    /// Day entries are separated by `;`, multiple disjoint ranges within a
    /// day by `|`. Chunks that fail to parse are skipped with a warning; a
    /// completely invalid definition yields an empty schedule, which the
    /// caller treats as closed.
    pub fn parse(definition: &str) -> Self {
        let mut days: [Vec<TimeRange>; 7] = Default::default();

        for entry in definition.split(';') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let Some((day_token, ranges_part)) = entry.split_once(':') else {
                warn!(target: "config", chunk = entry, "Schedule chunk has no weekday prefix, skipped");
                continue;
            };
            let Some(weekday) = parse_weekday(day_token.trim()) else {
                warn!(target: "config", chunk = entry, "Unknown weekday in schedule chunk, skipped");
                continue;
            };
            for range_text in ranges_part.split('|') {
                let range_text = range_text.trim();
                if range_text.is_empty() {
                    continue;
                }
                match parse_range(range_text) {
                    Some(range) => {
                        days[weekday.num_days_from_monday() as usize].push(range)
                    }
                    None => {
                        warn!(
                            target: "config",
                            range = range_text,
                            "Malformed schedule range, skipped"
                        );
                    }
                }
            }
        }

        for ranges in days.iter_mut() {
            ranges.sort_by_key(|r| r.start);
        }

        Self { days }
    }

    /// Service ranges for `date`'s weekday, ordered by start time
    pub fn ranges_for(&self, date: NaiveDate) -> &[TimeRange] {
        &self.days[date.weekday().num_days_from_monday() as usize]
    }

    /// Service ranges for a weekday directly
    pub fn ranges_on(&self, weekday: Weekday) -> &[TimeRange] {
        &self.days[weekday.num_days_from_monday() as usize]
    }

    /// Whether no weekday has any service range
    pub fn is_empty(&self) -> bool {
        self.days.iter().all(|d| d.is_empty())
    }
}

fn parse_weekday(token: &str) -> Option<Weekday> {
    match token.to_ascii_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Parse a `"HH:MM-HH:MM"` range; the en dash variant is accepted too
fn parse_range(text: &str) -> Option<TimeRange> {
    let (start_text, end_text) = text
        .split_once('-')
        .or_else(|| text.split_once('\u{2013}'))?;
    let start = NaiveTime::parse_from_str(start_text.trim(), "%H:%M").ok()?;
    let end = NaiveTime::parse_from_str(end_text.trim(), "%H:%M").ok()?;
    if start >= end {
        return None;
    }
    Some(TimeRange::new(start, end))
}
