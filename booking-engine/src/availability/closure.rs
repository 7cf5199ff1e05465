//! Closure Evaluator
//!
//! Decides, for a scope chain (venue → room → table) and an instant, whether
//! booking is fully blocked and how much capacity remains. Recurring
//! closures are expanded into occurrence windows up to the queried instant.
//!
//! Blocking precedence: the most specific scope with any covering closure
//! decides. Capacity reductions combine pessimistically across all
//! applicable scopes: the worst (lowest) percentage wins, reductions never
//! compound multiplicatively.

use chrono::{Datelike, Duration, NaiveDateTime, Weekday};

use crate::db::models::{Closure, ClosureKind, ClosureScope, Recurrence};

pub struct ClosureEvaluator {
    closures: Vec<Closure>,
}

impl ClosureEvaluator {
    pub fn new(closures: Vec<Closure>) -> Self {
        Self {
            closures: closures.into_iter().filter(|c| c.is_active).collect(),
        }
    }

    /// Whether booking is fully blocked for the given scope chain at `instant`
    ///
    /// `room_id`/`table_id` identify the resource being evaluated; pass
    /// `None` for venue-level questions.
    pub fn is_blocked(
        &self,
        room_id: Option<i64>,
        table_id: Option<i64>,
        instant: NaiveDateTime,
    ) -> bool {
        for scope in [ClosureScope::Table, ClosureScope::Room, ClosureScope::Venue] {
            let mut any_covering = false;
            let mut any_full = false;
            for closure in &self.closures {
                if closure.scope != scope
                    || !scope_matches(closure, room_id, table_id)
                    || !covers(closure, instant)
                {
                    continue;
                }
                any_covering = true;
                if closure.kind == ClosureKind::Full {
                    any_full = true;
                }
            }
            // Most specific scope with a covering closure wins
            if any_covering {
                return any_full;
            }
        }
        false
    }

    /// Remaining-capacity multiplier in `[0, 1]` at `instant`
    ///
    /// 1.0 when no reduction applies; otherwise the lowest override
    /// percentage among overlapping reductions at every applicable scope.
    pub fn capacity_multiplier(
        &self,
        room_id: Option<i64>,
        table_id: Option<i64>,
        instant: NaiveDateTime,
    ) -> f64 {
        self.closures
            .iter()
            .filter(|c| {
                c.kind == ClosureKind::Reduced
                    && scope_matches(c, room_id, table_id)
                    && covers(c, instant)
            })
            .filter_map(|c| c.capacity_pct)
            .map(|pct| pct as f64 / 100.0)
            .fold(1.0_f64, f64::min)
            .clamp(0.0, 1.0)
    }
}

/// Whether a closure's scope reference matches the evaluated resource
fn scope_matches(closure: &Closure, room_id: Option<i64>, table_id: Option<i64>) -> bool {
    match closure.scope {
        ClosureScope::Venue => true,
        ClosureScope::Room => closure.room_id.is_some() && closure.room_id == room_id,
        ClosureScope::Table => closure.table_id.is_some() && closure.table_id == table_id,
    }
}

/// Whether `instant` falls inside the closure's window or any recurrence
/// occurrence of it
fn covers(closure: &Closure, instant: NaiveDateTime) -> bool {
    match closure.recurrence {
        Recurrence::None => closure.starts_at <= instant && instant < closure.ends_at,
        _ => recurring_covers(closure, instant),
    }
}

fn recurring_covers(closure: &Closure, instant: NaiveDateTime) -> bool {
    if instant < closure.starts_at {
        return false;
    }
    let span = closure.ends_at - closure.starts_at;
    // Occurrence windows may span days; widen the candidate range accordingly
    let span_days = span.num_days() + 1;

    match closure.recurrence {
        Recurrence::None => false,
        Recurrence::Daily { interval_days } => {
            let step = interval_days.max(1) as i64;
            occurrence_in_steps(closure.starts_at, step, span, span_days, instant)
        }
        Recurrence::Weekly {
            weekday,
            interval_weeks,
        } => {
            let Some(target) = weekday_from_index(weekday) else {
                return false;
            };
            let start_date = closure.starts_at.date();
            let offset = (7 + target.num_days_from_monday() as i64
                - start_date.weekday().num_days_from_monday() as i64)
                % 7;
            let first = (start_date + Duration::days(offset)).and_time(closure.starts_at.time());
            let step = 7 * interval_weeks.max(1) as i64;
            occurrence_in_steps(first, step, span, span_days, instant)
        }
        Recurrence::Monthly { day_of_month } => {
            let start_date = closure.starts_at.date();
            let end_date = instant.date();
            let mut year = start_date.year();
            let mut month = start_date.month();
            // Bounded month walk from the rule's start to the queried date
            while (year, month) <= (end_date.year(), end_date.month()) {
                if let Some(date) =
                    chrono::NaiveDate::from_ymd_opt(year, month, day_of_month)
                {
                    let occ_start = date.and_time(closure.starts_at.time());
                    if occ_start >= closure.starts_at
                        && occ_start <= instant
                        && instant < occ_start + span
                    {
                        return true;
                    }
                }
                month += 1;
                if month > 12 {
                    month = 1;
                    year += 1;
                }
            }
            false
        }
    }
}

/// Check the day-stepped occurrences whose windows can reach `instant`
fn occurrence_in_steps(
    first: NaiveDateTime,
    step_days: i64,
    span: Duration,
    span_days: i64,
    instant: NaiveDateTime,
) -> bool {
    let days = (instant.date() - first.date()).num_days();
    if days < 0 {
        return false;
    }
    let k_hi = days / step_days;
    let k_lo = ((days - span_days) / step_days).max(0);
    for k in k_lo..=k_hi {
        let occ_start = first + Duration::days(k * step_days);
        if occ_start <= instant && instant < occ_start + span {
            return true;
        }
    }
    false
}

fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}
