use std::cmp::Ordering;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::pricing::{PricingEngine, PricingError};
use crate::rules::EventRule;
use crate::window::{MonthDay, YEAR_SLOTS};

/// Longest search for the next occurrence of a window; a 02-29 window can be
/// almost four years away.
const OCCURRENCE_SEARCH_DAYS: usize = 4 * 366;

#[derive(Debug, Clone, Serialize)]
pub struct CalendarEntry<'a> {
    pub date: NaiveDate,
    pub rule: &'a EventRule,
}

/// A contiguous run of days inside a query range on which a rule is active.
#[derive(Debug, Clone, Serialize)]
pub struct EventSpan<'a> {
    pub rule: &'a EventRule,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingEvent<'a> {
    pub rule: &'a EventRule,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub active_now: bool,
}

/// Display order for rules sharing a date: tier descending, then name.
fn display_order(a: &EventRule, b: &EventRule) -> Ordering {
    b.tier.cmp(&a.tier).then_with(|| a.name.cmp(&b.name))
}

fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(1))
}

fn prev_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(1))
}

/// Bounds of the occurrence of `rule` that contains `day`.
fn occurrence_containing(rule: &EventRule, day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let mut start = day;
    for _ in 0..YEAR_SLOTS {
        if MonthDay::from_date(start) == rule.start_date {
            break;
        }
        match prev_day(start) {
            Some(prev) if rule.is_active_on(prev) => start = prev,
            _ => break,
        }
    }

    let mut end = day;
    for _ in 0..YEAR_SLOTS {
        if MonthDay::from_date(end) == rule.end_date {
            break;
        }
        match next_day(end) {
            Some(next) if rule.is_active_on(next) => end = next,
            _ => break,
        }
    }

    (start, end)
}

impl PricingEngine {
    fn check_range(&self, start: NaiveDate, end: NaiveDate) -> Result<(), PricingError> {
        if end < start {
            return Err(PricingError::InvalidDateRange { start, end });
        }
        let days = (end - start).num_days() + 1;
        let max = self.config().max_projection_days;
        if days > max {
            return Err(PricingError::RangeTooLarge { days, max });
        }
        Ok(())
    }

    /// Every (date, rule) pair in `[start, end]`, keywords ignored. Ordered by
    /// date, then tier descending, then name.
    pub fn project_calendar(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CalendarEntry<'_>>, PricingError> {
        self.check_range(start, end)?;

        let mut entries = Vec::new();
        for date in start.iter_days().take_while(|d| *d <= end) {
            let mut active = self.active_rules(date);
            active.sort_by(|a, b| display_order(a, b));
            entries.extend(active.into_iter().map(|rule| CalendarEntry { date, rule }));
        }

        tracing::debug!(%start, %end, entries = entries.len(), "Projected calendar");
        Ok(entries)
    }

    /// The projection collapsed into per-rule runs, clipped to `[start, end]`.
    pub fn active_spans(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<EventSpan<'_>>, PricingError> {
        self.check_range(start, end)?;

        let mut spans = Vec::new();
        for rule in self.rules() {
            let mut open: Option<NaiveDate> = None;
            let mut last = start;

            for date in start.iter_days().take_while(|d| *d <= end) {
                if rule.is_active_on(date) {
                    open.get_or_insert(date);
                } else if let Some(span_start) = open.take() {
                    spans.push(EventSpan { rule, start: span_start, end: last });
                }
                last = date;
            }

            if let Some(span_start) = open {
                spans.push(EventSpan { rule, start: span_start, end });
            }
        }

        spans.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| display_order(a.rule, b.rule)));
        Ok(spans)
    }

    /// For each rule, the occurrence running on `today` or else the next one,
    /// nearest first.
    pub fn upcoming_events(&self, today: NaiveDate, limit: usize) -> Vec<UpcomingEvent<'_>> {
        let mut upcoming: Vec<UpcomingEvent<'_>> = self
            .rules()
            .iter()
            .filter_map(|rule| {
                if rule.is_active_on(today) {
                    let (start, end) = occurrence_containing(rule, today);
                    return Some(UpcomingEvent { rule, start, end, active_now: true });
                }

                let first = today
                    .iter_days()
                    .skip(1)
                    .take(OCCURRENCE_SEARCH_DAYS)
                    .find(|d| rule.is_active_on(*d))?;
                let (start, end) = occurrence_containing(rule, first);
                Some(UpcomingEvent { rule, start, end, active_now: false })
            })
            .collect();

        upcoming.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| display_order(a.rule, b.rule)));
        upcoming.truncate(limit);
        upcoming
    }
}
