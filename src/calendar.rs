use chrono::{Datelike, Days, NaiveDate};

/// count business days in the inclusive range `[from, to]`, capped at `cap`.
///
/// Monday through Saturday count; only Sunday is skipped. The cap applies
/// to every span, including overdue spans longer than the nominal term.
/// Returns 0 when `from > to`.
pub fn count_business_days(from: NaiveDate, to: NaiveDate, cap: u32) -> u32 {
    let mut days = 0;
    let mut current = from;
    while current <= to && days < cap {
        if current.weekday().num_days_from_monday() < 6 {
            days += 1;
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    days
}

/// calendar days elapsed since `start`, clamped to zero for future starts
pub fn elapsed_calendar_days(start: NaiveDate, today: NaiveDate) -> u32 {
    (today - start).num_days().max(0) as u32
}

/// nominal term end for a loan starting on `start`
pub fn term_end(start: NaiveDate, term_days: i64) -> NaiveDate {
    start
        .checked_add_days(Days::new(term_days as u64))
        .unwrap_or(start)
}
