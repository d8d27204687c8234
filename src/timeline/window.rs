use chrono::{Datelike, Months, NaiveDate};

/// Months of padding kept on either side of today by [`DateWindow::around`].
pub const RESET_PADDING_MONTHS: u32 = 1;

/// First day of the month containing `date`.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let first = start_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    end_of_month(date).day()
}

fn plus_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

fn minus_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months)).unwrap_or(date)
}

/// The materialized range of days backing the timeline.
///
/// `start` is always the first day of a month and `end` the last day of a
/// month; the window only ever moves in whole months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window from the start of the previous month to the end of the next one.
    pub fn around(today: NaiveDate) -> Self {
        Self {
            start: start_of_month(minus_months(today, RESET_PADDING_MONTHS)),
            end: end_of_month(plus_months(today, RESET_PADDING_MONTHS)),
        }
    }

    /// Snap an arbitrary range outwards to whole months.
    pub fn covering(start: NaiveDate, end: NaiveDate) -> Self {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        Self {
            start: start_of_month(start),
            end: end_of_month(end),
        }
    }

    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::around(today);
    }

    /// Slide one month later. Returns the number of days that left on the left.
    pub fn move_forward(&mut self) -> u32 {
        let leaving = days_in_month(self.start);
        self.start = start_of_month(plus_months(self.start, 1));
        self.end = end_of_month(plus_months(self.end, 1));
        leaving
    }

    /// Slide one month earlier. Returns the number of days that entered on the left.
    pub fn move_back(&mut self) -> u32 {
        self.start = start_of_month(minus_months(self.start, 1));
        self.end = end_of_month(minus_months(self.end, 1));
        days_in_month(self.start)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days in the window, counting both ends.
    pub fn len_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1).max(0) as usize
    }

    /// Zero-based column of `date`, if it is inside the window.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if self.contains(date) {
            Some((date - self.start).num_days() as usize)
        } else {
            None
        }
    }

    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index < self.len_days() {
            self.start
                .checked_add_days(chrono::Days::new(index as u64))
        } else {
            None
        }
    }

    /// Every day of the window, in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .collect()
    }
}
