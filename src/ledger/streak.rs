use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Consecutive-day logging streak, updated whenever a transaction is added.
///
/// Deleting transactions never rewinds the streak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub count: u32,
    #[serde(default)]
    pub last_logged: Option<NaiveDate>,
}

impl StreakRecord {
    /// Registers activity on `today`.
    ///
    /// Same day keeps the count, the day after `last_logged` extends it, any
    /// other gap restarts at one.
    pub fn record(&mut self, today: NaiveDate) {
        if self.last_logged == Some(today) {
            return;
        }
        let yesterday = today - Duration::days(1);
        self.count = if self.last_logged == Some(yesterday) {
            self.count.saturating_add(1)
        } else {
            1
        };
        self.last_logged = Some(today);
    }

    /// Streak length as of `today`; zero once a full day has been skipped.
    pub fn live_count(&self, today: NaiveDate) -> u32 {
        match self.last_logged {
            Some(last) if last == today || last == today - Duration::days(1) => self.count,
            _ => 0,
        }
    }

    /// Rebuilds a record from the set of days that have activity.
    ///
    /// Starts at the most recent day not after `today` and walks backward
    /// while the previous day is present.
    pub fn from_dates<I>(dates: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let days: BTreeSet<NaiveDate> = dates.into_iter().filter(|day| *day <= today).collect();
        let Some(&latest) = days.iter().next_back() else {
            return Self::default();
        };

        let mut count = 0u32;
        let mut cursor = latest;
        while days.contains(&cursor) {
            count += 1;
            cursor = cursor - Duration::days(1);
        }

        Self {
            count,
            last_logged: Some(latest),
        }
    }
}
