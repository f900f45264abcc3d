//! Month view over diary entries.
//!
//! Weeks start on Sunday; the day grid opens with blanks up to the weekday of
//! the first of the month. `[` and `]` page through months and open the
//! latest entry of the month shown.

use bevy::prelude::*;
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};
use std::collections::BTreeSet;

use crate::input::is_text_entry_active;
use crate::model::{EntryId, PhotoEntry};
use crate::session::EditSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarMonth {
    year: i32,
    /// 1..=12
    month: u32,
}

impl CalendarMonth {
    /// Returns `None` for a month outside `1..=12`
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// The month containing `date` in the given time zone
    pub fn containing<Tz: TimeZone>(date: DateTime<Utc>, tz: &Tz) -> Self {
        let local = date.with_timezone(tz);
        Self {
            year: local.year(),
            month: local.month(),
        }
    }

    /// The current month in local time
    pub fn current() -> Self {
        Self::containing(Utc::now(), &Local)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// e.g. "November 2024"
    pub fn label(&self) -> String {
        self.first_day()
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }

    pub fn contains<Tz: TimeZone>(&self, date: DateTime<Utc>, tz: &Tz) -> bool {
        Self::containing(date, tz) == *self
    }

    fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn day_count(&self) -> u32 {
        let (Some(first), Some(next_first)) = (self.first_day(), self.next().first_day()) else {
            return 0;
        };
        (next_first - first).num_days() as u32
    }

    /// Day cells for a Sunday-first grid; `None` cells pad the first week
    pub fn days(&self) -> Vec<Option<NaiveDate>> {
        let Some(first) = self.first_day() else {
            return Vec::new();
        };
        let leading = first.weekday().num_days_from_sunday() as usize;
        let mut cells = vec![None; leading];
        cells.extend(
            first
                .iter_days()
                .take(self.day_count() as usize)
                .map(Some),
        );
        cells
    }

    /// Entries dated in this month, oldest first
    pub fn entries_in_month<'a, Tz: TimeZone>(
        &self,
        entries: impl IntoIterator<Item = &'a PhotoEntry>,
        tz: &Tz,
    ) -> Vec<&'a PhotoEntry> {
        let mut matching: Vec<_> = entries
            .into_iter()
            .filter(|entry| self.contains(entry.date(), tz))
            .collect();
        matching.sort_by_key(|entry| entry.date());
        matching
    }

    /// Days of the month (1-based) having at least one entry
    pub fn days_with_entries<'a, Tz: TimeZone>(
        &self,
        entries: impl IntoIterator<Item = &'a PhotoEntry>,
        tz: &Tz,
    ) -> BTreeSet<u32> {
        entries
            .into_iter()
            .map(|entry| entry.date().with_timezone(tz))
            .filter(|local| local.year() == self.year && local.month() == self.month)
            .map(|local| local.day())
            .collect()
    }
}

/// Month currently shown in the calendar
#[derive(Resource, Debug, Clone, Copy)]
pub struct CalendarView {
    pub month: CalendarMonth,
}

impl Default for CalendarView {
    fn default() -> Self {
        Self {
            month: CalendarMonth::current(),
        }
    }
}

impl CalendarView {
    /// Move one month and select the latest entry dated in it.
    ///
    /// Returns the selected entry, or `None` for an empty month (the
    /// session's selection is left alone then).
    pub fn step<Tz: TimeZone>(
        &mut self,
        session: &mut EditSession,
        forward: bool,
        tz: &Tz,
    ) -> Option<EntryId> {
        self.month = if forward {
            self.month.next()
        } else {
            self.month.previous()
        };
        let latest = self
            .month
            .entries_in_month(session.entries(), tz)
            .last()
            .map(|entry| entry.id());
        match latest {
            Some(id) => {
                session.select_entry(id);
                info!("{}: showing entry {}", self.month.label(), id);
            }
            None => debug!("{}: no entries", self.month.label()),
        }
        latest
    }
}

fn browse_calendar(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut view: ResMut<CalendarView>,
    mut session: ResMut<EditSession>,
) {
    if is_text_entry_active(session.modes()) {
        return;
    }
    if keyboard.just_pressed(KeyCode::BracketLeft) {
        view.step(&mut session, false, &Local);
    } else if keyboard.just_pressed(KeyCode::BracketRight) {
        view.step(&mut session, true, &Local);
    }
}

pub struct CalendarPlugin;

impl Plugin for CalendarPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CalendarView>()
            .add_systems(Update, browse_calendar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntryId, Photo};
    use chrono::{FixedOffset, Weekday};

    fn entry_on(y: i32, m: u32, d: u32, h: u32) -> PhotoEntry {
        let date = Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
        PhotoEntry::restore(EntryId::new(), date, Photo::from_bytes(vec![0]))
    }

    #[test]
    fn test_label() {
        assert_eq!(CalendarMonth::new(2024, 11).unwrap().label(), "November 2024");
        assert!(CalendarMonth::new(2024, 13).is_none());
    }

    #[test]
    fn test_next_and_previous_wrap_years() {
        let december = CalendarMonth::new(2024, 12).unwrap();
        assert_eq!(december.next(), CalendarMonth::new(2025, 1).unwrap());
        assert_eq!(december.next().previous(), december);
        assert_eq!(
            CalendarMonth::new(2024, 1).unwrap().previous(),
            CalendarMonth::new(2023, 12).unwrap()
        );
    }

    #[test]
    fn test_day_counts() {
        assert_eq!(CalendarMonth::new(2024, 2).unwrap().day_count(), 29);
        assert_eq!(CalendarMonth::new(2023, 2).unwrap().day_count(), 28);
        assert_eq!(CalendarMonth::new(2024, 12).unwrap().day_count(), 31);
    }

    #[test]
    fn test_days_grid_starts_on_sunday() {
        // November 1st 2024 was a Friday: five blanks
        let days = CalendarMonth::new(2024, 11).unwrap().days();
        assert_eq!(days.iter().take_while(|d| d.is_none()).count(), 5);
        assert_eq!(days.len(), 5 + 30);
        let first = days[5].unwrap();
        assert_eq!(first.weekday(), Weekday::Fri);
        assert_eq!(days.last().unwrap().unwrap().day(), 30);
    }

    #[test]
    fn test_entries_filtered_by_local_month() {
        let month = CalendarMonth::new(2024, 11).unwrap();
        let entries = [
            entry_on(2024, 11, 12, 10),
            entry_on(2024, 11, 3, 10),
            entry_on(2024, 10, 31, 23),
            entry_on(2024, 12, 1, 1),
        ];

        let utc = month.entries_in_month(entries.iter(), &Utc);
        assert_eq!(utc.len(), 2);
        assert!(utc[0].date() < utc[1].date());

        // Two hours east, Oct 31 23:00 UTC is already November 1st
        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        let days = month.days_with_entries(entries.iter(), &east);
        assert_eq!(days.into_iter().collect::<Vec<_>>(), vec![1, 3, 12]);
    }

    #[test]
    fn test_view_steps_to_latest_entry_of_month() {
        let mut session = EditSession::default();
        let newest = entry_on(2024, 11, 20, 8);
        let newest_id = newest.id();
        session.restore_entries(vec![
            entry_on(2024, 11, 2, 8),
            newest,
            entry_on(2025, 1, 5, 8),
        ]);
        let mut view = CalendarView {
            month: CalendarMonth::new(2024, 12).unwrap(),
        };

        assert_eq!(view.step(&mut session, false, &Utc), Some(newest_id));
        assert_eq!(view.month, CalendarMonth::new(2024, 11).unwrap());
        assert_eq!(session.active_entry_id(), Some(newest_id));

        // December is empty: the selection stays put
        assert_eq!(view.step(&mut session, true, &Utc), None);
        assert_eq!(session.active_entry_id(), Some(newest_id));
    }
}
