//! Editing state for one participant's own availability.
//!
//! Cell, row and column toggles plus drag gestures, expressed as explicit
//! state the caller owns between edits.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::slots::{SlotKey, SlotTime, TimeSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Select,
    Deselect,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    slots: BTreeSet<SlotKey>,
    read_only: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_selected(&self, date: NaiveDate, time: SlotTime) -> bool {
        self.slots.contains(&SlotKey::new(date, time))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &SlotKey> {
        self.slots.iter()
    }

    /// Selected cells as wire slots, in date then time order.
    pub fn to_time_slots(&self) -> Vec<TimeSlot> {
        self.slots.iter().copied().map(TimeSlot::from).collect()
    }

    pub fn toggle_cell(&mut self, date: NaiveDate, time: SlotTime) {
        let mode = if self.is_selected(date, time) {
            DragMode::Deselect
        } else {
            DragMode::Select
        };
        self.apply(SlotKey::new(date, time), mode);
    }

    /// Fills the day if any of `times` is missing, otherwise clears the day.
    pub fn toggle_day(&mut self, date: NaiveDate, times: &[SlotTime]) {
        if self.read_only {
            return;
        }
        if times.iter().all(|&time| self.is_selected(date, time)) {
            self.slots.retain(|key| key.date != date);
        } else {
            self.slots
                .extend(times.iter().map(|&time| SlotKey::new(date, time)));
        }
    }

    /// Fills the time row across `dates` if any is missing, otherwise clears it.
    pub fn toggle_time(&mut self, time: SlotTime, dates: &[NaiveDate]) {
        if self.read_only {
            return;
        }
        if dates.iter().all(|&date| self.is_selected(date, time)) {
            self.slots.retain(|key| key.time != time);
        } else {
            self.slots
                .extend(dates.iter().map(|&date| SlotKey::new(date, time)));
        }
    }

    fn apply(&mut self, key: SlotKey, mode: DragMode) {
        if self.read_only {
            return;
        }
        match mode {
            DragMode::Select => {
                self.slots.insert(key);
            }
            DragMode::Deselect => {
                self.slots.remove(&key);
            }
        }
    }
}

impl FromIterator<SlotKey> for Selection {
    fn from_iter<I: IntoIterator<Item = SlotKey>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
            read_only: false,
        }
    }
}

/// A press-and-drag over the grid. The first cell fixes the mode; every
/// other cell the pointer enters gets that mode applied once.
#[derive(Debug, Clone)]
pub struct DragGesture {
    mode: DragMode,
    visited: HashSet<SlotKey>,
}

impl DragGesture {
    pub fn begin(selection: &mut Selection, date: NaiveDate, time: SlotTime) -> Self {
        let key = SlotKey::new(date, time);
        let mode = if selection.is_selected(date, time) {
            DragMode::Deselect
        } else {
            DragMode::Select
        };
        selection.apply(key, mode);
        Self {
            mode,
            visited: HashSet::from([key]),
        }
    }

    pub fn mode(&self) -> DragMode {
        self.mode
    }

    pub fn enter(&mut self, selection: &mut Selection, date: NaiveDate, time: SlotTime) {
        let key = SlotKey::new(date, time);
        if self.visited.insert(key) {
            selection.apply(key, self.mode);
        }
    }

    pub fn end(self) {}
}
