//! # Availability Aggregator
//!
//! Maps every participant's selected slots onto the meeting grid and
//! answers, per cell, how many and which participants are free.
//!
//! All functions here are pure and work on a snapshot of responses that
//! the caller already fetched. Nothing is cached: the matrix is rebuilt on
//! every read.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::slots::{generate_dates, SlotKey, SlotTime, TimeWindow};

/// One participant's availability for a meeting.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantResponse {
    pub id: Uuid,
    pub name: String,
    pub slots: HashSet<SlotKey>,
}

impl ParticipantResponse {
    pub fn new(id: Uuid, name: impl Into<String>, slots: impl IntoIterator<Item = SlotKey>) -> Self {
        Self {
            id,
            name: name.into(),
            slots: slots.into_iter().collect(),
        }
    }

    pub fn is_selected(&self, date: NaiveDate, time: SlotTime) -> bool {
        self.slots.contains(&SlotKey::new(date, time))
    }
}

pub fn is_selected(participant: &ParticipantResponse, date: NaiveDate, time: SlotTime) -> bool {
    participant.is_selected(date, time)
}

/// Number of responses that include the cell.
pub fn availability_count(date: NaiveDate, time: SlotTime, responses: &[ParticipantResponse]) -> usize {
    responses
        .iter()
        .filter(|r| r.is_selected(date, time))
        .count()
}

/// Fraction of responses that include the cell, `0.0` when nobody responded.
pub fn coverage_ratio(date: NaiveDate, time: SlotTime, responses: &[ParticipantResponse]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    availability_count(date, time, responses) as f64 / responses.len() as f64
}

/// Names of the participants free at the cell, in response order.
pub fn available_names(
    date: NaiveDate,
    time: SlotTime,
    responses: &[ParticipantResponse],
) -> Vec<&str> {
    responses
        .iter()
        .filter(|r| r.is_selected(date, time))
        .map(|r| r.name.as_str())
        .collect()
}

/// Cells where every participant is free, in grid order.
///
/// Empty when nobody has responded: no responses means no consensus.
pub fn best_slots(responses: &[ParticipantResponse], grid: &Grid) -> Vec<SlotKey> {
    if responses.is_empty() {
        return Vec::new();
    }
    grid.cells()
        .filter(|cell| availability_count(cell.date, cell.time, responses) == responses.len())
        .collect()
}

/// Dates x half-hour labels of a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    dates: Vec<NaiveDate>,
    times: Vec<SlotTime>,
}

impl Grid {
    pub fn new(dates: Vec<NaiveDate>, times: Vec<SlotTime>) -> Self {
        Self { dates, times }
    }

    pub fn for_meeting(start_date: NaiveDate, end_date: NaiveDate, window: &TimeWindow) -> Self {
        Self::new(generate_dates(start_date, end_date), window.slots())
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn times(&self) -> &[SlotTime] {
        &self.times
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.times.is_empty()
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.dates.contains(&key.date) && self.times.contains(&key.time)
    }

    /// Every cell, dates outer and times inner.
    pub fn cells(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.dates
            .iter()
            .flat_map(move |&date| self.times.iter().map(move |&time| SlotKey::new(date, time)))
    }

    pub fn aggregate(&self, responses: &[ParticipantResponse]) -> AvailabilityMatrix {
        let rows = self
            .times
            .iter()
            .map(|&time| {
                self.dates
                    .iter()
                    .map(|&date| CellAvailability::compute(date, time, responses))
                    .collect()
            })
            .collect();

        AvailabilityMatrix {
            dates: self.dates.clone(),
            times: self.times.clone(),
            response_count: responses.len(),
            rows,
            best_slots: best_slots(responses, self),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellAvailability {
    pub date: NaiveDate,
    pub time: SlotTime,
    pub count: usize,
    pub ratio: f64,
    pub names: Vec<String>,
}

impl CellAvailability {
    fn compute(date: NaiveDate, time: SlotTime, responses: &[ParticipantResponse]) -> Self {
        let names: Vec<String> = available_names(date, time, responses)
            .into_iter()
            .map(str::to_owned)
            .collect();
        let count = names.len();
        let ratio = if responses.is_empty() {
            0.0
        } else {
            count as f64 / responses.len() as f64
        };
        Self {
            date,
            time,
            count,
            ratio,
            names,
        }
    }
}

/// Coverage of every grid cell. `rows[t][d]` is time `times[t]` on `dates[d]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityMatrix {
    pub dates: Vec<NaiveDate>,
    pub times: Vec<SlotTime>,
    pub response_count: usize,
    pub rows: Vec<Vec<CellAvailability>>,
    pub best_slots: Vec<SlotKey>,
}

impl AvailabilityMatrix {
    pub fn cell(&self, date: NaiveDate, time: SlotTime) -> Option<&CellAvailability> {
        let t = self.times.iter().position(|&x| x == time)?;
        let d = self.dates.iter().position(|&x| x == date)?;
        self.rows.get(t)?.get(d)
    }
}
