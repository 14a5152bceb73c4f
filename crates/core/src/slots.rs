//! # Slot Model
//!
//! Time is discretized into fixed 30-minute slots. A [`SlotTime`] is a
//! wall-clock label (`HH:MM`) aligned to a slot boundary, a [`TimeWindow`]
//! is the daily range a meeting is polled over, and a [`TimeSlot`] is one
//! concrete half hour on one date.
//!
//! Labels coming from outside the service are parsed here and nowhere else,
//! so everything downstream of this module can assume well-formed slots.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{MeetError, MeetResult};

/// Length of one slot in minutes
pub const SLOT_MINUTES: u16 = 30;

/// Minutes in a day; `24:00` is a valid end boundary but never a slot start
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day on a 30-minute boundary, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(u16);

impl SlotTime {
    pub const MIDNIGHT: SlotTime = SlotTime(0);
    pub const END_OF_DAY: SlotTime = SlotTime(MINUTES_PER_DAY);

    pub fn from_minutes(minutes: u16) -> MeetResult<Self> {
        if minutes > MINUTES_PER_DAY {
            return Err(MeetError::Validation(format!(
                "Time {} minutes is past the end of the day",
                minutes
            )));
        }
        if minutes % SLOT_MINUTES != 0 {
            return Err(MeetError::Validation(format!(
                "Time {:02}:{:02} is not on a 30-minute boundary",
                minutes / 60,
                minutes % 60
            )));
        }
        Ok(Self(minutes))
    }

    pub fn from_hm(hour: u16, minute: u16) -> MeetResult<Self> {
        if minute >= 60 {
            return Err(MeetError::Validation(format!(
                "Invalid minute value {}",
                minute
            )));
        }
        let minutes = hour
            .checked_mul(60)
            .and_then(|m| m.checked_add(minute))
            .ok_or_else(|| MeetError::Validation(format!("Invalid hour value {}", hour)))?;
        Self::from_minutes(minutes)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Whether a slot may begin at this label (everything but `24:00`)
    pub fn is_slot_start(self) -> bool {
        self.0 < MINUTES_PER_DAY
    }

    /// End of the slot starting at this label, rolling the hour over
    /// (`09:30 -> 10:00`, `23:30 -> 24:00`). `None` for `24:00`.
    pub fn end_time(self) -> Option<SlotTime> {
        self.is_slot_start().then_some(SlotTime(self.0 + SLOT_MINUTES))
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for SlotTime {
    type Err = MeetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed =
            || MeetError::Validation(format!("Invalid time label '{}': expected HH:MM", s));

        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(malformed());
        }
        let (hh, mm) = (&s[0..2], &s[3..5]);
        if !hh.bytes().chain(mm.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let hour: u16 = hh.parse().map_err(|_| malformed())?;
        let minute: u16 = mm.parse().map_err(|_| malformed())?;
        if hour > 24 {
            return Err(malformed());
        }
        Self::from_hm(hour, minute)
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Whether the end label of a window is itself a slot start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    #[default]
    Exclusive,
    Inclusive,
}

/// Half-hour labels from `start` up to `end`, stepping by 30 minutes.
///
/// With [`Boundary::Exclusive`] the last label is before `end`; with
/// [`Boundary::Inclusive`] `end` itself is emitted when it can start a slot.
/// An inverted window yields nothing.
pub fn generate_time_slots(start: SlotTime, end: SlotTime, boundary: Boundary) -> Vec<SlotTime> {
    (start.0..)
        .step_by(SLOT_MINUTES as usize)
        .take_while(|&m| m < MINUTES_PER_DAY)
        .take_while(|&m| match boundary {
            Boundary::Exclusive => m < end.0,
            Boundary::Inclusive => m <= end.0,
        })
        .map(SlotTime)
        .collect()
}

/// Every date from `start` to `end`, both included. Inverted ranges are empty.
pub fn generate_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if end < start {
        return Vec::new();
    }
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Number of calendar days covered by `start..=end`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Daily polling window, normalized to the half-open range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: SlotTime,
    end: SlotTime,
}

impl TimeWindow {
    pub fn new(start: SlotTime, end: SlotTime, boundary: Boundary) -> MeetResult<Self> {
        let end = match boundary {
            Boundary::Exclusive => end,
            Boundary::Inclusive => end.end_time().unwrap_or(SlotTime::END_OF_DAY),
        };
        if start >= end {
            return Err(MeetError::Validation(format!(
                "Time window must end after it starts ({} - {})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn from_minutes(start: u16, end: u16) -> MeetResult<Self> {
        Self::new(
            SlotTime::from_minutes(start)?,
            SlotTime::from_minutes(end)?,
            Boundary::Exclusive,
        )
    }

    pub fn full_day() -> Self {
        Self {
            start: SlotTime::MIDNIGHT,
            end: SlotTime::END_OF_DAY,
        }
    }

    pub fn start(&self) -> SlotTime {
        self.start
    }

    /// Exclusive end of the window
    pub fn end(&self) -> SlotTime {
        self.end
    }

    pub fn is_full_day(&self) -> bool {
        *self == Self::full_day()
    }

    pub fn contains(&self, time: SlotTime) -> bool {
        self.start <= time && time < self.end
    }

    pub fn slots(&self) -> Vec<SlotTime> {
        generate_time_slots(self.start, self.end, Boundary::Exclusive)
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::full_day()
    }
}

/// Identity of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub time: SlotTime,
}

impl SlotKey {
    pub fn new(date: NaiveDate, time: SlotTime) -> Self {
        Self { date, time }
    }
}

/// One half hour on one date. `end_time` is always `start_time + 30min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSlot")]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub start_time: SlotTime,
    pub end_time: SlotTime,
}

impl TimeSlot {
    pub fn new(date: NaiveDate, start_time: SlotTime) -> MeetResult<Self> {
        let end_time = start_time.end_time().ok_or_else(|| {
            MeetError::Validation(format!("A slot cannot start at {}", start_time))
        })?;
        Ok(Self {
            date,
            start_time,
            end_time,
        })
    }

    /// Builds a slot from all three parts, rejecting an end that is not
    /// exactly one slot after the start.
    pub fn from_parts(date: NaiveDate, start_time: SlotTime, end_time: SlotTime) -> MeetResult<Self> {
        let slot = Self::new(date, start_time)?;
        if slot.end_time != end_time {
            return Err(MeetError::Validation(format!(
                "Slot {} {}-{} must span exactly {} minutes",
                date, start_time, end_time, SLOT_MINUTES
            )));
        }
        Ok(slot)
    }

    pub fn key(&self) -> SlotKey {
        SlotKey::new(self.date, self.start_time)
    }
}

impl From<SlotKey> for TimeSlot {
    fn from(key: SlotKey) -> Self {
        // Keys are only built from slot starts, which always have an end.
        let end_time = key.time.end_time().unwrap_or(SlotTime::END_OF_DAY);
        Self {
            date: key.date,
            start_time: key.time,
            end_time,
        }
    }
}

#[derive(Deserialize)]
struct RawTimeSlot {
    date: NaiveDate,
    start_time: SlotTime,
    end_time: SlotTime,
}

impl TryFrom<RawTimeSlot> for TimeSlot {
    type Error = MeetError;

    fn try_from(raw: RawTimeSlot) -> Result<Self, Self::Error> {
        Self::from_parts(raw.date, raw.start_time, raw.end_time)
    }
}
