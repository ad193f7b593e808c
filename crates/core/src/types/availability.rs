//! Weekly availability of a therapist.
//!
//! Availability is a fixed record of the seven weekdays, each holding an
//! ordered list of `HH:MM` time slots. It is persisted as a JSON object
//! with all seven keys (`mon`..`sun`) present.
//!
//! Validation rules:
//! - at most [`MAX_SLOTS_PER_DAY`] slots per day
//! - `start` and `end` are two digits, a colon and two digits
//! - `start < end` compared as strings (chronological for zero-padded times)
//!
//! Overlapping slots within a day are accepted.

use core::fmt;

use serde::{Deserialize, Serialize};

pub const MAX_SLOTS_PER_DAY: usize = 3;

/// Errors produced by [`Availability::validate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("{day}: at most {max} slots per day", max = MAX_SLOTS_PER_DAY)]
    TooManySlots { day: DayKey },
    #[error("{day}: invalid time {value:?}, expected HH:MM")]
    InvalidTime { day: DayKey, value: String },
    #[error("{day}: slot must start before it ends ({start} - {end})")]
    StartNotBeforeEnd {
        day: DayKey,
        start: String,
        end: String,
    },
}

impl AvailabilityError {
    /// The day the error refers to.
    #[must_use]
    pub const fn day(&self) -> DayKey {
        match self {
            Self::TooManySlots { day }
            | Self::InvalidTime { day, .. }
            | Self::StartNotBeforeEnd { day, .. } => *day,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKey {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayKey {
    pub const ALL: [Self; 7] = [
        Self::Mon,
        Self::Tue,
        Self::Wed,
        Self::Thu,
        Self::Fri,
        Self::Sat,
        Self::Sun,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mon => "mon",
            Self::Tue => "tue",
            Self::Wed => "wed",
            Self::Thu => "thu",
            Self::Fri => "fri",
            Self::Sat => "sat",
            Self::Sun => "sun",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mon => "Lunes",
            Self::Tue => "Martes",
            Self::Wed => "Miércoles",
            Self::Thu => "Jueves",
            Self::Fri => "Viernes",
            Self::Sat => "Sábado",
            Self::Sun => "Domingo",
        }
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bookable interval, both ends as `HH:MM` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

impl TimeSlot {
    #[must_use]
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    fn validate(&self, day: DayKey) -> Result<(), AvailabilityError> {
        for value in [&self.start, &self.end] {
            if !is_hh_mm(value) {
                return Err(AvailabilityError::InvalidTime {
                    day,
                    value: value.clone(),
                });
            }
        }
        if self.start >= self.end {
            return Err(AvailabilityError::StartNotBeforeEnd {
                day,
                start: self.start.clone(),
                end: self.end.clone(),
            });
        }
        Ok(())
    }
}

fn is_hh_mm(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 5
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 => *b == b':',
            _ => b.is_ascii_digit(),
        })
}

/// Weekly slots keyed by day. Missing days deserialize as empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Availability {
    mon: Vec<TimeSlot>,
    tue: Vec<TimeSlot>,
    wed: Vec<TimeSlot>,
    thu: Vec<TimeSlot>,
    fri: Vec<TimeSlot>,
    sat: Vec<TimeSlot>,
    sun: Vec<TimeSlot>,
}

impl Availability {
    #[must_use]
    pub fn day(&self, day: DayKey) -> &[TimeSlot] {
        match day {
            DayKey::Mon => &self.mon,
            DayKey::Tue => &self.tue,
            DayKey::Wed => &self.wed,
            DayKey::Thu => &self.thu,
            DayKey::Fri => &self.fri,
            DayKey::Sat => &self.sat,
            DayKey::Sun => &self.sun,
        }
    }

    fn day_mut(&mut self, day: DayKey) -> &mut Vec<TimeSlot> {
        match day {
            DayKey::Mon => &mut self.mon,
            DayKey::Tue => &mut self.tue,
            DayKey::Wed => &mut self.wed,
            DayKey::Thu => &mut self.thu,
            DayKey::Fri => &mut self.fri,
            DayKey::Sat => &mut self.sat,
            DayKey::Sun => &mut self.sun,
        }
    }

    /// Replace the slots of one day. Call [`Availability::validate`] before persisting.
    pub fn set_day(&mut self, day: DayKey, slots: Vec<TimeSlot>) {
        *self.day_mut(day) = slots;
    }

    /// Days paired with their slots, `mon` first.
    pub fn iter(&self) -> impl Iterator<Item = (DayKey, &[TimeSlot])> {
        DayKey::ALL.into_iter().map(|d| (d, self.day(d)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, slots)| slots.is_empty())
    }

    /// Check every day against the slot rules, reporting the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`AvailabilityError`] found, scanning `mon` to `sun`.
    pub fn validate(&self) -> Result<(), AvailabilityError> {
        for (day, slots) in self.iter() {
            if slots.len() > MAX_SLOTS_PER_DAY {
                return Err(AvailabilityError::TooManySlots { day });
            }
            for slot in slots {
                slot.validate(day)?;
            }
        }
        Ok(())
    }
}
