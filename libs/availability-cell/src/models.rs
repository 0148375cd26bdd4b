use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::RecordId;

pub use shared_config::ScoringWeights;

use crate::services::time::{format_minutes, to_minutes};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

// ==============================================================================
// CLOCK TIME
// ==============================================================================

/// Wall-clock time of day in the clinic's timezone, stored as minutes since
/// midnight. Always within `[0, 1440)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(pub(crate) u32);

impl ClockTime {
    pub fn from_minutes(minutes: u32) -> Result<Self, AvailabilityError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(AvailabilityError::OutOfRange(minutes));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / 60
    }

    pub fn checked_add(self, minutes: u32) -> Result<Self, AvailabilityError> {
        Self::from_minutes(self.0.saturating_add(minutes))
    }
}

impl FromStr for ClockTime {
    type Err = AvailabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        to_minutes(s).map(Self)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = AvailabilityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_minutes(self.0))
    }
}

// ==============================================================================
// SCHEDULE INPUTS
// ==============================================================================

/// Contiguous interval during which a professional works on a weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WorkingBlockRecord")]
pub struct WorkingBlock {
    start: ClockTime,
    end: ClockTime,
}

#[derive(Deserialize)]
struct WorkingBlockRecord {
    start: ClockTime,
    end: ClockTime,
}

impl TryFrom<WorkingBlockRecord> for WorkingBlock {
    type Error = AvailabilityError;

    fn try_from(record: WorkingBlockRecord) -> Result<Self, Self::Error> {
        Self::new(record.start, record.end)
    }
}

impl WorkingBlock {
    pub fn new(start: ClockTime, end: ClockTime) -> Result<Self, AvailabilityError> {
        if start >= end {
            return Err(AvailabilityError::InvalidWorkingBlock { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> ClockTime {
        self.start
    }

    pub fn end(&self) -> ClockTime {
        self.end
    }

    pub fn contains(&self, start: ClockTime, end: ClockTime) -> bool {
        self.start <= start && end <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no_show",
        };
        write!(f, "{}", status)
    }
}

/// Existing appointment on the professional's day, as read from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub start: ClockTime,
    pub end: ClockTime,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<RecordId>,
}

impl Booking {
    pub fn new(start: ClockTime, end: ClockTime, status: BookingStatus) -> Self {
        Self {
            start,
            end,
            status,
            location_id: None,
        }
    }

    pub fn at_location(mut self, location_id: RecordId) -> Self {
        self.location_id = Some(location_id);
        self
    }

    /// Cancelled bookings never block a slot or occupy a room.
    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }
}

/// One of the patient's past visits, used for time-of-day affinity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientVisit {
    pub date: NaiveDate,
    pub time: ClockTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professional {
    pub id: RecordId,
    pub online_booking_enabled: bool,
    #[serde(default)]
    pub slot_interval_minutes: Option<u32>,
    #[serde(default)]
    pub min_advance_booking_days: u32,
    #[serde(default)]
    pub service_ids: Vec<RecordId>,
}

impl Professional {
    pub fn offers(&self, service_id: &RecordId) -> bool {
        self.service_ids.iter().any(|id| id == service_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    /// Supervised sessions held in a shared space (gym floor, pilates studio).
    Attendance,
    /// One-on-one sessions held in a private office.
    Consultation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: RecordId,
    pub duration_minutes: u32,
    pub category: ServiceCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Shared,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: RecordId,
    pub name: String,
    pub capacity: NonZeroU32,
    pub kind: LocationKind,
}

/// Everything the engine needs for one professional, one service, one day.
/// Assembled by the caller from the external store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionContext {
    pub professional: Professional,
    pub service: Service,
    pub date: NaiveDate,
    pub working_blocks: Vec<WorkingBlock>,
    #[serde(default)]
    pub existing_appointments: Vec<Booking>,
    #[serde(default)]
    pub patient_history: Option<Vec<PatientVisit>>,
    #[serde(default)]
    pub locations: Vec<Location>,
    /// Bookings of every professional held in `locations` on `date`.
    #[serde(default)]
    pub location_bookings: Vec<Booking>,
    /// Drop slots for which no location has spare capacity.
    #[serde(default)]
    pub require_location: bool,
}

impl SuggestionContext {
    pub fn professional_id(&self) -> &RecordId {
        &self.professional.id
    }

    pub fn service_id(&self) -> &RecordId {
        &self.service.id
    }

    pub fn service_duration(&self) -> u32 {
        self.service.duration_minutes
    }
}

// ==============================================================================
// ENGINE OUTPUT
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreReason {
    #[serde(rename = "Gap Filler")]
    GapFiller,
    #[serde(rename = "Prime Time")]
    PrimeTime,
    #[serde(rename = "Early Bird")]
    EarlyBird,
    #[serde(rename = "Lunch Hour")]
    LunchHour,
    #[serde(rename = "Same Day")]
    SameDay,
    #[serde(rename = "Patient Preference")]
    PatientPreference,
    #[serde(rename = "Busy Day")]
    BusyDay,
}

impl ScoreReason {
    pub fn label(self) -> &'static str {
        match self {
            ScoreReason::GapFiller => "Gap Filler",
            ScoreReason::PrimeTime => "Prime Time",
            ScoreReason::EarlyBird => "Early Bird",
            ScoreReason::LunchHour => "Lunch Hour",
            ScoreReason::SameDay => "Same Day",
            ScoreReason::PatientPreference => "Patient Preference",
            ScoreReason::BusyDay => "Busy Day",
        }
    }
}

impl fmt::Display for ScoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Candidate appointment interval. Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub time: ClockTime,
    pub end_time: ClockTime,
    pub available: bool,
    pub score: u32,
    pub reasons: Vec<ScoreReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<RecordId>,
}

impl TimeSlot {
    pub fn new(date: NaiveDate, time: ClockTime, end_time: ClockTime) -> Self {
        Self {
            date,
            time,
            end_time,
            available: true,
            score: 0,
            reasons: Vec::new(),
            location_id: None,
        }
    }

    pub fn is_morning(&self) -> bool {
        self.time.hour() < 12
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartSuggestion {
    pub date: NaiveDate,
    pub morning: Option<TimeSlot>,
    pub afternoon: Option<TimeSlot>,
    pub alternative_slots: Vec<TimeSlot>,
}

impl SmartSuggestion {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            morning: None,
            afternoon: None,
            alternative_slots: Vec::new(),
        }
    }

    /// No slot at all for the day. A valid outcome, not a fault.
    pub fn is_empty(&self) -> bool {
        self.morning.is_none() && self.afternoon.is_none() && self.alternative_slots.is_empty()
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvailabilityError {
    #[error("Invalid time format: '{0}' (expected HH:MM)")]
    InvalidFormat(String),

    #[error("Minutes out of range for a clock time: {0}")]
    OutOfRange(u32),

    #[error("Working block must start before it ends: {start}-{end}")]
    InvalidWorkingBlock { start: ClockTime, end: ClockTime },

    #[error("Service duration must be between 1 and 1439 minutes, got {0}")]
    InvalidDuration(u32),
}
