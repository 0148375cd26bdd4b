// libs/availability-cell/src/services/time.rs

use crate::models::{AvailabilityError, ClockTime, MINUTES_PER_DAY};

/// Parse `HH:MM` into minutes since midnight.
pub fn to_minutes(time: &str) -> Result<u32, AvailabilityError> {
    let invalid = || AvailabilityError::InvalidFormat(time.to_string());

    let (hours, minutes) = time.split_once(':').ok_or_else(invalid)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if hours >= 24 || minutes >= 60 {
        return Err(invalid());
    }

    Ok(hours * 60 + minutes)
}

/// Inverse of [`to_minutes`]. Values outside `[0, 1440)` are a caller error,
/// they are never wrapped around midnight.
pub fn to_clock(minutes: u32) -> Result<String, AvailabilityError> {
    if minutes >= MINUTES_PER_DAY {
        return Err(AvailabilityError::OutOfRange(minutes));
    }
    Ok(format_minutes(minutes))
}

pub(crate) fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn add_duration(time: &str, minutes: u32) -> Result<String, AvailabilityError> {
    let start = to_minutes(time)?;
    to_clock(start.saturating_add(minutes))
}

/// Half-open interval overlap: touching intervals do not overlap.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && a_end > b_start
}

/// Start times `start, start + step, ...` for which a `duration`-long
/// appointment still ends at or before `end`.
///
/// The iterator is `Clone`, so a sequence can be restarted from any point.
pub fn generate_candidates(
    start: ClockTime,
    end: ClockTime,
    step_minutes: u32,
    duration_minutes: u32,
) -> CandidateTimes {
    CandidateTimes {
        next: start.minutes(),
        end: end.minutes(),
        step: step_minutes.max(1),
        duration: duration_minutes,
    }
}

#[derive(Debug, Clone)]
pub struct CandidateTimes {
    next: u32,
    end: u32,
    step: u32,
    duration: u32,
}

impl Iterator for CandidateTimes {
    type Item = ClockTime;

    fn next(&mut self) -> Option<ClockTime> {
        let fits = self
            .next
            .checked_add(self.duration)
            .is_some_and(|finish| finish <= self.end);
        if !fits {
            return None;
        }
        let current = ClockTime(self.next);
        // Saturated steps stop the sequence on the next call.
        self.next = self.next.saturating_add(self.step);
        Some(current)
    }
}

/// Stable 32-bit polynomial rolling hash (`h = h * 31 + c`, wrapping) over the
/// UTF-16 code units of `date`, returned as its absolute value.
///
/// Only used to seed tie-breaks; not suitable for anything security related.
pub fn date_seed(date: &str) -> u32 {
    let hash = date.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(i32::from(unit))
    });
    hash.unsigned_abs()
}
