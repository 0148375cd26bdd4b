// libs/availability-cell/src/services/slots.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{
    AvailabilityError, Booking, ClockTime, Professional, Service, TimeSlot, WorkingBlock,
    MINUTES_PER_DAY,
};
use crate::services::time::{generate_candidates, overlaps};

pub struct SlotGenerator {
    default_interval_minutes: u32,
}

impl SlotGenerator {
    pub fn new(default_interval_minutes: u32) -> Self {
        Self {
            default_interval_minutes: default_interval_minutes.max(1),
        }
    }

    /// Step between candidate start times for this professional.
    pub fn interval_for(&self, professional: &Professional) -> u32 {
        professional
            .slot_interval_minutes
            .filter(|minutes| *minutes > 0)
            .unwrap_or(self.default_interval_minutes)
    }

    /// Open slots for `professional` offering `service` on `date`.
    ///
    /// Disabled online booking and unoffered services yield an empty list,
    /// not an error.
    pub fn open_slots(
        &self,
        professional: &Professional,
        service: &Service,
        date: NaiveDate,
        working_blocks: &[WorkingBlock],
        bookings: &[Booking],
        today: NaiveDate,
    ) -> Result<Vec<TimeSlot>, AvailabilityError> {
        if !professional.online_booking_enabled {
            debug!("Online booking disabled for professional {}", professional.id);
            return Ok(Vec::new());
        }

        if !professional.offers(&service.id) {
            debug!("Professional {} does not offer service {}", professional.id, service.id);
            return Ok(Vec::new());
        }

        generate(
            working_blocks,
            bookings,
            service.duration_minutes,
            professional.min_advance_booking_days,
            date,
            today,
            self.interval_for(professional),
        )
    }
}

/// Calendar-day comparison only, so wall-clock offsets can't shift the boundary.
pub fn lead_time_satisfied(date: NaiveDate, today: NaiveDate, booking_lead_days: u32) -> bool {
    (date - today).num_days() >= i64::from(booking_lead_days)
}

/// Every non-overlapping candidate slot inside `working_blocks`, ascending by
/// start time and unique per start time.
pub fn generate(
    working_blocks: &[WorkingBlock],
    bookings: &[Booking],
    duration_minutes: u32,
    booking_lead_days: u32,
    date: NaiveDate,
    today: NaiveDate,
    step_minutes: u32,
) -> Result<Vec<TimeSlot>, AvailabilityError> {
    if duration_minutes == 0 || duration_minutes >= MINUTES_PER_DAY {
        return Err(AvailabilityError::InvalidDuration(duration_minutes));
    }

    if !lead_time_satisfied(date, today, booking_lead_days) {
        debug!(
            "{} is inside the {} day booking lead time from {}",
            date, booking_lead_days, today
        );
        return Ok(Vec::new());
    }

    let active: Vec<&Booking> = bookings.iter().filter(|b| b.is_active()).collect();
    let mut slots: BTreeMap<ClockTime, TimeSlot> = BTreeMap::new();

    for block in working_blocks {
        for start in generate_candidates(block.start(), block.end(), step_minutes, duration_minutes) {
            if slots.contains_key(&start) {
                continue;
            }

            let end = start.checked_add(duration_minutes)?;
            let blocked = active
                .iter()
                .any(|booking| overlaps(start, end, booking.start, booking.end));

            if !blocked {
                slots.insert(start, TimeSlot::new(date, start, end));
            }
        }
    }

    debug!("Generated {} open slots for {}", slots.len(), date);
    Ok(slots.into_values().collect())
}
