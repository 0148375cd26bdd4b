// libs/availability-cell/src/services/location.rs

use tracing::debug;

use crate::models::{Booking, ClockTime, Location, LocationKind, ServiceCategory};
use crate::services::time::overlaps;

/// Advises a room for an interval from a fixed snapshot of the day's bookings.
///
/// The advice is not a reservation. Two callers holding the same snapshot can
/// be pointed at the same room, so the store must enforce capacity again when
/// the booking is committed.
pub struct LocationAssigner<'a> {
    locations: &'a [Location],
    bookings: &'a [Booking],
}

impl<'a> LocationAssigner<'a> {
    pub fn new(locations: &'a [Location], bookings: &'a [Booking]) -> Self {
        Self { locations, bookings }
    }

    /// First location in policy order with spare capacity for `[start, end)`.
    pub fn assign(
        &self,
        category: ServiceCategory,
        start: ClockTime,
        end: ClockTime,
    ) -> Option<&'a Location> {
        for location in policy_order(category, self.locations) {
            let occupied = self.occupancy(location, start, end);
            if occupied < location.capacity.get() as usize {
                return Some(location);
            }
            debug!(
                "Location {} full for {}-{} ({}/{})",
                location.id, start, end, occupied, location.capacity
            );
        }
        None
    }

    /// Active bookings held in `location` that overlap `[start, end)`.
    pub fn occupancy(&self, location: &Location, start: ClockTime, end: ClockTime) -> usize {
        self.bookings
            .iter()
            .filter(|b| b.is_active())
            .filter(|b| b.location_id.as_ref() == Some(&location.id))
            .filter(|b| overlaps(start, end, b.start, b.end))
            .count()
    }
}

/// Attendance tries shared spaces first and overflows into private offices.
/// Consultation tries private offices first and falls back to shared spaces.
/// Listed order is kept within each kind.
pub fn policy_order(category: ServiceCategory, locations: &[Location]) -> Vec<&Location> {
    let preferred = match category {
        ServiceCategory::Attendance => LocationKind::Shared,
        ServiceCategory::Consultation => LocationKind::Private,
    };

    let (mut ordered, overflow): (Vec<&Location>, Vec<&Location>) =
        locations.iter().partition(|l| l.kind == preferred);
    ordered.extend(overflow);
    ordered
}

/// Convenience wrapper around [`LocationAssigner::assign`].
pub fn assign<'a>(
    category: ServiceCategory,
    start: ClockTime,
    end: ClockTime,
    locations: &'a [Location],
    bookings_on_day: &'a [Booking],
) -> Option<&'a Location> {
    LocationAssigner::new(locations, bookings_on_day).assign(category, start, end)
}
