// libs/availability-cell/src/services/scoring.rs

use chrono::NaiveDate;

use crate::models::{Booking, PatientVisit, ScoreReason, ScoringWeights, TimeSlot};

const BASE_SCORE: i32 = 1;
const GAP_TOLERANCE_MINUTES: u32 = 15;
const HISTORY_WINDOW_MINUTES: u32 = 60;

const PRIME_TIME_HOURS: std::ops::Range<u32> = 17..20;
const EARLY_BIRD_BEFORE: u32 = 9;
const LUNCH_HOURS: std::ops::Range<u32> = 12..14;

/// Day-level facts shared by every slot being scored.
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    today: NaiveDate,
    bookings: Vec<&'a Booking>,
    preferred_hour: Option<u32>,
}

impl<'a> ScoringContext<'a> {
    pub fn new(
        today: NaiveDate,
        bookings: &'a [Booking],
        patient_history: Option<&[PatientVisit]>,
    ) -> Self {
        Self {
            today,
            bookings: bookings.iter().filter(|b| b.is_active()).collect(),
            preferred_hour: patient_history.and_then(modal_hour),
        }
    }

    pub fn active_bookings(&self) -> usize {
        self.bookings.len()
    }

    pub fn preferred_hour(&self) -> Option<u32> {
        self.preferred_hour
    }
}

/// Hour the patient books most often; the earliest-seen hour wins ties.
pub fn modal_hour(history: &[PatientVisit]) -> Option<u32> {
    let mut counts: Vec<(u32, usize)> = Vec::new();
    for visit in history {
        let hour = visit.time.hour();
        match counts.iter_mut().find(|(h, _)| *h == hour) {
            Some((_, count)) => *count += 1,
            None => counts.push((hour, 1)),
        }
    }

    let mut best: Option<(u32, usize)> = None;
    for (hour, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((hour, count));
        }
    }
    best.map(|(hour, _)| hour)
}

pub struct ScoringEngine {
    weights: ScoringWeights,
    average_daily_bookings: u32,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights, average_daily_bookings: u32) -> Self {
        Self {
            weights,
            average_daily_bookings,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Scores `slot` in place: reasons are appended in rule order and the
    /// clamped score is both stored and returned.
    pub fn score(&self, slot: &mut TimeSlot, context: &ScoringContext<'_>) -> u32 {
        let hour = slot.time.hour();
        let days_ahead = (slot.date - context.today).num_days();
        let near_preferred = context.preferred_hour.is_some_and(|preferred| {
            slot.time.minutes().abs_diff(preferred * 60) <= HISTORY_WINDOW_MINUTES
        });

        let rules = [
            (fills_gap(slot, &context.bookings), self.weights.gap_filler, ScoreReason::GapFiller),
            (PRIME_TIME_HOURS.contains(&hour), self.weights.prime_time, ScoreReason::PrimeTime),
            (hour < EARLY_BIRD_BEFORE, self.weights.early_bird, ScoreReason::EarlyBird),
            (LUNCH_HOURS.contains(&hour), self.weights.lunch_penalty, ScoreReason::LunchHour),
            ((0..=1).contains(&days_ahead), self.weights.same_day, ScoreReason::SameDay),
            (near_preferred, self.weights.patient_history, ScoreReason::PatientPreference),
            (
                self.is_overloaded(context.active_bookings()),
                self.weights.load_balance,
                ScoreReason::BusyDay,
            ),
        ];

        let mut total = BASE_SCORE;
        for (fired, weight, reason) in rules {
            if fired {
                total = total.saturating_add(weight);
                slot.reasons.push(reason);
            }
        }

        let score = total.max(0).unsigned_abs();
        slot.score = score;
        score
    }

    /// More than 1.5x the baseline number of bookings on the day.
    pub fn is_overloaded(&self, active_bookings: usize) -> bool {
        active_bookings * 2 > self.average_daily_bookings as usize * 3
    }
}

/// Slot starts within 15 minutes of a booking ending, or ends within
/// 15 minutes of a booking starting.
fn fills_gap(slot: &TimeSlot, bookings: &[&Booking]) -> bool {
    let start = slot.time.minutes();
    let end = slot.end_time.minutes();
    bookings.iter().any(|b| {
        start.abs_diff(b.end.minutes()) <= GAP_TOLERANCE_MINUTES
            || end.abs_diff(b.start.minutes()) <= GAP_TOLERANCE_MINUTES
    })
}
