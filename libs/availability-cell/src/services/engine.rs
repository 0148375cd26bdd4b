// libs/availability-cell/src/services/engine.rs

use chrono::NaiveDate;
use tracing::{debug, instrument};

use shared_config::AppConfig;

use crate::models::{AvailabilityError, ScoringWeights, SmartSuggestion, SuggestionContext, TimeSlot};
use crate::services::location::LocationAssigner;
use crate::services::scoring::{ScoringContext, ScoringEngine};
use crate::services::slots::SlotGenerator;
use crate::services::suggestion::{DateSeedTieBreak, SuggestionSelector, TieBreak};

/// Runs generation, placement, scoring and selection for one
/// professional/service/day. Holds no state between calls.
pub struct SmartSuggestionService<T: TieBreak = DateSeedTieBreak> {
    generator: SlotGenerator,
    scoring: ScoringEngine,
    selector: SuggestionSelector<T>,
    max_alternatives: usize,
}

impl SmartSuggestionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            generator: SlotGenerator::new(config.default_slot_interval_minutes),
            scoring: ScoringEngine::new(config.scoring_weights, config.average_daily_bookings),
            selector: SuggestionSelector::date_seeded(),
            max_alternatives: config.max_alternatives,
        }
    }
}

impl<T: TieBreak> SmartSuggestionService<T> {
    /// Same pipeline with a different tie-break strategy.
    pub fn with_tie_break<U: TieBreak>(self, tie_break: U) -> SmartSuggestionService<U> {
        SmartSuggestionService {
            generator: self.generator,
            scoring: self.scoring,
            selector: SuggestionSelector::new(tie_break),
            max_alternatives: self.max_alternatives,
        }
    }

    /// Per-call rubric override.
    pub fn with_weights(mut self, weights: ScoringWeights, average_daily_bookings: u32) -> Self {
        self.scoring = ScoringEngine::new(weights, average_daily_bookings);
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        self.scoring.weights()
    }

    /// Every open slot of the day, placed and scored, in ascending time order.
    pub fn open_slots(
        &self,
        context: &SuggestionContext,
        today: NaiveDate,
    ) -> Result<Vec<TimeSlot>, AvailabilityError> {
        let mut slots = self.generator.open_slots(
            &context.professional,
            &context.service,
            context.date,
            &context.working_blocks,
            &context.existing_appointments,
            today,
        )?;

        if !context.locations.is_empty() {
            let assigner = LocationAssigner::new(&context.locations, &context.location_bookings);
            for slot in slots.iter_mut() {
                slot.location_id = assigner
                    .assign(context.service.category, slot.time, slot.end_time)
                    .map(|location| location.id.clone());
            }

            if context.require_location {
                let before = slots.len();
                slots.retain(|slot| slot.location_id.is_some());
                debug!("Dropped {} slots without a free location", before - slots.len());
            }
        }

        let scoring_context = ScoringContext::new(
            today,
            &context.existing_appointments,
            context.patient_history.as_deref(),
        );
        for slot in slots.iter_mut() {
            self.scoring.score(slot, &scoring_context);
        }

        Ok(slots)
    }

    /// Best morning slot, best afternoon slot and ranked alternatives.
    #[instrument(
        skip(self, context),
        fields(
            professional_id = %context.professional_id(),
            service_id = %context.service_id(),
            date = %context.date
        )
    )]
    pub fn suggest(
        &self,
        context: &SuggestionContext,
        today: NaiveDate,
        max_alternatives: Option<usize>,
    ) -> Result<SmartSuggestion, AvailabilityError> {
        let slots = self.open_slots(context, today)?;
        let suggestion = self.selector.select(
            context.date,
            slots,
            max_alternatives.unwrap_or(self.max_alternatives),
        );

        if suggestion.is_empty() {
            debug!("No availability on {}", context.date);
        } else {
            debug!(
                "Suggested morning={:?} afternoon={:?} with {} alternatives",
                suggestion.morning.as_ref().map(|s| s.time.to_string()),
                suggestion.afternoon.as_ref().map(|s| s.time.to_string()),
                suggestion.alternative_slots.len()
            );
        }

        Ok(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Booking, BookingStatus, ClockTime, Location, LocationKind, Professional, ScoreReason,
        Service, ServiceCategory, WorkingBlock,
    };
    use shared_models::RecordId;
    use std::num::NonZeroU32;

    fn clock(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()
    }

    fn context(category: ServiceCategory) -> SuggestionContext {
        let service = Service {
            id: RecordId::slug("session"),
            duration_minutes: 60,
            category,
        };
        SuggestionContext {
            professional: Professional {
                id: RecordId::slug("ana"),
                online_booking_enabled: true,
                slot_interval_minutes: Some(60),
                min_advance_booking_days: 0,
                service_ids: vec![service.id.clone()],
            },
            service,
            date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            working_blocks: vec![WorkingBlock::new(clock("09:00"), clock("12:00")).unwrap()],
            existing_appointments: vec![],
            patient_history: None,
            locations: vec![],
            location_bookings: vec![],
            require_location: false,
        }
    }

    #[test]
    fn slots_are_scored_once() {
        let service = SmartSuggestionService::new(&AppConfig::default());
        let mut ctx = context(ServiceCategory::Consultation);
        ctx.existing_appointments
            .push(Booking::new(clock("11:00"), clock("12:00"), BookingStatus::Confirmed));

        let slots = service.open_slots(&ctx, today()).unwrap();
        let times: Vec<String> = slots.iter().map(|s| s.time.to_string()).collect();
        assert_eq!(times, vec!["09:00", "10:00"]);
        assert_eq!(slots[1].reasons, vec![ScoreReason::GapFiller]);
        assert!(slots[0].reasons.is_empty());
        assert_eq!(slots[0].score, 1);
    }

    #[test]
    fn required_location_drops_unplaceable_slots() {
        let service = SmartSuggestionService::new(&AppConfig::default());
        let office = Location {
            id: RecordId::slug("office-1"),
            name: "Office 1".to_string(),
            capacity: NonZeroU32::new(1).unwrap(),
            kind: LocationKind::Private,
        };
        let mut ctx = context(ServiceCategory::Consultation);
        ctx.locations.push(office.clone());
        // Another professional holds the office at 10:00.
        ctx.location_bookings.push(
            Booking::new(clock("10:00"), clock("11:00"), BookingStatus::Confirmed)
                .at_location(office.id.clone()),
        );

        let advisory = service.open_slots(&ctx, today()).unwrap();
        let placed: Vec<(String, bool)> = advisory
            .iter()
            .map(|s| (s.time.to_string(), s.location_id.is_some()))
            .collect();
        assert_eq!(
            placed,
            vec![
                ("09:00".to_string(), true),
                ("10:00".to_string(), false),
                ("11:00".to_string(), true),
            ]
        );

        ctx.require_location = true;
        let strict = service.open_slots(&ctx, today()).unwrap();
        assert_eq!(strict.len(), 2);
        assert!(strict.iter().all(|s| s.location_id == Some(office.id.clone())));
    }

    #[test]
    fn suggestion_honours_alternative_override() {
        let service = SmartSuggestionService::new(&AppConfig::default());
        let mut ctx = context(ServiceCategory::Attendance);
        ctx.working_blocks
            .push(WorkingBlock::new(clock("14:00"), clock("18:00")).unwrap());

        let suggestion = service.suggest(&ctx, today(), Some(2)).unwrap();
        assert!(suggestion.morning.is_some());
        assert!(suggestion.afternoon.is_some());
        assert_eq!(suggestion.alternative_slots.len(), 2);
    }
}
