// libs/availability-cell/src/services/suggestion.rs

use chrono::NaiveDate;

use crate::models::{SmartSuggestion, TimeSlot};
use crate::services::time::date_seed;

/// At most this many equally-scored slots compete for a period's pick.
const TIE_WINDOW: usize = 3;

/// Chooses one index among `candidates` equally good options for `date`.
///
/// Implementations must be pure functions of their inputs so that repeating a
/// query on the same day returns the same recommendation.
pub trait TieBreak {
    fn pick(&self, date: NaiveDate, candidates: usize) -> usize;
}

/// `date_seed("YYYY-MM-DD") mod candidates`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateSeedTieBreak;

impl TieBreak for DateSeedTieBreak {
    fn pick(&self, date: NaiveDate, candidates: usize) -> usize {
        if candidates == 0 {
            return 0;
        }
        let seed = date_seed(&date.format("%Y-%m-%d").to_string());
        seed as usize % candidates
    }
}

pub struct SuggestionSelector<T: TieBreak = DateSeedTieBreak> {
    tie_break: T,
}

impl SuggestionSelector {
    pub fn date_seeded() -> Self {
        Self::new(DateSeedTieBreak)
    }
}

impl<T: TieBreak> SuggestionSelector<T> {
    pub fn new(tie_break: T) -> Self {
        Self { tie_break }
    }

    /// Reduces scored slots to a morning pick, an afternoon pick and up to
    /// `max_alternatives` runners-up.
    pub fn select(
        &self,
        date: NaiveDate,
        mut slots: Vec<TimeSlot>,
        max_alternatives: usize,
    ) -> SmartSuggestion {
        if slots.is_empty() {
            return SmartSuggestion::empty(date);
        }

        slots.sort_by_key(|slot| slot.time);

        let (morning, afternoon): (Vec<usize>, Vec<usize>) =
            (0..slots.len()).partition(|&i| slots[i].is_morning());

        let morning_pick = self.best_of(date, &slots, &morning);
        let afternoon_pick = self.best_of(date, &slots, &afternoon);

        let mut morning_best = None;
        let mut afternoon_best = None;
        let mut alternatives = Vec::with_capacity(slots.len());
        for (index, slot) in slots.into_iter().enumerate() {
            if Some(index) == morning_pick {
                morning_best = Some(slot);
            } else if Some(index) == afternoon_pick {
                afternoon_best = Some(slot);
            } else {
                alternatives.push(slot);
            }
        }

        // Stable: equal scores keep ascending time order.
        alternatives.sort_by(|a, b| b.score.cmp(&a.score));
        alternatives.truncate(max_alternatives);

        SmartSuggestion {
            date,
            morning: morning_best,
            afternoon: afternoon_best,
            alternative_slots: alternatives,
        }
    }

    fn best_of(&self, date: NaiveDate, slots: &[TimeSlot], period: &[usize]) -> Option<usize> {
        let top = period.iter().map(|&i| slots[i].score).max()?;
        let tied: Vec<usize> = period
            .iter()
            .copied()
            .filter(|&i| slots[i].score == top)
            .take(TIE_WINDOW)
            .collect();

        let pick = self.tie_break.pick(date, tied.len()).min(tied.len() - 1);
        Some(tied[pick])
    }
}
