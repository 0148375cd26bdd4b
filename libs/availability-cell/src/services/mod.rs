pub mod time;
pub mod slots;
pub mod location;
pub mod scoring;
pub mod suggestion;
pub mod engine;

pub use engine::SmartSuggestionService;
pub use location::LocationAssigner;
pub use scoring::{ScoringContext, ScoringEngine};
pub use slots::SlotGenerator;
pub use suggestion::{DateSeedTieBreak, SuggestionSelector, TieBreak};
