pub mod error;
pub mod ids;

pub use ids::RecordId;
