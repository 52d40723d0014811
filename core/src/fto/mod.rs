pub mod aggregate;
pub mod summary;

pub use aggregate::aggregate;
pub use summary::{summarize_prior_art, PriorArtSummary};
