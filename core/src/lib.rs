pub mod assess;
pub mod audit;
pub mod claims;
pub mod config;
pub mod determinism;
pub mod engine;
pub mod fto;
pub mod model;
pub mod normalize;
pub mod report;
pub mod run;
pub mod similarity;
pub mod source;

pub mod error;

pub use config::EngineConfig;
pub use engine::{AnalysisOutcome, AnalysisRequest, CandidatePatent, FtoEngine};
pub use error::{CoreError, CoreResult};
