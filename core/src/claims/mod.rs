pub mod decompose;
pub mod ingest;
pub mod patterns;

pub use decompose::{decompose, ClaimDecomposer, DecomposedClaims};
pub use ingest::claims_from_text;
