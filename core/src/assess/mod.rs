pub mod blocking;
pub mod invalidity;

pub use blocking::assess_blocking;
pub use invalidity::{assess_invalidity, broadest_independent_claim};
