use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClearingStage {
    Collected,
    Analyzed,
    Aggregated,
    Reported,
}

pub fn valid_transition(from: ClearingStage, to: ClearingStage) -> bool {
    matches!(
        (from, to),
        (ClearingStage::Collected, ClearingStage::Analyzed)
            | (ClearingStage::Analyzed, ClearingStage::Aggregated)
            | (ClearingStage::Aggregated, ClearingStage::Reported)
    )
}

pub fn check_transition(from: ClearingStage, to: ClearingStage) -> CoreResult<()> {
    if !valid_transition(from, to) {
        return Err(CoreError::WorkflowTransition(format!(
            "invalid transition {:?} -> {:?}",
            from, to
        )));
    }
    Ok(())
}
