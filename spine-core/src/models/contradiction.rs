use serde::{Deserialize, Serialize};

/// Which narrative axis two statements conflict on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionAxis {
    Belief,
    Fact,
    Goal,
    Action,
}

impl ContradictionAxis {
    pub fn as_str(self) -> &'static str {
        match self {
            ContradictionAxis::Belief => "belief",
            ContradictionAxis::Fact => "fact",
            ContradictionAxis::Goal => "goal",
            ContradictionAxis::Action => "action",
        }
    }
}

/// Raw oracle verdict: the candidate at `index` conflicts with the new
/// statement on `axis`, with the oracle's own confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleFinding {
    pub index: usize,
    pub axis: ContradictionAxis,
    pub confidence: f64,
}

/// An oracle finding resolved against the actual window: which existing
/// event the new one contradicts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContradictionFinding {
    pub event_id: String,
    pub axis: ContradictionAxis,
    /// Oracle confidence in the contradiction, already past the
    /// actionability threshold.
    pub confidence: f64,
}
