use std::fmt::Display;

use thiserror::Error;

use super::fingerprint::Fingerprint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Seeding,
    Growth,
    TableExtension,
    CombinationMerge,
    Materialization,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Seeding => write!(f, "Seeding"),
            Phase::Growth => write!(f, "Growth"),
            Phase::TableExtension => write!(f, "TableExtension"),
            Phase::CombinationMerge => write!(f, "CombinationMerge"),
            Phase::Materialization => write!(f, "Materialization"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum JoinPlannerError {
    #[error("Maximum join width must be at least 1, got {0}")]
    InvalidJoinNum(usize),

    #[error("Table `{table}` references unknown table `{target}`")]
    UnknownTable { table: String, target: String },

    /// The registry and the per-table width caches disagree. Always a planner defect.
    #[error("{phase}: planner invariant violated: {message}")]
    InvariantViolation { phase: Phase, message: String },

    #[error("Fingerprint {fingerprint} maps to both {existing:?} and {candidate:?}")]
    FingerprintCollision {
        fingerprint: Fingerprint,
        existing: Vec<usize>,
        candidate: Vec<usize>,
    },
}

impl JoinPlannerError {
    pub fn invariant(phase: Phase, message: impl Into<String>) -> Self {
        JoinPlannerError::InvariantViolation {
            phase,
            message: message.into(),
        }
    }
}

pub type PlannerResult<T> = Result<T, JoinPlannerError>;
