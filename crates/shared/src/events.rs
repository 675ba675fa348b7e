//! Event types for skill execution status updates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Skill execution event for real-time status updates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SkillEvent {
    /// Skill execution started
    Started {
        execution_id: Uuid,
        skill_id: String,
    },
    /// Progress update during execution
    Progress {
        execution_id: Uuid,
        message: String,
        percent: Option<u8>,
    },
    /// Skill execution completed successfully
    Completed {
        execution_id: Uuid,
        duration_ms: u64,
    },
    /// Skill execution failed
    Failed {
        execution_id: Uuid,
        error: String,
        duration_ms: u64,
    },
    /// Skill execution timed out
    Timeout {
        execution_id: Uuid,
        duration_ms: u64,
    },
}

impl SkillEvent {
    pub fn execution_id(&self) -> Uuid {
        match self {
            SkillEvent::Started { execution_id, .. } => *execution_id,
            SkillEvent::Progress { execution_id, .. } => *execution_id,
            SkillEvent::Completed { execution_id, .. } => *execution_id,
            SkillEvent::Failed { execution_id, .. } => *execution_id,
            SkillEvent::Timeout { execution_id, .. } => *execution_id,
        }
    }
}
