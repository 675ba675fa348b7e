//! Skill system types and traits for host-driven skill execution.
//!
//! This module defines the core abstractions for skills that the host can
//! invoke: the input/output contracts, the artifact type returned by
//! rendering skills, and the `Skill` trait itself.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::schema::{ParameterSchema, SchemaError};

/// Permission level for skills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionLevel {
    /// Auto-approved, runs without confirmation
    Safe,
    /// Requires per-session confirmation before execution
    Sensitive,
}

/// User's permission setting for a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    Enabled,
    Disabled,
    Ask,
}

impl Default for Permission {
    fn default() -> Self {
        Permission::Ask
    }
}

/// Skill execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
    Timeout,
}

/// Result type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultType {
    Text,
    Data,
    Artifact,
    Error,
}

/// Input to a skill execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillInput {
    /// Natural language request from user
    pub query: String,
    /// Parsed argument object; validated against the skill's declared
    /// parameter schema before the handler runs
    pub params: Map<String, Value>,
}

impl SkillInput {
    pub fn from_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: Map::new(),
        }
    }

    pub fn from_params(params: Map<String, Value>) -> Self {
        Self {
            query: String::new(),
            params,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

/// Kind of renderable artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Html,
}

/// A renderable result produced by a skill.
///
/// The host persists or displays artifacts; skills only construct them
/// and never perform file I/O of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub content: String,
    pub title: String,
}

impl Artifact {
    pub fn html(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: ArtifactKind::Html,
            content: content.into(),
            title: title.into(),
        }
    }
}

/// Output from a skill execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillOutput {
    /// Primary result type
    pub result_type: ResultType,
    /// Text response for display
    pub message: Option<String>,
    /// Artifacts produced by the skill
    pub artifacts: Vec<Artifact>,
    /// Structured data
    pub data: Option<Value>,
}

impl SkillOutput {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            result_type: ResultType::Text,
            message: Some(message.into()),
            artifacts: Vec::new(),
            data: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result_type: ResultType::Error,
            message: Some(message.into()),
            artifacts: Vec::new(),
            data: None,
        }
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        if self.result_type == ResultType::Text {
            self.result_type = ResultType::Artifact;
        }
        self
    }

    pub fn is_success(&self) -> bool {
        self.result_type != ResultType::Error
    }
}

/// Context provided to skills during execution
pub struct SkillContext {
    /// Session approval cache (for Sensitive skills)
    pub session_approvals: Arc<RwLock<HashSet<String>>>,
}

impl SkillContext {
    pub fn new() -> Self {
        Self {
            session_approvals: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Check if a skill is approved for this session
    pub fn is_session_approved(&self, skill_id: &str) -> bool {
        self.session_approvals.read().contains(skill_id)
    }

    /// Grant session approval for a skill
    pub fn approve_session(&self, skill_id: &str) {
        self.session_approvals.write().insert(skill_id.to_string());
    }
}

impl Default for SkillContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Record of a skill execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillExecution {
    pub id: Uuid,
    pub skill_id: String,
    pub timestamp: DateTime<Utc>,
    pub input: SkillInput,
    pub output: Option<SkillOutput>,
    pub status: ExecutionStatus,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl SkillExecution {
    pub fn new(skill_id: impl Into<String>, input: SkillInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            skill_id: skill_id.into(),
            timestamp: Utc::now(),
            input,
            output: None,
            status: ExecutionStatus::Running,
            duration_ms: 0,
            error: None,
        }
    }

    pub fn complete(mut self, output: SkillOutput, duration_ms: u64) -> Self {
        self.status = ExecutionStatus::Completed;
        self.output = Some(output);
        self.duration_ms = duration_ms;
        self
    }

    pub fn fail(mut self, error: impl Into<String>, duration_ms: u64) -> Self {
        self.status = ExecutionStatus::Failed;
        self.error = Some(error.into());
        self.duration_ms = duration_ms;
        self
    }

    pub fn timeout(mut self, duration_ms: u64) -> Self {
        self.status = ExecutionStatus::Timeout;
        self.error = Some("Execution timed out".to_string());
        self.duration_ms = duration_ms;
        self
    }
}

/// Core skill trait that all skills must implement
#[async_trait]
pub trait Skill: Send + Sync {
    /// Unique skill identifier (snake_case)
    fn id(&self) -> &'static str;

    /// Human-readable display name
    fn name(&self) -> &'static str;

    /// Description shown in capability outline
    fn description(&self) -> &'static str;

    /// Permission level (Safe or Sensitive)
    fn permission_level(&self) -> PermissionLevel;

    /// Declared parameter schema, checked by the host before execution
    fn parameters(&self) -> ParameterSchema;

    /// Execute the skill with schema-validated input
    async fn execute(&self, input: SkillInput, ctx: &SkillContext) -> anyhow::Result<SkillOutput>;
}

/// Skill error types
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("Skill not found: {skill_id}")]
    NotFound { skill_id: String },

    #[error("Permission denied for skill: {skill_id}")]
    PermissionDenied { skill_id: String },

    #[error("Invalid parameters: {0}")]
    SchemaViolation(#[from] SchemaError),

    #[error("Execution failed: {0}")]
    ExecutionFailed(#[from] anyhow::Error),

    #[error("Execution timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skill_input_builder() {
        let input = SkillInput::from_query("test query").with_param("key", json!("value"));

        assert_eq!(input.query, "test query");
        assert!(input.params.contains_key("key"));
    }

    #[test]
    fn test_skill_output_builder() {
        let output =
            SkillOutput::text("created").with_artifact(Artifact::html("Report", "<html></html>"));

        assert_eq!(output.result_type, ResultType::Artifact);
        assert_eq!(output.artifacts.len(), 1);
        assert!(output.is_success());
    }

    #[test]
    fn test_error_output_is_not_success() {
        let output = SkillOutput::error("boom");
        assert!(!output.is_success());
    }

    #[test]
    fn test_artifact_serializes_with_type_tag() {
        let artifact = Artifact::html("Report", "<html></html>");
        let value = serde_json::to_value(&artifact).unwrap();

        assert_eq!(value["type"], "html");
        assert_eq!(value["title"], "Report");
    }

    #[test]
    fn test_execution_transitions() {
        let input = SkillInput::from_query("q");
        let execution = SkillExecution::new("pivot_table", input.clone());
        assert_eq!(execution.status, ExecutionStatus::Running);

        let done = execution.complete(SkillOutput::text("ok"), 5);
        assert_eq!(done.status, ExecutionStatus::Completed);
        assert!(done.output.is_some());

        let failed = SkillExecution::new("pivot_table", input).fail("bad", 3);
        assert_eq!(failed.status, ExecutionStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("bad"));
    }

    #[test]
    fn test_session_approval() {
        let ctx = SkillContext::new();
        assert!(!ctx.is_session_approved("pivot_table"));

        ctx.approve_session("pivot_table");
        assert!(ctx.is_session_approved("pivot_table"));
    }
}
