//! Skill registry and management.
//!
//! The registry owns all registered skills, checks permissions, and
//! validates invocation arguments against each skill's declared
//! parameter schema before the handler runs. Handlers therefore perform
//! no redundant shape checks of their own.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use shared::skill::{
    Permission, PermissionLevel, Skill, SkillContext, SkillError, SkillExecution, SkillInput,
};
use tracing::debug;

pub mod data;

/// Registry managing all available skills
pub struct SkillRegistry {
    /// All registered skills by ID
    skills: HashMap<String, Arc<dyn Skill>>,
    /// User permission settings per skill
    permissions: HashMap<String, Permission>,
}

impl SkillRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            skills: HashMap::new(),
            permissions: HashMap::new(),
        }
    }

    /// Register a skill
    pub fn register(&mut self, skill: Arc<dyn Skill>) {
        let id = skill.id().to_string();

        // Set default permission based on skill's permission level
        if !self.permissions.contains_key(&id) {
            let default_perm = match skill.permission_level() {
                PermissionLevel::Safe => Permission::Enabled,
                PermissionLevel::Sensitive => Permission::Ask,
            };
            self.permissions.insert(id.clone(), default_perm);
        }

        debug!(skill_id = %id, "registered skill");
        self.skills.insert(id, skill);
    }

    /// Get a skill by ID
    pub fn get(&self, skill_id: &str) -> Option<&Arc<dyn Skill>> {
        self.skills.get(skill_id)
    }

    /// Get all registered skills
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Skill>> {
        self.skills.values()
    }

    /// Get user permission for a skill
    pub fn get_permission(&self, skill_id: &str) -> Permission {
        self.permissions
            .get(skill_id)
            .copied()
            .unwrap_or(Permission::Ask)
    }

    /// Set user permission for a skill
    pub fn set_permission(&mut self, skill_id: &str, permission: Permission) {
        self.permissions.insert(skill_id.to_string(), permission);
    }

    /// Check if skill is enabled (considering permission and session approval)
    pub fn can_execute(&self, skill_id: &str, ctx: &SkillContext) -> Result<(), SkillError> {
        let skill = self
            .skills
            .get(skill_id)
            .ok_or_else(|| SkillError::NotFound {
                skill_id: skill_id.to_string(),
            })?;

        match self.get_permission(skill_id) {
            Permission::Disabled => {
                return Err(SkillError::PermissionDenied {
                    skill_id: skill_id.to_string(),
                });
            }
            Permission::Ask => {
                // For Sensitive skills, check session approval
                if skill.permission_level() == PermissionLevel::Sensitive
                    && !ctx.is_session_approved(skill_id)
                {
                    return Err(SkillError::PermissionDenied {
                        skill_id: skill_id.to_string(),
                    });
                }
            }
            Permission::Enabled => {
                // Always allowed
            }
        }

        Ok(())
    }

    /// Invoke a skill with permission and schema checks
    pub async fn invoke(
        &self,
        skill_id: &str,
        input: SkillInput,
        ctx: &SkillContext,
    ) -> Result<SkillExecution, SkillError> {
        // Permission check
        self.can_execute(skill_id, ctx)?;

        let skill = self
            .skills
            .get(skill_id)
            .ok_or_else(|| SkillError::NotFound {
                skill_id: skill_id.to_string(),
            })?;

        // Validate arguments against the declared schema before the
        // handler runs
        skill.parameters().validate(&input.params)?;

        // Create execution record
        let execution = SkillExecution::new(skill_id, input.clone());
        let start = Instant::now();
        debug!(skill_id, "invoking skill");

        // Execute skill
        match skill.execute(input, ctx).await {
            Ok(output) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                Ok(execution.complete(output, duration_ms))
            }
            Err(e) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                Ok(execution.fail(e.to_string(), duration_ms))
            }
        }
    }

    /// Check if skill requires session approval
    pub fn requires_approval(&self, skill_id: &str, ctx: &SkillContext) -> bool {
        if let Some(skill) = self.skills.get(skill_id) {
            if skill.permission_level() == PermissionLevel::Sensitive
                && self.get_permission(skill_id) == Permission::Ask
            {
                return !ctx.is_session_approved(skill_id);
            }
        }
        false
    }

    /// Get skill metadata for display
    pub fn skill_info(&self, skill_id: &str) -> Option<SkillInfo> {
        self.skills.get(skill_id).map(|skill| SkillInfo {
            id: skill.id(),
            name: skill.name(),
            description: skill.description(),
            permission_level: skill.permission_level(),
            user_permission: self.get_permission(skill_id),
        })
    }

    /// Get all skills with their info
    pub fn skills_info(&self) -> Vec<SkillInfo> {
        self.skills
            .values()
            .map(|skill| SkillInfo {
                id: skill.id(),
                name: skill.name(),
                description: skill.description(),
                permission_level: skill.permission_level(),
                user_permission: self.get_permission(skill.id()),
            })
            .collect()
    }
}

impl Default for SkillRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Skill information for display
#[derive(Debug, Clone)]
pub struct SkillInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub permission_level: PermissionLevel,
    pub user_permission: Permission,
}

/// Initialize the skill registry with all available skills
pub fn init_registry() -> SkillRegistry {
    let mut registry = SkillRegistry::new();

    data::register_skills(&mut registry);

    registry
}
