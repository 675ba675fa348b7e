//! Crosstab skill host
//!
//! This crate hosts the skill registry and the async executor and wires
//! up the built-in skills. Parameter schemas are validated here, at the
//! invocation boundary, so skill handlers always run against well-shaped
//! arguments.

pub mod skill_executor;
pub mod skills;

pub use skill_executor::SkillExecutor;
pub use skills::{init_registry, SkillInfo, SkillRegistry};
