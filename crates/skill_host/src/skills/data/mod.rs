//! Data skills for tabular analysis and visualization.
//!
//! Provides:
//! - Interactive pivot-table document generation

pub mod pivot_table;

pub use pivot_table::PivotTable;

use crate::skills::SkillRegistry;
use std::sync::Arc;

/// Register all data skills with the registry
pub fn register_skills(registry: &mut SkillRegistry) {
    registry.register(Arc::new(PivotTable::new()));
}
