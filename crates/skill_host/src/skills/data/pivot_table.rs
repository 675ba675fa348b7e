//! Interactive pivot-table skill.
//!
//! Takes tabular records plus row/column/value field specifications and
//! returns a self-contained HTML artifact embedding the AntV S2
//! renderer. The skill is a pure transformation: no state is held
//! between invocations and no I/O is performed; the produced document
//! fetches the display library from its CDN only when a browser renders
//! the artifact.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use renderer::pivot::{self, PivotRequest};
use shared::schema::{ParameterSchema, SchemaBuilder};
use shared::skill::{Artifact, PermissionLevel, Skill, SkillContext, SkillInput, SkillOutput};

/// Pivot-table document skill.
pub struct PivotTable;

impl PivotTable {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PivotTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Skill for PivotTable {
    fn id(&self) -> &'static str {
        "pivot_table"
    }

    fn name(&self) -> &'static str {
        "Pivot Table"
    }

    fn description(&self) -> &'static str {
        "Create interactive pivot tables from tabular data using the AntV S2 renderer"
    }

    fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::Safe
    }

    fn parameters(&self) -> ParameterSchema {
        SchemaBuilder::new()
            .required_property(
                "data",
                json!({
                    "type": "array",
                    "description": "The data array for the pivot table",
                    "items": {"type": "object"}
                }),
            )
            .required_property(
                "rows",
                json!({
                    "type": "array",
                    "description": "Row field names for the pivot table",
                    "items": {"type": "string"}
                }),
            )
            .required_property(
                "columns",
                json!({
                    "type": "array",
                    "description": "Column field names for the pivot table",
                    "items": {"type": "string"}
                }),
            )
            .required_property(
                "values",
                json!({
                    "type": "array",
                    "description": "Value field names and aggregation methods",
                    "items": {
                        "type": "object",
                        "properties": {
                            "field": {"type": "string"},
                            "aggregation": {
                                "type": "string",
                                "enum": ["sum", "count", "avg", "max", "min"]
                            }
                        },
                        "required": ["field"]
                    }
                }),
            )
            .property(
                "options",
                json!({
                    "type": "object",
                    "description": "Additional display options",
                    "properties": {
                        "width": {"type": "number"},
                        "height": {"type": "number"},
                        "showGrandTotals": {"type": "boolean"},
                        "showSubTotals": {"type": "boolean"}
                    }
                }),
            )
            .build()
    }

    async fn execute(&self, input: SkillInput, _ctx: &SkillContext) -> Result<SkillOutput> {
        let request: PivotRequest = serde_json::from_value(Value::Object(input.params))?;
        let html = pivot::render_request(&request)?;
        debug!(records = request.data.len(), "pivot document created");

        Ok(SkillOutput::text("透视表已创建")
            .with_artifact(Artifact::html(pivot::DOCUMENT_TITLE, html)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use shared::skill::{ArtifactKind, ResultType, SkillError};

    fn scenario_params() -> Map<String, Value> {
        json!({
            "data": [{"region": "East", "product": "A", "sales": 10}],
            "rows": ["region"],
            "columns": ["product"],
            "values": [{"field": "sales"}],
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn declares_the_wire_parameter_schema() {
        let schema = PivotTable::new().parameters();

        assert_eq!(
            schema.required.as_deref(),
            Some(
                &[
                    "data".to_string(),
                    "rows".to_string(),
                    "columns".to_string(),
                    "values".to_string()
                ][..]
            )
        );
        let props = schema.properties.unwrap();
        assert!(props.contains_key("options"));
        assert_eq!(
            props["values"]["items"]["properties"]["aggregation"]["enum"],
            json!(["sum", "count", "avg", "max", "min"])
        );
    }

    #[tokio::test]
    async fn execute_returns_one_html_artifact() {
        let skill = PivotTable::new();
        let ctx = SkillContext::new();
        let input = SkillInput::from_params(scenario_params());

        let output = skill.execute(input, &ctx).await.unwrap();

        assert!(output.is_success());
        assert_eq!(output.result_type, ResultType::Artifact);
        assert_eq!(output.message.as_deref(), Some("透视表已创建"));
        assert_eq!(output.artifacts.len(), 1);

        let artifact = &output.artifacts[0];
        assert_eq!(artifact.kind, ArtifactKind::Html);
        assert_eq!(artifact.title, "交叉透视表 - AntV S2");
        assert!(artifact.content.contains("行维度：region"));
        assert!(artifact.content.contains("指标：sales(sum)"));
    }

    #[tokio::test]
    async fn execute_is_deterministic() {
        let skill = PivotTable::new();
        let ctx = SkillContext::new();

        let first = skill
            .execute(SkillInput::from_params(scenario_params()), &ctx)
            .await
            .unwrap();
        let second = skill
            .execute(SkillInput::from_params(scenario_params()), &ctx)
            .await
            .unwrap();

        assert_eq!(first.artifacts[0].content, second.artifacts[0].content);
    }

    #[tokio::test]
    async fn execute_applies_option_defaults() {
        let skill = PivotTable::new();
        let ctx = SkillContext::new();
        let mut params = scenario_params();
        params.insert("options".into(), json!({"width": 800}));

        let output = skill
            .execute(SkillInput::from_params(params), &ctx)
            .await
            .unwrap();
        let content = &output.artifacts[0].content;

        assert!(content.contains(
            r#"const sheetOptions = {"width":800,"height":600,"showGrandTotals":true,"showSubTotals":true};"#
        ));
    }

    #[tokio::test]
    async fn registry_rejects_request_missing_required_fields() {
        let registry = crate::skills::init_registry();
        let ctx = SkillContext::new();
        let mut params = scenario_params();
        params.remove("values");

        let result = registry
            .invoke("pivot_table", SkillInput::from_params(params), &ctx)
            .await;
        assert!(matches!(result, Err(SkillError::SchemaViolation(_))));
    }

    #[tokio::test]
    async fn registry_invokes_the_skill_end_to_end() {
        let registry = crate::skills::init_registry();
        let ctx = SkillContext::new();

        let execution = registry
            .invoke("pivot_table", SkillInput::from_params(scenario_params()), &ctx)
            .await
            .unwrap();

        let output = execution.output.unwrap();
        assert_eq!(output.artifacts.len(), 1);
        assert!(output.artifacts[0].content.starts_with("<!DOCTYPE html>"));
    }
}
