//! Record projection and dataset configurations.
//!
//! The projection is a one-to-one field copy: dimension and metric values
//! are taken from each record verbatim, plus an informational marker per
//! metric carrying the resolved aggregation name. Both the pivot and the
//! flat table configuration reference the same projected records.

use serde::Serialize;
use serde_json::{Map, Value};

use super::PivotRequest;

/// Field layout section of a dataset configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<String>>,
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_in_cols: Option<bool>,
}

/// Per-field display name entry.
#[derive(Debug, Clone, Serialize)]
pub struct FieldMeta {
    pub field: String,
    pub name: String,
}

/// Dataset configuration consumed by the embedded renderer.
#[derive(Debug, Clone, Serialize)]
pub struct DataConfig {
    pub fields: FieldsConfig,
    pub data: Vec<Map<String, Value>>,
    pub meta: Vec<FieldMeta>,
}

/// Flat projection of the input records.
///
/// For every record: copy the fields named in `rows` and `columns`
/// verbatim, and for every metric copy the raw field value plus a
/// `<field>_agg` sibling marker with the resolved aggregation name.
/// Fields absent from a record are not synthesized.
pub fn project_records(request: &PivotRequest) -> Vec<Map<String, Value>> {
    request
        .data
        .iter()
        .map(|record| {
            let mut projected = Map::new();

            for field in request.rows.iter().chain(request.columns.iter()) {
                if let Some(value) = record.get(field) {
                    projected.insert(field.clone(), value.clone());
                }
            }

            for spec in &request.values {
                if let Some(value) = record.get(&spec.field) {
                    projected.insert(spec.field.clone(), value.clone());
                }
                projected.insert(
                    spec.marker_key(),
                    Value::String(spec.resolved_aggregation().as_str().to_string()),
                );
            }

            projected
        })
        .collect()
}

/// Pivot layout: rows and columns as dimensions, metrics as values.
pub fn pivot_config(request: &PivotRequest, projected: &[Map<String, Value>]) -> DataConfig {
    let mut meta = dimension_meta(request);
    meta.extend(request.values.iter().map(|spec| FieldMeta {
        field: spec.field.clone(),
        name: spec.label(),
    }));

    DataConfig {
        fields: FieldsConfig {
            rows: Some(request.rows.clone()),
            columns: request.columns.clone(),
            values: Some(request.values.iter().map(|spec| spec.field.clone()).collect()),
            value_in_cols: Some(true),
        },
        data: projected.to_vec(),
        meta,
    }
}

/// Flat table layout: every field as a plain column.
pub fn table_config(request: &PivotRequest, projected: &[Map<String, Value>]) -> DataConfig {
    let mut columns = request.rows.clone();
    columns.extend(request.columns.iter().cloned());
    columns.extend(request.values.iter().map(|spec| spec.field.clone()));

    let mut meta = dimension_meta(request);
    meta.extend(request.values.iter().map(|spec| FieldMeta {
        field: spec.field.clone(),
        name: spec.field.clone(),
    }));

    DataConfig {
        fields: FieldsConfig {
            rows: None,
            columns,
            values: None,
            value_in_cols: None,
        },
        data: projected.to_vec(),
        meta,
    }
}

fn dimension_meta(request: &PivotRequest) -> Vec<FieldMeta> {
    request
        .rows
        .iter()
        .chain(request.columns.iter())
        .map(|field| FieldMeta {
            field: field.clone(),
            name: field.clone(),
        })
        .collect()
}
