//! Pivot-table request model and document service.
//!
//! A [`PivotRequest`] names the row and column dimensions, the metric
//! fields with their aggregation methods, and display options. The
//! service projects the records, builds the dataset configurations for
//! the embedded renderer, and assembles the final HTML document.
//!
//! No aggregation is computed here. The aggregation name on each metric
//! is recorded for display labels and per-record markers; grouping and
//! summarization happen inside the embedded display library at render
//! time.

mod document;
mod project;

pub use document::{render_client_script, render_document, render_request, DocumentParts};
pub use document::{DOCUMENT_TITLE, S2_CDN_URL};
pub use project::{pivot_config, project_records, table_config, DataConfig, FieldMeta, FieldsConfig};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Default canvas width in pixels when `options.width` is omitted.
pub const DEFAULT_WIDTH: u32 = 1160;
/// Default canvas height in pixels when `options.height` is omitted.
pub const DEFAULT_HEIGHT: u32 = 600;
/// Grand totals are shown unless `options.showGrandTotals` is false.
pub const DEFAULT_SHOW_GRAND_TOTALS: bool = true;
/// Sub totals are shown unless `options.showSubTotals` is false.
pub const DEFAULT_SHOW_SUB_TOTALS: bool = true;

/// Aggregation method recorded on a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Count,
    Avg,
    Max,
    Min,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Count => "count",
            Aggregation::Avg => "avg",
            Aggregation::Max => "max",
            Aggregation::Min => "min",
        }
    }
}

impl Default for Aggregation {
    fn default() -> Self {
        Aggregation::Sum
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One metric of the pivot: the source field plus an optional aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSpec {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
}

impl ValueSpec {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            aggregation: None,
        }
    }

    pub fn with_aggregation(field: impl Into<String>, aggregation: Aggregation) -> Self {
        Self {
            field: field.into(),
            aggregation: Some(aggregation),
        }
    }

    /// Aggregation with the documented `sum` default applied.
    pub fn resolved_aggregation(&self) -> Aggregation {
        self.aggregation.unwrap_or_default()
    }

    /// Metric display name used in dataset meta, e.g. `sales (avg)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.field, self.resolved_aggregation())
    }

    /// Compact form used in the info panel, e.g. `sales(avg)`.
    pub fn short_label(&self) -> String {
        format!("{}({})", self.field, self.resolved_aggregation())
    }

    /// Key of the per-record marker carrying the aggregation name.
    pub fn marker_key(&self) -> String {
        format!("{}_agg", self.field)
    }
}

/// Display options as supplied by the caller; every field is optional
/// and defaults independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_grand_totals: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_sub_totals: Option<bool>,
}

impl PivotOptions {
    /// Merge against the documented defaults.
    ///
    /// | option          | default |
    /// |-----------------|---------|
    /// | width           | 1160    |
    /// | height          | 600     |
    /// | showGrandTotals | true    |
    /// | showSubTotals   | true    |
    pub fn resolve(&self) -> ResolvedOptions {
        ResolvedOptions {
            width: self.width.unwrap_or(DEFAULT_WIDTH),
            height: self.height.unwrap_or(DEFAULT_HEIGHT),
            show_grand_totals: self.show_grand_totals.unwrap_or(DEFAULT_SHOW_GRAND_TOTALS),
            show_sub_totals: self.show_sub_totals.unwrap_or(DEFAULT_SHOW_SUB_TOTALS),
        }
    }
}

/// Display options with all defaults applied, as embedded in the
/// generated configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOptions {
    pub width: u32,
    pub height: u32,
    pub show_grand_totals: bool,
    pub show_sub_totals: bool,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        PivotOptions::default().resolve()
    }
}

/// A single pivot rendering request.
///
/// Records are ordered and keys are unique per record; field values may
/// be any JSON type. The host guarantees `data`, `rows`, `columns` and
/// `values` are present before this type is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotRequest {
    pub data: Vec<Map<String, Value>>,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<ValueSpec>,
    #[serde(default)]
    pub options: PivotOptions,
}

/// Rendering failures
#[derive(Debug, thiserror::Error)]
pub enum PivotError {
    /// A request value could not be serialized into the document.
    #[error("failed to serialize request data: {0}")]
    Serialize(#[from] serde_json::Error),
}
