//! HTML document assembly for the pivot-table renderer.
//!
//! Split per the service design into two pure pieces: the static shell
//! (`render_document`) and the embedded client script
//! (`render_client_script`), so each can be asserted on as a string
//! without executing anything. The document is fully self-contained
//! except for the S2 library `<script>` tag, which a browser fetches
//! from the CDN when the artifact is eventually displayed.

use tracing::debug;

use super::{pivot_config, project_records, table_config, PivotError, PivotRequest};

/// Title of the generated document and of the returned artifact.
pub const DOCUMENT_TITLE: &str = "交叉透视表 - AntV S2";

/// CDN location of the display library loaded by the generated document.
pub const S2_CDN_URL: &str = "https://unpkg.com/@antv/s2@latest/dist/index.min.js";

const STYLESHEET: &str = r#"
        body {
            margin: 0;
            padding: 20px;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'PingFang SC', 'Hiragino Sans GB', 'Microsoft YaHei', sans-serif;
            background-color: #f5f5f5;
        }
        .container {
            max-width: 1200px;
            margin: 0 auto;
            background: white;
            border-radius: 8px;
            box-shadow: 0 2px 8px rgba(0,0,0,0.1);
            overflow: hidden;
        }
        .header {
            padding: 20px;
            background: #001529;
            color: white;
        }
        .header h1 {
            margin: 0;
            font-size: 24px;
        }
        .controls {
            padding: 16px 20px;
            border-bottom: 1px solid #f0f0f0;
            display: flex;
            gap: 12px;
            flex-wrap: wrap;
        }
        .control-group {
            display: flex;
            align-items: center;
            gap: 8px;
        }
        .control-group label {
            font-size: 14px;
            color: #666;
        }
        .control-group button {
            padding: 6px 12px;
            border: 1px solid #d9d9d9;
            background: white;
            border-radius: 4px;
            cursor: pointer;
            font-size: 14px;
            transition: all 0.3s;
        }
        .control-group button:hover {
            border-color: #1890ff;
            color: #1890ff;
        }
        .control-group button.active {
            background: #1890ff;
            color: white;
            border-color: #1890ff;
        }
        #container {
            padding: 20px;
            min-height: 500px;
        }
        .info-panel {
            padding: 16px 20px;
            background: #fafafa;
            border-top: 1px solid #f0f0f0;
            font-size: 14px;
            color: #666;
        }
"#;

/// Interactive behavior wired against the embedded constants. Layout
/// mode and totals toggles re-instantiate the sheet; export is a
/// placeholder pending backend support.
const CLIENT_BEHAVIOR: &str = r#"
sheetOptions.style = {
    layoutWidthType: 'compact',
    colCell: { text: { fontSize: 12, fontWeight: 'bold' } },
    rowCell: { text: { fontSize: 12 } },
    dataCell: { text: { fontSize: 12 } }
};

let s2Instance;
let currentMode = 'pivot';

function renderSheet() {
    const container = document.getElementById('container');
    container.innerHTML = '';
    if (currentMode === 'pivot') {
        s2Instance = new s2.PivotSheet(container, pivotConfig, sheetOptions);
    } else {
        s2Instance = new s2.TableSheet(container, tableConfig, sheetOptions);
    }
    s2Instance.render();
}

renderSheet();

document.getElementById('pivot-mode').addEventListener('click', function () {
    if (currentMode !== 'pivot') {
        currentMode = 'pivot';
        document.getElementById('pivot-mode').classList.add('active');
        document.getElementById('table-mode').classList.remove('active');
        renderSheet();
    }
});

document.getElementById('table-mode').addEventListener('click', function () {
    if (currentMode !== 'table') {
        currentMode = 'table';
        document.getElementById('table-mode').classList.add('active');
        document.getElementById('pivot-mode').classList.remove('active');
        renderSheet();
    }
});

document.getElementById('toggle-totals').addEventListener('click', function () {
    const show = this.classList.contains('active');
    if (show) {
        this.classList.remove('active');
        this.textContent = '关闭';
    } else {
        this.classList.add('active');
        this.textContent = '开启';
    }
    sheetOptions.showGrandTotals = !show;
    sheetOptions.showSubTotals = !show;
    if (currentMode === 'pivot') {
        renderSheet();
    }
});

document.getElementById('export-btn').addEventListener('click', function () {
    alert('导出功能需要后端支持，当前数据量：' + rawData.length + ' 行');
});
"#;

/// The JSON-serialized pieces interpolated into the document template.
///
/// The raw request arrays are embedded verbatim so the produced document
/// can parse them back out (export, inspection); the dataset
/// configurations and resolved options drive the embedded renderer.
#[derive(Debug, Clone)]
pub struct DocumentParts {
    row_panel: String,
    col_panel: String,
    metric_panel: String,
    raw_data_json: String,
    rows_json: String,
    columns_json: String,
    values_json: String,
    pivot_config_json: String,
    table_config_json: String,
    options_json: String,
}

impl DocumentParts {
    /// Project the records, build both dataset configurations, and
    /// serialize every piece of the request. Serialization failure of
    /// any input propagates; no fallback document is emitted.
    pub fn from_request(request: &PivotRequest) -> Result<Self, PivotError> {
        let projected = project_records(request);
        let resolved = request.options.resolve();

        let short_labels: Vec<String> =
            request.values.iter().map(|spec| spec.short_label()).collect();

        Ok(Self {
            row_panel: escape_html(&request.rows.join("、")),
            col_panel: escape_html(&request.columns.join("、")),
            metric_panel: escape_html(&short_labels.join("、")),
            raw_data_json: serde_json::to_string(&request.data)?,
            rows_json: serde_json::to_string(&request.rows)?,
            columns_json: serde_json::to_string(&request.columns)?,
            values_json: serde_json::to_string(&request.values)?,
            pivot_config_json: serde_json::to_string(&pivot_config(request, &projected))?,
            table_config_json: serde_json::to_string(&table_config(request, &projected))?,
            options_json: serde_json::to_string(&resolved)?,
        })
    }
}

/// Render the embedded client script: the serialized constants followed
/// by the fixed interactive behavior.
pub fn render_client_script(parts: &DocumentParts) -> String {
    let mut script = String::new();
    script.push_str(&format!("const rawData = {};\n", parts.raw_data_json));
    script.push_str(&format!("const rowFields = {};\n", parts.rows_json));
    script.push_str(&format!("const colFields = {};\n", parts.columns_json));
    script.push_str(&format!("const valueFields = {};\n", parts.values_json));
    script.push_str(&format!("const pivotConfig = {};\n", parts.pivot_config_json));
    script.push_str(&format!("const tableConfig = {};\n", parts.table_config_json));
    script.push_str(&format!("const sheetOptions = {};\n", parts.options_json));
    script.push_str(CLIENT_BEHAVIOR);
    script
}

/// Render the complete standalone document.
pub fn render_document(parts: &DocumentParts) -> String {
    let script = render_client_script(parts);

    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{cdn}"></script>
    <style>{stylesheet}    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{title}</h1>
        </div>
        <div class="controls">
            <div class="control-group">
                <label>布局模式：</label>
                <button id="pivot-mode" class="active">透视表</button>
                <button id="table-mode">明细表</button>
            </div>
            <div class="control-group">
                <label>显示总计：</label>
                <button id="toggle-totals" class="active">开启</button>
            </div>
            <div class="control-group">
                <button id="export-btn">导出数据</button>
            </div>
        </div>
        <div id="container"></div>
        <div class="info-panel">
            <div>行维度：{rows}</div>
            <div>列维度：{cols}</div>
            <div>指标：{metrics}</div>
        </div>
    </div>

    <script>
{script}    </script>
</body>
</html>
"#,
        title = DOCUMENT_TITLE,
        cdn = S2_CDN_URL,
        stylesheet = STYLESHEET,
        rows = parts.row_panel,
        cols = parts.col_panel,
        metrics = parts.metric_panel,
        script = script,
    )
}

/// Render a request straight to its document.
pub fn render_request(request: &PivotRequest) -> Result<String, PivotError> {
    let parts = DocumentParts::from_request(request)?;
    let document = render_document(&parts);
    debug!(
        records = request.data.len(),
        bytes = document.len(),
        "rendered pivot document"
    );
    Ok(document)
}

/// Minimal entity escaping for text interpolated into markup.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
