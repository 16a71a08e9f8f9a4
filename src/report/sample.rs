use std::path::Path;

use anyhow::Context;
use serde_json::Value;

const BUILTIN: &str = include_str!("../../data/sample-report.json");

const KEYWORD_PLACEHOLDER: &str = "{{keyword}}";
const AREA_PLACEHOLDER: &str = "{{area}}";

pub const SAMPLE_NOTE: &str =
    "Note: this is a sample report shown because a live report could not be generated.";

/// The fixed report served whenever live generation fails. Loaded once at
/// startup and shared read-only.
#[derive(Debug, Clone)]
pub struct SampleReport {
    template: Value,
}

impl SampleReport {
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_json(BUILTIN)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading sample report {}", path.display()))?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> anyhow::Result<Self> {
        let template: Value = serde_json::from_str(data).context("parsing sample report")?;
        if !template.is_object() {
            anyhow::bail!("sample report must be a JSON object");
        }
        Ok(Self { template })
    }

    /// The sample with the requested subject and area substituted into its
    /// title and summary. The summary always ends with [`SAMPLE_NOTE`].
    pub fn for_request(&self, subject: &str, area: &str) -> Value {
        let mut report = self.template.clone();
        let substitute = |s: &str| {
            s.replace(KEYWORD_PLACEHOLDER, subject)
                .replace(AREA_PLACEHOLDER, area)
        };

        let title = report.get("title").and_then(Value::as_str).map(substitute);
        if let Some(title) = title {
            report["title"] = Value::String(title);
        }

        let summary = report
            .get("summary")
            .and_then(Value::as_str)
            .map(substitute)
            .unwrap_or_default();
        report["summary"] = Value::String(if summary.is_empty() {
            SAMPLE_NOTE.to_string()
        } else {
            format!("{summary} {SAMPLE_NOTE}")
        });

        report
    }
}
