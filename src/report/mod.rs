pub mod json;
pub mod md;

use crate::error::Result;
use crate::types::consilience::LinkCheckResult;
use crate::types::scoring::{DocsEffectiveResult, SustainabilityGateResult};

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Md,
}

/// Docs result plus the optional advisory link check.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DocsReport<'a> {
    #[serde(flatten)]
    pub result: &'a DocsEffectiveResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<&'a LinkCheckResult>,
}

pub fn render_docs(report: &DocsReport<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(json::to_json(report)?),
        OutputFormat::Md => Ok(md::docs_to_markdown(report)),
    }
}

pub fn render_gate(result: &SustainabilityGateResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(json::to_json(result)?),
        OutputFormat::Md => Ok(md::gate_to_markdown(result)),
    }
}
