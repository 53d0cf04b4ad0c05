use schemars::JsonSchema;
use serde::Deserialize;

use crate::{error::ToolError, model::CallToolResult};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ComplianceScanParams {
    /// Marketing copy to screen for regulatory red flags.
    pub marketing_copy: String,
}

/// Keyword scan over marketing copy: flags wording that implies guaranteed
/// winnings or predatory offers, and requires a "terms apply" disclaimer.
pub fn scan_gaming_compliance(params: ComplianceScanParams) -> Result<CallToolResult, ToolError> {
    let text = params.marketing_copy.to_lowercase();
    let mut risks = Vec::new();
    if text.contains("guaranteed") {
        risks.push("Avoid 'Guaranteed' (implies winning).");
    }
    if text.contains("free money") {
        risks.push("Avoid 'Free Money' (predatory).");
    }
    if !text.contains("terms apply") {
        risks.push("Missing 'Terms Apply'.");
    }

    let verdict = if risks.is_empty() {
        "APPROVED ✅".to_string()
    } else {
        format!("REJECTED ❌\nIssues:\n- {}", risks.join("\n- "))
    };
    Ok(CallToolResult::text(verdict))
}
