use schemars::JsonSchema;
use serde::Deserialize;

use crate::{error::ToolError, model::CallToolResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PayoutCategory {
    SportsBetting,
    Igaming,
    Esports,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PayoutInsightParams {
    /// Vertical to look up.
    pub category: PayoutCategory,
}

/// Fixed payout-friction findings per vertical.
pub fn get_player_payout_insights(
    params: PayoutInsightParams,
) -> Result<CallToolResult, ToolError> {
    let text = match params.category {
        PayoutCategory::SportsBetting => {
            "Players hate 3-5 day waits. 72% will switch apps for Instant Payouts."
        }
        PayoutCategory::Igaming => "KYC friction causes 40% drop-off. Market needs 'Pay n Play'.",
        PayoutCategory::Esports => "Bank flags are blocking micro-transactions.",
    };
    Ok(CallToolResult::text(text))
}
