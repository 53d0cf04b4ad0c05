use schemars::JsonSchema;
use serde::Deserialize;

use crate::{error::ToolError, model::CallToolResult};

// card rail vs. instant bank rail economics
const CARD_FEE_RATE: f64 = 0.025;
const CARD_ACCEPTANCE_RATE: f64 = 0.85;
const INSTANT_FEE_RATE: f64 = 0.01;
const INSTANT_ACCEPTANCE_RATE: f64 = 0.98;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RoiParams {
    /// Name of the gaming operator.
    pub operator_name: String,
    /// Total monthly deposit volume in USD.
    pub monthly_volume_usd: f64,
}

/// Compares card-rail and instant-bank-rail deposit economics for one
/// operator and reports the uplift, savings and annualized benefit.
pub fn calculate_operator_roi(params: RoiParams) -> Result<CallToolResult, ToolError> {
    let volume = params.monthly_volume_usd;
    if !volume.is_finite() || volume < 0.0 {
        return Err(ToolError::new(format!(
            "monthly_volume_usd must be a non-negative finite amount, got {volume}"
        )));
    }

    let card_revenue = volume * CARD_ACCEPTANCE_RATE;
    let instant_revenue = volume * INSTANT_ACCEPTANCE_RATE;
    let revenue_uplift = instant_revenue - card_revenue;
    let fee_savings = card_revenue * CARD_FEE_RATE - instant_revenue * INSTANT_FEE_RATE;
    let annual_benefit = (revenue_uplift + fee_savings) * 12.0;

    Ok(CallToolResult::text(format!(
        "ROI Analysis for {}:\n\
         Revenue Uplift: ${}\n\
         Fee Savings: ${}\n\
         Total Annual Benefit: ${}",
        params.operator_name,
        format_usd(revenue_uplift),
        format_usd(fee_savings),
        format_usd(annual_benefit),
    )))
}

/// Comma-grouped USD amount with two decimals.
fn format_usd(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!(
        "{}{}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        cents % 100
    )
}

#[cfg(test)]
mod tests {
    use crate::model::Content;

    use super::*;

    fn result_text(result: CallToolResult) -> String {
        match result.content.into_iter().next().unwrap() {
            Content::Text { text } => text,
        }
    }

    #[test]
    fn roi_report_for_a_million_monthly() {
        let result = calculate_operator_roi(RoiParams {
            operator_name: "Rivalry".to_string(),
            monthly_volume_usd: 1_000_000.0,
        })
        .unwrap();
        let text = result_text(result);

        // uplift = 1M * (0.98 - 0.85) = 130,000
        // savings = 1M * (0.85 * 0.025 - 0.98 * 0.01) = 11,450
        // annual = (130,000 + 11,450) * 12 = 1,697,400
        assert!(text.starts_with("ROI Analysis for Rivalry:"));
        assert!(text.contains("Revenue Uplift: $130,000.00"), "{text}");
        assert!(text.contains("Fee Savings: $11,450.00"), "{text}");
        assert!(text.contains("Total Annual Benefit: $1,697,400.00"), "{text}");
    }

    #[test]
    fn zero_volume_is_a_zero_report() {
        let result = calculate_operator_roi(RoiParams {
            operator_name: "Idle".to_string(),
            monthly_volume_usd: 0.0,
        })
        .unwrap();
        assert!(result_text(result).contains("Revenue Uplift: $0.00"));
    }

    #[test]
    fn negative_volume_is_rejected() {
        let error = calculate_operator_roi(RoiParams {
            operator_name: "Broken".to_string(),
            monthly_volume_usd: -1.0,
        })
        .unwrap_err();
        assert!(error.to_string().contains("non-negative"));
    }

    #[test]
    fn nan_volume_is_rejected() {
        assert!(
            calculate_operator_roi(RoiParams {
                operator_name: "Broken".to_string(),
                monthly_volume_usd: f64::NAN,
            })
            .is_err()
        );
    }

    #[test]
    fn usd_formatting_groups_thousands() {
        assert_eq!(format_usd(0.0), "0.00");
        assert_eq!(format_usd(1000.0), "1,000.00");
        assert_eq!(format_usd(1234567.891), "1,234,567.89");
        assert_eq!(format_usd(-42.5), "-42.50");
    }
}
