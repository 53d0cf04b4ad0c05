//! The three tool collaborators. Each is a pure function from validated
//! arguments to content blocks; no session or transport state leaks in.

pub mod compliance;
pub mod payouts;
pub mod roi;

use crate::{error::RegistryError, registry::ToolRegistry};

/// Builds the startup registry. Duplicate names abort startup.
pub fn registry() -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register("calculate_operator_roi", roi::calculate_operator_roi)?;
    registry.register(
        "get_player_payout_insights",
        payouts::get_player_payout_insights,
    )?;
    registry.register("scan_gaming_compliance", compliance::scan_gaming_compliance)?;
    Ok(registry)
}
