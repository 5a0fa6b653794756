//! CLI Output Formatting.
//!
//! Reports render either as aligned text rows or as JSON.

use serde::Serialize;

use crate::error::Result;
use crate::protocol::treasury::TreasuryState;
use crate::utils::constants::{RATIO_PRECISION, UNBOUNDED_RATIO};
use crate::utils::math::backing_ratio;

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT FORMAT
// ═══════════════════════════════════════════════════════════════════════════════

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
    /// Pretty JSON format
    JsonPretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Ok(OutputFormat::JsonPretty),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Serialize `value` for a JSON format; `None` for text
pub fn render_json<T: Serialize>(format: OutputFormat, value: &T) -> Result<Option<String>> {
    let rendered = match format {
        OutputFormat::Text => None,
        OutputFormat::Json => Some(serde_json::to_string(value)?),
        OutputFormat::JsonPretty => Some(serde_json::to_string_pretty(value)?),
    };
    Ok(rendered)
}

/// Format a 1e18-scaled ratio as a percentage
pub fn format_ratio(ratio: u128) -> String {
    if ratio == UNBOUNDED_RATIO {
        return "unbounded".to_string();
    }
    let basis_points = ratio.saturating_mul(10_000) / RATIO_PRECISION;
    format!("{}.{:02}%", basis_points / 100, basis_points % 100)
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATUS SUMMARY
// ═══════════════════════════════════════════════════════════════════════════════

/// Labelled rows describing a treasury state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    /// Section title and its rows
    pub sections: Vec<(String, Vec<(String, String)>)>,
}

impl StatusSummary {
    /// Summarize a state against an optional pegged supply
    pub fn from_state(state: &TreasuryState, peg_supply: Option<u64>) -> Self {
        let c = &state.collateral;
        let s = &state.stability;
        let f = &state.fee_structure;

        let row = |k: &str, v: String| (k.to_string(), v);

        let collateral = vec![
            row("Total reserves", c.total_reserves.to_string()),
            row("Allocated", c.allocated_collateral.to_string()),
            row("Available", c.available_collateral.to_string()),
            row(
                "Backing ratio",
                format_ratio(backing_ratio(c.total_reserves, peg_supply.unwrap_or(0))),
            ),
            row("Balanced", c.is_balanced().to_string()),
        ];

        let fees = vec![
            row("Collected", state.fees.total_fees_collected.to_string()),
            row("Distributed", state.fees.total_fees_distributed.to_string()),
            row(
                "Shares (bps)",
                format!("{}/{}/{}", f.stability_share, f.governance_share, f.development_share),
            ),
        ];

        let stability = vec![
            row("Total funds", s.total_funds.to_string()),
            row("Deployed", s.deployed_funds.to_string()),
            row("Max deployment", s.max_deployment.to_string()),
        ];

        let governance = vec![
            row("Owner", state.roles.owner().to_string()),
            row("Governance", state.roles.governance().to_string()),
            row("Required approvals", state.roles.required_approvals().to_string()),
            row("Pending approvals", state.quorum.pending_operations().len().to_string()),
            row("Pending withdrawals", state.timelock.pending().len().to_string()),
            row("Withdrawal delay", format!("{}s", state.timelock.delay())),
            row("Paused", state.flags.paused.to_string()),
            row("Deposits enabled", state.flags.deposits_enabled.to_string()),
            row("Withdrawals enabled", state.flags.withdrawals_enabled.to_string()),
        ];

        Self {
            sections: vec![
                ("Collateral".to_string(), collateral),
                ("Fees".to_string(), fees),
                ("Stability fund".to_string(), stability),
                ("Governance".to_string(), governance),
            ],
        }
    }
}
