//! Optional consistency checks on a materialized report.
//!
//! Checks only produce warnings. A report is never rejected for them.

use crate::report::Report;

/// Percentages in `deepDive.addressProfile` and the liquidity holder
/// breakdown should each sum to 100 within `tolerance` percentage points.
/// Empty or all-zero groups are skipped.
pub fn holder_percentage_warnings(report: &Report, tolerance: f64) -> Vec<String> {
    let mut warnings = Vec::new();

    let profile = &report.deep_dive.address_profile;
    if !profile.is_empty() {
        let total = report.deep_dive.address_profile_total();
        if total != 0.0 && (total - 100.0).abs() > tolerance {
            warnings.push(format!(
                "addressProfile percentages sum to {:.1} across {} entries",
                total,
                profile.len()
            ));
        }
    }

    let breakdown = &report.report_sections.liquidity_analysis.holder_breakdown;
    let total = breakdown.contracts + breakdown.exchanges + breakdown.whales;
    if total != 0.0 && (total - 100.0).abs() > tolerance {
        warnings.push(format!("holderBreakdown percentages sum to {:.1}", total));
    }

    warnings
}
