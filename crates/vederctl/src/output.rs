//! Terminal rendering of reports and errors.

use owo_colors::OwoColorize;
use veder_shared::{Language, Report, VederError, Verdict};

/// Short human summary of a report
pub fn format_summary(report: &Report) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{} ({})  {}\n",
        report.token_name.bold(),
        report.token_symbol,
        report.engine_version.dimmed()
    ));
    out.push_str(&format!("  Generated:  {}\n", report.generated_at));
    if !report.market_data.price.is_empty() {
        out.push_str(&format!("  Price:      {}\n", report.market_data.price));
    }
    out.push_str(&format!("  Score:      {}\n", report.total_score));
    out.push_str(&format!("  Verdict:    {}\n", colored_verdict(report)));
    out.push_str(&format!("  Confidence: {}%\n", report.confidence_score));

    let missing = report.missing_sections();
    if !missing.is_empty() {
        out.push_str(&format!(
            "  {} {}\n",
            "Incomplete:".yellow(),
            missing.join(", ")
        ));
    }

    if !report.sources.is_empty() {
        out.push_str("  Sources:\n");
        for source in &report.sources {
            out.push_str(&format!("    * {} <{}>\n", source.title, source.uri));
        }
    }
    out
}

fn colored_verdict(report: &Report) -> String {
    match report.verdict_category() {
        Some(Verdict::StrongBuy) | Some(Verdict::Buy) => report.verdict.green().to_string(),
        Some(Verdict::Sell) | Some(Verdict::StrongSell) => report.verdict.red().to_string(),
        Some(Verdict::Hold) => report.verdict.yellow().to_string(),
        None => report.verdict.clone(),
    }
}

/// Print the user-facing message for a failed query
pub fn print_error(error: &VederError, language: Language) {
    eprintln!("[ERROR] {}", error.user_message(language).red());
    if error.is_retryable() {
        eprintln!("        {}", "Run the same command again to retry.".dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veder_shared::SourceLink;

    #[test]
    fn test_summary_lists_sources_and_gaps() {
        let report = Report {
            token_name: "Aave".to_string(),
            token_symbol: "AAVE".to_string(),
            verdict: "Buy".to_string(),
            sources: vec![SourceLink {
                title: "aave.com".to_string(),
                uri: "https://aave.com".to_string(),
            }],
            ..Report::default()
        };
        let summary = format_summary(&report);
        assert!(summary.contains("AAVE"));
        assert!(summary.contains("https://aave.com"));
        assert!(summary.contains("Incomplete:"));
    }

    #[test]
    fn test_unknown_verdict_printed_verbatim() {
        let report = Report {
            verdict: "Accumulate".to_string(),
            ..Report::default()
        };
        assert!(format_summary(&report).contains("Verdict:    Accumulate"));
    }
}
