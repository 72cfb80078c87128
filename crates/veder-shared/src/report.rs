//! Research report data model.
//!
//! A `Report` is built once per query by the materializer and is never
//! mutated afterwards. Every field is concrete: missing model output becomes
//! a typed empty default, so consumers can iterate and display without
//! checking for absence.
//!
//! Categorical fields (verdict, statuses, tiers) are stored verbatim as the
//! model wrote them. `Verdict` and `DimensionStatus` map them for display.

use serde::{Deserialize, Serialize};

/// Engine label used when the model does not claim one
pub const ENGINE_VERSION: &str = "Veder X V16.0 Deterministic Stability";

/// Placeholder token name when the model gives none
pub const UNKNOWN_TOKEN_NAME: &str = "Unknown";

/// Placeholder symbol when the model gives none
pub const UNKNOWN_TOKEN_SYMBOL: &str = "???";

/// Verdict recorded when the model gives none
pub const DEFAULT_VERDICT: &str = "Hold";

/// Confidence recorded when the model gives none
pub const DEFAULT_CONFIDENCE: f64 = 50.0;

/// Maximum number of grounding sources kept on a report
pub const MAX_SOURCES: usize = 8;

/// Output language of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Zh,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    /// Parse a language tag ("en", "zh", "zh-CN", "english", ...)
    pub fn parse(tag: &str) -> Option<Language> {
        let tag = tag.trim().to_lowercase();
        if tag == "en" || tag.starts_with("en-") || tag == "english" {
            Some(Language::En)
        } else if tag == "zh" || tag.starts_with("zh-") || tag == "chinese" {
            Some(Language::Zh)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::parse(s).ok_or_else(|| format!("unsupported language: {} (expected en or zh)", s))
    }
}

/// Investment verdict categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Verdict {
    /// Map a raw verdict label; unrecognized labels yield `None`
    pub fn parse(label: &str) -> Option<Verdict> {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "strongbuy" => Some(Verdict::StrongBuy),
            "buy" => Some(Verdict::Buy),
            "hold" => Some(Verdict::Hold),
            "sell" => Some(Verdict::Sell),
            "strongsell" => Some(Verdict::StrongSell),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::StrongBuy => "Strong Buy",
            Verdict::Buy => "Buy",
            Verdict::Hold => "Hold",
            Verdict::Sell => "Sell",
            Verdict::StrongSell => "Strong Sell",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Status of a scored dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimensionStatus {
    Good,
    Neutral,
    Warning,
    Critical,
}

impl DimensionStatus {
    pub fn parse(label: &str) -> Option<DimensionStatus> {
        match label.trim().to_lowercase().as_str() {
            "good" => Some(DimensionStatus::Good),
            "neutral" => Some(DimensionStatus::Neutral),
            "warning" => Some(DimensionStatus::Warning),
            "critical" => Some(DimensionStatus::Critical),
            _ => None,
        }
    }
}

// ============================================================================
// Top-level report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub token_name: String,
    pub token_symbol: String,
    /// Stamped at materialization time, never taken from model output
    pub generated_at: String,
    pub engine_version: String,
    pub language: Language,

    pub market_data: MarketData,

    /// Overall score, expected 0-100 but not enforced
    pub total_score: f64,
    /// Raw verdict label as written by the model
    pub verdict: String,
    pub confidence_score: f64,

    pub report_sections: ReportSections,

    pub confidence_factors: Vec<ConfidenceFactor>,
    pub evidence_pack: Vec<AuditEvidence>,
    pub manual_review_triggers: Vec<ManualReviewTrigger>,
    pub dimension_scores: Vec<DimensionScore>,

    pub deep_dive: DeepDiveAnalysis,

    pub competitors: Vec<Competitor>,
    pub catalysts: Vec<Catalyst>,
    pub health_indicators: Vec<HealthIndicator>,
    pub risks: Vec<RiskAlert>,
    /// Grounding citations, at most `MAX_SOURCES`
    pub sources: Vec<SourceLink>,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            token_name: UNKNOWN_TOKEN_NAME.to_string(),
            token_symbol: UNKNOWN_TOKEN_SYMBOL.to_string(),
            generated_at: String::new(),
            engine_version: ENGINE_VERSION.to_string(),
            language: Language::default(),
            market_data: MarketData::default(),
            total_score: 0.0,
            verdict: DEFAULT_VERDICT.to_string(),
            confidence_score: DEFAULT_CONFIDENCE,
            report_sections: ReportSections::default(),
            confidence_factors: Vec::new(),
            evidence_pack: Vec::new(),
            manual_review_triggers: Vec::new(),
            dimension_scores: Vec::new(),
            deep_dive: DeepDiveAnalysis::default(),
            competitors: Vec::new(),
            catalysts: Vec::new(),
            health_indicators: Vec::new(),
            risks: Vec::new(),
            sources: Vec::new(),
        }
    }
}

impl Report {
    /// Verdict mapped to its category, `None` if the model used an unknown label
    pub fn verdict_category(&self) -> Option<Verdict> {
        Verdict::parse(&self.verdict)
    }

    /// Names of the narrative sections that came back empty
    pub fn missing_sections(&self) -> Vec<&'static str> {
        self.report_sections
            .section_population()
            .into_iter()
            .filter(|(_, populated)| !populated)
            .map(|(name, _)| name)
            .collect()
    }

    /// True when any narrative section is empty (a partially populated report)
    pub fn is_degraded(&self) -> bool {
        !self.missing_sections().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub price: String,
    #[serde(rename = "change24h")]
    pub change_24h: String,
    pub market_cap: String,
    pub fdv: String,
    #[serde(rename = "volume24h")]
    pub volume_24h: String,
    pub tvl: String,
    pub holders: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScore {
    pub name: String,
    pub score: f64,
    /// Weight label such as "15%"
    pub weight: String,
    pub description: String,
    pub status: String,
}

impl Default for DimensionScore {
    fn default() -> Self {
        Self {
            name: String::new(),
            score: 0.0,
            weight: String::new(),
            description: String::new(),
            status: "Neutral".to_string(),
        }
    }
}

impl DimensionScore {
    pub fn status_category(&self) -> Option<DimensionStatus> {
        DimensionStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceFactor {
    pub factor: String,
    pub impact: String,
    pub score_delta: f64,
}

/// One entry of the evidence pack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvidence {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub tier: String,
    /// Non-authoritative evidence (typically Tier 3)
    pub is_reference_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualReviewTrigger {
    pub trigger_name: String,
    pub severity: String,
    pub description: String,
    pub recommended_action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub name: String,
    pub comparison: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalyst {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub impact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthIndicator {
    pub label: String,
    pub status: String,
    pub value_display: String,
    pub assessment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAlert {
    pub severity: String,
    pub title: String,
    pub description: String,
    pub evidence_level: String,
    pub logic: String,
}

/// Grounding citation; both fields are always non-empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    pub title: String,
    pub uri: String,
}

// ============================================================================
// Narrative sections
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSections {
    pub profile: ProjectProfile,
    pub overview: ProjectOverview,
    pub product_tech: ProductTech,
    pub market_analysis: String,
    pub tokenomics: TokenomicsDeep,
    pub on_chain_summary: String,
    pub liquidity_analysis: LiquidityAnalysis,
    pub team_info: TeamBackerInfo,
    pub social_analysis: SocialStats,
    pub compliance: RegulatoryCheck,
    pub roadmap: Vec<RoadmapItem>,
    pub strengths: Vec<String>,
    pub general_risks: Vec<String>,
}

impl ReportSections {
    /// Each named section paired with whether the model populated it
    pub fn section_population(&self) -> Vec<(&'static str, bool)> {
        let liquidity_default = LiquidityAnalysis::default();
        vec![
            ("profile", self.profile != ProjectProfile::default()),
            ("overview", self.overview != ProjectOverview::default()),
            ("productTech", self.product_tech != ProductTech::default()),
            ("marketAnalysis", !self.market_analysis.is_empty()),
            ("tokenomics", self.tokenomics != TokenomicsDeep::default()),
            ("onChainSummary", !self.on_chain_summary.is_empty()),
            ("liquidityAnalysis", self.liquidity_analysis != liquidity_default),
            ("teamInfo", self.team_info != TeamBackerInfo::default()),
            ("socialAnalysis", self.social_analysis != SocialStats::default()),
            ("compliance", self.compliance != RegulatoryCheck::default()),
            ("roadmap", !self.roadmap.is_empty()),
            ("strengths", !self.strengths.is_empty()),
            ("generalRisks", !self.general_risks.is_empty()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProfile {
    pub name: String,
    pub symbol: String,
    pub contract_address: String,
    pub website: Vec<String>,
    pub whitepaper: String,
    pub socials: Vec<SocialLink>,
    pub sector: String,
    pub status: String,
    pub team_location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOverview {
    pub what_is_it: String,
    pub vision: String,
    pub achievements: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTech {
    pub features: String,
    pub architecture: String,
    pub scalability: String,
    pub dependencies: String,
    pub github_activity: String,
    pub security_summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenomicsDeep {
    pub base_info: TokenBaseInfo,
    pub distribution: String,
    pub utility: String,
    pub risk_analysis: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBaseInfo {
    pub total_supply: String,
    pub circulating_supply: String,
    pub inflation_mechanism: String,
    pub vesting_schedule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityAnalysis {
    pub holder_breakdown: HolderBreakdown,
    pub lp_status: LpStatus,
    pub concentration_verdict: String,
    pub explanation: String,
}

impl Default for LiquidityAnalysis {
    fn default() -> Self {
        Self {
            holder_breakdown: HolderBreakdown::default(),
            lp_status: LpStatus::default(),
            concentration_verdict: "Warning".to_string(),
            explanation: "Data unavailable".to_string(),
        }
    }
}

/// Percentages held by each holder class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HolderBreakdown {
    pub contracts: f64,
    pub exchanges: f64,
    pub whales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LpStatus {
    pub is_locked: bool,
    pub lock_duration: String,
    pub owner: String,
}

impl Default for LpStatus {
    fn default() -> Self {
        Self {
            is_locked: false,
            lock_duration: "N/A".to_string(),
            owner: "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamBackerInfo {
    pub core_team: String,
    pub investors: String,
    pub advisors: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialStats {
    pub twitter_followers: String,
    pub community_activity: String,
    pub sentiment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulatoryCheck {
    pub securities_risk: String,
    pub geo_restrictions: String,
    pub kyc_requirements: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadmapItem {
    pub period: String,
    pub goal: String,
    pub status: String,
}

// ============================================================================
// Deep-dive analysis
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepDiveAnalysis {
    pub address_profile: Vec<AddressProfile>,
    pub logic_paths: Vec<LogicPath>,
    pub anti_cheat: Vec<AntiCheatCheck>,
    pub code_audit: CodeAudit,
    pub resource_probes: Vec<ResourceProbe>,
    pub verified_mechanisms: Vec<VerifiedMechanism>,
    pub mechanism_deviations: Vec<MechanismDeviation>,
    pub harvesting_trace: Vec<HarvestingTrace>,
}

impl DeepDiveAnalysis {
    /// Sum of address-profile percentages (not guaranteed to be 100)
    pub fn address_profile_total(&self) -> f64 {
        self.address_profile.iter().map(|a| a.percentage).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressProfile {
    #[serde(rename = "type")]
    pub kind: String,
    pub percentage: f64,
    pub description: String,
}

/// Signal -> tier-1 check -> tier-2 check -> conclusion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicPath {
    pub signal: String,
    #[serde(rename = "tier1Check")]
    pub tier1_check: String,
    #[serde(rename = "tier2Check")]
    pub tier2_check: String,
    pub conclusion: String,
    pub risk_level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntiCheatCheck {
    pub check_name: String,
    pub status: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeAudit {
    pub contract_verified: bool,
    pub bytecode_match: bool,
    pub owner_status: String,
    pub vulnerabilities_found: u32,
    pub audits: Vec<AuditRecord>,
    pub github_trust: String,
}

impl Default for CodeAudit {
    fn default() -> Self {
        Self {
            contract_verified: false,
            bytecode_match: false,
            owner_status: "Unknown".to_string(),
            vulnerabilities_found: 0,
            audits: Vec::new(),
            github_trust: "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub firm: String,
    pub date: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceProbe {
    pub resource_name: String,
    pub status: String,
    pub discovery_layer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedMechanism {
    pub mechanism_name: String,
    pub technical_risk: String,
    pub business_intent: String,
    pub implementation_status: String,
    pub match_confidence: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MechanismDeviation {
    pub category: String,
    pub signal: String,
    pub whitepaper_justification: String,
    pub assessment: String,
    /// 0 is aligned, 100 is deviation
    pub deviation_score: f64,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_evidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle_check: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_layer: Option<String>,
}

/// How a resource (website, whitepaper, ...) was discovered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestingTrace {
    pub category: String,
    pub status: String,
    pub discovery_path: String,
    pub source_url: String,
    pub evidence_tier: String,
    pub evidence_snapshot: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("en"), Some(Language::En));
        assert_eq!(Language::parse("zh-CN"), Some(Language::Zh));
        assert_eq!(Language::parse("EN-us"), Some(Language::En));
        assert_eq!(Language::parse("fr"), None);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Language::Zh).unwrap(), "\"zh\"");
    }

    #[test]
    fn test_verdict_parse_tolerates_spacing() {
        assert_eq!(Verdict::parse("Strong Buy"), Some(Verdict::StrongBuy));
        assert_eq!(Verdict::parse("strong_sell"), Some(Verdict::StrongSell));
        assert_eq!(Verdict::parse("HOLD"), Some(Verdict::Hold));
        assert_eq!(Verdict::parse("Accumulate"), None);
    }

    #[test]
    fn test_default_report_is_degraded() {
        let report = Report::default();
        assert!(report.is_degraded());
        assert_eq!(report.missing_sections().len(), 13);
        assert_eq!(report.verdict_category(), Some(Verdict::Hold));
    }

    #[test]
    fn test_populated_section_not_missing() {
        let mut report = Report::default();
        report.report_sections.market_analysis = "Liquid majors".to_string();
        report.report_sections.strengths.push("Deep liquidity".to_string());
        let missing = report.missing_sections();
        assert!(!missing.contains(&"marketAnalysis"));
        assert!(!missing.contains(&"strengths"));
        assert!(missing.contains(&"roadmap"));
    }

    #[test]
    fn test_report_serializes_camel_case_keys() {
        let json = serde_json::to_value(Report::default()).unwrap();
        assert!(json.get("tokenName").is_some());
        assert!(json["marketData"].get("change24h").is_some());
        assert!(json["reportSections"].get("onChainSummary").is_some());
        assert!(json["deepDive"]["logicPaths"].is_array());
    }

    #[test]
    fn test_address_profile_total() {
        let mut deep = DeepDiveAnalysis::default();
        deep.address_profile.push(AddressProfile {
            kind: "Staking".to_string(),
            percentage: 45.0,
            description: String::new(),
        });
        deep.address_profile.push(AddressProfile {
            kind: "CEX".to_string(),
            percentage: 30.5,
            description: String::new(),
        });
        assert!((deep.address_profile_total() - 75.5).abs() < f64::EPSILON);
    }
}
