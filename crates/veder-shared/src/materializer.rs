//! Report materializer: untrusted JSON in, fully defaulted `Report` out.
//!
//! Every record type starts from its documented default and each field is
//! overlaid from the parsed value when present and coercible. Nested records
//! default their own children, so a partially populated section keeps what
//! it has. Materialization never fails.
//!
//! Coercion rules:
//! - `null` and missing keys are absent
//! - text accepts strings, numbers and booleans
//! - numbers accept numbers and numeric strings ("85", "12.5%")
//! - flags accept booleans and "true"/"false"
//! - string lists accept a single string as a one-element list
//! - record lists skip elements that are not objects

use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use tracing::debug;

use crate::grounding::{extract_sources, GroundingChunk};
use crate::market::{MarketIntelligence, NewToken};
use crate::report::*;

/// Types that can be built from an arbitrary JSON value without failing
pub trait Materialize: Sized + Default {
    fn materialize(value: &Value) -> Self;
}

/// Build a report from a parsed value, without grounding sources
pub fn materialize(parsed: &Value, language: Language) -> Report {
    materialize_with_sources(parsed, language, &[])
}

/// Build a report and attach up to `MAX_SOURCES` grounding sources
pub fn materialize_with_sources(parsed: &Value, language: Language, grounding: &[GroundingChunk]) -> Report {
    let root = root_object(parsed);
    let f = Fields::of(root);

    let report = Report {
        token_name: f.text_or("tokenName", UNKNOWN_TOKEN_NAME),
        token_symbol: f.text_or("tokenSymbol", UNKNOWN_TOKEN_SYMBOL),
        generated_at: format_generated_at(Local::now(), language),
        engine_version: f.text_or("engineVersion", ENGINE_VERSION),
        language,
        market_data: f.record("marketData"),
        total_score: f.number_or("totalScore", 0.0),
        verdict: f.text_or("verdict", DEFAULT_VERDICT),
        confidence_score: f.number_or("confidenceScore", DEFAULT_CONFIDENCE),
        report_sections: f.record("reportSections"),
        confidence_factors: f.list("confidenceFactors"),
        evidence_pack: f.list("evidencePack"),
        manual_review_triggers: f.list("manualReviewTriggers"),
        dimension_scores: f.list("dimensionScores"),
        deep_dive: f.record("deepDive"),
        competitors: f.list("competitors"),
        catalysts: f.list("catalysts"),
        health_indicators: f.list("healthIndicators"),
        risks: f.list("risks"),
        sources: extract_sources(grounding),
    };

    debug!(
        "Materializer: {} ({}) score={} verdict={} missing_sections={}",
        report.token_name,
        report.token_symbol,
        report.total_score,
        report.verdict,
        report.missing_sections().len()
    );
    report
}

/// Build market intelligence from a parsed value
pub fn materialize_market(parsed: &Value, language: Language) -> MarketIntelligence {
    let f = Fields::of(root_object(parsed));
    MarketIntelligence {
        generated_at: format_generated_at(Local::now(), language),
        new_listings: f.list("newListings"),
        upcoming_projects: f.list("upcomingProjects"),
    }
}

/// Timestamp in the display convention of the requested language
pub fn format_generated_at(now: DateTime<Local>, language: Language) -> String {
    match language {
        Language::En => now.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        Language::Zh => now.format("%Y/%-m/%-d %H:%M:%S").to_string(),
    }
}

/// A top-level array (recovered object sequence) contributes its first object
fn root_object(parsed: &Value) -> &Value {
    match parsed {
        Value::Array(items) => items.iter().find(|v| v.is_object()).unwrap_or(parsed),
        _ => parsed,
    }
}

// ============================================================================
// Field access with coercion
// ============================================================================

#[derive(Clone, Copy)]
struct Fields<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Fields<'a> {
    fn of(value: &'a Value) -> Self {
        Self { map: value.as_object() }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map?.get(key).filter(|v| !v.is_null())
    }

    fn text(&self, key: &str) -> String {
        self.opt_text(key).unwrap_or_default()
    }

    /// Text with a placeholder; blank text counts as absent
    fn text_or(&self, key: &str, default: &str) -> String {
        self.opt_text(key)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    fn opt_text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(coerce_text)
    }

    fn number_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(coerce_number).unwrap_or(default)
    }

    fn count(&self, key: &str) -> u32 {
        let n = self.number_or(key, 0.0);
        if n.is_finite() && n > 0.0 {
            n.round().min(u32::MAX as f64) as u32
        } else {
            0
        }
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(coerce_flag).unwrap_or(false)
    }

    fn strings(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(coerce_text).collect(),
            Some(other) => coerce_text(other).filter(|s| !s.is_empty()).into_iter().collect(),
            None => Vec::new(),
        }
    }

    fn list<T: Materialize>(&self, key: &str) -> Vec<T> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter(|v| v.is_object()).map(T::materialize).collect(),
            Some(single @ Value::Object(_)) => vec![T::materialize(single)],
            _ => Vec::new(),
        }
    }

    fn record<T: Materialize>(&self, key: &str) -> T {
        self.get(key).map(T::materialize).unwrap_or_default()
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn coerce_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        _ => None,
    }
}

// ============================================================================
// Record materializers
// ============================================================================

impl Materialize for MarketData {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            price: f.text("price"),
            change_24h: f.text("change24h"),
            market_cap: f.text("marketCap"),
            fdv: f.text("fdv"),
            volume_24h: f.text("volume24h"),
            tvl: f.text("tvl"),
            holders: f.text("holders"),
            currency: f.text("currency"),
        }
    }
}

impl Materialize for DimensionScore {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            name: f.text("name"),
            score: f.number_or("score", 0.0),
            weight: f.text("weight"),
            description: f.text("description"),
            status: f.text_or("status", "Neutral"),
        }
    }
}

impl Materialize for ConfidenceFactor {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            factor: f.text("factor"),
            impact: f.text("impact"),
            score_delta: f.number_or("scoreDelta", 0.0),
        }
    }
}

impl Materialize for AuditEvidence {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            id: f.text("id"),
            kind: f.text("type"),
            content: f.text("content"),
            url: f.opt_text("url"),
            tier: f.text("tier"),
            is_reference_only: f.flag("isReferenceOnly"),
        }
    }
}

impl Materialize for ManualReviewTrigger {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            trigger_name: f.text("triggerName"),
            severity: f.text("severity"),
            description: f.text("description"),
            recommended_action: f.text("recommendedAction"),
        }
    }
}

impl Materialize for Competitor {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            name: f.text("name"),
            comparison: f.text("comparison"),
        }
    }
}

impl Materialize for Catalyst {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            name: f.text("name"),
            date: f.opt_text("date"),
            kind: f.text("type"),
            impact: f.text("impact"),
        }
    }
}

impl Materialize for HealthIndicator {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            label: f.text("label"),
            status: f.text("status"),
            value_display: f.text("valueDisplay"),
            assessment: f.text("assessment"),
        }
    }
}

impl Materialize for RiskAlert {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            severity: f.text("severity"),
            title: f.text("title"),
            description: f.text("description"),
            evidence_level: f.text("evidenceLevel"),
            logic: f.text("logic"),
        }
    }
}

impl Materialize for ReportSections {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            profile: f.record("profile"),
            overview: f.record("overview"),
            product_tech: f.record("productTech"),
            market_analysis: f.text("marketAnalysis"),
            tokenomics: f.record("tokenomics"),
            on_chain_summary: f.text("onChainSummary"),
            liquidity_analysis: f.record("liquidityAnalysis"),
            team_info: f.record("teamInfo"),
            social_analysis: f.record("socialAnalysis"),
            compliance: f.record("compliance"),
            roadmap: f.list("roadmap"),
            strengths: f.strings("strengths"),
            general_risks: f.strings("generalRisks"),
        }
    }
}

impl Materialize for ProjectProfile {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            name: f.text("name"),
            symbol: f.text("symbol"),
            contract_address: f.text("contractAddress"),
            website: f.strings("website"),
            whitepaper: f.text("whitepaper"),
            socials: f.list("socials"),
            sector: f.text("sector"),
            status: f.text("status"),
            team_location: f.text("teamLocation"),
        }
    }
}

impl Materialize for SocialLink {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            platform: f.text("platform"),
            url: f.text("url"),
        }
    }
}

impl Materialize for ProjectOverview {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            what_is_it: f.text("whatIsIt"),
            vision: f.text("vision"),
            achievements: f.text("achievements"),
        }
    }
}

impl Materialize for ProductTech {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            features: f.text("features"),
            architecture: f.text("architecture"),
            scalability: f.text("scalability"),
            dependencies: f.text("dependencies"),
            github_activity: f.text("githubActivity"),
            security_summary: f.text("securitySummary"),
        }
    }
}

impl Materialize for TokenomicsDeep {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            base_info: f.record("baseInfo"),
            distribution: f.text("distribution"),
            utility: f.text("utility"),
            risk_analysis: f.text("riskAnalysis"),
        }
    }
}

impl Materialize for TokenBaseInfo {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            total_supply: f.text("totalSupply"),
            circulating_supply: f.text("circulatingSupply"),
            inflation_mechanism: f.text("inflationMechanism"),
            vesting_schedule: f.text("vestingSchedule"),
        }
    }
}

impl Materialize for LiquidityAnalysis {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        let defaults = LiquidityAnalysis::default();
        Self {
            holder_breakdown: f.record("holderBreakdown"),
            lp_status: f.record("lpStatus"),
            concentration_verdict: f.text_or("concentrationVerdict", &defaults.concentration_verdict),
            explanation: f.text_or("explanation", &defaults.explanation),
        }
    }
}

impl Materialize for HolderBreakdown {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            contracts: f.number_or("contracts", 0.0),
            exchanges: f.number_or("exchanges", 0.0),
            whales: f.number_or("whales", 0.0),
        }
    }
}

impl Materialize for LpStatus {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        let defaults = LpStatus::default();
        Self {
            is_locked: f.flag("isLocked"),
            lock_duration: f.text_or("lockDuration", &defaults.lock_duration),
            owner: f.text_or("owner", &defaults.owner),
        }
    }
}

impl Materialize for TeamBackerInfo {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            core_team: f.text("coreTeam"),
            investors: f.text("investors"),
            advisors: f.text("advisors"),
        }
    }
}

impl Materialize for SocialStats {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            twitter_followers: f.text("twitterFollowers"),
            community_activity: f.text("communityActivity"),
            sentiment: f.text("sentiment"),
        }
    }
}

impl Materialize for RegulatoryCheck {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            securities_risk: f.text("securitiesRisk"),
            geo_restrictions: f.text("geoRestrictions"),
            kyc_requirements: f.text("kycRequirements"),
        }
    }
}

impl Materialize for RoadmapItem {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            period: f.text("period"),
            goal: f.text("goal"),
            status: f.text("status"),
        }
    }
}

impl Materialize for DeepDiveAnalysis {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            address_profile: f.list("addressProfile"),
            logic_paths: f.list("logicPaths"),
            anti_cheat: f.list("antiCheat"),
            code_audit: f.record("codeAudit"),
            resource_probes: f.list("resourceProbes"),
            verified_mechanisms: f.list("verifiedMechanisms"),
            mechanism_deviations: f.list("mechanismDeviations"),
            harvesting_trace: f.list("harvestingTrace"),
        }
    }
}

impl Materialize for AddressProfile {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            kind: f.text("type"),
            percentage: f.number_or("percentage", 0.0),
            description: f.text("description"),
        }
    }
}

impl Materialize for LogicPath {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            signal: f.text("signal"),
            tier1_check: f.text("tier1Check"),
            tier2_check: f.text("tier2Check"),
            conclusion: f.text("conclusion"),
            risk_level: f.text("riskLevel"),
        }
    }
}

impl Materialize for AntiCheatCheck {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            check_name: f.text("checkName"),
            status: f.text("status"),
            details: f.text("details"),
        }
    }
}

impl Materialize for CodeAudit {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        let defaults = CodeAudit::default();
        Self {
            contract_verified: f.flag("contractVerified"),
            bytecode_match: f.flag("bytecodeMatch"),
            owner_status: f.text_or("ownerStatus", &defaults.owner_status),
            vulnerabilities_found: f.count("vulnerabilitiesFound"),
            audits: f.list("audits"),
            github_trust: f.text_or("githubTrust", &defaults.github_trust),
        }
    }
}

impl Materialize for AuditRecord {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            firm: f.text("firm"),
            date: f.text("date"),
            status: f.text("status"),
        }
    }
}

impl Materialize for ResourceProbe {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            resource_name: f.text("resourceName"),
            status: f.text("status"),
            discovery_layer: f.text("discoveryLayer"),
            url: f.opt_text("url"),
            details: f.text("details"),
            discovery_path: f.opt_text("discoveryPath"),
        }
    }
}

impl Materialize for VerifiedMechanism {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            mechanism_name: f.text("mechanismName"),
            technical_risk: f.text("technicalRisk"),
            business_intent: f.text("businessIntent"),
            implementation_status: f.text("implementationStatus"),
            match_confidence: f.text("matchConfidence"),
            source: f.text("source"),
        }
    }
}

impl Materialize for MechanismDeviation {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            category: f.text("category"),
            signal: f.text("signal"),
            whitepaper_justification: f.text("whitepaperJustification"),
            assessment: f.text("assessment"),
            deviation_score: f.number_or("deviationScore", 0.0),
            details: f.text("details"),
            reasoning: f.opt_text("reasoning"),
            counter_evidence: f.opt_text("counterEvidence"),
            token_flow: f.opt_text("tokenFlow"),
            lifecycle_check: f.opt_text("lifecycleCheck"),
            risk_layer: f.opt_text("riskLayer"),
        }
    }
}

impl Materialize for HarvestingTrace {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            category: f.text("category"),
            status: f.text("status"),
            discovery_path: f.text("discoveryPath"),
            source_url: f.text("sourceUrl"),
            evidence_tier: f.text("evidenceTier"),
            evidence_snapshot: f.text("evidenceSnapshot"),
        }
    }
}

impl Materialize for NewToken {
    fn materialize(value: &Value) -> Self {
        let f = Fields::of(value);
        Self {
            name: f.text("name"),
            symbol: f.text("symbol"),
            price: f.opt_text("price"),
            launch_date: f.opt_text("launchDate"),
            platform: f.text("platform"),
            description: f.text("description"),
            trend: f.opt_text("trend"),
        }
    }
}
