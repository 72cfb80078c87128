//! Prompt builders for the generative service.
//!
//! The returned text is opaque to the pipeline: nothing downstream depends on
//! its wording, only on the JSON shape the model is asked to produce.

use veder_shared::report::ENGINE_VERSION;
use veder_shared::Language;

fn language_rules(language: Language) -> &'static str {
    match language {
        Language::Zh => {
            r#"LANGUAGE ENFORCEMENT (CRITICAL):
1. TARGET LANGUAGE: Simplified Chinese (简体中文).
2. All analysis, descriptions, reasoning and summaries MUST be in Chinese.
3. Translate insights from English sources into Chinese; never output raw English paragraphs.
4. Keep in English: token symbols, project names, crypto abbreviations (TVL, FDV, DAO, PoS, zk-Rollup), contract fields and functions (owner, mint, renounceOwnership), audit firm names.
5. Before output, check every string value and translate any English sentence."#
        }
        Language::En => {
            r#"LANGUAGE ENFORCEMENT:
1. TARGET LANGUAGE: English.
2. All analysis must be in English.
3. Keep technical terms standard."#
        }
    }
}

/// System instruction: persona, language rules, discovery and evidence protocols
pub fn system_instruction(language: Language) -> String {
    format!(
        r#"You are "{engine}".
{rules}

DETERMINISTIC STABILITY
1. If several tokens share a name, ALWAYS select the one with the highest market cap or trading volume unless a contract address is given.
2. Take the official website and whitepaper from the CoinGecko or CoinMarketCap profile; fall back to the explorer token profile. Never use random articles or posts as the primary website.

IDENTITY RESOLUTION
If the input is an address (0x...), search the block explorers for its "Token Tracker" page. Do not mistake a transaction or account page for a token.

9-PATH DISCOVERY
1. Explorer metadata  2. Aggregators (CoinGecko/CMC)  3. DNS  4. Bytecode metadata  5. Wayback Machine
6. Pinned social posts  7. IPFS/ENS  8. Corporate registries  9. Official community posts

EVIDENCE TIERS
L1 chain/metadata (40), L2 aggregator/auditor (25), L3 social/GitHub (15), L4 media/data portals (10), L5 community/blogs (5).

COUNTER-EVIDENCE CHAIN
- Concentration? Check staking pool or treasury.
- Infinite mint? Check game rewards or caps.
- Owner privileges? Check renounced ownership or timelock.

OUTPUT
- Return ONLY a valid single-line JSON string.
- Double quotes for keys and string values; single quotes inside strings.
- Separate every array element with a comma. No trailing commas. No comments."#,
        engine = ENGINE_VERSION,
        rules = language_rules(language),
    )
}

/// Report directive for one query, including the full JSON skeleton
pub fn report_prompt(query: &str, language: Language) -> String {
    let (lang_name, val) = match language {
        Language::En => ("English", "String (In English)"),
        Language::Zh => ("Simplified Chinese (简体中文)", "String (In Chinese)"),
    };
    format!(
        r#"Generate a Comprehensive Crypto Research Report (15 Sections) for: "{query}".
TARGET OUTPUT LANGUAGE: {lang_name}.
MANDATORY: populate "harvestingTrace" in "deepDive" with AT LEAST 3 items showing how the website, whitepaper and GitHub were found using the 9-path discovery protocol.

JSON STRUCTURE:
{{
  "tokenName": "String", "tokenSymbol": "String", "engineVersion": "{engine}", "language": "{lang}",
  "marketData": {{ "price": "...", "change24h": "...", "marketCap": "...", "fdv": "...", "volume24h": "...", "tvl": "...", "holders": "...", "currency": "USD" }},
  "totalScore": 85, "verdict": "Buy", "confidenceScore": 90,
  "reportSections": {{
    "profile": {{ "name": "...", "symbol": "...", "contractAddress": "MUST BE FILLED", "website": ["url1"], "whitepaper": "...", "socials": [{{"platform": "X", "url": "..."}}], "sector": "{val}", "status": "{val}", "teamLocation": "{val}" }},
    "overview": {{ "whatIsIt": "{val}", "vision": "{val}", "achievements": "{val}" }},
    "productTech": {{ "features": "{val}", "architecture": "{val}", "scalability": "{val}", "dependencies": "{val}", "githubActivity": "{val}", "securitySummary": "{val}" }},
    "marketAnalysis": "{val}",
    "tokenomics": {{ "baseInfo": {{ "totalSupply": "...", "circulatingSupply": "...", "inflationMechanism": "{val}", "vestingSchedule": "{val}" }}, "distribution": "{val}", "utility": "{val}", "riskAnalysis": "{val}" }},
    "onChainSummary": "{val}",
    "liquidityAnalysis": {{ "holderBreakdown": {{ "contracts": 80, "exchanges": 10, "whales": 10 }}, "lpStatus": {{ "isLocked": true, "lockDuration": "...", "owner": "Protocol Owned" }}, "concentrationVerdict": "Safe (Mechanism)", "explanation": "{val}" }},
    "teamInfo": {{ "coreTeam": "{val}", "investors": "{val}", "advisors": "{val}" }},
    "socialAnalysis": {{ "twitterFollowers": "...", "communityActivity": "{val}", "sentiment": "{val}" }},
    "compliance": {{ "securitiesRisk": "{val}", "geoRestrictions": "{val}", "kycRequirements": "{val}" }},
    "roadmap": [{{ "period": "...", "goal": "{val}", "status": "Planned" }}],
    "strengths": ["{val}"],
    "generalRisks": ["{val}"]
  }},
  "confidenceFactors": [{{ "factor": "{val}", "impact": "Positive", "scoreDelta": 20 }}],
  "evidencePack": [{{ "id": "EV-01", "type": "On-Chain", "content": "{val}", "url": "...", "tier": "Tier 1", "isReferenceOnly": false }}],
  "manualReviewTriggers": [],
  "dimensionScores": [
    {{ "name": "Fundamental", "score": 80, "weight": "15%", "description": "{val}", "status": "Good" }},
    {{ "name": "Code Security", "score": 90, "weight": "25%", "description": "{val}", "status": "Good" }},
    {{ "name": "On-chain", "score": 80, "weight": "15%", "description": "{val}", "status": "Good" }},
    {{ "name": "Market", "score": 80, "weight": "10%", "description": "{val}", "status": "Good" }},
    {{ "name": "Social", "score": 80, "weight": "10%", "description": "{val}", "status": "Good" }},
    {{ "name": "Team", "score": 80, "weight": "10%", "description": "{val}", "status": "Good" }},
    {{ "name": "Regulation", "score": 80, "weight": "10%", "description": "{val}", "status": "Good" }},
    {{ "name": "Product", "score": 80, "weight": "5%", "description": "{val}", "status": "Good" }}
  ],
  "deepDive": {{
    "codeAudit": {{ "contractVerified": true, "bytecodeMatch": true, "ownerStatus": "Renounced", "vulnerabilitiesFound": 0, "audits": [{{ "firm": "CertiK", "date": "...", "status": "Passed" }}], "githubTrust": "High" }},
    "addressProfile": [{{ "type": "Staking", "percentage": 45, "description": "{val}" }}],
    "logicPaths": [{{ "signal": "Concentration", "tier1Check": "Staking Contract", "tier2Check": "Matches WP", "conclusion": "{val}", "riskLevel": "Low" }}],
    "antiCheat": [{{ "checkName": "Fake Audit", "status": "Passed", "details": "{val}" }}],
    "resourceProbes": [],
    "harvestingTrace": [{{ "category": "Whitepaper", "status": "Confirmed", "discoveryPath": "Path #2: CoinGecko Official", "sourceUrl": "...", "evidenceTier": "L2", "evidenceSnapshot": "CoinGecko Profile Field" }}],
    "mechanismDeviations": [{{ "category": "Tokenomics", "signal": "Signal", "whitepaperJustification": "Mechanism", "assessment": "Mechanism-Expected Behavior", "deviationScore": 0, "details": "{val}", "reasoning": "{val}", "counterEvidence": "{val}", "tokenFlow": "User -> LP", "lifecycleCheck": "Consistent", "riskLayer": "Structural" }}]
  }},
  "competitors": [{{ "name": "...", "comparison": "{val}" }}],
  "catalysts": [],
  "healthIndicators": [],
  "risks": [{{ "severity": "Medium", "title": "{val}", "description": "{val}", "evidenceLevel": "Tier 2", "logic": "{val}" }}]
}}"#,
        query = query.trim(),
        lang_name = lang_name,
        engine = ENGINE_VERSION,
        lang = language.as_str(),
        val = val,
    )
}

/// Market intelligence directive
pub fn market_prompt() -> String {
    r#"Act as a crypto market analyst. Find 3-4 newly listed tokens and 3-4 upcoming projects.
OUTPUT STRICT JSON. Use double quotes for keys and values. No Markdown. Ensure commas between objects.
{
  "newListings": [ { "name": "Name", "symbol": "Symbol", "price": "...", "platform": "...", "description": "...", "trend": "Up" } ],
  "upcomingProjects": [ { "name": "Name", "symbol": "Symbol", "launchDate": "...", "platform": "...", "description": "..." } ]
}"#
    .to_string()
}
