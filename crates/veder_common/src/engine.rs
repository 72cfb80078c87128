//! Query orchestration.
//!
//! One report query is a single generative call followed by the response
//! pipeline: normalize the raw text, then materialize it into a complete
//! `Report` annotated with grounding sources. Overlapping submissions are
//! resolved by the sequence guard in `guard`.

use chrono::Local;
use std::sync::Arc;
use tracing::{debug, info, warn};
use veder_shared::materializer::format_generated_at;
use veder_shared::validation::holder_percentage_warnings;
use veder_shared::{
    materialize_market, materialize_with_sources, normalize, Language, MarketIntelligence, Report, Result,
    VederError,
};

use crate::config::Config;
use crate::guard::LatestReport;
use crate::llm_client::{GenerationOutput, GenerationRequest, GenerativeClient, HttpGenerativeClient};
use crate::prompts;

/// Outcome of `ResearchEngine::submit`
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The query was still the latest when it resolved; the report is displayed
    Current(Box<Report>),
    /// A newer query was submitted meanwhile; this result was dropped
    Superseded,
}

pub struct ResearchEngine<C: GenerativeClient> {
    client: Arc<C>,
    config: Config,
    latest: LatestReport,
}

impl ResearchEngine<HttpGenerativeClient> {
    /// Engine backed by the real HTTP client described by `config`
    pub fn from_config(config: Config) -> Result<Self> {
        let client = HttpGenerativeClient::new(config.service.clone())?;
        Ok(Self::new(Arc::new(client), config))
    }
}

impl<C: GenerativeClient> ResearchEngine<C> {
    pub fn new(client: Arc<C>, config: Config) -> Self {
        Self {
            client,
            config,
            latest: LatestReport::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Slot holding the status and report of the latest submitted query
    pub fn latest(&self) -> &LatestReport {
        &self.latest
    }

    /// Run one research query end to end.
    ///
    /// Fails with `EmptyResponse` when the service returns no text,
    /// `MalformedResponse` when the text cannot be repaired into JSON, and
    /// `Service` for transport failures. Otherwise always yields a complete
    /// report, even from a sparse document.
    pub async fn generate_report(&self, query: &str, language: Language) -> Result<Report> {
        info!("Generating report for {:?} ({})", query.trim(), language);

        let request = GenerationRequest {
            system_instruction: Some(prompts::system_instruction(language)),
            prompt: prompts::report_prompt(query, language),
            temperature: self.config.service.report_temperature,
            search_grounding: self.config.service.search_grounding,
        };
        let output = self.client.generate(&request).await?;
        let text = require_text(&output)?;

        let parsed = normalize(text)?;
        let report = materialize_with_sources(&parsed, language, &output.grounding);

        let missing = report.missing_sections();
        if !missing.is_empty() {
            debug!("Report for {} lacks sections: {}", report.token_symbol, missing.join(", "));
        }

        let validation = &self.config.validation;
        if validation.check_holder_percentages {
            for warning in holder_percentage_warnings(&report, validation.holder_tolerance) {
                warn!("{}", warning);
            }
        }

        info!(
            "Report ready: {} ({}) score={} verdict={}",
            report.token_name, report.token_symbol, report.total_score, report.verdict
        );
        Ok(report)
    }

    /// Submit a query through the sequence guard.
    ///
    /// The outcome is stored only when no newer query was submitted while
    /// this one was in flight. A superseded error is dropped as well.
    pub async fn submit(&self, query: &str, language: Language) -> Result<Submission> {
        let ticket = self.latest.begin();
        debug!("Submitted query seq={}", ticket.seq());

        let outcome = self.generate_report(query, language).await;
        if !self.latest.complete(ticket, outcome.as_ref()) {
            return Ok(Submission::Superseded);
        }
        match outcome {
            Ok(report) => Ok(Submission::Current(Box::new(report))),
            Err(e) => {
                warn!("Query seq={} failed: {}", ticket.seq(), e);
                Err(e)
            }
        }
    }

    /// Newly listed and upcoming tokens
    pub async fn market_intelligence(&self, language: Language) -> Result<MarketIntelligence> {
        let request = GenerationRequest {
            system_instruction: None,
            prompt: prompts::market_prompt(),
            temperature: self.config.service.market_temperature,
            search_grounding: self.config.service.search_grounding,
        };
        let output = self.client.generate(&request).await?;
        let text = require_text(&output)?;
        let parsed = normalize(text)?;
        let market = materialize_market(&parsed, language);
        info!(
            "Market intelligence: {} listings, {} upcoming",
            market.new_listings.len(),
            market.upcoming_projects.len()
        );
        Ok(market)
    }

    /// Like `market_intelligence`, but any failure yields empty lists
    pub async fn market_intelligence_or_empty(&self, language: Language) -> MarketIntelligence {
        match self.market_intelligence(language).await {
            Ok(market) => market,
            Err(e) => {
                warn!("Market intelligence unavailable: {}", e);
                MarketIntelligence::empty(format_generated_at(Local::now(), language))
            }
        }
    }
}

fn require_text(output: &GenerationOutput) -> Result<&str> {
    match output.text.as_deref() {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(VederError::EmptyResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::FakeGenerativeClient;

    #[test]
    fn test_require_text_rejects_whitespace() {
        assert!(matches!(
            require_text(&GenerationOutput::text("  \n\t")),
            Err(VederError::EmptyResponse)
        ));
        assert!(matches!(
            require_text(&GenerationOutput::default()),
            Err(VederError::EmptyResponse)
        ));
        assert_eq!(require_text(&GenerationOutput::text("{}")).unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_report_request_uses_report_settings() {
        let client = Arc::new(FakeGenerativeClient::always_text(r#"{"tokenName":"Aave"}"#));
        let engine = ResearchEngine::new(client.clone(), Config::default());
        engine.generate_report("aave", Language::En).await.unwrap();

        let request = &client.requests()[0];
        assert_eq!(request.temperature, 0.0);
        assert!(request.search_grounding);
        assert!(request.system_instruction.is_some());
        assert!(request.prompt.contains("\"aave\""));
    }
}
