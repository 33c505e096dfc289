//! Pattern-based fact extraction

use crate::patterns::{self, BillingRules, RateRules};
use crate::text::{context, truncate_chars, TextCleaner};
use crate::{ExtractorConfig, ExtractorError};
use taxa_domain::{RawFact, SourceType};
use tracing::{debug, info};

/// One fetched page or PDF text, ready for extraction
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Municipality the document belongs to
    pub municipality: String,
    /// Plain text of the document
    pub text: String,
    /// Where the document was fetched from
    pub source_url: String,
    /// Kind of document
    pub source_type: SourceType,
}

impl Document {
    /// Create a document, inferring the source type from the URL
    pub fn new(
        municipality: impl Into<String>,
        text: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        let source_url = source_url.into();
        Self {
            municipality: municipality.into(),
            text: text.into(),
            source_type: SourceType::from_url(&source_url),
            source_url,
        }
    }
}

/// Turns document text into raw facts for the three target fields
///
/// Pattern tables are compiled once at construction.
pub struct FactExtractor {
    config: ExtractorConfig,
    cleaner: TextCleaner,
    food_control: RateRules,
    building_permit: RateRules,
    billing: Vec<BillingRules>,
}

impl FactExtractor {
    /// Create an extractor, compiling the built-in and configured patterns
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        let cleaner = TextCleaner::new().map_err(|e| ExtractorError::Pattern {
            pattern: "text cleaner".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            food_control: patterns::food_control_rules(&config.extra_food_control_patterns)?,
            building_permit: patterns::building_permit_rules(
                &config.extra_building_permit_patterns,
            )?,
            billing: patterns::billing_rules()?,
            cleaner,
            config,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract up to one fact per field from a document
    pub fn extract(&self, document: &Document) -> Vec<RawFact> {
        if document.text.trim().is_empty() {
            return Vec::new();
        }

        let cleaned = self.cleaner.clean(&document.text);
        let text = truncate_chars(&cleaned, self.config.max_text_length);
        if text.len() < cleaned.len() {
            debug!(
                "Truncated text from {} to {} chars for {}",
                cleaned.chars().count(),
                self.config.max_text_length,
                document.source_url
            );
        }

        let mut facts = Vec::new();

        if let Some((amount, confidence)) = self.extract_rate(&self.food_control, text) {
            info!(
                "Found food control hourly rate: {} kr/timme (confidence: {:.2}) in {}",
                amount, confidence, document.source_url
            );
            facts.push(self.fact(document, &self.food_control, amount, confidence));
        }

        if let Some((model, confidence)) = self.extract_billing(text) {
            info!(
                "Found food control billing model: {} (confidence: {:.2}) in {}",
                model, confidence, document.source_url
            );
            facts.push(RawFact::new(
                document.municipality.clone(),
                taxa_domain::FieldName::FoodControlBilling,
                model.as_str(),
                confidence,
                document.source_url.clone(),
                document.source_type,
            ));
        }

        if let Some((amount, confidence)) = self.extract_rate(&self.building_permit, text) {
            info!(
                "Found building permit hourly rate: {} kr/timme (confidence: {:.2}) in {}",
                amount, confidence, document.source_url
            );
            facts.push(self.fact(document, &self.building_permit, amount, confidence));
        }

        debug!(
            "Extracted {}/{} fields for {} from {}",
            facts.len(),
            taxa_domain::FieldName::COUNT,
            document.municipality,
            document.source_url
        );

        facts
    }

    /// Extract facts from several documents, in order
    pub fn extract_all(&self, documents: &[Document]) -> Vec<RawFact> {
        documents.iter().flat_map(|d| self.extract(d)).collect()
    }

    fn fact(&self, document: &Document, rules: &RateRules, amount: i64, confidence: f64) -> RawFact {
        RawFact::new(
            document.municipality.clone(),
            rules.field,
            amount,
            confidence,
            document.source_url.clone(),
            document.source_type,
        )
    }

    /// First plausible amount, in pattern order, whose context names the topic
    fn extract_rate(&self, rules: &RateRules, text: &str) -> Option<(i64, f64)> {
        for pattern in &rules.patterns {
            for caps in pattern.regex.captures_iter(text) {
                let (Some(whole), Some(group)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let Some(amount) = parse_amount(group.as_str()) else {
                    continue;
                };
                if !self.config.is_plausible(amount) {
                    continue;
                }

                let ctx = context(text, whole.start(), whole.end(), self.config.context_window);
                if !rules.context.iter().any(|r| r.is_match(ctx)) {
                    continue;
                }

                let lower = ctx.to_lowercase();
                let mut confidence = 0.5 + pattern.bonus;
                confidence += 0.1 * rules.keywords.iter().filter(|k| lower.contains(*k)).count() as f64;
                if self.config.is_typical(amount) {
                    confidence += 0.1;
                }

                return Some((amount, f64::min(confidence, 1.0)));
            }
        }
        None
    }

    /// First billing pattern that matches, förskott patterns first
    fn extract_billing(&self, text: &str) -> Option<(taxa_domain::BillingModel, f64)> {
        for rules in &self.billing {
            for pattern in &rules.patterns {
                let Some(found) = pattern.regex.find(text) else {
                    continue;
                };

                let ctx = context(
                    text,
                    found.start(),
                    found.end(),
                    self.config.billing_context_window,
                )
                .to_lowercase();

                let mut confidence = 0.6 + pattern.bonus;
                if ctx.contains(rules.model.as_str()) {
                    confidence += 0.1;
                }
                if ctx.contains("avgift") || ctx.contains("debitering") {
                    confidence += 0.1;
                }

                return Some((rules.model, f64::min(confidence, 1.0)));
            }
        }
        None
    }
}

/// Parse a captured amount, dropping the thousands separator
fn parse_amount(captured: &str) -> Option<i64> {
    let digits: String = captured.chars().filter(|c| !c.is_whitespace()).collect();
    digits.parse().ok()
}
