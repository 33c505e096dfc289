//! Fact and record validation logic

use crate::config::{EnumRule, FieldRule, NumericRule};
use crate::scorer::QualityScorer;
use crate::stats::ValidationStats;
use crate::{GatekeeperError, ValidationConfig};
use std::collections::BTreeMap;
use taxa_domain::{
    clean_municipality_name, BillingModel, Evidence, FieldName, FieldValue, MunicipalRecord,
    QualityFlag, RawFact, SourceType,
};
use tracing::{debug, info, warn};

/// Canonical value of a field that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedValue {
    /// Integer rate in kr/hour
    Rate(i64),
    /// Billing model
    Billing(BillingModel),
}

impl NormalizedValue {
    /// Render the value as text
    pub fn as_text(&self) -> String {
        match self {
            NormalizedValue::Rate(v) => v.to_string(),
            NormalizedValue::Billing(m) => m.as_str().to_string(),
        }
    }
}

/// A fact that passed its field rule
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedField {
    /// Field the value belongs to
    pub field: FieldName,
    /// Canonical value
    pub value: NormalizedValue,
    /// Typical-range flag (always typical for the billing model)
    pub flag: QualityFlag,
    /// Value text as supplied
    pub original: String,
    /// Confidence after clamping
    pub confidence: f64,
    /// Source of the fact
    pub source_url: String,
    /// Kind of source
    pub source_type: SourceType,
    /// Notes produced while validating
    pub warnings: Vec<String>,
}

/// Why a fact failed its field rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RejectionKind {
    /// Value could not be read as a number
    NonNumeric,
    /// Number outside the hard bounds
    OutOfRange,
    /// Text matched no billing model synonym
    UnknownBillingModel,
}

impl RejectionKind {
    /// Get the kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::NonNumeric => "non_numeric",
            RejectionKind::OutOfRange => "out_of_range",
            RejectionKind::UnknownBillingModel => "unknown_billing_model",
        }
    }
}

/// A fact that failed its field rule
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRejection {
    /// Municipality text of the fact
    pub municipality: String,
    /// Field the value was meant for
    pub field: FieldName,
    /// Reason
    pub kind: RejectionKind,
    /// Value text as supplied
    pub original: String,
    /// Source of the fact
    pub source_url: String,
    /// Notes produced while validating; the last one describes the rejection
    pub warnings: Vec<String>,
}

/// Result of validating one fact
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    /// Fact accepted
    Valid(ValidatedField),
    /// Fact rejected for its field
    Invalid(FieldRejection),
}

impl FieldOutcome {
    /// Whether the fact passed
    pub fn is_valid(&self) -> bool {
        matches!(self, FieldOutcome::Valid(_))
    }

    /// Canonical value, if the fact passed
    pub fn normalized_value(&self) -> Option<NormalizedValue> {
        match self {
            FieldOutcome::Valid(v) => Some(v.value),
            FieldOutcome::Invalid(_) => None,
        }
    }

    /// Notes produced while validating
    pub fn warnings(&self) -> &[String] {
        match self {
            FieldOutcome::Valid(v) => &v.warnings,
            FieldOutcome::Invalid(r) => &r.warnings,
        }
    }

    /// Field the fact was for
    pub fn field(&self) -> FieldName {
        match self {
            FieldOutcome::Valid(v) => v.field,
            FieldOutcome::Invalid(r) => r.field,
        }
    }
}

/// Why a whole municipality group was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordRejectionReason {
    /// Every fact failed validation
    NoValidFields,
    /// Name is empty, too short or a placeholder
    InvalidMunicipality,
}

impl RecordRejectionReason {
    /// Get the reason as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordRejectionReason::NoValidFields => "no_valid_fields",
            RecordRejectionReason::InvalidMunicipality => "invalid_municipality",
        }
    }
}

/// A municipality group that produced no record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRejection {
    /// Municipality text as supplied
    pub municipality: String,
    /// Reason
    pub reason: RecordRejectionReason,
    /// Human-readable detail
    pub detail: String,
    /// Facts in the group
    pub facts: usize,
}

/// Output of [`Gatekeeper::validate_batch`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationBatch {
    /// Records sorted by their trimmed municipality text
    pub records: Vec<MunicipalRecord>,
    /// Municipality groups that produced no record
    pub rejections: Vec<RecordRejection>,
    /// Every fact that failed its field rule
    pub field_rejections: Vec<FieldRejection>,
}

/// The Gatekeeper validates raw facts and assembles municipal records
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    config: ValidationConfig,
    scorer: QualityScorer,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        let scorer = QualityScorer::new(config.weights.clone())
            .with_low_confidence_threshold(config.low_confidence_threshold);
        Self { config, scorer }
    }

    /// Create a Gatekeeper after checking the configuration
    pub fn try_new(config: ValidationConfig) -> Result<Self, GatekeeperError> {
        config.validate().map_err(GatekeeperError::Config)?;
        Ok(Self::new(config))
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// The active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// The scorer built from the configured weights
    pub fn scorer(&self) -> &QualityScorer {
        &self.scorer
    }

    /// Validate one fact against its field rule
    ///
    /// Never fails: malformed values come back as
    /// [`FieldOutcome::Invalid`], malformed confidences are clamped with a
    /// warning.
    pub fn validate_fact(&self, fact: &RawFact) -> FieldOutcome {
        let (confidence, clamp_warning) = clamp_confidence(fact.confidence);
        let mut warnings: Vec<String> = clamp_warning.into_iter().collect();
        let original = fact.value.as_text();

        let checked = match self.config.rule(fact.field_name) {
            FieldRule::Numeric(rule) => check_numeric(fact.field_name, &fact.value, rule),
            FieldRule::Enumerated(rule) => check_enumerated(fact.field_name, &original, rule),
        };

        match checked {
            Ok((value, flag, note)) => {
                warnings.extend(note);
                FieldOutcome::Valid(ValidatedField {
                    field: fact.field_name,
                    value,
                    flag,
                    original,
                    confidence,
                    source_url: fact.source_url.clone(),
                    source_type: fact.source_type,
                    warnings,
                })
            }
            Err((kind, message)) => {
                warnings.push(message);
                FieldOutcome::Invalid(FieldRejection {
                    municipality: fact.municipality.clone(),
                    field: fact.field_name,
                    kind,
                    original,
                    source_url: fact.source_url.clone(),
                    warnings,
                })
            }
        }
    }

    /// Clean a municipality name, or explain why it is unusable
    pub fn validate_municipality(&self, raw: &str) -> Result<String, String> {
        let cleaned = clean_municipality_name(raw);
        if cleaned.chars().count() < 2 {
            return Err(format!("municipality name '{}' is too short", raw.trim()));
        }
        let lower = cleaned.to_lowercase();
        if self
            .config
            .placeholder_names
            .iter()
            .any(|p| p.trim().to_lowercase() == lower)
        {
            return Err(format!("municipality name '{}' is a placeholder", cleaned));
        }
        Ok(cleaned)
    }

    /// Validate a batch of facts and build one record per municipality
    ///
    /// Facts are grouped by their trimmed municipality text and the result
    /// does not depend on input order. Groups whose name is unusable, or where every fact fails,
    /// become [`RecordRejection`]s; the rest become records with their
    /// completeness and quality scores set.
    pub fn validate_batch(&self, facts: &[RawFact], stats: &mut ValidationStats) -> ValidationBatch {
        let mut batch = ValidationBatch::default();

        for (raw_name, group) in group_by_municipality(facts) {
            match self.validate_municipality(raw_name) {
                Ok(name) => {
                    if let Some(record) = self.build_record(raw_name, name, &group, stats, &mut batch) {
                        batch.records.push(record);
                    }
                }
                Err(detail) => {
                    warn!("Rejecting {} facts for '{}': {}", group.len(), raw_name, detail);
                    for _ in &group {
                        stats.record_skipped_fact();
                    }
                    stats.record_rejection(RecordRejectionReason::InvalidMunicipality);
                    batch.rejections.push(RecordRejection {
                        municipality: raw_name.to_string(),
                        reason: RecordRejectionReason::InvalidMunicipality,
                        detail,
                        facts: group.len(),
                    });
                }
            }
        }

        info!(
            "Validated {} facts into {} records ({} rejected groups, {} rejected facts)",
            facts.len(),
            batch.records.len(),
            batch.rejections.len(),
            batch.field_rejections.len()
        );

        batch
    }

    /// Build the record for one municipality group
    fn build_record(
        &self,
        raw_name: &str,
        name: String,
        facts: &[&RawFact],
        stats: &mut ValidationStats,
        batch: &mut ValidationBatch,
    ) -> Option<MunicipalRecord> {
        let mut record = MunicipalRecord::new(name);

        if record.municipality != raw_name {
            info!("Municipality name normalized: {} → {}", raw_name, record.municipality);
            stats.record_name_normalized();
            record.validation_warnings.push(format!(
                "municipality name normalized: {} → {}",
                raw_name, record.municipality
            ));
        }

        let mut candidates: BTreeMap<FieldName, Vec<ValidatedField>> = BTreeMap::new();
        for fact in facts {
            if fact.confidence.is_nan() || !(0.0..=1.0).contains(&fact.confidence) {
                stats.record_clamp();
            }

            let outcome = self.validate_fact(fact);
            stats.record_fact(&outcome);

            match outcome {
                FieldOutcome::Valid(field) => {
                    candidates.entry(field.field).or_default().push(field);
                }
                FieldOutcome::Invalid(rejection) => {
                    warn!(
                        "Rejected {} for {}: {}",
                        rejection.field,
                        raw_name,
                        rejection.warnings.last().map(String::as_str).unwrap_or_default()
                    );
                    record.validation_warnings.extend(
                        rejection
                            .warnings
                            .iter()
                            .map(|w| format!("{}: {}", rejection.field, w)),
                    );
                    batch.field_rejections.push(rejection);
                }
            }
        }

        for (field, mut group) in candidates {
            group.sort_by(|a, b| {
                b.confidence
                    .total_cmp(&a.confidence)
                    .then_with(|| a.source_url.cmp(&b.source_url))
                    .then_with(|| a.value.as_text().cmp(&b.value.as_text()))
            });

            let mut group = group.into_iter();
            let Some(winner) = group.next() else {
                continue;
            };

            for loser in group {
                if loser.value == winner.value {
                    record.source_urls.insert(loser.source_url);
                } else {
                    debug!(
                        "Conflict on {} for {}: kept {} ({}), dropped {} ({})",
                        field,
                        record.municipality,
                        winner.value.as_text(),
                        winner.source_url,
                        loser.value.as_text(),
                        loser.source_url
                    );
                    record.validation_warnings.push(format!(
                        "conflicting values for {}: kept {}, dropped {} from {}",
                        field,
                        winner.value.as_text(),
                        loser.value.as_text(),
                        loser.source_url
                    ));
                }
            }

            apply_field(&mut record, winner);
        }

        if record.populated_count() == 0 {
            warn!("No valid fields for '{}', record rejected", raw_name);
            stats.record_rejection(RecordRejectionReason::NoValidFields);
            batch.rejections.push(RecordRejection {
                municipality: raw_name.to_string(),
                reason: RecordRejectionReason::NoValidFields,
                detail: "no field passed validation".to_string(),
                facts: facts.len(),
            });
            return None;
        }

        self.scorer.apply(&mut record);
        self.scorer.refresh_warnings(&mut record);
        stats.record_built(&record);

        info!(
            "Record {}: {} ({}/{} fields, quality {:.1})",
            record.municipality,
            record.status,
            record.populated_count(),
            FieldName::COUNT,
            record.data_quality_score
        );

        Some(record)
    }
}

/// Group facts by trimmed municipality text
///
/// Groups come out sorted by that text and facts within a group are
/// sorted by field, source, value and confidence, so the batch does not
/// depend on the order facts arrived in.
fn group_by_municipality(facts: &[RawFact]) -> Vec<(&str, Vec<&RawFact>)> {
    let mut groups: BTreeMap<&str, Vec<&RawFact>> = BTreeMap::new();
    for fact in facts {
        groups.entry(fact.municipality.trim()).or_default().push(fact);
    }

    groups
        .into_iter()
        .map(|(name, mut group)| {
            group.sort_by(|a, b| {
                a.field_name
                    .cmp(&b.field_name)
                    .then_with(|| a.source_url.cmp(&b.source_url))
                    .then_with(|| a.value.as_text().cmp(&b.value.as_text()))
                    .then_with(|| a.confidence.total_cmp(&b.confidence))
                    .then_with(|| a.source_type.cmp(&b.source_type))
                    .then_with(|| a.municipality.cmp(&b.municipality))
            });
            (name, group)
        })
        .collect()
}

fn apply_field(record: &mut MunicipalRecord, field: ValidatedField) {
    match field.value {
        NormalizedValue::Rate(v) => record.set_rate(field.field, v, field.flag),
        NormalizedValue::Billing(model) => record.set_billing(model, field.original.clone()),
    }
    record.evidence.insert(
        field.field,
        Evidence::new(field.confidence, field.source_type, field.source_url.clone()),
    );
    record.source_urls.insert(field.source_url);
    record.validation_warnings.extend(
        field
            .warnings
            .into_iter()
            .map(|w| format!("{}: {}", field.field, w)),
    );
}

/// Clamp a confidence into [0, 1], reporting any change
fn clamp_confidence(confidence: f64) -> (f64, Option<String>) {
    if confidence.is_nan() {
        return (0.0, Some("confidence NaN clamped to 0".to_string()));
    }
    let clamped = confidence.clamp(0.0, 1.0);
    if clamped != confidence {
        (
            clamped,
            Some(format!("confidence {} clamped to {}", confidence, clamped)),
        )
    } else {
        (confidence, None)
    }
}

type Checked = Result<(NormalizedValue, QualityFlag, Option<String>), (RejectionKind, String)>;

fn check_numeric(field: FieldName, value: &FieldValue, rule: &NumericRule) -> Checked {
    let Some(amount) = coerce_integer(value) else {
        return Err((
            RejectionKind::NonNumeric,
            format!("non-numeric value '{}'", value.as_text()),
        ));
    };

    if amount < rule.min || amount > rule.max {
        return Err((
            RejectionKind::OutOfRange,
            format!("value {} outside [{}, {}]", amount, rule.min, rule.max),
        ));
    }

    let (flag, note) = if amount < rule.typical_min {
        (
            QualityFlag::Low,
            Some(format!(
                "value {} below typical range {}-{}",
                amount, rule.typical_min, rule.typical_max
            )),
        )
    } else if amount > rule.typical_max {
        (
            QualityFlag::High,
            Some(format!(
                "value {} above typical range {}-{}",
                amount, rule.typical_min, rule.typical_max
            )),
        )
    } else {
        (QualityFlag::Typical, None)
    };

    if note.is_some() {
        debug!("{} {} flagged {}", field, amount, flag.as_str());
    }

    Ok((NormalizedValue::Rate(amount), flag, note))
}

fn check_enumerated(field: FieldName, text: &str, rule: &EnumRule) -> Checked {
    match match_billing(rule, text) {
        Some(model) => {
            let note = (text.trim().to_lowercase() != model.as_str())
                .then(|| format!("billing model '{}' normalized to {}", text.trim(), model));
            Ok((NormalizedValue::Billing(model), QualityFlag::Typical, note))
        }
        None => {
            debug!("{}: no synonym matched '{}'", field, text);
            Err((
                RejectionKind::UnknownBillingModel,
                format!("unknown billing model '{}'", text.trim()),
            ))
        }
    }
}

/// Case-insensitive containment match, förskott synonyms first
pub fn match_billing(rule: &EnumRule, text: &str) -> Option<BillingModel> {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    rule.ordered()
        .into_iter()
        .find(|(_, synonyms)| {
            synonyms
                .iter()
                .any(|s| lower.contains(s.trim().to_lowercase().as_str()))
        })
        .map(|(model, _)| model)
}

/// Coerce a raw value to an integer amount
///
/// Decimals are truncated; text may carry whitespace or NBSP thousands
/// separators, a `kr` suffix and a decimal comma.
pub fn coerce_integer(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Integer(v) => Some(*v),
        FieldValue::Decimal(v) => truncate(*v),
        FieldValue::Text(s) => parse_amount(s),
    }
}

fn truncate(v: f64) -> Option<i64> {
    (v.is_finite() && v.abs() < i64::MAX as f64).then(|| v.trunc() as i64)
}

fn parse_amount(text: &str) -> Option<i64> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    let number = compact.strip_suffix(":-").unwrap_or(&compact);
    let number = number.strip_suffix("kr").unwrap_or(number);
    if number.is_empty() {
        return None;
    }
    if let Ok(v) = number.parse::<i64>() {
        return Some(v);
    }
    number.replace(',', ".").parse::<f64>().ok().and_then(truncate)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: validity is exactly the inclusive hard bound
        #[test]
        fn test_validity_matches_bounds(value in 0i64..5000) {
            let gatekeeper = Gatekeeper::default_config();
            let fact = RawFact::new(
                "Ale",
                FieldName::BuildingPermitRate,
                value,
                0.8,
                "https://www.ale.se/",
                SourceType::Html,
            );
            let outcome = gatekeeper.validate_fact(&fact);
            prop_assert_eq!(outcome.is_valid(), (800..=2000).contains(&value));
        }

        /// Property: confidence after validation is always inside [0, 1]
        #[test]
        fn test_confidence_always_clamped(confidence in proptest::num::f64::ANY) {
            let gatekeeper = Gatekeeper::default_config();
            let fact = RawFact::new(
                "Ale",
                FieldName::FoodControlRate,
                1200i64,
                confidence,
                "https://www.ale.se/",
                SourceType::Html,
            );
            if let FieldOutcome::Valid(v) = gatekeeper.validate_fact(&fact) {
                prop_assert!((0.0..=1.0).contains(&v.confidence));
            } else {
                prop_assert!(false, "rate 1200 must be valid");
            }
        }
    }
}
