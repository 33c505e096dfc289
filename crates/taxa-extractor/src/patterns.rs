//! Built-in pattern tables
//!
//! Rate patterns capture the amount in group 1. Amounts may use a Swedish
//! thousands separator ("1 350").

use crate::ExtractorError;
use regex::Regex;
use taxa_domain::{BillingModel, FieldName};

/// Amount capture shared by all rate patterns
pub(crate) const AMOUNT: &str = r"(\d{1,2}\s?\d{3}|\d{3,4})";

const FOOD_CONTROL_RATE: &[&str] = &[
    r"livsmedelskontroll.*?{AMOUNT}\s*kr.*?timme",
    r"timtaxa.*?livsmedel.*?{AMOUNT}\s*kr",
    r"livsmedel.*?timtaxa.*?{AMOUNT}\s*kr",
    r"kontroll.*?livsmedel.*?{AMOUNT}\s*kr.*?timme",
    r"offentlig.*?kontroll.*?livsmedel.*?{AMOUNT}\s*kr",
    r"avgift.*?per.*?timme.*?{AMOUNT}\s*kr",
    r"{AMOUNT}\s*kr.*?per.*?timme",
    r"handläggning.*?{AMOUNT}\s*kr.*?timme",
    r"timavgift.*?{AMOUNT}\s*kr",
    r"livsmedelskontroll.*?{AMOUNT}",
    r"livsmedelsinspektion.*?{AMOUNT}\s*kr",
    r"kontrollavgift.*?livsmedel.*?{AMOUNT}",
];

const FOOD_CONTROL_CONTEXT: &[&str] = &[
    r"livsmedelskontroll",
    r"livsmedelstillsyn",
    r"offentlig.*?kontroll.*?livsmedel",
    r"kontrollavgift.*?livsmedel",
    r"livsmedelsinspektion",
];

const BUILDING_PERMIT_RATE: &[&str] = &[
    r"bygglov.*?timtaxa.*?{AMOUNT}\s*kr",
    r"timtaxa.*?bygglov.*?{AMOUNT}\s*kr",
    r"handläggning.*?bygglov.*?{AMOUNT}\s*kr.*?timme",
    r"plan.*?och.*?bygg.*?timtaxa.*?{AMOUNT}\s*kr",
    r"byggnadsnämnd.*?timtaxa.*?{AMOUNT}\s*kr",
    r"bygglov.*?{AMOUNT}\s*kr.*?timme",
    r"handläggningsavgift.*?bygglov.*?{AMOUNT}",
    r"avgift.*?per.*?timme.*?bygglov.*?{AMOUNT}",
    r"pbl.*?timtaxa.*?{AMOUNT}\s*kr",
    r"plan.*?och.*?bygglagen.*?{AMOUNT}\s*kr.*?timme",
    r"bygglovshandläggning.*?{AMOUNT}\s*kr",
    r"timavgift.*?bygglov.*?{AMOUNT}",
    r"handläggningstid.*?bygglov.*?{AMOUNT}\s*kr",
    r"{AMOUNT}\s*kr.*?timme.*?bygglov",
    r"{AMOUNT}\s*kr.*?per.*?timme.*?plan.*?bygg",
    r"{AMOUNT}\s*kr.*?handläggning.*?bygglov",
];

const BUILDING_PERMIT_CONTEXT: &[&str] = &[
    r"bygglov",
    r"plan.*?och.*?bygg",
    r"byggnadsnämnd",
    r"\bpbl\b",
];

const FORSKOTT: &[&str] = &[
    r"livsmedel.*?förskott",
    r"förskott.*?livsmedel",
    r"livsmedelskontroll.*?förskottsbetalning",
    r"förskottsbetalning.*?livsmedelskontroll",
    r"livsmedel.*?betalas.*?i.*?förväg",
    r"livsmedel.*?faktureras.*?i.*?förskott",
    r"avgift.*?livsmedel.*?erläggas.*?i.*?förskott",
    r"livsmedelskontroll.*?debiteras.*?i.*?förskott",
];

const EFTERHAND: &[&str] = &[
    r"livsmedel.*?efterhand",
    r"efterhand.*?livsmedel",
    r"livsmedelskontroll.*?efterhandsdebitering",
    r"efterhandsdebitering.*?livsmedelskontroll",
    r"livsmedel.*?faktureras.*?i.*?efterhand",
    r"livsmedel.*?debiteras.*?efter.*?utförd",
    r"avgift.*?livsmedel.*?erläggas.*?efter",
    r"livsmedelskontroll.*?betalas.*?efter.*?kontroll",
];

/// A compiled pattern and the confidence bonus its wording earns
pub(crate) struct ScoredPattern {
    pub(crate) regex: Regex,
    pub(crate) bonus: f64,
}

/// Patterns, topic checks and keyword bonuses for one rate field
pub(crate) struct RateRules {
    pub(crate) field: FieldName,
    pub(crate) patterns: Vec<ScoredPattern>,
    pub(crate) context: Vec<Regex>,
    pub(crate) keywords: &'static [&'static str],
}

/// Patterns for one billing model
pub(crate) struct BillingRules {
    pub(crate) model: BillingModel,
    pub(crate) patterns: Vec<ScoredPattern>,
}

/// +`exact` when the pattern names the exact topic, +`loose` for its stem
fn specificity(pattern: &str, topic: &str, stem: &str, exact: f64, loose: f64) -> f64 {
    if pattern.contains(topic) {
        exact
    } else if pattern.contains(stem) {
        loose
    } else {
        0.0
    }
}

fn compile(pattern: &str) -> Result<Regex, ExtractorError> {
    Regex::new(&format!("(?i){}", pattern)).map_err(|e| ExtractorError::Pattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

fn compile_rate(pattern: &str) -> Result<Regex, ExtractorError> {
    let regex = compile(pattern)?;
    // group 0 is the whole match
    if regex.captures_len() < 2 {
        return Err(ExtractorError::Pattern {
            pattern: pattern.to_string(),
            reason: "rate patterns need a capture group for the amount".to_string(),
        });
    }
    Ok(regex)
}

fn rate_rules(
    field: FieldName,
    builtin: &[&str],
    extra: &[String],
    context: &[&str],
    topic: (&str, &str),
    keywords: &'static [&'static str],
) -> Result<RateRules, ExtractorError> {
    let sources = builtin
        .iter()
        .map(|p| p.replace("{AMOUNT}", AMOUNT))
        .chain(extra.iter().cloned());

    let mut patterns = Vec::new();
    for source in sources {
        patterns.push(ScoredPattern {
            regex: compile_rate(&source)?,
            bonus: specificity(&source.to_lowercase(), topic.0, topic.1, 0.3, 0.2),
        });
    }

    Ok(RateRules {
        field,
        patterns,
        context: context.iter().map(|p| compile(p)).collect::<Result<_, _>>()?,
        keywords,
    })
}

pub(crate) fn food_control_rules(extra: &[String]) -> Result<RateRules, ExtractorError> {
    rate_rules(
        FieldName::FoodControlRate,
        FOOD_CONTROL_RATE,
        extra,
        FOOD_CONTROL_CONTEXT,
        ("livsmedelskontroll", "livsmedel"),
        &["timme", "avgift"],
    )
}

pub(crate) fn building_permit_rules(extra: &[String]) -> Result<RateRules, ExtractorError> {
    rate_rules(
        FieldName::BuildingPermitRate,
        BUILDING_PERMIT_RATE,
        extra,
        BUILDING_PERMIT_CONTEXT,
        ("bygglov", "bygg"),
        &["timme", "handläggning", "pbl"],
    )
}

/// Billing rules in match order: förskott before efterhand
pub(crate) fn billing_rules() -> Result<Vec<BillingRules>, ExtractorError> {
    [
        (BillingModel::Forskott, FORSKOTT),
        (BillingModel::Efterhand, EFTERHAND),
    ]
    .into_iter()
    .map(|(model, sources)| {
        let patterns = sources
            .iter()
            .map(|p| {
                Ok(ScoredPattern {
                    regex: compile(p)?,
                    bonus: specificity(p, "livsmedelskontroll", "livsmedel", 0.2, 0.1),
                })
            })
            .collect::<Result<Vec<_>, ExtractorError>>()?;
        Ok(BillingRules { model, patterns })
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_compile() {
        let food = food_control_rules(&[]).unwrap();
        let building = building_permit_rules(&[]).unwrap();
        let billing = billing_rules().unwrap();

        assert_eq!(food.patterns.len(), FOOD_CONTROL_RATE.len());
        assert_eq!(building.patterns.len(), BUILDING_PERMIT_RATE.len());
        assert_eq!(billing[0].model, BillingModel::Forskott);
        assert_eq!(billing[1].model, BillingModel::Efterhand);
    }

    #[test]
    fn test_specificity_bonus() {
        let food = food_control_rules(&[]).unwrap();
        // livsmedelskontroll.*? ...
        assert_eq!(food.patterns[0].bonus, 0.3);
        // timtaxa.*?livsmedel ...
        assert_eq!(food.patterns[1].bonus, 0.2);
        // avgift.*?per.*?timme ...
        assert_eq!(food.patterns[5].bonus, 0.0);
    }

    #[test]
    fn test_extra_pattern_without_group_is_refused() {
        let err = food_control_rules(&["timtaxa \\d+ kr".to_string()]);
        assert!(matches!(err, Err(ExtractorError::Pattern { .. })));
    }

    #[test]
    fn test_extra_pattern_that_does_not_compile() {
        let err = building_permit_rules(&["bygglov (\\d+".to_string()]);
        assert!(matches!(err, Err(ExtractorError::Pattern { .. })));
    }

    #[test]
    fn test_amount_capture() {
        let regex = compile_rate(&format!("timtaxa {}", AMOUNT)).unwrap();
        let caps = regex.captures("Timtaxa 1 350").unwrap();
        assert_eq!(&caps[1], "1 350");
    }
}
