//! End-to-end tests for the assembled pipeline

use proptest::prelude::*;
use std::fs;
use taxa_domain::{BillingModel, FieldName, RawFact, RecordStatus, RecordStore, SourceType};
use taxa_export::{ExportConfig, ExportFormat};
use taxa_extractor::Document;
use taxa_gatekeeper::RejectionKind;
use taxa_pipeline::{parse_facts, Pipeline, PipelineConfig};
use taxa_store::SqliteStore;
use tempfile::TempDir;

fn fact(municipality: &str, field: FieldName, value: impl Into<taxa_domain::FieldValue>, confidence: f64) -> RawFact {
    let url = format!(
        "https://www.{}.se/taxa",
        municipality.split_whitespace().next().unwrap_or("x").to_lowercase()
    );
    RawFact::new(municipality, field, value, confidence, url, SourceType::Html)
}

fn pipeline(dir: &TempDir) -> Pipeline {
    let config = PipelineConfig {
        export: ExportConfig::in_dir(dir.path()),
        ..PipelineConfig::default()
    };
    Pipeline::new(config).unwrap()
}

#[tokio::test]
async fn test_bounds_are_inclusive() {
    let dir = TempDir::new().unwrap();
    let facts = vec![
        fact("Ale", FieldName::FoodControlRate, 800, 0.8),
        fact("Ale", FieldName::BuildingPermitRate, 2000, 0.8),
        fact("Lund", FieldName::FoodControlRate, 799, 0.8),
        fact("Lund", FieldName::BuildingPermitRate, 2001, 0.8),
    ];

    let result = pipeline(&dir).run(&facts).await;

    assert_eq!(result.records.len(), 1);
    let ale = &result.records[0];
    assert_eq!(ale.food_control_rate, Some(800));
    assert_eq!(ale.building_permit_rate, Some(2000));

    assert_eq!(result.field_rejections.len(), 2);
    assert!(result
        .field_rejections
        .iter()
        .all(|r| r.kind == RejectionKind::OutOfRange && r.municipality == "Lund"));
    assert_eq!(result.rejections.len(), 1);
    assert_eq!(result.rejections[0].municipality, "Lund");
}

#[tokio::test]
async fn test_empty_input_produces_empty_exports() {
    let dir = TempDir::new().unwrap();
    let result = pipeline(&dir).run(&[]).await;

    assert!(result.is_empty_input());
    assert!(result.records.is_empty());
    assert_eq!(result.statistics.total_records, 0);
    assert_eq!(result.statistics.completion_rate, 0.0);
    for field in FieldName::ALL {
        assert_eq!(result.statistics.coverage(field).percentage, 0.0);
    }
    assert!(result.manifest.is_complete(), "failed: {:?}", result.manifest.failed());

    let csv_path = result.manifest.path(ExportFormat::Csv).unwrap();
    let csv = fs::read_to_string(csv_path).unwrap();
    assert_eq!(csv.lines().count(), 1);
    assert!(csv.starts_with("municipality,"));

    let stats_path = result.manifest.path(ExportFormat::StatisticsJson).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(stats_path).unwrap()).unwrap();
    assert_eq!(json["summary"]["total_records"], 0);
}

#[tokio::test]
async fn test_spellings_of_one_municipality_collapse() {
    let dir = TempDir::new().unwrap();
    let facts = vec![
        fact("Stockholm kommun", FieldName::FoodControlRate, 1350, 0.9),
        fact("Stockholm kommun", FieldName::FoodControlBilling, "förskott", 0.8),
        fact("stockholm", FieldName::BuildingPermitRate, 1200, 0.7),
    ];

    let result = pipeline(&dir).run(&facts).await;

    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];
    assert_eq!(record.municipality, "Stockholm");
    assert_eq!(record.food_control_rate, Some(1350));
    assert_eq!(record.billing_model, Some(BillingModel::Forskott));
    assert_eq!(record.building_permit_rate, Some(1200));
    assert_eq!(record.status, RecordStatus::Complete);
    assert!((record.completeness_score - 1.0).abs() < f64::EPSILON);

    assert_eq!(result.dedup.records_in, 2);
    assert_eq!(result.dedup.records_out, 1);
    assert_eq!(result.dedup.duplicates_merged, 1);
    assert_eq!(result.statistics.complete_records, 1);
}

#[tokio::test]
async fn test_billing_synonyms_and_unknown_term() {
    let dir = TempDir::new().unwrap();
    let facts = vec![
        fact("Ale", FieldName::FoodControlBilling, "förskott", 0.8),
        fact("Borås", FieldName::FoodControlBilling, "Förskottsbetalning", 0.8),
        fact("Lund", FieldName::FoodControlBilling, "unknown-term", 0.8),
        fact("Lund", FieldName::FoodControlRate, 1100, 0.8),
    ];

    let result = pipeline(&dir).run(&facts).await;

    assert_eq!(result.records.len(), 3);
    let by_name = |name: &str| {
        result
            .records
            .iter()
            .find(|r| r.municipality == name)
            .unwrap()
    };

    assert_eq!(by_name("Ale").billing_model, Some(BillingModel::Forskott));
    assert_eq!(by_name("Borås").billing_model, Some(BillingModel::Forskott));
    assert_eq!(
        by_name("Borås").billing_model_original.as_deref(),
        Some("Förskottsbetalning")
    );

    let lund = by_name("Lund");
    assert_eq!(lund.billing_model, None);
    assert_eq!(lund.food_control_rate, Some(1100));
    assert_eq!(result.field_rejections.len(), 1);
    assert_eq!(result.field_rejections[0].kind, RejectionKind::UnknownBillingModel);
}

#[tokio::test]
async fn test_out_of_range_value_leaves_partial_record() {
    let dir = TempDir::new().unwrap();
    let facts = vec![
        fact("Ale", FieldName::FoodControlRate, 50000, 0.9),
        fact("Ale", FieldName::FoodControlBilling, "efterhand", 0.9),
        fact("Ale", FieldName::BuildingPermitRate, 1100, 0.9),
    ];

    let result = pipeline(&dir).run(&facts).await;

    let ale = &result.records[0];
    assert_eq!(ale.food_control_rate, None);
    assert_eq!(ale.status, RecordStatus::Partial);
    assert!((ale.completeness_score - 2.0 / 3.0).abs() < 1e-9);
    assert!(ale
        .validation_warnings
        .iter()
        .any(|w| w.starts_with("timtaxa_livsmedel")));
    assert_eq!(result.validation.total_facts_rejected(), 1);
}

#[tokio::test]
async fn test_snapshot_matches_records() {
    let dir = TempDir::new().unwrap();
    let facts = vec![
        fact("Ale kommun", FieldName::FoodControlRate, 1250, 0.85),
        fact("Ale kommun", FieldName::BuildingPermitRate, 990, 0.6),
        fact("Malmö stad", FieldName::FoodControlBilling, "i efterhand", 0.7),
    ];

    let result = pipeline(&dir).run(&facts).await;
    let snapshot = result.manifest.path(ExportFormat::Sqlite).unwrap();
    let store = SqliteStore::new(snapshot).unwrap();

    assert_eq!(store.count_records().unwrap(), result.records.len());
    for record in &result.records {
        let stored = store.get_record(&record.municipality).unwrap().unwrap();
        assert_eq!(&stored, record);
    }

    let run = store.latest_run().unwrap().unwrap();
    assert_eq!(run.run_id, result.manifest.run_id);
}

#[tokio::test]
async fn test_run_from_documents() {
    let dir = TempDir::new().unwrap();
    let documents = vec![
        Document::new(
            "Ale kommun",
            "Taxa för livsmedelskontroll: timtaxan är 1 250 kr per timme. \
             Avgiften för livsmedelskontroll debiteras i förskott.",
            "https://www.ale.se/taxa",
        ),
        Document::new(
            "Ale kommun",
            "Plan- och bygglagen (PBL). Timtaxa för bygglov: 1 100 kr/tim.",
            "https://www.ale.se/bygglov-taxa.pdf",
        ),
    ];

    let result = pipeline(&dir).run_documents(&documents).await;

    assert!(result.input_facts >= 2);
    assert_eq!(result.records.len(), 1);
    let ale = &result.records[0];
    assert_eq!(ale.municipality, "Ale");
    assert_eq!(ale.building_permit_rate, Some(1100));
    assert!(ale.source_urls.contains("https://www.ale.se/bygglov-taxa.pdf"));
    assert!(result.summary().contains("Records out: 1"));
}

#[tokio::test]
async fn test_facts_from_json() {
    let json = r#"[
        {"municipality": "Lund", "field_name": "FIELD_1", "value": "1 150 kr",
         "confidence": 1.4, "source_url": "https://www.lund.se/taxa", "source_type": "html"},
        {"municipality": "Lund", "field_name": "timtaxa_bygglov", "value": 1080.6,
         "confidence": 0.7, "source_url": "https://www.lund.se/taxa.pdf", "source_type": "PDF"}
    ]"#;

    let facts = parse_facts(json).unwrap();
    assert_eq!(facts.len(), 2);
    assert_eq!(facts[0].field_name, FieldName::FoodControlRate);

    let dir = TempDir::new().unwrap();
    let processed = pipeline(&dir).process(&facts);
    let lund = &processed.records[0];
    assert_eq!(lund.food_control_rate, Some(1150));
    assert_eq!(lund.building_permit_rate, Some(1080));
    assert_eq!(processed.validation.confidences_clamped, 1);
    assert!(lund.evidence[&FieldName::FoodControlRate].confidence <= 1.0);
}

#[test]
fn test_malformed_fact_list() {
    assert!(parse_facts("{\"not\": \"a list\"}").is_err());
    assert!(parse_facts("[]").unwrap().is_empty());
}

#[test]
fn test_invalid_config_is_refused() {
    let mut config = PipelineConfig::default();
    config.dedup.weights.completeness = 0.9;
    assert!(Pipeline::new(config).is_err());
}

#[tokio::test]
async fn test_accented_and_plain_names_stay_separate() {
    let dir = TempDir::new().unwrap();
    let facts = vec![
        RawFact::new("Håbo kommun", FieldName::FoodControlRate, 1100, 0.9, "https://www.habo.se/taxa", SourceType::Html),
        RawFact::new("Habo kommun", FieldName::FoodControlRate, 1300, 0.9, "https://www.habokommun.se/taxa", SourceType::Html),
    ];

    let result = pipeline(&dir).run(&facts).await;

    assert_eq!(result.records.len(), 2);
    assert_eq!(result.dedup.duplicates_found, 0);
    let habo = result.records.iter().find(|r| r.municipality == "Håbo").unwrap();
    assert_eq!(habo.food_control_rate, Some(1100));
    let plain = result.records.iter().find(|r| r.municipality == "Habo").unwrap();
    assert_eq!(plain.food_control_rate, Some(1300));
}

fn fact_pool() -> Vec<RawFact> {
    vec![
        fact("Ale", FieldName::FoodControlRate, 1250, 0.9),
        fact("Ale", FieldName::FoodControlRate, 1300, 0.9),
        fact("Ale", FieldName::FoodControlRate, 50000, 0.8),
        fact("Ale", FieldName::BuildingPermitRate, "n/a", 0.7),
        fact("Ale", FieldName::FoodControlBilling, "monthly", 0.6),
        fact("Ale kommun", FieldName::FoodControlBilling, "efterhand", 0.8),
        fact("Ale kommun", FieldName::BuildingPermitRate, 1100, 0.4),
        fact("Stockholm kommun", FieldName::FoodControlRate, 1350, 0.9),
        fact("stockholm", FieldName::BuildingPermitRate, 1200, 0.7),
        fact("Stockholms stad", FieldName::FoodControlBilling, "förskott", 0.3),
        fact("Håbo", FieldName::FoodControlRate, 999, 0.5),
        fact("Habo", FieldName::FoodControlRate, 1700, 0.95),
        fact("Lund", FieldName::FoodControlRate, 799, 0.8),
        fact("test", FieldName::FoodControlRate, 1200, 0.9),
        RawFact::new("Ale", FieldName::BuildingPermitRate, 1150, 0.6, "https://fee-aggregator.com/ale", SourceType::Html),
    ]
}

fn subset_and_shuffle() -> impl Strategy<Value = (Vec<RawFact>, Vec<RawFact>)> {
    let pool = fact_pool();
    let len = pool.len();
    prop::sample::subsequence(pool, 0..=len)
        .prop_flat_map(|facts| (Just(facts.clone()), Just(facts).prop_shuffle()))
}

proptest! {
    /// Property: processing does not depend on the order facts arrive in
    #[test]
    fn test_process_is_independent_of_fact_order((facts, shuffled) in subset_and_shuffle()) {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir);

        let ordered = pipeline.process(&facts);
        let reordered = pipeline.process(&shuffled);
        prop_assert_eq!(ordered, reordered);
    }
}
