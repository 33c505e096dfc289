//! Integration tests for the export stage

use std::fs;
use taxa_domain::{
    BillingModel, Evidence, FieldName, MunicipalRecord, QualityFlag, RecordQuery, RecordStore,
    RunId, SourceType,
};
use taxa_export::{ExportConfig, ExportFormat, Exporter, StatisticsDocument};
use taxa_store::SqliteStore;
use tempfile::TempDir;

fn records() -> Vec<MunicipalRecord> {
    let mut stockholm = MunicipalRecord::new("Stockholm");
    stockholm.set_rate(FieldName::FoodControlRate, 1350, QualityFlag::Typical);
    stockholm.set_billing(BillingModel::Forskott, "Förskottsbetalning");
    stockholm.set_rate(FieldName::BuildingPermitRate, 1200, QualityFlag::Typical);
    for field in FieldName::ALL {
        stockholm.evidence.insert(
            field,
            Evidence::new(0.9, SourceType::Html, "https://www.stockholm.se/taxa"),
        );
    }
    stockholm
        .source_urls
        .insert("https://www.stockholm.se/taxa".to_string());
    stockholm.refresh_completeness();
    stockholm.data_quality_score = 91.0;

    let mut ale = MunicipalRecord::new("Ale");
    ale.set_rate(FieldName::BuildingPermitRate, 950, QualityFlag::Typical);
    ale.evidence.insert(
        FieldName::BuildingPermitRate,
        Evidence::new(0.6, SourceType::Pdf, "https://www.ale.se/taxa.pdf"),
    );
    ale.source_urls.insert("https://www.ale.se/taxa.pdf".to_string());
    ale.refresh_completeness();
    ale.data_quality_score = 52.5;

    vec![ale, stockholm]
}

#[tokio::test]
async fn test_export_writes_all_formats() {
    let dir = TempDir::new().unwrap();
    let exporter = Exporter::new(ExportConfig::in_dir(dir.path()));
    let manifest = exporter.export(&records()).await;

    assert!(manifest.is_complete(), "failed: {:?}", manifest.failed());
    assert_eq!(manifest.outcomes.len(), 4);
    assert_eq!(manifest.record_count, 2);
    assert_eq!(manifest.timestamp.len(), "20250101_120000".len());

    for outcome in &manifest.outcomes {
        assert!(outcome.path.exists(), "{} missing", outcome.path.display());
        assert!(outcome
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .contains(&manifest.timestamp));
    }
}

#[tokio::test]
async fn test_csv_rows() {
    let dir = TempDir::new().unwrap();
    let exporter = Exporter::new(ExportConfig::in_dir(dir.path()));
    let manifest = exporter.export(&records()).await;

    let csv = fs::read_to_string(manifest.path(ExportFormat::Csv).unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "municipality,timtaxa_livsmedel,debitering_livsmedel,debitering_livsmedel_original,\
         timtaxa_bygglov,completeness_score,data_quality_score,status,source_urls"
    );
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("Ale,,,,950,"));
    assert!(lines[1].contains(",partial,"));
    assert!(lines[2].starts_with("Stockholm,1350,förskott,Förskottsbetalning,1200,1,91,complete,"));
}

#[tokio::test]
async fn test_snapshot_round_trips() {
    let dir = TempDir::new().unwrap();
    let exporter = Exporter::new(ExportConfig::in_dir(dir.path()));
    let records = records();
    let manifest = exporter.export(&records).await;

    let store = SqliteStore::new(manifest.path(ExportFormat::Sqlite).unwrap()).unwrap();
    let loaded = store.query_records(&RecordQuery::default()).unwrap();
    assert_eq!(loaded, records);

    let run = store.latest_run().unwrap().unwrap();
    assert_eq!(run.run_id, manifest.run_id);
    assert_eq!(run.timestamp, manifest.timestamp);
    assert_eq!(run.value("complete_records"), Some("1"));
}

#[tokio::test]
async fn test_statistics_document() {
    let dir = TempDir::new().unwrap();
    let exporter = Exporter::new(ExportConfig::in_dir(dir.path()));
    let manifest = exporter.export(&records()).await;

    let json = fs::read_to_string(manifest.path(ExportFormat::StatisticsJson).unwrap()).unwrap();
    let document: StatisticsDocument = serde_json::from_str(&json).unwrap();

    assert_eq!(document.summary.run_id, manifest.run_id.to_string());
    assert_eq!(document.summary.total_records, 2);
    assert_eq!(document.summary.completion_rate, 50.0);
    assert_eq!(document.field_coverage[&FieldName::BuildingPermitRate].count, 2);
    assert_eq!(document.field_coverage[&FieldName::FoodControlRate].percentage, 50.0);
    assert_eq!(document.value_analysis.timtaxa_bygglov.min, 950);
    assert_eq!(document.value_analysis.timtaxa_bygglov.max, 1200);
    assert_eq!(document.value_analysis.debitering_livsmedel.forskott, 1);
}

#[tokio::test]
async fn test_empty_export_is_well_formed() {
    let dir = TempDir::new().unwrap();
    let exporter = Exporter::new(ExportConfig::in_dir(dir.path()));
    let manifest = exporter.export(&[]).await;

    assert!(manifest.is_complete(), "failed: {:?}", manifest.failed());

    let csv = fs::read_to_string(manifest.path(ExportFormat::Csv).unwrap()).unwrap();
    assert_eq!(csv.lines().count(), 1);

    let json = fs::read_to_string(manifest.path(ExportFormat::StatisticsJson).unwrap()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["summary"]["total_records"], 0);
    assert_eq!(value["summary"]["completion_rate"], 0.0);
    assert_eq!(value["field_coverage"]["timtaxa_livsmedel"]["percentage"], 0.0);
}

#[tokio::test]
async fn test_one_failing_format_does_not_stop_the_rest() {
    let dir = TempDir::new().unwrap();
    let config = ExportConfig::in_dir(dir.path());
    let timestamp = "20250101_120000".to_string();

    // a directory where the CSV file should go
    fs::create_dir_all(config.path_for(ExportFormat::Csv, &timestamp)).unwrap();

    let exporter = Exporter::new(config);
    let manifest = exporter
        .export_as(&records(), RunId::new(), timestamp)
        .await;

    assert!(!manifest.is_complete());
    let failed = manifest.failed();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].format, ExportFormat::Csv);
    assert_eq!(manifest.succeeded().len(), 3);
}

#[tokio::test]
async fn test_unwritable_output_dir_fails_every_format() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "x").unwrap();

    let exporter = Exporter::new(ExportConfig::in_dir(blocker.join("out")));
    let manifest = exporter.export(&records()).await;

    assert_eq!(manifest.outcomes.len(), 4);
    assert!(manifest.succeeded().is_empty());
}

#[tokio::test]
async fn test_disabled_formats_are_skipped() {
    let dir = TempDir::new().unwrap();
    let config = ExportConfig {
        output_dir: dir.path().to_path_buf(),
        ..ExportConfig::minimal()
    };
    let manifest = Exporter::new(config).export(&records()).await;

    let formats: Vec<ExportFormat> = manifest.outcomes.iter().map(|o| o.format).collect();
    assert_eq!(formats, vec![ExportFormat::Csv, ExportFormat::StatisticsJson]);
    assert!(manifest.path(ExportFormat::Xlsx).is_none());
}
