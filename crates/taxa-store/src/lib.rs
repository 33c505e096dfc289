//! Taxa Storage Layer
//!
//! Implements the RecordStore trait on SQLite: the relational snapshot of an
//! export run.
//!
//! # Tables
//!
//! - `records`: one row per municipality, in export column order
//! - `evidence`: confidence and source per populated field, so a snapshot
//!   reads back into the exact records that were written
//! - `export_statistics`: flat key/value statistics per run
//! - `field_coverage`, `quality_distribution`: per-run breakdowns for
//!   dashboards
//!
//! # Examples
//!
//! ```no_run
//! use taxa_domain::{MunicipalRecord, RecordStore};
//! use taxa_store::SqliteStore;
//!
//! let mut store = SqliteStore::new("taxa.db").unwrap();
//! store.save_records(&[MunicipalRecord::new("Ale")]).unwrap();
//! assert!(store.get_record("ale").unwrap().is_some());
//! ```

#![warn(missing_docs)]

mod reports;

pub use reports::{MissingData, StoredRun};

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use taxa_domain::{
    percentage, AggregateStatistics, BillingModel, Evidence, FieldName, MunicipalRecord,
    MunicipalityKey, QualityBucket, QualityFlag, RecordQuery, RecordStatus, RecordStore, RunId,
    SourceType,
};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A list column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

const RECORD_COLUMNS: &str = "name_key, municipality, timtaxa_livsmedel, timtaxa_livsmedel_flag, \
     debitering_livsmedel, debitering_livsmedel_original, timtaxa_bygglov, timtaxa_bygglov_flag, \
     completeness_score, data_quality_score, status, source_urls, validation_warnings";

/// SQLite-based implementation of RecordStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a snapshot at the given path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    /// Lookup key for a municipality name, shared with deduplication
    fn name_key(municipality: &str) -> String {
        MunicipalityKey::from_name(municipality).to_string()
    }

    /// Map a text column through a parser, failing the row on unknown values
    fn parse_column<T>(
        row: &Row<'_>,
        idx: usize,
        parse: fn(&str) -> Option<T>,
    ) -> rusqlite::Result<Option<T>> {
        let Some(text) = row.get::<_, Option<String>>(idx)? else {
            return Ok(None);
        };
        parse(&text).map(Some).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                Type::Text,
                Box::new(StoreError::InvalidData(format!("Unknown value: {}", text))),
            )
        })
    }

    fn json_column<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
        let text: String = row.get(idx)?;
        serde_json::from_str(&text)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    /// Read a `records` row selected with [`RECORD_COLUMNS`]
    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<(String, MunicipalRecord)> {
        let status = Self::parse_column(row, 10, RecordStatus::parse)?.ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                10,
                Type::Null,
                Box::new(StoreError::InvalidData("missing status".to_string())),
            )
        })?;
        let source_urls: BTreeSet<String> = Self::json_column(row, 11)?;
        let validation_warnings: Vec<String> = Self::json_column(row, 12)?;

        let record = MunicipalRecord {
            municipality: row.get(1)?,
            food_control_rate: row.get(2)?,
            food_control_rate_flag: Self::parse_column(row, 3, QualityFlag::parse)?,
            billing_model: Self::parse_column(row, 4, BillingModel::parse)?,
            billing_model_original: row.get(5)?,
            building_permit_rate: row.get(6)?,
            building_permit_rate_flag: Self::parse_column(row, 7, QualityFlag::parse)?,
            completeness_score: row.get(8)?,
            data_quality_score: row.get(9)?,
            status,
            source_urls,
            validation_warnings,
            evidence: BTreeMap::new(),
        };

        Ok((row.get(0)?, record))
    }

    fn load_evidence(&self, name_key: &str) -> Result<BTreeMap<FieldName, Evidence>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT field_name, confidence, source_type, source_url
             FROM evidence WHERE name_key = ?1",
        )?;

        let evidence = stmt
            .query_map(params![name_key], |row| {
                let field = Self::parse_column(row, 0, FieldName::parse)?;
                let source_type = Self::parse_column(row, 2, SourceType::parse)?;
                Ok((field, row.get::<_, f64>(1)?, source_type, row.get::<_, String>(3)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut map = BTreeMap::new();
        for (field, confidence, source_type, url) in evidence {
            let (Some(field), Some(source_type)) = (field, source_type) else {
                return Err(StoreError::InvalidData(format!(
                    "Incomplete evidence row for {}",
                    name_key
                )));
            };
            map.insert(field, Evidence::new(confidence, source_type, url));
        }
        Ok(map)
    }

    fn with_evidence(
        &self,
        rows: Vec<(String, MunicipalRecord)>,
    ) -> Result<Vec<MunicipalRecord>, StoreError> {
        rows.into_iter()
            .map(|(key, mut record)| {
                record.evidence = self.load_evidence(&key)?;
                Ok(record)
            })
            .collect()
    }

    /// Number of records in the snapshot
    pub fn count_records(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl RecordStore for SqliteStore {
    type Error = StoreError;

    fn save_records(&mut self, records: &[MunicipalRecord]) -> Result<usize, Self::Error> {
        let tx = self.conn.transaction()?;

        for record in records {
            let key = Self::name_key(&record.municipality);
            tx.execute("DELETE FROM evidence WHERE name_key = ?1", params![&key])?;
            tx.execute("DELETE FROM records WHERE name_key = ?1", params![&key])?;

            tx.execute(
                "INSERT INTO records (name_key, municipality, timtaxa_livsmedel, timtaxa_livsmedel_flag,
                     debitering_livsmedel, debitering_livsmedel_original, timtaxa_bygglov,
                     timtaxa_bygglov_flag, completeness_score, data_quality_score, status,
                     source_urls, validation_warnings)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    &key,
                    &record.municipality,
                    record.food_control_rate,
                    record.food_control_rate_flag.map(|f| f.as_str()),
                    record.billing_model.map(|m| m.as_str()),
                    &record.billing_model_original,
                    record.building_permit_rate,
                    record.building_permit_rate_flag.map(|f| f.as_str()),
                    record.completeness_score,
                    record.data_quality_score,
                    record.status.as_str(),
                    serde_json::to_string(&record.source_urls)?,
                    serde_json::to_string(&record.validation_warnings)?,
                ],
            )?;

            for (field, evidence) in &record.evidence {
                tx.execute(
                    "INSERT INTO evidence (name_key, field_name, confidence, source_type, source_url)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        &key,
                        field.as_str(),
                        evidence.confidence,
                        evidence.source_type.as_str(),
                        &evidence.source_url,
                    ],
                )?;
            }
        }

        tx.commit()?;
        debug!("Saved {} records to snapshot", records.len());
        Ok(records.len())
    }

    fn get_record(&self, municipality: &str) -> Result<Option<MunicipalRecord>, Self::Error> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM records WHERE name_key = ?1", RECORD_COLUMNS),
                params![Self::name_key(municipality)],
                Self::row_to_record,
            )
            .optional()?;

        match row {
            Some(row) => Ok(self.with_evidence(vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn query_records(&self, query: &RecordQuery) -> Result<Vec<MunicipalRecord>, Self::Error> {
        let mut sql = format!("SELECT {} FROM records WHERE 1=1", RECORD_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(needle) = &query.name_contains {
            sql.push_str(" AND instr(name_key, ?) > 0");
            params.push(Box::new(needle.trim().to_lowercase()));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            params.push(Box::new(status.as_str()));
        }

        if let Some(min_quality) = query.min_quality {
            sql.push_str(" AND data_quality_score >= ?");
            params.push(Box::new(min_quality));
        }

        if let Some(field) = query.missing_field {
            // column names are the field identifiers
            sql.push_str(&format!(" AND {} IS NULL", field.as_str()));
        }

        sql.push_str(" ORDER BY name_key");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt
            .query_map(&param_refs[..], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        self.with_evidence(rows)
    }

    fn save_statistics(
        &mut self,
        run_id: RunId,
        timestamp: &str,
        statistics: &AggregateStatistics,
    ) -> Result<(), Self::Error> {
        let run = run_id.to_string();
        let tx = self.conn.transaction()?;

        for table in ["export_statistics", "field_coverage", "quality_distribution"] {
            tx.execute(&format!("DELETE FROM {} WHERE run_id = ?1", table), params![&run])?;
        }

        for (key, value) in statistics.key_values() {
            tx.execute(
                "INSERT INTO export_statistics (run_id, timestamp, key, value) VALUES (?1, ?2, ?3, ?4)",
                params![&run, timestamp, key, value],
            )?;
        }

        for field in FieldName::ALL {
            let coverage = statistics.coverage(field);
            tx.execute(
                "INSERT INTO field_coverage (run_id, field_name, populated, percentage)
                 VALUES (?1, ?2, ?3, ?4)",
                params![&run, field.as_str(), coverage.count as i64, coverage.percentage],
            )?;
        }

        for bucket in QualityBucket::ALL {
            let count = statistics.quality_distribution.count(bucket);
            tx.execute(
                "INSERT INTO quality_distribution (run_id, bucket, count, percentage)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    &run,
                    bucket.as_str(),
                    count as i64,
                    percentage(count, statistics.total_records),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Saved statistics for run {}", run);
        Ok(())
    }
}
