//! Read queries behind the `missing` and `stats` views

use crate::{SqliteStore, StoreError};
use rusqlite::{params, OptionalExtension};
use taxa_domain::{FieldCoverage, FieldName, QualityBucket, RecordQuery, RecordStore, RunId};

/// Fields a municipality is still missing
#[derive(Debug, Clone, PartialEq)]
pub struct MissingData {
    /// Municipality display name
    pub municipality: String,
    /// Missing fields in column order
    pub missing: Vec<FieldName>,
}

/// Statistics saved for one export run
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRun {
    /// Run identifier
    pub run_id: RunId,
    /// Run timestamp (`%Y%m%d_%H%M%S`)
    pub timestamp: String,
    /// Flat statistics in the order they were written
    pub values: Vec<(String, String)>,
    /// Coverage per field
    pub field_coverage: Vec<(FieldName, FieldCoverage)>,
    /// Record count and share per quality bucket
    pub quality_distribution: Vec<(QualityBucket, usize, f64)>,
}

impl StoredRun {
    /// Look up one flat statistic
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl SqliteStore {
    /// Municipalities with at least one missing field
    ///
    /// Most gaps first, then by name.
    pub fn missing_data(&self) -> Result<Vec<MissingData>, StoreError> {
        let mut rows: Vec<MissingData> = self
            .query_records(&RecordQuery::default())?
            .into_iter()
            .filter_map(|record| {
                let missing = record.missing_fields();
                (!missing.is_empty()).then(|| MissingData {
                    municipality: record.municipality,
                    missing,
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            b.missing
                .len()
                .cmp(&a.missing.len())
                .then_with(|| a.municipality.cmp(&b.municipality))
        });
        Ok(rows)
    }

    /// Statistics of the most recent run, if any was saved
    pub fn latest_run(&self) -> Result<Option<StoredRun>, StoreError> {
        let latest: Option<String> = self
            .conn
            .query_row(
                "SELECT run_id FROM export_statistics ORDER BY timestamp DESC, id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match latest {
            Some(run) => self.run_statistics(RunId::from_string(&run).map_err(StoreError::InvalidData)?),
            None => Ok(None),
        }
    }

    /// Statistics saved for a given run
    pub fn run_statistics(&self, run_id: RunId) -> Result<Option<StoredRun>, StoreError> {
        let run = run_id.to_string();

        let mut stmt = self.conn.prepare(
            "SELECT timestamp, key, value FROM export_statistics WHERE run_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![&run], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let Some(timestamp) = rows.first().map(|(ts, _, _)| ts.clone()) else {
            return Ok(None);
        };
        let values = rows.into_iter().map(|(_, k, v)| (k, v)).collect();

        let mut stmt = self.conn.prepare(
            "SELECT field_name, populated, percentage FROM field_coverage WHERE run_id = ?1",
        )?;
        let coverage_rows = stmt
            .query_map(params![&run], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut field_coverage = Vec::new();
        for (name, count, pct) in coverage_rows {
            let field = FieldName::parse(&name)
                .ok_or_else(|| StoreError::InvalidData(format!("Unknown field: {}", name)))?;
            field_coverage.push((
                field,
                FieldCoverage {
                    count: count as usize,
                    percentage: pct,
                },
            ));
        }
        field_coverage.sort_by_key(|(field, _)| *field);

        let mut stmt = self.conn.prepare(
            "SELECT bucket, count, percentage FROM quality_distribution WHERE run_id = ?1",
        )?;
        let bucket_rows = stmt
            .query_map(params![&run], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut quality_distribution = Vec::new();
        for (name, count, pct) in bucket_rows {
            let bucket = QualityBucket::parse(&name)
                .ok_or_else(|| StoreError::InvalidData(format!("Unknown bucket: {}", name)))?;
            quality_distribution.push((bucket, count as usize, pct));
        }
        quality_distribution.sort_by_key(|(bucket, _, _)| *bucket);

        Ok(Some(StoredRun {
            run_id,
            timestamp,
            values,
            field_coverage,
            quality_distribution,
        }))
    }
}
