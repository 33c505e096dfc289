//! Flat row shape shared by the CSV file and the workbook

use taxa_domain::{FieldName, MunicipalRecord};

/// Record columns in export order
pub const RECORD_COLUMNS: [&str; 9] = [
    "municipality",
    "timtaxa_livsmedel",
    "debitering_livsmedel",
    "debitering_livsmedel_original",
    "timtaxa_bygglov",
    "completeness_score",
    "data_quality_score",
    "status",
    "source_urls",
];

/// One typed cell of an exported row
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Text value
    Text(String),
    /// Whole number
    Integer(i64),
    /// Decimal number
    Decimal(f64),
    /// Missing value
    Empty,
}

impl Cell {
    /// Text form used in CSV; empty string for missing values
    pub fn to_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Integer(v) => v.to_string(),
            Cell::Decimal(v) => v.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

fn optional_text(value: Option<&str>) -> Cell {
    value.map_or(Cell::Empty, |s| Cell::Text(s.to_string()))
}

/// Cells of one record in [`RECORD_COLUMNS`] order
pub fn record_cells(record: &MunicipalRecord) -> Vec<Cell> {
    vec![
        Cell::Text(record.municipality.clone()),
        record.food_control_rate.map_or(Cell::Empty, Cell::Integer),
        optional_text(record.billing_model.map(|m| m.as_str())),
        optional_text(record.billing_model_original.as_deref()),
        record.building_permit_rate.map_or(Cell::Empty, Cell::Integer),
        Cell::Decimal(record.completeness_score),
        Cell::Decimal(record.data_quality_score),
        Cell::Text(record.status.as_str().to_string()),
        Cell::Text(record.joined_source_urls()),
    ]
}

/// Header of the missing-data sheet
pub fn missing_data_header() -> Vec<String> {
    let mut header = vec!["municipality".to_string()];
    header.extend(FieldName::ALL.iter().map(|f| format!("{}_missing", f)));
    header.push("missing_count".to_string());
    header
}

/// Missing-data row of a record, `None` when nothing is missing
pub fn missing_data_cells(record: &MunicipalRecord) -> Option<Vec<Cell>> {
    let missing = record.missing_fields();
    if missing.is_empty() {
        return None;
    }

    let mut cells = vec![Cell::Text(record.municipality.clone())];
    for field in FieldName::ALL {
        let flag = if missing.contains(&field) { "yes" } else { "no" };
        cells.push(Cell::Text(flag.to_string()));
    }
    cells.push(Cell::Integer(missing.len() as i64));
    Some(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxa_domain::{BillingModel, QualityFlag};

    #[test]
    fn test_record_cells_follow_column_order() {
        let mut record = MunicipalRecord::new("Ale");
        record.set_rate(FieldName::FoodControlRate, 1250, QualityFlag::Typical);
        record.set_billing(BillingModel::Efterhand, "Faktureras i efterhand");
        record.source_urls.insert("https://www.ale.se/b".to_string());
        record.source_urls.insert("https://www.ale.se/a".to_string());
        record.refresh_completeness();

        let cells = record_cells(&record);
        assert_eq!(cells.len(), RECORD_COLUMNS.len());
        assert_eq!(cells[1], Cell::Integer(1250));
        assert_eq!(cells[2].to_text(), "efterhand");
        assert_eq!(cells[3].to_text(), "Faktureras i efterhand");
        assert_eq!(cells[4], Cell::Empty);
        assert_eq!(cells[7].to_text(), "partial");
        assert_eq!(cells[8].to_text(), "https://www.ale.se/a; https://www.ale.se/b");
    }

    #[test]
    fn test_missing_data_cells() {
        let mut record = MunicipalRecord::new("Ale");
        record.set_rate(FieldName::BuildingPermitRate, 1100, QualityFlag::Typical);

        let cells = missing_data_cells(&record).unwrap();
        let text: Vec<String> = cells.iter().map(Cell::to_text).collect();
        assert_eq!(text, vec!["Ale", "yes", "yes", "no", "2"]);
        assert_eq!(missing_data_header().len(), cells.len());
    }

    #[test]
    fn test_complete_record_has_no_missing_row() {
        let mut record = MunicipalRecord::new("Ale");
        record.set_rate(FieldName::FoodControlRate, 1250, QualityFlag::Typical);
        record.set_billing(BillingModel::Forskott, "förskott");
        record.set_rate(FieldName::BuildingPermitRate, 1100, QualityFlag::Typical);
        assert!(missing_data_cells(&record).is_none());
    }
}
