//! One writer per export format
//!
//! Writers are synchronous; the exporter runs each on the blocking pool.

use crate::rows::{missing_data_cells, missing_data_header, record_cells, Cell, RECORD_COLUMNS};
use crate::statistics::StatisticsDocument;
use crate::ExportError;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs;
use std::path::Path;
use taxa_domain::{AggregateStatistics, MunicipalRecord, RecordStore, RunId};
use taxa_store::SqliteStore;

/// Write the flat record file; the header row is always present
pub fn write_csv(path: &Path, records: &[MunicipalRecord]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(RECORD_COLUMNS)?;
    for record in records {
        writer.write_record(record_cells(record).iter().map(Cell::to_text))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<(), ExportError> {
    match cell {
        Cell::Text(s) => {
            sheet.write_string(row, col, s.as_str())?;
        }
        Cell::Integer(v) => {
            sheet.write_number(row, col, *v as f64)?;
        }
        Cell::Decimal(v) => {
            sheet.write_number(row, col, *v)?;
        }
        Cell::Empty => {}
    }
    Ok(())
}

fn write_header<S: AsRef<str>>(
    sheet: &mut Worksheet,
    header: &[S],
    format: &Format,
) -> Result<(), ExportError> {
    for (col, name) in header.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name.as_ref(), format)?;
    }
    Ok(())
}

/// Write the workbook: `Records`, `Summary` and `Missing Data` sheets
pub fn write_xlsx(
    path: &Path,
    records: &[MunicipalRecord],
    statistics: &AggregateStatistics,
) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Records")?;
        write_header(sheet, &RECORD_COLUMNS, &bold)?;
        for (i, record) in records.iter().enumerate() {
            for (col, cell) in record_cells(record).iter().enumerate() {
                write_cell(sheet, i as u32 + 1, col as u16, cell)?;
            }
        }
        sheet.set_column_width(0, 24)?;
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_header(sheet, &["metric", "value"], &bold)?;
        for (i, (key, value)) in statistics.key_values().iter().enumerate() {
            sheet.write_string(i as u32 + 1, 0, key.as_str())?;
            sheet.write_string(i as u32 + 1, 1, value.as_str())?;
        }
        sheet.set_column_width(0, 32)?;
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Missing Data")?;
        write_header(sheet, missing_data_header().as_slice(), &bold)?;
        let rows = records.iter().filter_map(missing_data_cells);
        for (i, cells) in rows.enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                write_cell(sheet, i as u32 + 1, col as u16, cell)?;
            }
        }
        sheet.set_column_width(0, 24)?;
    }

    workbook.save(path)?;
    Ok(())
}

/// Write a fresh relational snapshot with the run's statistics
pub fn write_sqlite(
    path: &Path,
    records: &[MunicipalRecord],
    statistics: &AggregateStatistics,
    run_id: RunId,
    timestamp: &str,
) -> Result<(), ExportError> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    let mut store = SqliteStore::new(path)?;
    store.save_records(records)?;
    store.save_statistics(run_id, timestamp, statistics)?;
    Ok(())
}

/// Write the four-section statistics document
pub fn write_statistics(
    path: &Path,
    document: &StatisticsDocument,
    pretty: bool,
) -> Result<(), ExportError> {
    let json = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    fs::write(path, json)?;
    Ok(())
}
