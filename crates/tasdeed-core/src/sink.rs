use crate::error::TasdeedError;
use crate::model::{DocumentResult, FieldMap, FIELD_NAMES};
use rust_xlsxwriter::{Format, Workbook};
use std::fs::{self, OpenOptions};
use std::path::Path;

/// The one row a bill contributes to the output: its first page, or a
/// placeholder for `account` when the result holds no page 0.
pub fn flatten(document: &DocumentResult, account: &str) -> FieldMap {
    document
        .first()
        .map(|page| page.fields.clone())
        .unwrap_or_else(|| FieldMap::placeholder(account))
}

/// One record per page, in page order.
pub fn page_rows(document: &DocumentResult) -> Vec<FieldMap> {
    document
        .pages
        .values()
        .map(|page| page.fields.clone())
        .collect()
}

fn row(record: &FieldMap) -> Vec<&str> {
    FIELD_NAMES
        .iter()
        .map(|name| record.value(name).unwrap_or(""))
        .collect()
}

/// Append one record to a CSV file, writing the header first when the file
/// is new or empty. Columns follow `FIELD_NAMES`; null values are empty cells.
pub fn append_csv_row(path: &Path, record: &FieldMap) -> Result<(), TasdeedError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let has_content = fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::Writer::from_writer(file);

    if !has_content {
        writer.write_record(FIELD_NAMES.iter().copied())?;
    }
    writer.write_record(row(record))?;
    writer.flush()?;

    log::debug!("appended row to {}", path.display());
    Ok(())
}

/// Render records as CSV text with a header row.
pub fn records_to_csv_string(records: &[FieldMap]) -> Result<String, TasdeedError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(FIELD_NAMES.iter().copied())?;
    for record in records {
        writer.write_record(row(record))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| TasdeedError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| TasdeedError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Read a file written by [`append_csv_row`] back into records.
/// Empty cells come back as nulls.
pub fn read_csv_rows(path: &Path) -> Result<Vec<FieldMap>, TasdeedError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut fields = FieldMap::new();
        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).unwrap_or("");
            let value = (!value.is_empty()).then(|| value.to_owned());
            fields.insert(header.as_str(), value);
        }
        records.push(fields);
    }
    Ok(records)
}

/// Write records to a new workbook: bold header row, one row per record.
pub fn write_xlsx(path: &Path, records: &[FieldMap]) -> Result<(), TasdeedError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Bills")?;

    for (col, name) in FIELD_NAMES.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }
    for (i, record) in records.iter().enumerate() {
        let row_idx = (i + 1) as u32;
        for (col, name) in FIELD_NAMES.iter().enumerate() {
            if let Some(value) = record.value(name) {
                worksheet.write_string(row_idx, col as u16, value)?;
            }
        }
    }

    workbook.save(path)?;
    log::info!("wrote {} row(s) to {}", records.len(), path.display());
    Ok(())
}
