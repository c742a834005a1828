use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::TasdeedError;

const SUBTYPE_COLUMN: &str = "SUBTYPE";
const ACCOUNT_COLUMN: &str = "ACCOUNTNO";

/// Accounts of one customer subtype, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBatch {
    pub subtype: String,
    pub accounts: Vec<String>,
}

/// Read an account list from `.xlsx`/`.xls`/`.ods` (first sheet) or `.csv`.
///
/// The file needs `SUBTYPE` and `ACCOUNTNO` columns. With `subtype` set, only
/// rows of that subtype (case-insensitive) are kept; without it, the file
/// must hold exactly one subtype.
pub fn load_accounts(path: &Path, subtype: Option<&str>) -> Result<AccountBatch, TasdeedError> {
    if !path.exists() {
        return Err(TasdeedError::NotFound(path.to_path_buf()));
    }

    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    let rows = if is_csv {
        read_csv_table(path)?
    } else {
        read_sheet_table(path)?
    };

    select_accounts(&rows, subtype)
}

/// Pick the accounts out of a table whose first row is the header.
fn select_accounts(rows: &[Vec<String>], subtype: Option<&str>) -> Result<AccountBatch, TasdeedError> {
    let header = rows
        .first()
        .ok_or_else(|| TasdeedError::AccountList("file is empty".into()))?;
    let subtype_col = column(header, SUBTYPE_COLUMN)?;
    let account_col = column(header, ACCOUNT_COLUMN)?;

    let subtype = match subtype {
        Some(s) => s.trim().to_uppercase(),
        None => {
            let mut found: Vec<String> = Vec::new();
            for row in &rows[1..] {
                let value = cell(row, subtype_col).to_uppercase();
                if !value.is_empty() && !found.contains(&value) {
                    found.push(value);
                }
            }
            match found.len() {
                1 => found.remove(0),
                0 => return Err(TasdeedError::AccountList("no SUBTYPE values found".into())),
                _ => {
                    return Err(TasdeedError::AccountList(format!(
                        "only one SUBTYPE should exist in the file, found {}",
                        found.join(", ")
                    )))
                }
            }
        }
    };

    let accounts: Vec<String> = rows[1..]
        .iter()
        .filter(|row| cell(row.as_slice(), subtype_col).to_uppercase() == subtype)
        .map(|row| cell(row, account_col))
        .filter(|account| !account.is_empty())
        .collect();

    if accounts.is_empty() {
        return Err(TasdeedError::AccountList(format!(
            "no accounts found for subtype {}",
            subtype
        )));
    }

    log::info!("loaded {} account(s) of subtype {}", accounts.len(), subtype);
    Ok(AccountBatch { subtype, accounts })
}

fn cell(row: &[String], col: usize) -> String {
    row.get(col).map(|s| s.trim().to_string()).unwrap_or_default()
}

fn column(header: &[String], name: &str) -> Result<usize, TasdeedError> {
    header
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| TasdeedError::AccountList(format!("missing {} column", name)))
}

fn read_csv_table(path: &Path) -> Result<Vec<Vec<String>>, TasdeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn read_sheet_table(path: &Path) -> Result<Vec<Vec<String>>, TasdeedError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TasdeedError::AccountList("workbook has no sheets".into()))??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_as_string).collect())
        .collect())
}

fn cell_as_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        // Account numbers come back as floats from numeric cells.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Empty => String::new(),
        _ => format!("{cell}"),
    }
}
