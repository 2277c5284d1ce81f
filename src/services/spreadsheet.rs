//! XLSX encoding of the client source: umya-spreadsheet writes, calamine reads.

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;

use crate::domain::client::CLIENT_COLUMNS;
use crate::domain::{Client, FraudHistory, Tabular, Value};
use crate::error::{PipelineError, PipelineResult};
use crate::services::sources::CLIENTS;

const SHEET: &str = "Sheet1";

static EMPTY_CELL: Data = Data::Empty;

pub fn write_clients(path: &Path, clients: &[Client]) -> PipelineResult<()> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_by_name_mut(SHEET)
        .ok_or_else(|| PipelineError::Spreadsheet {
            path: path.to_path_buf(),
            detail: format!("missing default worksheet {}", SHEET),
        })?;

    for (col, name) in Client::columns().into_iter().enumerate() {
        sheet.get_cell_mut((col as u32 + 1, 1)).set_value_string(name);
    }

    for (row, client) in clients.iter().enumerate() {
        for (col, value) in client.cells().into_iter().enumerate() {
            let cell = sheet.get_cell_mut((col as u32 + 1, row as u32 + 2));
            match value {
                Value::Null => {}
                Value::Int(v) => {
                    cell.set_value_number(v as f64);
                }
                Value::Float(v) => {
                    cell.set_value_number(v);
                }
                other => {
                    cell.set_value_string(other.render());
                }
            }
        }
    }

    umya_spreadsheet::writer::xlsx::write(&book, path).map_err(|e| PipelineError::Spreadsheet {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Read every client row from the first worksheet. Any bad cell fails the whole source.
pub fn read_clients(path: &Path) -> PipelineResult<Vec<Client>> {
    let format_error = |detail: String| PipelineError::SourceFormat {
        name: CLIENTS,
        path: path.to_path_buf(),
        detail,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| format_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| format_error("workbook has no worksheet".to_string()))?
        .map_err(|e| format_error(e.to_string()))?;

    let mut rows = range.rows();
    let header: HashMap<String, usize> = match rows.next() {
        Some(cells) => cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| cell_text(cell).map(|name| (name, i)))
            .collect(),
        None => return Ok(Vec::new()),
    };

    let mut index = HashMap::new();
    for column in CLIENT_COLUMNS {
        let position = header
            .get(column)
            .ok_or_else(|| format_error(format!("missing column {}", column)))?;
        index.insert(column, *position);
    }

    let mut clients = Vec::new();
    for (offset, cells) in rows.enumerate() {
        let line = offset + 2;
        if cells.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let cell = |column: &str| cells.get(index[column]).unwrap_or(&EMPTY_CELL);
        let row_error = |column: &str, detail: &str| {
            format_error(format!("row {} column {}: {}", line, column, detail))
        };

        let required_text = |column: &str| -> PipelineResult<String> {
            cell_text(cell(column)).ok_or_else(|| row_error(column, "value is required"))
        };
        let required_int = |column: &str| -> PipelineResult<i64> {
            cell_int(cell(column))
                .map_err(|detail| row_error(column, &detail))?
                .ok_or_else(|| row_error(column, "value is required"))
        };

        let client = Client {
            client_id: required_text("client_id")?,
            age: narrow(required_int("age")?).map_err(|d| row_error("age", &d))?,
            sex: required_text("sexe")?
                .parse()
                .map_err(|d: String| row_error("sexe", &d))?,
            postal_code: required_text("code_postal")?,
            tenure_months: narrow(required_int("anciennete_mois")?)
                .map_err(|d| row_error("anciennete_mois", &d))?,
            product_count: narrow(required_int("nb_produits")?)
                .map_err(|d| row_error("nb_produits", &d))?,
            income_bracket: required_text("revenu_annuel_tranche")?
                .parse()
                .map_err(|d: String| row_error("revenu_annuel_tranche", &d))?,
            credit_score: cell_int(cell("score_credit"))
                .map_err(|d| row_error("score_credit", &d))?
                .map(narrow)
                .transpose()
                .map_err(|d| row_error("score_credit", &d))?,
            fraud_history: match cell_date(cell("date_derniere_fraude"))
                .map_err(|d| row_error("date_derniere_fraude", &d))?
            {
                Some(date) => FraudHistory::LastOn(date),
                None => FraudHistory::Never,
            },
        };
        clients.push(client);
    }

    Ok(clients)
}

fn narrow<T: TryFrom<i64>>(value: i64) -> Result<T, String> {
    T::try_from(value).map_err(|_| format!("{} is out of range", value))
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Int(v) => Some(v.to_string()),
        Data::Float(v) if v.fract() == 0.0 => Some(format!("{}", *v as i64)),
        Data::Float(v) => Some(v.to_string()),
        Data::Bool(v) => Some(v.to_string()),
        Data::DateTime(dt) => dt.as_datetime().map(|at| at.to_string()),
        Data::Error(_) => None,
    }
}

fn cell_int(cell: &Data) -> Result<Option<i64>, String> {
    match cell {
        Data::Empty => Ok(None),
        Data::Int(v) => Ok(Some(*v)),
        Data::Float(v) if v.fract() == 0.0 => Ok(Some(*v as i64)),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        Data::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0)
            .map(|v| Some(v as i64))
            .ok_or_else(|| format!("{:?} is not an integer", s)),
        other => Err(format!("{:?} is not an integer", other)),
    }
}

fn cell_date(cell: &Data) -> Result<Option<NaiveDate>, String> {
    match cell {
        Data::Empty => Ok(None),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|at| Some(at.date()))
            .ok_or_else(|| "invalid spreadsheet date".to_string()),
        Data::String(s) | Data::DateTimeIso(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            let date_part = s.get(..10).unwrap_or(s);
            NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map(Some)
                .map_err(|e| format!("{:?} is not a date: {}", s, e))
        }
        other => Err(format!("{:?} is not a date", other)),
    }
}
