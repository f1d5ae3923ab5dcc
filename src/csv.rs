use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::{Amount, Engine, Operation, Split, UserId};

/// Errors that can occur when reading csv rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open csv file: {0}")]
    Open(csv::Error),

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized operation type '{op_type}'")]
    UnrecognizedType { line: usize, op_type: String },

    #[error("line {line}: {op_type} missing {field}")]
    MissingField {
        line: usize,
        op_type: String,
        field: &'static str,
    },

    #[error("line {line}: invalid {field} '{value}'")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
}

#[derive(Debug, Deserialize)]
struct InputRow {
    r#type: String,
    id: Option<Uuid>,
    name: Option<String>,
    amount: Option<f64>,
    payer: Option<Uuid>,
    payee: Option<Uuid>,
    group: Option<Uuid>,
    participants: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputRow {
    debtor: String,
    creditor: String,
    amount: String,
}

/// Read operations from a csv file
pub fn read_operations(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Operation, CsvError>>, CsvError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(CsvError::Open)?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            parse_row(line, row)
        }))
}

fn parse_row(line: usize, row: InputRow) -> Result<Operation, CsvError> {
    let op_type = row.r#type.as_str();
    let missing = |field: &'static str| CsvError::MissingField {
        line,
        op_type: op_type.to_string(),
        field,
    };

    match op_type {
        "user" => Ok(Operation::RegisterUser {
            id: row.id.ok_or_else(|| missing("id"))?,
            name: row.name.ok_or_else(|| missing("name"))?,
        }),
        "group" => Ok(Operation::CreateGroup {
            id: row.id.ok_or_else(|| missing("id"))?,
            name: row.name.ok_or_else(|| missing("name"))?,
            creator: row.payer.ok_or_else(|| missing("payer"))?,
        }),
        "member" => Ok(Operation::AddMember {
            user: row.payer.ok_or_else(|| missing("payer"))?,
            group: row.group.ok_or_else(|| missing("group"))?,
        }),
        "equal" | "exact" | "percent" | "shares" => {
            let id = row.id.ok_or_else(|| missing("id"))?;
            let total = to_amount(line, "amount", row.amount.ok_or_else(|| missing("amount"))?)?;
            let payer = row.payer.ok_or_else(|| missing("payer"))?;
            let participants = row.participants.unwrap_or_default();

            let split = match op_type {
                "equal" => Split::equal(total, parse_ids(line, &participants)?),
                "exact" => {
                    let amounts = parse_pairs::<f64>(line, &participants)?
                        .into_iter()
                        .map(|(id, amt)| to_amount(line, "participants", amt).map(|amt| (id, amt)))
                        .collect::<Result<_, CsvError>>()?;
                    Split::exact(total, amounts)
                }
                "percent" => Split::percentage(total, parse_pairs(line, &participants)?),
                _ => Split::shares(total, parse_pairs(line, &participants)?),
            };

            Ok(Operation::Expense {
                id,
                payer,
                group: row.group,
                split,
            })
        }
        "settle" => Ok(Operation::Settlement {
            id: row.id.ok_or_else(|| missing("id"))?,
            amount: to_amount(line, "amount", row.amount.ok_or_else(|| missing("amount"))?)?,
            payer: row.payer.ok_or_else(|| missing("payer"))?,
            payee: row.payee.ok_or_else(|| missing("payee"))?,
        }),
        other => Err(CsvError::UnrecognizedType {
            line,
            op_type: other.to_string(),
        }),
    }
}

/// Convert a parsed float, rejecting NaN, infinities and values beyond the cents range
fn to_amount(line: usize, field: &'static str, value: f64) -> Result<Amount, CsvError> {
    Amount::from_float(value).ok_or_else(|| CsvError::InvalidField {
        line,
        field,
        value: value.to_string(),
    })
}

/// Parse `id;id;...`
fn parse_ids(line: usize, field: &str) -> Result<Vec<UserId>, CsvError> {
    field
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            Uuid::parse_str(part).map_err(|_| CsvError::InvalidField {
                line,
                field: "participants",
                value: part.to_string(),
            })
        })
        .collect()
}

/// Parse `id:value;id:value;...`
fn parse_pairs<T: FromStr>(line: usize, field: &str) -> Result<Vec<(UserId, T)>, CsvError> {
    field
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| -> Result<(UserId, T), CsvError> {
            let invalid = || CsvError::InvalidField {
                line,
                field: "participants",
                value: part.to_string(),
            };
            let (id, value) = part.split_once(':').ok_or_else(invalid)?;
            let id = Uuid::parse_str(id.trim()).map_err(|_| invalid())?;
            let value = value.trim().parse::<T>().map_err(|_| invalid())?;
            Ok((id, value))
        })
        .collect()
}

/// Write every outstanding debt in csv format, sorted by debtor then creditor name
pub fn write_balances(engine: &Engine, writer: impl io::Write) -> Result<(), csv::Error> {
    let name = |id: UserId| {
        engine
            .users()
            .get(id)
            .map(|user| user.name.clone())
            .unwrap_or_else(|_| id.to_string())
    };

    let mut rows: Vec<OutputRow> = engine
        .ledger()
        .entries()
        .map(|(debtor, creditor, amount)| OutputRow {
            debtor: name(debtor),
            creditor: name(creditor),
            amount: amount.to_string(),
        })
        .collect();
    rows.sort_by(|a, b| (&a.debtor, &a.creditor).cmp(&(&b.debtor, &b.creditor)));

    let mut writer = csv::Writer::from_writer(writer);
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
