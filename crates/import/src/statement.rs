use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use calamine::{Data, Reader, Xls, Xlsx};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use khata_core::{Money, StatementEntry};

/// Bank exports prepend an unstructured cover section; the real header is
/// somewhere inside this window.
pub const PREVIEW_ROWS: usize = 25;

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d-%b-%Y", "%d/%m/%y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Xls,
    Xlsx,
}

impl FileKind {
    pub fn from_filename(name: &str) -> Result<Self, StatementError> {
        let extension = name
            .rsplit('.')
            .next()
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "xls" => Ok(FileKind::Xls),
            "xlsx" => Ok(FileKind::Xlsx),
            _ => Err(StatementError::UnsupportedFormat(name.to_string())),
        }
    }
}

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("unsupported file format: {0} (only .xls and .xlsx statements are accepted)")]
    UnsupportedFormat(String),
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("statement workbook has no worksheet")]
    EmptyWorkbook,
    #[error("could not find the transaction header row in the first {PREVIEW_ROWS} rows")]
    HeaderNotFound,
    #[error("statement is missing the \"{0}\" column")]
    MissingColumn(&'static str),
    #[error("no valid transactions found in the statement")]
    NoRows,
}

/// Label-to-index mapping, built once per file. The bank has shuffled column
/// order between export versions, so positions are never assumed.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub value_date: usize,
    pub transaction_date: usize,
    pub ref_no: usize,
    pub description: usize,
    pub debit: usize,
    pub credit: usize,
    pub balance: usize,
}

impl ColumnMap {
    /// Builds the mapping from the label row immediately below the header.
    /// Fails fast if any required label is absent.
    pub fn from_label_row(row: &[Data]) -> Result<Self, StatementError> {
        let mut value_date = None;
        let mut transaction_date = None;
        let mut ref_no = None;
        let mut description = None;
        let mut debit = None;
        let mut credit = None;
        let mut balance = None;

        for (idx, cell) in row.iter().enumerate() {
            let text = cell_text(cell);
            if text.contains("Value Date") {
                value_date.get_or_insert(idx);
            } else if text.contains("Transaction Date") {
                transaction_date.get_or_insert(idx);
            } else if text.contains("Cheque Number") {
                ref_no.get_or_insert(idx);
            } else if text.contains("Transaction Remarks") {
                description.get_or_insert(idx);
            } else if text.contains("Withdrawal Amount") {
                debit.get_or_insert(idx);
            } else if text.contains("Deposit Amount") {
                credit.get_or_insert(idx);
            } else if text.contains("Balance") {
                balance.get_or_insert(idx);
            }
        }

        Ok(ColumnMap {
            value_date: value_date.ok_or(StatementError::MissingColumn("Value Date"))?,
            transaction_date: transaction_date
                .ok_or(StatementError::MissingColumn("Transaction Date"))?,
            ref_no: ref_no.ok_or(StatementError::MissingColumn("Cheque Number"))?,
            description: description
                .ok_or(StatementError::MissingColumn("Transaction Remarks"))?,
            debit: debit.ok_or(StatementError::MissingColumn("Withdrawal Amount"))?,
            credit: credit.ok_or(StatementError::MissingColumn("Deposit Amount"))?,
            balance: balance.ok_or(StatementError::MissingColumn("Balance"))?,
        })
    }
}

/// Why a data row was excluded from the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowProblem {
    MissingTransactionDate,
    MissingValueDate,
    EmptyDescription,
    NoAmount,
    BothAmounts,
    MissingBalance,
}

impl fmt::Display for RowProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RowProblem::MissingTransactionDate => "transaction date missing or unparseable",
            RowProblem::MissingValueDate => "value date missing or unparseable",
            RowProblem::EmptyDescription => "description empty",
            RowProblem::NoAmount => "neither withdrawal nor deposit present",
            RowProblem::BothAmounts => "both withdrawal and deposit present",
            RowProblem::MissingBalance => "balance missing or unparseable",
        };
        f.write_str(text)
    }
}

/// Per-row failure record for operator review. Row numbers are 1-based as
/// shown in the spreadsheet application.
#[derive(Debug, Clone)]
pub struct RowDiagnostic {
    pub row: usize,
    pub problems: Vec<RowProblem>,
}

impl fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: ", self.row)?;
        for (i, problem) in self.problems.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{problem}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ParsedStatement {
    pub entries: Vec<StatementEntry>,
    pub skipped: Vec<RowDiagnostic>,
}

/// Parses a raw statement file. Header location failures are fatal; row-level
/// failures are isolated into the skipped list and the import continues.
pub fn parse_statement(bytes: &[u8], kind: FileKind) -> Result<ParsedStatement, StatementError> {
    let rows = match kind {
        FileKind::Xls => {
            let mut workbook = Xls::new(Cursor::new(bytes))
                .map_err(|e| StatementError::Workbook(e.into()))?;
            first_sheet_rows(&mut workbook)?
        }
        FileKind::Xlsx => {
            let mut workbook = Xlsx::new(Cursor::new(bytes))
                .map_err(|e| StatementError::Workbook(e.into()))?;
            first_sheet_rows(&mut workbook)?
        }
    };
    parse_rows(&rows)
}

fn first_sheet_rows<RS, R>(workbook: &mut R) -> Result<Vec<Vec<Data>>, StatementError>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    R::Error: Into<calamine::Error>,
{
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(StatementError::EmptyWorkbook)?
        .map_err(|e| StatementError::Workbook(e.into()))?;
    Ok(range.rows().map(<[Data]>::to_vec).collect())
}

/// Core of the import: locate the header, build the column map from the row
/// below it, then parse every data row beneath those two.
pub fn parse_rows(rows: &[Vec<Data>]) -> Result<ParsedStatement, StatementError> {
    let header = locate_header(rows)?;
    let label_row = rows.get(header + 1).map(Vec::as_slice).unwrap_or(&[]);
    let map = ColumnMap::from_label_row(label_row)?;

    let mut parsed = ParsedStatement::default();
    for (idx, row) in rows.iter().enumerate().skip(header + 2) {
        if is_blank(row) {
            continue;
        }
        match parse_row(row, &map) {
            Ok(entry) => parsed.entries.push(entry),
            Err(problems) => {
                let diagnostic = RowDiagnostic {
                    row: idx + 1,
                    problems,
                };
                tracing::warn!("skipping statement {diagnostic}");
                parsed.skipped.push(diagnostic);
            }
        }
    }
    Ok(parsed)
}

/// Finds the first preview row whose concatenated text contains both amount
/// column headings. Anything above it is cover-sheet noise.
pub fn locate_header(rows: &[Vec<Data>]) -> Result<usize, StatementError> {
    for (idx, row) in rows.iter().take(PREVIEW_ROWS).enumerate() {
        let text = row
            .iter()
            .map(cell_text)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if text.contains("withdrawal amount") && text.contains("deposit amount") {
            return Ok(idx);
        }
    }
    Err(StatementError::HeaderNotFound)
}

fn parse_row(row: &[Data], map: &ColumnMap) -> Result<StatementEntry, Vec<RowProblem>> {
    let transaction_date = parse_date_cell(cell(row, map.transaction_date));
    let value_date = parse_date_cell(cell(row, map.value_date));
    let description = cell_text(cell(row, map.description));
    let ref_no = cell_text(cell(row, map.ref_no));
    let debit = parse_amount_cell(cell(row, map.debit));
    let credit = parse_amount_cell(cell(row, map.credit));
    let balance = parse_amount_cell(cell(row, map.balance));

    let mut problems = Vec::new();
    if transaction_date.is_none() {
        problems.push(RowProblem::MissingTransactionDate);
    }
    if value_date.is_none() {
        problems.push(RowProblem::MissingValueDate);
    }
    if description.is_empty() {
        problems.push(RowProblem::EmptyDescription);
    }
    match (debit, credit) {
        (None, None) => problems.push(RowProblem::NoAmount),
        (Some(_), Some(_)) => problems.push(RowProblem::BothAmounts),
        _ => {}
    }
    if balance.is_none() {
        problems.push(RowProblem::MissingBalance);
    }
    if !problems.is_empty() {
        return Err(problems);
    }

    // All unwraps are guarded by the checks above.
    Ok(StatementEntry {
        id: None,
        transaction_date: transaction_date.unwrap(),
        value_date: value_date.unwrap(),
        description,
        ref_no,
        debit,
        credit,
        balance: balance.unwrap(),
        reconciled: false,
        matched_txn: None,
    })
}

fn cell(row: &[Data], idx: usize) -> &Data {
    row.get(idx).unwrap_or(&Data::Empty)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn parse_date_cell(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|dt| dt.date()),
        Data::String(s) => parse_date_text(s),
        _ => None,
    }
}

fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn parse_amount_cell(cell: &Data) -> Option<Money> {
    match cell {
        Data::Float(f) => {
            let dec = Decimal::try_from(*f).ok()?;
            nonzero(dec)
        }
        Data::Int(i) => nonzero(Decimal::from(*i)),
        Data::String(s) => parse_amount_text(s),
        _ => None,
    }
}

/// A cell that is empty, "-", or exactly zero means "no transaction in this
/// column", never a zero-value transaction. Currency symbols and thousands
/// separators are stripped before decimal parsing.
pub fn parse_amount_text(raw: &str) -> Option<Money> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        return None;
    }
    let cleaned = raw.replace("Rs.", "").replace(['₹', ',', ' '], "");
    let dec = Decimal::from_str(&cleaned).ok()?;
    nonzero(dec)
}

fn nonzero(dec: Decimal) -> Option<Money> {
    if dec.is_zero() {
        None
    } else {
        Some(Money::from_decimal(dec))
    }
}

fn is_blank(row: &[Data]) -> bool {
    row.iter().all(|c| cell_text(c).is_empty())
}
