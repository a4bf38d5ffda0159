mod delimited;
mod spreadsheet;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::error::{Result, TallyError};
use crate::fmt::{amount, report_date};
use crate::models::Transaction;
use crate::reports::Totals;

pub const FILENAME_PREFIX: &str = "transactions";

pub const COLUMNS: [&str; 5] = ["Date", "Type", "Category", "Description", "Amount"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Document,
    Spreadsheet,
    DelimitedText,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Document => "pdf",
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::DelimitedText => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pdf" | "document" => Ok(ExportFormat::Document),
            "xlsx" | "spreadsheet" | "excel" => Ok(ExportFormat::Spreadsheet),
            "csv" | "text" => Ok(ExportFormat::DelimitedText),
            other => Err(TallyError::Validation(format!(
                "unknown export format '{other}' (expected pdf, xlsx or csv)"
            ))),
        }
    }
}

/// Presentation details shared by all renderers.
pub struct ReportContext {
    pub title: String,
    pub subtitle: String,
    pub currency_symbol: String,
    pub generated_at: NaiveDateTime,
}

/// One transaction as it appears in every export format.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub date: String,
    pub kind: String,
    pub category: String,
    pub description: String,
    pub amount: String,
    pub amount_value: f64,
}

impl ReportRow {
    pub fn from_transaction(txn: &Transaction) -> Self {
        let description = if txn.description.trim().is_empty() {
            "-".to_string()
        } else {
            txn.description.clone()
        };
        Self {
            date: report_date(&txn.timestamp),
            kind: txn.kind.label().to_string(),
            category: txn.category.clone(),
            description,
            amount: amount(txn.amount),
            amount_value: crate::fmt::amount_f64(txn.amount),
        }
    }

    pub fn fields(&self) -> [&str; 5] {
        [
            self.date.as_str(),
            self.kind.as_str(),
            self.category.as_str(),
            self.description.as_str(),
            self.amount.as_str(),
        ]
    }
}

/// The three labeled lines every export ends with.
pub fn summary_lines(totals: &Totals) -> [(&'static str, rust_decimal::Decimal); 3] {
    [
        ("Total Income", totals.income),
        ("Total Expense", totals.expense),
        ("Net Balance", totals.net),
    ]
}

/// A rendered report ready to be handed to a save/share channel.
#[derive(Debug)]
pub struct Export {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub format: ExportFormat,
}

pub fn export_filename(format: ExportFormat, at: &NaiveDateTime) -> String {
    format!(
        "{FILENAME_PREFIX}_{}.{}",
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Render `records` and the already-computed `totals` into `format`.
///
/// The totals are taken as given so the exported figures are the same ones
/// the caller displays.
pub fn export(
    records: &[Transaction],
    totals: &Totals,
    format: ExportFormat,
    ctx: &ReportContext,
) -> Result<Export> {
    let rows: Vec<ReportRow> = records.iter().map(ReportRow::from_transaction).collect();
    let bytes = match format {
        ExportFormat::Document => render_document(&rows, totals, ctx)?,
        ExportFormat::Spreadsheet => spreadsheet::render(&rows, totals, ctx)?,
        ExportFormat::DelimitedText => delimited::render(&rows, totals, ctx)?,
    };
    tracing::debug!(rows = rows.len(), bytes = bytes.len(), format = ?format, "rendered export");
    Ok(Export {
        bytes,
        filename: export_filename(format, &ctx.generated_at),
        format,
    })
}

#[cfg(feature = "pdf")]
fn render_document(rows: &[ReportRow], totals: &Totals, ctx: &ReportContext) -> Result<Vec<u8>> {
    crate::pdf::render_transactions(rows, totals, ctx)
}

#[cfg(not(feature = "pdf"))]
fn render_document(_rows: &[ReportRow], _totals: &Totals, _ctx: &ReportContext) -> Result<Vec<u8>> {
    Err(TallyError::Export(
        "PDF export requires the 'pdf' feature; build with `cargo build --features pdf`".into(),
    ))
}

/// Write the payload into `dir` under its suggested filename.
///
/// The bytes go to a temporary file in the same directory first and are
/// renamed into place only once fully written; a failure leaves nothing behind.
pub fn write_export(export: &Export, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let dest = dir.join(&export.filename);
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&export.bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&dest)
        .map_err(|e| TallyError::Export(format!("could not save {}: {}", dest.display(), e.error)))?;
    tracing::info!(path = %dest.display(), bytes = export.bytes.len(), "wrote export");
    Ok(dest)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{parse_timestamp, TransactionKind};
    use rust_decimal::Decimal;

    pub(crate) fn scenario() -> Vec<Transaction> {
        vec![
            Transaction::new(
                TransactionKind::Income,
                Decimal::from(1000),
                "Sales",
                "Jan sale",
                parse_timestamp("2024-01-05").unwrap(),
            )
            .unwrap(),
            Transaction::new(
                TransactionKind::Expense,
                Decimal::from(200),
                "Rent",
                "",
                parse_timestamp("2024-01-10").unwrap(),
            )
            .unwrap(),
        ]
    }

    pub(crate) fn context() -> ReportContext {
        ReportContext {
            title: "Transactions Report".to_string(),
            subtitle: "All time".to_string(),
            currency_symbol: "$".to_string(),
            generated_at: parse_timestamp("2024-02-01 09:15:30").unwrap(),
        }
    }

    #[test]
    fn test_row_projection() {
        let rows: Vec<ReportRow> = scenario().iter().map(ReportRow::from_transaction).collect();
        assert_eq!(rows[0].fields(), ["05/01/2024", "INCOME", "Sales", "Jan sale", "1000.00"]);
        assert_eq!(rows[1].fields(), ["10/01/2024", "EXPENSE", "Rent", "-", "200.00"]);
        assert_eq!(rows[1].amount_value, 200.0);
    }

    #[test]
    fn test_filename_embeds_timestamp() {
        let ctx = context();
        assert_eq!(
            export_filename(ExportFormat::DelimitedText, &ctx.generated_at),
            "transactions_20240201_091530.csv"
        );
        assert_eq!(
            export_filename(ExportFormat::Spreadsheet, &ctx.generated_at),
            "transactions_20240201_091530.xlsx"
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Document);
        assert_eq!("spreadsheet".parse::<ExportFormat>().unwrap(), ExportFormat::Spreadsheet);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::DelimitedText);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_uses_given_totals() {
        let records = scenario();
        let totals = Totals::of(&records);
        let out = export(&records, &totals, ExportFormat::DelimitedText, &context()).unwrap();
        assert_eq!(out.filename, "transactions_20240201_091530.csv");
        let text = String::from_utf8(out.bytes).unwrap();
        assert!(text.contains("Net Balance ($),800.00"));
    }

    #[test]
    fn test_write_export_leaves_only_final_file() {
        let dir = tempfile::tempdir().unwrap();
        let records = scenario();
        let totals = Totals::of(&records);
        let out = export(&records, &totals, ExportFormat::DelimitedText, &context()).unwrap();
        let path = write_export(&out, dir.path()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), out.bytes);
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_export_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports").join("2024");
        let out = Export {
            bytes: b"hello".to_vec(),
            filename: "transactions_20240201_091530.csv".to_string(),
            format: ExportFormat::DelimitedText,
        };
        let path = write_export(&out, &nested).unwrap();
        assert!(path.starts_with(&nested));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_document_export_produces_pdf() {
        let records = scenario();
        let totals = Totals::of(&records);
        let out = export(&records, &totals, ExportFormat::Document, &context()).unwrap();
        assert!(out.bytes.starts_with(b"%PDF"));
        assert!(out.filename.ends_with(".pdf"));
    }
}
