//! CSV export of receipt listings
//!
//! Exports are generated client-side with a UTF-8 BOM so spreadsheet tools
//! pick up the accented Spanish headers. An empty result set is refused:
//! the caller gets an error to surface, never an empty or invalid file.
//! Excel and PDF variants are backend-rendered and fetched as blobs through
//! the ledger port instead.

use thiserror::Error;

use crate::query::ReceiptSummary;

/// UTF-8 byte-order mark expected by spreadsheet imports
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Errors raised while producing an export
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to export; no file must be produced
    #[error("No hay registros para exportar")]
    EmptyResult,

    /// CSV serialization failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writer buffer error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders a receipt listing as CSV bytes, BOM included
///
/// Row order follows the input, which in turn is server order; totals come
/// straight from the projections without recomputation.
pub fn receipts_to_csv(rows: &[ReceiptSummary]) -> Result<Vec<u8>, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::EmptyResult);
    }

    let mut buffer = Vec::from(UTF8_BOM);
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record([
            "Folio",
            "Matrícula",
            "Titular",
            "Vencimiento",
            "Total",
            "Saldo",
            "Estatus",
        ])?;

        for row in rows {
            writer.write_record([
                row.folio.as_str(),
                row.matricula.as_deref().unwrap_or(""),
                row.holder_name.as_str(),
                &row.due_on.format("%Y-%m-%d").to_string(),
                &row.total.round_to_currency().amount().to_string(),
                &row.balance.round_to_currency().amount().to_string(),
                row.status.wire_name(),
            ])?;
        }
        writer.flush()?;
    }

    Ok(buffer)
}
