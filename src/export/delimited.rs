use crate::error::{Result, TallyError};
use crate::fmt::amount;
use crate::reports::Totals;

use super::{summary_lines, ReportContext, ReportRow, COLUMNS};

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    wtr.into_inner()
        .map_err(|e| TallyError::Export(format!("could not flush CSV output: {}", e.error())))
}

/// Header, one line per row, a blank line, then the three total lines.
///
/// Fields containing commas, quotes or newlines are quoted. Only the total
/// lines carry the currency symbol, in their label field.
pub fn render(rows: &[ReportRow], totals: &Totals, ctx: &ReportContext) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(COLUMNS)?;
    for row in rows {
        wtr.write_record(row.fields())?;
    }
    let mut out = finish(wtr)?;

    out.push(b'\n');

    // Totals have a different field count, so they get their own writer.
    let mut wtr = csv::Writer::from_writer(out);
    for (label, value) in summary_lines(totals) {
        let label = format!("{label} ({})", ctx.currency_symbol);
        wtr.write_record([label.as_str(), amount(value).as_str()])?;
    }
    finish(wtr)
}
