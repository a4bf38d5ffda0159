use rust_xlsxwriter::{Format, Workbook};

use crate::error::Result;
use crate::fmt::amount_f64;
use crate::reports::Totals;

use super::{summary_lines, ReportContext, ReportRow, COLUMNS};

pub const SHEET_NAME: &str = "Transactions";

const COLUMN_WIDTHS: [f64; 5] = [12.0, 10.0, 22.0, 40.0, 14.0];
const AMOUNT_COL: u16 = 4;

/// One sheet: header row, data rows, a blank row, then three labeled totals.
///
/// Text columns are written as strings, amounts as numbers.
pub fn render(rows: &[ReportRow], totals: &Totals, ctx: &ReportContext) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let money = Format::new().set_num_format("0.00");
    let total_label = Format::new().set_bold();
    let total_money = Format::new().set_bold().set_num_format("0.00");

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, (title, width)) in COLUMNS.iter().zip(COLUMN_WIDTHS).enumerate() {
            let col = col as u16;
            sheet.write_string_with_format(0, col, *title, &header)?;
            sheet.set_column_width(col, width)?;
        }

        let mut r: u32 = 1;
        for row in rows {
            sheet.write_string(r, 0, &row.date)?;
            sheet.write_string(r, 1, &row.kind)?;
            sheet.write_string(r, 2, &row.category)?;
            sheet.write_string(r, 3, &row.description)?;
            sheet.write_number_with_format(r, AMOUNT_COL, row.amount_value, &money)?;
            r += 1;
        }

        // blank separator row
        r += 1;

        for (label, value) in summary_lines(totals) {
            let label = format!("{label} ({})", ctx.currency_symbol);
            sheet.write_string_with_format(r, 0, &label, &total_label)?;
            sheet.write_number_with_format(r, AMOUNT_COL, amount_f64(value), &total_money)?;
            r += 1;
        }
    }

    Ok(workbook.save_to_buffer()?)
}
