use crate::errors::{AppError, AppResult};
use crate::export::excel_date::parse_to_excel_date;
use crate::export::model::ReportTable;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use unicode_width::UnicodeWidthStr;

fn xlsx_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(format!("XLSX: {e}"))
}

/// Title in the first row, styled header in the second, banded data below.
pub(crate) fn to_xlsx(table: &ReportTable) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let title_format = Format::new().set_bold().set_font_size(13);
    worksheet
        .write_with_format(0, 0, table.title.as_str(), &title_format)
        .map_err(xlsx_err)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_with_format(1, col as u16, *header, &header_format)
            .map_err(xlsx_err)?;
    }
    worksheet.set_freeze_panes(2, 0).map_err(xlsx_err)?;

    if table.is_empty() {
        worksheet.write(2, 0, "Brak danych").map_err(xlsx_err)?;
    }

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.width()).collect();
    let band1 = Color::RGB(0xEAF3FB);
    let band2 = Color::RGB(0xFFFFFF);

    for (i, row) in table.rows.iter().enumerate() {
        let r = (i + 2) as u32;
        let band = if i % 2 == 0 { band1 } else { band2 };

        for (col, value) in row.iter().enumerate() {
            write_cell(worksheet, r, col as u16, value, band)?;
            if let Some(w) = widths.get_mut(col) {
                *w = (*w).max(value.width());
            }
        }
    }

    for (c, w) in widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, *w as f64 + 2.0)
            .map_err(xlsx_err)?;
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}

/// Dates and numbers are written typed so the sheet can sum and sort them.
fn write_cell(ws: &mut Worksheet, row: u32, col: u16, s: &str, bg: Color) -> AppResult<()> {
    let base = Format::new()
        .set_background_color(bg)
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    if let Some((num_format, serial)) = parse_to_excel_date(s) {
        ws.write_with_format(row, col, serial, &base.set_num_format(num_format))
            .map_err(xlsx_err)?;
    } else if let Ok(num) = s.parse::<f64>() {
        ws.write_with_format(row, col, num, &base.set_align(FormatAlign::Right))
            .map_err(xlsx_err)?;
    } else {
        ws.write_with_format(row, col, s, &base).map_err(xlsx_err)?;
    }

    Ok(())
}
