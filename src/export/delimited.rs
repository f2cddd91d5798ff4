use crate::errors::AppResult;
use crate::export::model::ReportTable;

/// Semicolon separated, header row first. Spreadsheet software in the Polish
/// locale opens this without an import dialog.
pub(crate) fn to_csv(table: &ReportTable) -> AppResult<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }

    wtr.into_inner()
        .map_err(|e| crate::errors::AppError::Export(format!("CSV flush error: {e}")))
}

pub(crate) fn to_json(table: &ReportTable) -> AppResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(&table.json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn csv_uses_semicolons_and_quotes_when_needed() {
        let table = ReportTable {
            title: "t".into(),
            headers: vec!["ID", "Imię i nazwisko"],
            rows: vec![vec!["7".into(), "Jan; Kowalski".into()]],
            json: json!([]),
        };
        let out = String::from_utf8(to_csv(&table).unwrap()).unwrap();
        assert_eq!(out, "ID;Imię i nazwisko\n7;\"Jan; Kowalski\"\n");
    }
}
