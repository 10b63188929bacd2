use actix_web::http::header;
use actix_web::HttpResponse;
use csv::WriterBuilder;

use crate::error::Error;

use super::Table;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Header row followed by every row of the table, `TOTAL` included.
pub fn write_csv(table: &Table) -> Result<Vec<u8>, Error> {
    let mut writer = WriterBuilder::new().from_writer(vec![]);

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|err| Error::IoError(err.into_error()))
}

/// A download response named after the campaign.
pub fn attachment(content_type: &str, name: &str, suffix: &str, bytes: Vec<u8>) -> HttpResponse {
    let stem: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();

    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}_{}\"", stem, suffix),
        ))
        .body(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_only_when_needed() {
        let table = Table {
            title: None,
            headers: vec!["Name".into(), "Views".into()],
            rows: vec![
                vec!["Ana, Jr.".into(), "15,000".into()],
                vec!["Bo".into(), "10".into()],
                vec!["TOTAL".into(), "15,010".into()],
            ],
        };

        let csv = String::from_utf8(write_csv(&table).unwrap()).unwrap();

        assert_eq!(
            csv,
            "Name,Views\n\"Ana, Jr.\",\"15,000\"\nBo,10\nTOTAL,\"15,010\"\n"
        );
    }

    #[test]
    fn attachment_names_are_sanitized() {
        let response = attachment(CSV_CONTENT_TYPE, "Diwali \"Launch\"", "report.csv", vec![]);

        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"Diwali__Launch__report.csv\""
        );
    }
}
