use genpdf::elements::{Break, FrameCellDecorator, Paragraph, TableLayout};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::Style;
use genpdf::{Document, Element, SimplePageDecorator};

use crate::config::PdfConfig;
use crate::error::Error;

use super::{Report, Table, INFLUENCERS};

const TITLE_SIZE: u8 = 18;
const HEADING_SIZE: u8 = 14;
const BODY_SIZE: u8 = 10;

pub fn load_fonts(config: &PdfConfig) -> Result<FontFamily<FontData>, Error> {
    genpdf::fonts::from_files(&config.font_dir, &config.font_family, None)
        .map_err(|err| Error::FailedToRenderPdf(err.to_string()))
}

#[tracing::instrument(skip(report, config), fields(campaign = %report.campaign_name))]
pub fn render_pdf(report: &Report, config: &PdfConfig) -> Result<Vec<u8>, Error> {
    let mut doc = Document::new(load_fonts(config)?);
    doc.set_title(format!("{} report", report.campaign_name));
    doc.set_font_size(BODY_SIZE);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    doc.push(
        Paragraph::new(report.campaign_name.as_str())
            .styled(Style::new().bold().with_font_size(TITLE_SIZE)),
    );
    if let Some(client) = &report.prepared_for {
        doc.push(Paragraph::new(format!("Prepared for: {}", client)));
    }
    doc.push(Paragraph::new(format!("Generated on {}", report.generated_on)));
    if let Some(message) = &report.message {
        doc.push(Break::new(1));
        doc.push(Paragraph::new(message.as_str()).styled(Style::new().italic()));
    }

    for section in &report.sections {
        doc.push(Break::new(1.5));
        doc.push(
            Paragraph::new(section.title.as_str())
                .styled(Style::new().bold().with_font_size(HEADING_SIZE)),
        );

        for table in &section.tables {
            if table.headers.is_empty() {
                continue;
            }
            if let Some(title) = &table.title {
                doc.push(Break::new(0.5));
                doc.push(Paragraph::new(title.as_str()).styled(Style::new().bold()));
            }
            doc.push(table_layout(table)?);
        }
    }

    // hidden details still leave the totals row
    if !report.sections.iter().any(|s| s.title == INFLUENCERS) {
        doc.push(Break::new(1.5));
        doc.push(
            Paragraph::new(INFLUENCERS).styled(Style::new().bold().with_font_size(HEADING_SIZE)),
        );
        doc.push(table_layout(&report.influencers)?);
    }

    let mut bytes = vec![];
    doc.render(&mut bytes)
        .map_err(|err| Error::FailedToRenderPdf(err.to_string()))?;

    Ok(bytes)
}

fn table_layout(table: &Table) -> Result<TableLayout, Error> {
    let mut layout = TableLayout::new(vec![1; table.headers.len()]);
    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let mut header = layout.row();
    for title in &table.headers {
        header.push_element(
            Paragraph::new(title.as_str())
                .styled(Style::new().bold())
                .padded(1),
        );
    }
    header
        .push()
        .map_err(|err| Error::FailedToRenderPdf(err.to_string()))?;

    for cells in &table.rows {
        let mut row = layout.row();
        for cell in cells {
            row.push_element(Paragraph::new(cell.as_str()).padded(1));
        }
        row.push()
            .map_err(|err| Error::FailedToRenderPdf(err.to_string()))?;
    }

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use super::*;
    use crate::campaign::SharingSettings;
    use crate::metrics::tests::sample;
    use crate::report::tests::campaign;
    use crate::report::{build_report, ReportQuery};

    fn fixture_fonts() -> PdfConfig {
        PdfConfig {
            font_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts")),
            font_family: "DejaVuSans".into(),
        }
    }

    fn render_with(settings: &SharingSettings) -> Vec<u8> {
        let generated_on = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let report = build_report(
            &campaign(50000.0),
            &sample(),
            settings,
            &ReportQuery::default(),
            generated_on,
        )
        .unwrap();

        render_pdf(&report, &fixture_fonts()).unwrap()
    }

    #[test]
    fn renders_the_owner_report() {
        let bytes = render_with(&SharingSettings::everything());

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn renders_totals_only_when_details_are_hidden() {
        let settings = SharingSettings {
            include_influencer_details: false,
            ..SharingSettings::everything()
        };

        let bytes = render_with(&settings);

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn renders_without_cost_columns() {
        let settings = SharingSettings {
            include_costs: false,
            ..SharingSettings::everything()
        };

        let bytes = render_with(&settings);

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn missing_fonts_are_a_render_error() {
        let config = PdfConfig {
            font_dir: PathBuf::from("./does-not-exist"),
            font_family: "Nope".into(),
        };
        let report = Report {
            campaign_name: "Empty".into(),
            prepared_for: None,
            message: None,
            generated_on: "March 05, 2024".into(),
            sections: vec![],
            influencers: Table {
                title: None,
                headers: vec!["Name".into()],
                rows: vec![vec!["TOTAL".into()]],
            },
        };

        let result = render_pdf(&report, &config);

        assert!(matches!(result, Err(Error::FailedToRenderPdf(_))));
    }
}
