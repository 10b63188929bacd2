//! Bulk csv import and the matching export layout.

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use crate::error::Error;

use super::{Influencer, InfluencerDraft};

pub const REQUIRED_COLUMNS: [&str; 5] = ["name", "platform", "post_type", "views", "cost"];
pub const COLUMNS: [&str; 9] = [
    "name",
    "platform",
    "post_type",
    "views",
    "cost",
    "likes",
    "shares",
    "comments",
    "post_url",
];

const TEMPLATE: &str = "\
name,platform,post_type,views,cost,likes,shares,comments,post_url
Influencer1,Instagram,Post,15000,500.0,1200,45,78,https://instagram.com/post1
Influencer2,TikTok,Video,50000,750.0,3500,120,95,https://tiktok.com/video2
Influencer3,YouTube,Collaboration,25000,1200.0,850,65,42,https://youtube.com/video3
";

pub fn template() -> &'static str {
    TEMPLATE
}

/// Parses and validates every row; nothing is returned unless all rows pass.
pub fn parse_csv(text: &str) -> Result<Vec<InfluencerDraft>, Error> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(Error::InvalidCsv)?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingCsvColumns { columns: missing });
    }

    let columns = ColumnIndex::new(&headers);
    let mut drafts = vec![];
    for (index, record) in reader.records().enumerate() {
        // header is line 1
        let row = index + 2;
        let record = record.map_err(Error::InvalidCsv)?;
        let draft = columns
            .draft(&record)
            .and_then(InfluencerDraft::validated)
            .map_err(|err| match err {
                Error::InvalidCsvRow { message, .. } => Error::InvalidCsvRow { row, message },
                other => Error::InvalidCsvRow {
                    row,
                    message: other.error_message().to_string(),
                },
            })?;
        drafts.push(draft);
    }

    Ok(drafts)
}

/// Same layout as the template, so an export can be imported again.
pub fn write_export(influencers: &[Influencer]) -> Result<Vec<u8>, Error> {
    let mut writer = WriterBuilder::new().from_writer(vec![]);

    writer.write_record(COLUMNS)?;
    for influencer in influencers {
        writer.write_record([
            influencer.name.clone(),
            influencer.platform.clone(),
            influencer.post_type.clone(),
            influencer.views.to_string(),
            influencer.cost.to_string(),
            influencer.likes.to_string(),
            influencer.shares.to_string(),
            influencer.comments.to_string(),
            influencer.post_url.clone().unwrap_or_default(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|err| Error::IoError(err.into_error()))
}

struct ColumnIndex {
    positions: Vec<Option<usize>>,
}

impl ColumnIndex {
    fn new(headers: &StringRecord) -> ColumnIndex {
        let positions = COLUMNS
            .iter()
            .map(|column| headers.iter().position(|header| header == *column))
            .collect();

        ColumnIndex { positions }
    }

    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        let slot = COLUMNS.iter().position(|c| *c == column)?;
        let position = self.positions[slot]?;
        record.get(position)
    }

    fn text(&self, record: &StringRecord, column: &str) -> String {
        self.get(record, column).unwrap_or_default().to_string()
    }

    fn count(&self, record: &StringRecord, column: &'static str) -> Result<u64, Error> {
        let value = self.get(record, column).unwrap_or_default();
        if value.is_empty() {
            return Ok(0);
        }
        if let Ok(count) = value.parse::<u64>() {
            return Ok(count);
        }

        match value.parse::<f64>() {
            Ok(number) if number >= 0.0 && number.fract() == 0.0 && number <= u64::MAX as f64 => {
                Ok(number as u64)
            }
            _ => Err(invalid(column, value)),
        }
    }

    fn amount(&self, record: &StringRecord, column: &'static str) -> Result<f64, Error> {
        let value = self.get(record, column).unwrap_or_default();
        if value.is_empty() {
            return Ok(0.0);
        }

        value.parse::<f64>().map_err(|_| invalid(column, value))
    }

    fn draft(&self, record: &StringRecord) -> Result<InfluencerDraft, Error> {
        let post_url = self.text(record, "post_url");

        Ok(InfluencerDraft {
            name: self.text(record, "name"),
            platform: self.text(record, "platform"),
            post_type: self.text(record, "post_type"),
            views: self.count(record, "views")?,
            cost: self.amount(record, "cost")?,
            likes: self.count(record, "likes")?,
            shares: self.count(record, "shares")?,
            comments: self.count(record, "comments")?,
            post_url: Some(post_url),
        })
    }
}

fn invalid(column: &str, value: &str) -> Error {
    Error::InvalidCsvRow {
        row: 0,
        message: format!("{} must be a non-negative number, got {:?}", column, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_into_three_rows() {
        let drafts = parse_csv(template()).unwrap();

        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].name, "Influencer1");
        assert_eq!(drafts[0].views, 15000);
        assert_eq!(drafts[0].cost, 500.0);
        assert_eq!(drafts[0].comments, 78);
        assert_eq!(
            drafts[2].post_url.as_deref(),
            Some("https://youtube.com/video3")
        );
    }

    #[test]
    fn missing_required_columns_are_listed() {
        let result = parse_csv("name,platform,views\nAna,Instagram,10\n");

        assert_eq!(
            result.unwrap_err(),
            Error::MissingCsvColumns {
                columns: vec!["post_type".into(), "cost".into()]
            }
        );
    }

    #[test]
    fn optional_columns_default_to_zero() {
        let drafts = parse_csv("name,platform,post_type,views,cost\nAna,,Reel,1200.0,99.5\n")
            .unwrap();

        assert_eq!(drafts[0].platform, "Instagram");
        assert_eq!(drafts[0].views, 1200);
        assert_eq!(drafts[0].likes, 0);
        assert_eq!(drafts[0].post_url, None);
    }

    #[test]
    fn any_bad_row_rejects_the_whole_file() {
        let text = "name,platform,post_type,views,cost\n\
                    Ana,Instagram,Post,10,1\n\
                    Bo,Instagram,Post,lots,1\n";

        let result = parse_csv(text);

        assert!(matches!(
            result,
            Err(Error::InvalidCsvRow { row: 3, .. })
        ));
    }

    #[test]
    fn counts_beyond_int64_are_row_errors() {
        let text = "name,platform,post_type,views,cost,likes\n\
                    Ana,Instagram,Post,10,1,18446744073709551615\n";

        let result = parse_csv(text);

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidCsvRow {
                row: 2,
                message: "The given influencer value is negative or out of range".into()
            }
        );
    }

    #[test]
    fn blank_names_and_negative_costs_are_row_errors() {
        let result = parse_csv("name,platform,post_type,views,cost\n ,Instagram,Post,10,1\n");
        assert_eq!(
            result.unwrap_err(),
            Error::InvalidCsvRow {
                row: 2,
                message: "Influencer name is required".into()
            }
        );

        let result = parse_csv("name,platform,post_type,views,cost\nAna,Instagram,Post,10,-1\n");
        assert!(matches!(result, Err(Error::InvalidCsvRow { row: 2, .. })));
    }
}
