//! Tables and documents built from a campaign and its influencers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::campaign::{Campaign, SharingSettings};
use crate::error::Error;
use crate::influencer::Influencer;
use crate::metrics::{self, CampaignMetrics, InfluencerFilter, SortKey};

pub mod export;
pub mod format;
pub mod pdf;

use format::{format_cost_per_view, format_count, format_currency, format_date, format_ratio};

pub const PERFORMANCE: &str = "Campaign Performance";
pub const BREAKDOWN: &str = "Platform & Content Breakdown";
pub const INFLUENCERS: &str = "Campaign Influencers";
pub const TOTAL: &str = "TOTAL";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub sort: Option<SortKey>,
    #[serde(flatten)]
    pub filter: InfluencerFilter,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Column {
    Name,
    Platform,
    PostType,
    Views,
    Likes,
    Shares,
    Comments,
    Investment,
    Efficiency,
    PostUrl,
}

impl Column {
    pub fn title(self) -> &'static str {
        match self {
            Column::Name => "Name",
            Column::Platform => "Platform",
            Column::PostType => "Post Type",
            Column::Views => "Views",
            Column::Likes => "Likes",
            Column::Shares => "Shares",
            Column::Comments => "Comments",
            Column::Investment => "Investment (₹)",
            Column::Efficiency => "Views per ₹",
            Column::PostUrl => "Post URL",
        }
    }

    pub fn visible(settings: &SharingSettings) -> Vec<Column> {
        let mut columns = vec![Column::Name, Column::Platform, Column::PostType, Column::Views];
        if settings.include_engagement_metrics {
            columns.extend([Column::Likes, Column::Shares, Column::Comments]);
        }
        if settings.include_costs {
            columns.extend([Column::Investment, Column::Efficiency]);
        }
        if settings.include_influencer_details {
            columns.push(Column::PostUrl);
        }

        columns
    }

    fn cell(self, influencer: &Influencer) -> String {
        match self {
            Column::Name => influencer.name.clone(),
            Column::Platform => influencer.platform.clone(),
            Column::PostType => influencer.post_type.clone(),
            Column::Views => format_count(influencer.views),
            Column::Likes => format_count(influencer.likes),
            Column::Shares => format_count(influencer.shares),
            Column::Comments => format_count(influencer.comments),
            Column::Investment => format_currency(influencer.cost),
            Column::Efficiency => format_ratio(influencer.efficiency()),
            Column::PostUrl => influencer.post_url.clone().unwrap_or_default(),
        }
    }

    fn total(self, totals: &CampaignMetrics) -> String {
        match self {
            Column::Name => TOTAL.to_string(),
            Column::Platform | Column::PostType | Column::PostUrl => String::new(),
            Column::Views => format_count(totals.total_views),
            Column::Likes => format_count(totals.total_likes),
            Column::Shares => format_count(totals.total_shares),
            Column::Comments => format_count(totals.total_comments),
            Column::Investment => format_currency(totals.total_cost),
            Column::Efficiency => format_ratio(totals.efficiency()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Table {
    pub title: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn new(title: Option<&str>, headers: &[&str]) -> Table {
        Table {
            title: title.map(str::to_string),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: vec![],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub tables: Vec<Table>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub campaign_name: String,
    pub prepared_for: Option<String>,
    pub message: Option<String>,
    pub generated_on: String,
    pub sections: Vec<Section>,
    /// Always present; holds only the `TOTAL` row when details are hidden.
    pub influencers: Table,
}

/// Builds the report a viewer with `settings` is allowed to see.
pub fn build_report(
    campaign: &Campaign,
    influencers: &[Influencer],
    settings: &SharingSettings,
    query: &ReportQuery,
    generated_on: NaiveDate,
) -> Result<Report, Error> {
    if let Some(sort) = query.sort {
        if !sort.is_visible(settings) {
            return Err(Error::SortKeyNotAvailable { sort });
        }
    }

    let mut rows = query.filter.apply(influencers);
    if let Some(sort) = query.sort {
        metrics::sort_influencers(&mut rows, sort);
    }

    let influencer_table = influencer_table(&rows, settings);

    let mut sections = vec![];
    if settings.include_metrics {
        sections.push(performance_section(campaign, influencers, settings));
    }
    if settings.include_dashboard && !influencers.is_empty() {
        sections.push(breakdown_section(influencers, settings));
    }
    if settings.include_influencer_details {
        sections.push(Section {
            title: INFLUENCERS.to_string(),
            tables: vec![influencer_table.clone()],
        });
    }

    Ok(Report {
        campaign_name: campaign.name.clone(),
        prepared_for: settings.client_name.clone(),
        message: settings.custom_message.clone(),
        generated_on: format_date(generated_on),
        sections,
        influencers: influencer_table,
    })
}

pub fn influencer_table(rows: &[&Influencer], settings: &SharingSettings) -> Table {
    let columns = Column::visible(settings);
    let titles: Vec<&str> = columns.iter().map(|c| c.title()).collect();
    let mut table = Table::new(None, &titles);

    if settings.include_influencer_details {
        for influencer in rows {
            table
                .rows
                .push(columns.iter().map(|c| c.cell(influencer)).collect());
        }
    }

    let totals = CampaignMetrics::from_influencers(rows.iter().copied());
    table
        .rows
        .push(columns.iter().map(|c| c.total(&totals)).collect());

    table
}

fn performance_section(
    campaign: &Campaign,
    influencers: &[Influencer],
    settings: &SharingSettings,
) -> Section {
    let aggregates = metrics::aggregate(influencers, campaign.budget);
    let totals = &aggregates.totals;
    let mut table = Table::new(None, &["Metric", "Value"]);
    let mut push = |label: &str, value: String| table.rows.push(vec![label.to_string(), value]);

    push("Total Views", format_count(totals.total_views));
    if settings.include_costs {
        push("Total Investment", format_currency(totals.total_cost));
    }
    if settings.include_budget {
        if let Some(budget_efficiency) = aggregates.budget_efficiency {
            push("Campaign Budget", format_currency(aggregates.budget));
            push("Views per ₹ of Budget", format_ratio(budget_efficiency));
        }
    }
    if settings.include_engagement_metrics {
        push("Total Likes", format_count(totals.total_likes));
        push("Total Shares", format_count(totals.total_shares));
        push("Total Comments", format_count(totals.total_comments));
    }
    if settings.include_costs {
        if let Some(cost_per_view) = aggregates.cost_per_view {
            push("Cost per View", format_cost_per_view(cost_per_view));
        }
        push("Views per ₹", format_ratio(aggregates.efficiency));
        if settings.include_engagement_metrics {
            push(
                "Cost per Engagement",
                format_currency(aggregates.cost_per_engagement),
            );
        }
    }

    Section {
        title: PERFORMANCE.to_string(),
        tables: vec![table],
    }
}

fn breakdown_section(influencers: &[Influencer], settings: &SharingSettings) -> Section {
    let aggregates = metrics::aggregate(influencers, 0.0);

    let mut headers = vec!["Platform", "Influencers", "Views"];
    if settings.include_engagement_metrics {
        headers.extend(["Likes", "Shares", "Comments"]);
    }
    if settings.include_costs {
        headers.extend(["Investment (₹)", "Avg Views per ₹"]);
        if settings.include_engagement_metrics {
            headers.push("Cost per Engagement");
        }
    }

    let mut platforms = Table::new(Some("Platforms"), &headers);
    for platform in &aggregates.platforms {
        let mut row = vec![
            platform.platform.clone(),
            format_count(platform.influencer_count as u64),
            format_count(platform.metrics.total_views),
        ];
        if settings.include_engagement_metrics {
            row.push(format_count(platform.metrics.total_likes));
            row.push(format_count(platform.metrics.total_shares));
            row.push(format_count(platform.metrics.total_comments));
        }
        if settings.include_costs {
            row.push(format_currency(platform.metrics.total_cost));
            row.push(format_ratio(platform.average_efficiency));
            if settings.include_engagement_metrics {
                row.push(format_currency(platform.cost_per_engagement));
            }
        }
        platforms.rows.push(row);
    }

    let mut post_types = Table::new(Some("Post Types"), &["Post Type", "Count"]);
    for entry in &aggregates.post_types {
        post_types
            .rows
            .push(vec![entry.post_type.clone(), format_count(entry.count as u64)]);
    }

    let mut tables = vec![platforms, post_types];

    if settings.include_costs && settings.include_influencer_details {
        let mut top = Table::new(
            Some("Top Performers"),
            &["Rank", "Name", "Platform", "Views per ₹"],
        );
        for (rank, performer) in aggregates.top_performers.iter().enumerate() {
            top.rows.push(vec![
                (rank + 1).to_string(),
                performer.name.clone(),
                performer.platform.clone(),
                format_ratio(performer.efficiency),
            ]);
        }
        tables.push(top);
    }

    Section {
        title: BREAKDOWN.to_string(),
        tables,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Utc;

    use super::*;
    use crate::campaign::CampaignId;
    use crate::metrics::tests::{influencer, sample};

    pub(crate) fn campaign(budget: f64) -> Campaign {
        let now = Utc::now();
        Campaign {
            id: CampaignId::from_raw(1),
            name: "Diwali Launch".to_string(),
            created_at: now,
            modified_at: now,
            budget,
            share_token: "abc".to_string(),
            sharing_settings: SharingSettings::default(),
            metrics: CampaignMetrics::default(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    fn section_titles(report: &Report) -> Vec<&str> {
        report.sections.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn column_mapping_follows_flags() {
        let hidden = SharingSettings {
            include_engagement_metrics: false,
            include_costs: false,
            include_influencer_details: false,
            ..SharingSettings::default()
        };
        assert_eq!(
            Column::visible(&hidden),
            vec![Column::Name, Column::Platform, Column::PostType, Column::Views]
        );

        let titles: Vec<_> = Column::visible(&SharingSettings::everything())
            .into_iter()
            .map(Column::title)
            .collect();
        assert_eq!(
            titles,
            vec![
                "Name",
                "Platform",
                "Post Type",
                "Views",
                "Likes",
                "Shares",
                "Comments",
                "Investment (₹)",
                "Views per ₹",
                "Post URL"
            ]
        );
    }

    #[test]
    fn hiding_costs_drops_every_cost_column() {
        let settings = SharingSettings {
            include_costs: false,
            include_influencer_details: true,
            ..SharingSettings::default()
        };

        let report = build_report(
            &campaign(50000.0),
            &sample(),
            &settings,
            &ReportQuery::default(),
            today(),
        )
        .unwrap();

        for section in &report.sections {
            for table in &section.tables {
                for header in &table.headers {
                    assert!(!header.contains('₹'), "{} leaks a cost", header);
                }
                for row in &table.rows {
                    assert!(row.iter().all(|cell| !cell.contains('₹')));
                }
            }
        }
        assert_eq!(
            report.influencers.headers,
            vec![
                "Name",
                "Platform",
                "Post Type",
                "Views",
                "Likes",
                "Shares",
                "Comments",
                "Post URL"
            ]
        );
        assert_eq!(report.influencers.rows.len(), 5);
    }

    #[test]
    fn total_row_is_last_and_sums_displayed_rows() {
        let report = build_report(
            &campaign(0.0),
            &sample(),
            &SharingSettings::everything(),
            &ReportQuery {
                sort: Some(SortKey::Views),
                filter: InfluencerFilter {
                    platform: Some("Instagram".into()),
                    ..InfluencerFilter::default()
                },
            },
            today(),
        )
        .unwrap();

        let rows = &report.influencers.rows;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "Influencer1");
        assert_eq!(rows[1][0], "Influencer4");
        assert_eq!(
            rows[2],
            vec![
                "TOTAL", "", "", "23,000", "1,600", "55", "90", "₹500.00", "46.00", ""
            ]
        );
    }

    #[test]
    fn total_row_survives_hidden_details() {
        let settings = SharingSettings {
            include_influencer_details: false,
            ..SharingSettings::default()
        };

        let report = build_report(
            &campaign(0.0),
            &sample(),
            &settings,
            &ReportQuery::default(),
            today(),
        )
        .unwrap();

        assert_eq!(report.influencers.rows.len(), 1);
        assert_eq!(report.influencers.rows[0][0], TOTAL);
        assert_eq!(section_titles(&report), vec![PERFORMANCE, BREAKDOWN]);
    }

    #[test]
    fn sections_keep_their_order() {
        let report = build_report(
            &campaign(0.0),
            &sample(),
            &SharingSettings::everything(),
            &ReportQuery::default(),
            today(),
        )
        .unwrap();

        assert_eq!(section_titles(&report), vec![PERFORMANCE, BREAKDOWN, INFLUENCERS]);
        assert_eq!(report.generated_on, "March 05, 2024");
    }

    #[test]
    fn breakdown_is_skipped_without_records() {
        let report = build_report(
            &campaign(0.0),
            &[],
            &SharingSettings::everything(),
            &ReportQuery::default(),
            today(),
        )
        .unwrap();

        assert_eq!(section_titles(&report), vec![PERFORMANCE, INFLUENCERS]);
    }

    #[test]
    fn budget_rows_need_flag_and_positive_budget() {
        let influencers = vec![influencer(
            "Influencer1",
            "Instagram",
            "Post",
            15000,
            500.0,
            (1200, 45, 78),
        )];
        let settings = SharingSettings {
            include_budget: true,
            ..SharingSettings::default()
        };

        let report = build_report(
            &campaign(50000.0),
            &influencers,
            &settings,
            &ReportQuery::default(),
            today(),
        )
        .unwrap();
        let performance = &report.sections[0].tables[0].rows;
        assert!(performance.contains(&vec!["Total Views".to_string(), "15,000".to_string()]));
        assert!(performance.contains(&vec![
            "Campaign Budget".to_string(),
            "₹50,000.00".to_string()
        ]));
        assert!(performance.contains(&vec![
            "Views per ₹ of Budget".to_string(),
            "0.30".to_string()
        ]));

        let report = build_report(
            &campaign(0.0),
            &influencers,
            &settings,
            &ReportQuery::default(),
            today(),
        )
        .unwrap();
        let performance = &report.sections[0].tables[0].rows;
        assert!(performance.iter().all(|row| row[0] != "Campaign Budget"));
    }

    #[test]
    fn hidden_sort_key_is_rejected() {
        let result = build_report(
            &campaign(0.0),
            &sample(),
            &SharingSettings::default(),
            &ReportQuery {
                sort: Some(SortKey::Cost),
                filter: InfluencerFilter::default(),
            },
            today(),
        );

        assert_eq!(
            result.unwrap_err(),
            Error::SortKeyNotAvailable {
                sort: SortKey::Cost
            }
        );
    }

    #[test]
    fn header_carries_client_details() {
        let settings = SharingSettings {
            client_name: Some("Acme".into()),
            custom_message: Some("Thanks!".into()),
            ..SharingSettings::default()
        };

        let report = build_report(
            &campaign(0.0),
            &[],
            &settings,
            &ReportQuery::default(),
            today(),
        )
        .unwrap();

        assert_eq!(report.campaign_name, "Diwali Launch");
        assert_eq!(report.prepared_for.as_deref(), Some("Acme"));
        assert_eq!(report.message.as_deref(), Some("Thanks!"));
    }
}
